//! sqlbulk - SQL statement composition and bulk-operation chunking
//!
//! Compiles templated SQL statements from mixed literal/parameter/nested
//! fragments, and executes parameter sets that exceed a backend's bound
//! parameter ceiling by splitting the work into right-sized round trips and
//! recombining results in order.
//!
//! # Example
//! ```ignore
//! use sqlbulk::{BulkClient, Statement, Template};
//!
//! let client = BulkClient::connect("postgres://localhost/mydb").await?;
//!
//! let statement = Template::new()
//!     .text("SELECT name FROM users WHERE tenant = ")
//!     .value(tenant_id)
//!     .text(" AND id IN (")
//!     .values(user_ids)
//!     .text(")")
//!     .compile()?;
//!
//! // One logical call, as many round trips as the backend limit requires.
//! let rows = match statement {
//!     Statement::BulkExecute(bulk) => client.get_rows(&bulk).await?,
//!     Statement::Plain(plain) => {
//!         client.database().get_rows(&plain.text, &plain.parameters).await?
//!     }
//! };
//! ```

pub mod bulk;
pub mod drivers;
pub mod error;
pub mod migrate;
pub mod placeholder;
pub mod statement;
pub mod traits;
pub mod types;

mod client;

// Re-export main types for convenient access
pub use bulk::{bulk_execute, bulk_get_count, bulk_get_rows, bulk_insert};
pub use client::BulkClient;
pub use error::{Result, SqlBulkError};
pub use migrate::{migrate, FnMigration, Migration, MigrationRunner, VersionStore};
pub use statement::{
    BulkExecuteStatement, BulkInsertStatement, CompiledStatement, InsertTemplate, RawLiteral,
    Statement, Template,
};
pub use traits::Database;
pub use types::{RawQueryResult, Row, SqlValue, COUNT_COLUMN};
