use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Row, SqlValue};

/// The capability the bulk engines require from a backend.
///
/// Implementations are responsible for:
/// - Converting `SqlValue` parameters to native types
/// - Replacing `?` placeholder markers with their native parameter syntax
/// - Reporting the bound-parameter ceiling for a single statement
#[async_trait]
pub trait Database: Send + Sync {
    /// The maximum number of bound parameters the backend accepts in one
    /// statement. Sole capacity input to chunk-size computation.
    fn max_variable_number(&self) -> usize;

    /// Execute a side-effecting statement with the given parameters.
    async fn execute_sql_command(&self, statement: &str, parameters: &[SqlValue]) -> Result<()>;

    /// Execute a read statement and return its rows in order.
    async fn get_rows(&self, statement: &str, parameters: &[SqlValue]) -> Result<Vec<Row>>;
}
