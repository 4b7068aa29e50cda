//! An ordered apply-once-and-record migration sequencer built on the
//! Database capability and the statement compositor.
//!
//! Two flavors ship here: [`MigrationRunner`] records applied migrations by
//! id in a ledger table (bootstrapping the table on first use), while
//! [`migrate`] drives a numeric schema version through a caller-provided
//! [`VersionStore`].

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::{debug, info};

use crate::error::{Result, SqlBulkError};
use crate::statement::Template;
use crate::traits::Database;

/// One schema migration, identified by a stable id and applied at most once.
#[async_trait]
pub trait Migration: Send + Sync {
    fn id(&self) -> &str;

    async fn apply(&self, database: &dyn Database) -> Result<()>;
}

type ApplyFn = Box<dyn for<'a> Fn(&'a dyn Database) -> BoxFuture<'a, Result<()>> + Send + Sync>;

/// Closure-backed [`Migration`] for callers that do not want a struct per
/// migration.
pub struct FnMigration {
    id: String,
    apply: ApplyFn,
}

impl FnMigration {
    pub fn new<F>(id: impl Into<String>, apply: F) -> Self
    where
        F: for<'a> Fn(&'a dyn Database) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            apply: Box::new(apply),
        }
    }
}

#[async_trait]
impl Migration for FnMigration {
    fn id(&self) -> &str {
        &self.id
    }

    async fn apply(&self, database: &dyn Database) -> Result<()> {
        (self.apply)(database).await
    }
}

const DEFAULT_LEDGER_TABLE: &str = "_db_migration";

/// Applies migrations in order, skipping those whose ids are already
/// recorded in the ledger table and recording each id as it completes.
///
/// The ledger table is created on demand: a failing read of the executed
/// ids is taken to mean the table does not exist yet.
pub struct MigrationRunner<'a> {
    database: &'a dyn Database,
    ledger_table: String,
    target_id: Option<String>,
}

impl<'a> MigrationRunner<'a> {
    pub fn new(database: &'a dyn Database) -> Self {
        Self {
            database,
            ledger_table: DEFAULT_LEDGER_TABLE.to_string(),
            target_id: None,
        }
    }

    /// Override the ledger table name. The name is spliced into statement
    /// text as a raw literal, so it must be trusted input.
    pub fn ledger_table(mut self, name: impl Into<String>) -> Self {
        self.ledger_table = name.into();
        self
    }

    /// Stop after the migration with this id has been applied (or skipped,
    /// when already recorded).
    pub fn target_id(mut self, id: impl Into<String>) -> Self {
        self.target_id = Some(id.into());
        self
    }

    pub async fn run(&self, migrations: &[&dyn Migration]) -> Result<()> {
        let executed = self.executed_ids().await?;

        if executed.is_empty() {
            debug!("no previously applied migrations");
        } else {
            debug!(
                count = executed.len(),
                last = executed.last().map(String::as_str),
                "previously applied migrations"
            );
        }

        for migration in migrations {
            let id = migration.id();

            if executed.iter().any(|executed_id| executed_id == id) {
                if self.target_id.as_deref() == Some(id) {
                    break;
                }
                continue;
            }

            migration.apply(self.database).await?;
            self.record(id).await?;
            info!(id, "applied migration");

            if self.target_id.as_deref() == Some(id) {
                break;
            }
        }

        Ok(())
    }

    async fn executed_ids(&self) -> Result<Vec<String>> {
        let statement = Template::new()
            .text("SELECT id FROM ")
            .raw(self.ledger_table.as_str())
            .compile_plain()?;

        match self
            .database
            .get_rows(&statement.text, &statement.parameters)
            .await
        {
            Ok(rows) => rows
                .iter()
                .map(|row| row.get("id").map(str::to_string))
                .collect(),
            Err(_) => {
                self.bootstrap().await?;
                Ok(Vec::new())
            }
        }
    }

    async fn record(&self, id: &str) -> Result<()> {
        let statement = Template::new()
            .text("INSERT INTO ")
            .raw(self.ledger_table.as_str())
            .text(" (id) VALUES (")
            .value(id)
            .text(")")
            .compile_plain()?;

        self.database
            .execute_sql_command(&statement.text, &statement.parameters)
            .await
    }

    async fn bootstrap(&self) -> Result<()> {
        let statement = Template::new()
            .text("CREATE TABLE IF NOT EXISTS ")
            .raw(self.ledger_table.as_str())
            .text(" (id VARCHAR NOT NULL, PRIMARY KEY (id))")
            .compile_plain()?;

        self.database
            .execute_sql_command(&statement.text, &statement.parameters)
            .await
    }
}

/// Tracks a numeric schema version for [`migrate`].
#[async_trait]
pub trait VersionStore: Send + Sync {
    async fn current_version(&self, database: &dyn Database) -> Result<u32>;

    async fn set_version(&self, database: &dyn Database, version: u32) -> Result<()>;
}

/// Drives the schema from the store's current version to `target_version`,
/// applying every step whose version lies in `(current, target]` in
/// ascending version order, then recording the target version once.
///
/// Fails with [`SqlBulkError::UnreachableVersion`] when no step carries the
/// target version; a no-op when the schema is already at the target.
pub async fn migrate(
    database: &dyn Database,
    store: &dyn VersionStore,
    target_version: u32,
    steps: &[(u32, &dyn Migration)],
) -> Result<()> {
    let current = store.current_version(database).await?;

    if current == target_version {
        return Ok(());
    }

    if !steps.iter().any(|(version, _)| *version == target_version) {
        return Err(SqlBulkError::UnreachableVersion(target_version));
    }

    let mut ordered: Vec<&(u32, &dyn Migration)> = steps.iter().collect();
    ordered.sort_by_key(|(version, _)| *version);

    for (version, migration) in ordered {
        if *version > target_version {
            break;
        }

        if current < *version {
            migration.apply(database).await?;
            info!(version = *version, "applied migration step");
        }
    }

    store.set_version(database, target_version).await
}
