use async_trait::async_trait;
use tokio_postgres::{types::ToSql, Client, NoTls};

use crate::error::{Result, SqlBulkError};
use crate::placeholder::PLACEHOLDER;
use crate::traits::Database;
use crate::types::{RawQueryResult, Row, SqlValue};

/// The PostgreSQL wire protocol binds parameters with a 16-bit counter.
const MAX_VARIABLE_NUMBER: usize = 65_535;

/// PostgreSQL implementation of the Database capability using
/// tokio-postgres. Placeholder markers are rewritten to the backend's
/// `$1..$n` syntax at dispatch time.
pub struct TokioPostgresDriver {
    client: Client,
}

impl TokioPostgresDriver {
    /// Connect to a PostgreSQL database.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(|e| SqlBulkError::ConnectionFailed(e.to_string()))?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        Ok(Self { client })
    }

    async fn query(&self, statement: &str, parameters: &[SqlValue]) -> Result<RawQueryResult> {
        let statement = number_placeholders(statement);

        // Convert SqlValue parameters to tokio-postgres compatible types
        let converted: Vec<Box<dyn ToSql + Sync + Send>> =
            parameters.iter().map(sql_value_to_tosql).collect();
        let param_refs: Vec<&(dyn ToSql + Sync)> = converted
            .iter()
            .map(|b| b.as_ref() as &(dyn ToSql + Sync))
            .collect();

        let rows = self
            .client
            .query(statement.as_str(), &param_refs)
            .await
            .map_err(|e| SqlBulkError::Dispatch(e.to_string()))?;

        let columns: Vec<String> = if rows.is_empty() {
            Vec::new()
        } else {
            rows[0]
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect()
        };

        let result_rows: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                (0..row.columns().len())
                    .map(|i| row_value_to_string(row, i))
                    .collect()
            })
            .collect();

        Ok(RawQueryResult::new(columns, result_rows))
    }
}

#[async_trait]
impl Database for TokioPostgresDriver {
    fn max_variable_number(&self) -> usize {
        MAX_VARIABLE_NUMBER
    }

    async fn execute_sql_command(&self, statement: &str, parameters: &[SqlValue]) -> Result<()> {
        self.query(statement, parameters).await?;
        Ok(())
    }

    async fn get_rows(&self, statement: &str, parameters: &[SqlValue]) -> Result<Vec<Row>> {
        Ok(self.query(statement, parameters).await?.into_rows())
    }
}

/// Rewrite `?` markers into numbered `$1..$n` parameters.
/// Purely textual, matching the placeholder scan used everywhere else.
fn number_placeholders(statement: &str) -> String {
    let mut out = String::with_capacity(statement.len() + 8);
    let mut next = 1usize;

    for ch in statement.chars() {
        if ch == PLACEHOLDER {
            out.push('$');
            out.push_str(&next.to_string());
            next += 1;
        } else {
            out.push(ch);
        }
    }

    out
}

/// Convert a SqlValue to a boxed ToSql trait object.
fn sql_value_to_tosql(value: &SqlValue) -> Box<dyn ToSql + Sync + Send> {
    match value {
        SqlValue::Null => Box::new(None::<String>),
        SqlValue::Text(s) => Box::new(s.clone()),
        SqlValue::Int32(i) => Box::new(*i),
        SqlValue::Int64(i) => Box::new(*i),
        SqlValue::Float64(f) => Box::new(*f),
        SqlValue::Bool(b) => Box::new(*b),
    }
}

/// Convert a row value at a given index to a string.
fn row_value_to_string(row: &tokio_postgres::Row, index: usize) -> String {
    // Try common types and convert to string
    // This is a simplified implementation - a production version would handle more types

    // Try as i32
    if let Ok(val) = row.try_get::<_, i32>(index) {
        return val.to_string();
    }

    // Try as i64
    if let Ok(val) = row.try_get::<_, i64>(index) {
        return val.to_string();
    }

    // Try as String
    if let Ok(val) = row.try_get::<_, String>(index) {
        return val;
    }

    // Try as bool
    if let Ok(val) = row.try_get::<_, bool>(index) {
        return val.to_string();
    }

    // Try as f64
    if let Ok(val) = row.try_get::<_, f64>(index) {
        return val.to_string();
    }

    // Try as Option<String> for NULL handling
    if let Ok(val) = row.try_get::<_, Option<String>>(index) {
        return val.unwrap_or_else(|| "NULL".to_string());
    }

    // Fallback
    "UNKNOWN".to_string()
}
