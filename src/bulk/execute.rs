use std::future::Future;

use futures::future::try_join_all;
use tracing::debug;

use crate::error::{Result, SqlBulkError};
use crate::placeholder::{
    count_placeholders, ensure_placeholder_count, locate_nth_placeholder, repeat_placeholders,
};
use crate::statement::BulkExecuteStatement;
use crate::traits::Database;
use crate::types::{Row, SqlValue};

/// Executes a bulk statement in as few round trips as possible, discarding
/// per-chunk results.
///
/// Any single chunk failure fails the whole call, but chunks already
/// dispatched may have taken effect; no rollback is attempted.
pub async fn bulk_execute(
    database: &dyn Database,
    statement: &BulkExecuteStatement,
) -> Result<()> {
    bulk_dispatch(database, statement, |text, parameters| async move {
        database.execute_sql_command(&text, &parameters).await
    })
    .await?;

    Ok(())
}

/// Loads rows matching a bulk statement in as few round trips as possible,
/// concatenating each chunk's rows in chunk order.
pub async fn bulk_get_rows(
    database: &dyn Database,
    statement: &BulkExecuteStatement,
) -> Result<Vec<Row>> {
    let chunks = bulk_dispatch(database, statement, |text, parameters| async move {
        database.get_rows(&text, &parameters).await
    })
    .await?;

    Ok(chunks.into_iter().flatten().collect())
}

/// Sums the `COUNT(*)` column over all chunks of a count-shaped bulk query.
///
/// Each chunk is expected to return at most one row; a chunk with no rows
/// contributes 0.
pub async fn bulk_get_count(
    database: &dyn Database,
    statement: &BulkExecuteStatement,
) -> Result<i64> {
    let chunks = bulk_dispatch(database, statement, |text, parameters| async move {
        database.get_rows(&text, &parameters).await
    })
    .await?;

    let mut total = 0i64;
    for rows in chunks {
        if let Some(first) = rows.first() {
            total += first.count()?;
        }
    }

    Ok(total)
}

/// Shared chunking routine behind the execute, rows and count entry points.
///
/// Splits the statement text at the bulk placeholder, partitions the bulk
/// parameters into chunks that fit the backend's variable ceiling, rebuilds
/// one statement per chunk and dispatches them all concurrently. Results
/// come back in chunk order regardless of completion order. The caller's
/// parameter collections are never mutated.
async fn bulk_dispatch<T, F, Fut>(
    database: &dyn Database,
    statement: &BulkExecuteStatement,
    op: F,
) -> Result<Vec<T>>
where
    F: Fn(String, Vec<SqlValue>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if statement.bulk_parameters.is_empty() {
        return Ok(Vec::new());
    }

    let fixed = statement.fixed_parameters.len();
    ensure_placeholder_count(&statement.text, fixed + 1)?;

    let max_variables = database.max_variable_number();
    if max_variables <= fixed {
        return Err(SqlBulkError::ChunkCapacity {
            max_variables,
            required: fixed + 1,
        });
    }
    let chunk_size = max_variables - fixed;

    // The bulk placeholder itself is discarded; each chunk re-inserts its
    // own run of markers between prefix and suffix.
    let split = locate_nth_placeholder(&statement.text, statement.bulk_position).ok_or(
        SqlBulkError::PlaceholderMismatch {
            expected: statement.bulk_position + 1,
            actual: count_placeholders(&statement.text),
        },
    )?;
    let prefix = &statement.text[..split];
    let suffix = &statement.text[split + 1..];

    let before = &statement.fixed_parameters[..statement.bulk_position];
    let after = &statement.fixed_parameters[statement.bulk_position..];

    let dispatches: Vec<_> = statement
        .bulk_parameters
        .chunks(chunk_size)
        .map(|chunk| {
            let text = format!("{prefix}{}{suffix}", repeat_placeholders(chunk.len()));
            let mut parameters = Vec::with_capacity(fixed + chunk.len());
            parameters.extend_from_slice(before);
            parameters.extend_from_slice(chunk);
            parameters.extend_from_slice(after);
            op(text, parameters)
        })
        .collect();

    debug!(
        chunks = dispatches.len(),
        chunk_size, "dispatching bulk statement"
    );

    try_join_all(dispatches).await
}
