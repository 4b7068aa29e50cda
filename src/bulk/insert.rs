use futures::future::try_join_all;
use tracing::debug;

use crate::error::{Result, SqlBulkError};
use crate::placeholder::{ensure_placeholder_count, locate_nth_placeholder, repeat_placeholders};
use crate::statement::BulkInsertStatement;
use crate::traits::Database;
use crate::types::SqlValue;

/// Inserts rows in as few round trips as possible.
///
/// The template's single placeholder is expanded per chunk into a
/// comma-joined list of `(?,?,...)` tuple groups, one per row; the
/// surrounding parentheses come from the template itself. Rows are never
/// mutated and their order is preserved across chunks.
pub async fn bulk_insert<R>(
    database: &dyn Database,
    rows: &[R],
    statement: &BulkInsertStatement<R>,
) -> Result<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };

    ensure_placeholder_count(&statement.text, 1)?;

    let arity = statement.row_parameters(first).len();
    let max_variables = database.max_variable_number();
    let chunk_size = if arity == 0 { 0 } else { max_variables / arity };
    if chunk_size == 0 {
        return Err(SqlBulkError::ChunkCapacity {
            max_variables,
            required: arity.max(1),
        });
    }

    // Count is 1 after the check above, so the placeholder exists.
    let split = locate_nth_placeholder(&statement.text, 0).ok_or(
        SqlBulkError::PlaceholderMismatch {
            expected: 1,
            actual: 0,
        },
    )?;
    let prefix = &statement.text[..split];
    let suffix = &statement.text[split + 1..];
    let tuple = repeat_placeholders(arity);

    // Every chunk statement is built before the first dispatch so that an
    // arity drift fails the call without partial effects.
    let mut built = Vec::with_capacity(rows.len().div_ceil(chunk_size));
    for chunk in rows.chunks(chunk_size) {
        let groups = vec![tuple.as_str(); chunk.len()].join("),(");
        let text = format!("{prefix}{groups}{suffix}");

        let mut parameters: Vec<SqlValue> = Vec::with_capacity(chunk.len() * arity);
        for row in chunk {
            let values = statement.row_parameters(row);
            if values.len() != arity {
                return Err(SqlBulkError::RowArity {
                    expected: arity,
                    actual: values.len(),
                });
            }
            parameters.extend(values);
        }

        built.push((text, parameters));
    }

    debug!(
        chunks = built.len(),
        rows_per_chunk = chunk_size,
        "dispatching bulk insert"
    );

    try_join_all(built.into_iter().map(|(text, parameters)| async move {
        database.execute_sql_command(&text, &parameters).await
    }))
    .await?;

    Ok(())
}
