//! Textual placeholder helpers shared by the statement compositor and the
//! bulk engines.
//!
//! The scan is purely textual: a `?` inside quoted string data is counted
//! like any other. Callers must pass literal question marks through
//! parameter binding or [`RawLiteral`](crate::RawLiteral) instead.

use crate::error::{Result, SqlBulkError};

/// The single-character token standing for one bound parameter.
pub const PLACEHOLDER: char = '?';

/// Counts placeholder markers in a statement's text.
pub fn count_placeholders(text: &str) -> usize {
    text.bytes().filter(|&b| b == PLACEHOLDER as u8).count()
}

/// Returns the byte offset of the (n+1)-th placeholder marker (0-based `n`),
/// or `None` if fewer than `n + 1` markers exist.
pub fn locate_nth_placeholder(text: &str, n: usize) -> Option<usize> {
    text.bytes()
        .enumerate()
        .filter(|&(_, b)| b == PLACEHOLDER as u8)
        .map(|(offset, _)| offset)
        .nth(n)
}

/// Fails with [`SqlBulkError::PlaceholderMismatch`] when the statement's
/// marker count does not equal the expected parameter count.
///
/// Both bulk engines call this before any chunk-size computation, so a
/// malformed template is rejected before the first dispatch.
pub fn ensure_placeholder_count(text: &str, expected: usize) -> Result<()> {
    let actual = count_placeholders(text);

    if actual != expected {
        return Err(SqlBulkError::PlaceholderMismatch { expected, actual });
    }

    Ok(())
}

/// Builds a comma-joined run of `n` placeholder markers, e.g. `"?,?,?"`.
pub fn repeat_placeholders(n: usize) -> String {
    let mut out = String::with_capacity(n * 2);
    for i in 0..n {
        if i > 0 {
            out.push(',');
        }
        out.push(PLACEHOLDER);
    }
    out
}
