use std::fmt;
use std::sync::Arc;

use crate::types::SqlValue;

/// A flat statement string plus its ordered parameter list.
///
/// Invariant: the number of placeholder markers in `text` equals
/// `parameters.len()`, with parameters in left-to-right marker order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    pub text: String,
    pub parameters: Vec<SqlValue>,
}

impl CompiledStatement {
    pub fn new(text: impl Into<String>, parameters: Vec<SqlValue>) -> Self {
        Self {
            text: text.into(),
            parameters,
        }
    }

    /// The identity for statement composition: splicing this into another
    /// template contributes nothing.
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            parameters: Vec::new(),
        }
    }
}

/// A statement with one variable-length parameter group bound to a single
/// placeholder, ready for chunked dispatch.
///
/// Invariant: `text` contains exactly `fixed_parameters.len() + 1` markers;
/// the extra one is the bulk slot, located at `bulk_position` among all
/// markers in left-to-right order (0-based, fixed and bulk slots counted
/// together).
#[derive(Debug, Clone, PartialEq)]
pub struct BulkExecuteStatement {
    pub text: String,
    pub fixed_parameters: Vec<SqlValue>,
    pub bulk_parameters: Vec<SqlValue>,
    pub bulk_position: usize,
}

/// A multi-row INSERT template whose single placeholder stands for one full
/// `(?,?,...)` tuple per row.
///
/// The extractor must produce the same number of values for every row of a
/// given bulk insert call.
#[derive(Clone)]
pub struct BulkInsertStatement<R> {
    pub text: String,
    extract: Arc<dyn Fn(&R) -> Vec<SqlValue> + Send + Sync>,
}

impl<R> BulkInsertStatement<R> {
    pub fn new(
        text: impl Into<String>,
        extract: impl Fn(&R) -> Vec<SqlValue> + Send + Sync + 'static,
    ) -> Self {
        Self {
            text: text.into(),
            extract: Arc::new(extract),
        }
    }

    /// Extracts the ordered parameter values for one row.
    pub fn row_parameters(&self, row: &R) -> Vec<SqlValue> {
        (self.extract)(row)
    }
}

impl<R> fmt::Debug for BulkInsertStatement<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkInsertStatement")
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}

/// A string spliced into statement text verbatim, never bound as a
/// parameter. Used for values that must appear as SQL syntax rather than
/// data; callers are responsible for its safety since it bypasses
/// parameterization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLiteral {
    value: String,
}

impl RawLiteral {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl From<&str> for RawLiteral {
    fn from(value: &str) -> Self {
        RawLiteral::new(value)
    }
}

impl From<String> for RawLiteral {
    fn from(value: String) -> Self {
        RawLiteral::new(value)
    }
}

/// Result of compiling a [`Template`](crate::Template): which shape comes
/// back is determined entirely by the slot values supplied, not by a mode
/// flag. The bulk-insert shape has its own typed path through
/// [`InsertTemplate`](crate::InsertTemplate).
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Plain(CompiledStatement),
    BulkExecute(BulkExecuteStatement),
}

impl Statement {
    /// Returns the plain shape, if that is what compilation produced.
    pub fn plain(self) -> Option<CompiledStatement> {
        match self {
            Statement::Plain(statement) => Some(statement),
            Statement::BulkExecute(_) => None,
        }
    }

    /// Returns the bulk-execute shape, if that is what compilation produced.
    pub fn bulk_execute(self) -> Option<BulkExecuteStatement> {
        match self {
            Statement::BulkExecute(statement) => Some(statement),
            Statement::Plain(_) => None,
        }
    }
}
