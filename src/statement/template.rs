use std::sync::Arc;

use crate::error::{Result, SqlBulkError};
use crate::placeholder::PLACEHOLDER;
use crate::statement::compiled::{
    BulkExecuteStatement, BulkInsertStatement, CompiledStatement, RawLiteral, Statement,
};
use crate::types::SqlValue;

/// One slot of a template, interleaved with literal text.
enum Part {
    Text(String),
    Value(SqlValue),
    Values(Vec<SqlValue>),
    Raw(RawLiteral),
    Nested(CompiledStatement),
}

/// Builder for a templated statement: an alternating sequence of literal
/// text and typed slots, compiled into one of the statement shapes.
///
/// # Example
/// ```
/// use sqlbulk::{Statement, Template};
///
/// let statement = Template::new()
///     .text("SELECT name FROM users WHERE tenant = ")
///     .value(7)
///     .text(" AND id IN (")
///     .values([1, 2, 3])
///     .text(")")
///     .compile()
///     .unwrap();
///
/// match statement {
///     Statement::BulkExecute(bulk) => {
///         assert_eq!(bulk.bulk_parameters.len(), 3);
///         assert_eq!(bulk.bulk_position, 1);
///     }
///     Statement::Plain(_) => unreachable!(),
/// }
/// ```
#[derive(Default)]
pub struct Template {
    parts: Vec<Part>,
}

impl Template {
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Append literal statement text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(Part::Text(text.into()));
        self
    }

    /// Append a scalar parameter slot: one placeholder marker in the text,
    /// one bound value.
    pub fn value(mut self, value: impl Into<SqlValue>) -> Self {
        self.parts.push(Part::Value(value.into()));
        self
    }

    /// Append the bulk parameter group: one placeholder marker standing for
    /// a variable-length collection. At most one per template.
    pub fn values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        self.parts
            .push(Part::Values(values.into_iter().map(Into::into).collect()));
        self
    }

    /// Splice a raw literal into the text verbatim, bypassing parameter
    /// binding.
    pub fn raw(mut self, literal: impl Into<RawLiteral>) -> Self {
        self.parts.push(Part::Raw(literal.into()));
        self
    }

    /// Splice a pre-built statement fragment: its trimmed text is inlined
    /// and its parameters are appended in order.
    pub fn nested(mut self, statement: CompiledStatement) -> Self {
        self.parts.push(Part::Nested(statement));
        self
    }

    /// Turn this template into a multi-row INSERT template. The slot emits
    /// the single placeholder standing for one `(?,?,...)` tuple per row;
    /// only literal text may follow.
    pub fn rows<R>(
        self,
        extract: impl Fn(&R) -> Vec<SqlValue> + Send + Sync + 'static,
    ) -> InsertTemplate<R> {
        InsertTemplate {
            template: self.text(PLACEHOLDER.to_string()),
            extract: Arc::new(extract),
        }
    }

    /// Compile into a flat statement, classifying the final shape from the
    /// slots supplied: a bulk parameter group yields
    /// [`Statement::BulkExecute`], otherwise [`Statement::Plain`].
    ///
    /// Fails with [`SqlBulkError::AmbiguousBulkShape`] when more than one
    /// bulk group is present.
    pub fn compile(self) -> Result<Statement> {
        let mut text = String::new();
        let mut parameters = Vec::new();
        let mut placeholders = 0usize;
        let mut bulk: Option<(usize, Vec<SqlValue>)> = None;

        for part in self.parts {
            match part {
                Part::Text(segment) => text.push_str(&segment),
                Part::Raw(literal) => text.push_str(literal.value()),
                Part::Value(value) => {
                    text.push(PLACEHOLDER);
                    placeholders += 1;
                    parameters.push(value);
                }
                Part::Values(values) => {
                    if bulk.is_some() {
                        return Err(SqlBulkError::AmbiguousBulkShape);
                    }
                    text.push(PLACEHOLDER);
                    bulk = Some((placeholders, values));
                    placeholders += 1;
                }
                Part::Nested(nested) => {
                    text.push_str(nested.text.trim());
                    placeholders += nested.parameters.len();
                    parameters.extend(nested.parameters);
                }
            }
        }

        Ok(match bulk {
            Some((bulk_position, bulk_parameters)) => {
                Statement::BulkExecute(BulkExecuteStatement {
                    text,
                    fixed_parameters: parameters,
                    bulk_parameters,
                    bulk_position,
                })
            }
            None => Statement::Plain(CompiledStatement { text, parameters }),
        })
    }

    /// Compile, expecting the plain shape; a bulk parameter group is
    /// rejected.
    pub fn compile_plain(self) -> Result<CompiledStatement> {
        match self.compile()? {
            Statement::Plain(statement) => Ok(statement),
            Statement::BulkExecute(_) => Err(SqlBulkError::AmbiguousBulkShape),
        }
    }
}

/// A template terminated by a per-row parameter extractor; compiles into a
/// [`BulkInsertStatement`].
pub struct InsertTemplate<R> {
    template: Template,
    extract: Arc<dyn Fn(&R) -> Vec<SqlValue> + Send + Sync>,
}

impl<R> InsertTemplate<R> {
    /// Append literal statement text after the tuple placeholder.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.template = self.template.text(text);
        self
    }

    pub fn compile(self) -> Result<BulkInsertStatement<R>>
    where
        R: 'static,
    {
        let extract = self.extract;
        let statement = self.template.compile_plain()?;

        Ok(BulkInsertStatement::new(statement.text, move |row| {
            extract(row)
        }))
    }
}
