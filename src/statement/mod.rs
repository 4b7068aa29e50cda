mod compiled;
mod template;

pub use compiled::{
    BulkExecuteStatement, BulkInsertStatement, CompiledStatement, RawLiteral, Statement,
};
pub use template::{InsertTemplate, Template};
