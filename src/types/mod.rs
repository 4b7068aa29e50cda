mod row;
mod sql_value;

pub use row::{RawQueryResult, Row, COUNT_COLUMN};
pub use sql_value::SqlValue;
