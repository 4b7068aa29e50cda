mod execute;
mod insert;

pub use execute::{bulk_execute, bulk_get_count, bulk_get_rows};
pub use insert::bulk_insert;
