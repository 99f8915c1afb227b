//! Data structures for observation records.

mod table;
mod value;

pub use table::{ObservationTable, RowRef};
pub use value::Value;
