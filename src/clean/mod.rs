//! Column and value cleanup for raw observation feeds.

mod columns;
mod values;

pub use columns::{
    find_column, remove_homogenous_columns, rename_latlon_columns, replace_column_prefix,
};
pub use values::{round_columns, standardize_missing_values};
