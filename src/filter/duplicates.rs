//! Duplicate-cluster removal for observation tables.

use crate::data::{ObservationTable, Value};
use crate::error::{Result, ScrubError};
use crate::filter::FilterStats;
use std::collections::HashMap;

fn keep_mask(table: &ObservationTable, columns: &[String], group_size: usize) -> Result<Vec<bool>> {
    if columns.is_empty() {
        return Err(ScrubError::InvalidParameter(
            "Duplicate filtering requires at least one grouping column".to_string(),
        ));
    }
    let positions = columns
        .iter()
        .map(|name| table.column_position(name))
        .collect::<Result<Vec<usize>>>()?;

    // Single pass to count group sizes, second pass to keep small groups.
    let keys: Vec<Vec<&Value>> = table
        .rows()
        .map(|row| positions.iter().map(|&pos| row.at(pos)).collect())
        .collect();

    let mut group_counts: HashMap<&[&Value], usize> = HashMap::new();
    for key in &keys {
        *group_counts.entry(key.as_slice()).or_insert(0) += 1;
    }

    Ok(keys
        .iter()
        .map(|key| group_counts.get(key.as_slice()).copied().unwrap_or(0) < group_size)
        .collect())
}

/// Filter rows by duplicate-cluster membership.
///
/// Rows are grouped by their combined values in `columns`, in order. Any
/// group whose size reaches `group_size` is removed entirely, the first
/// occurrence included. Null cells group like any other value, so two rows
/// that are null in a grouping column fall into the same group. A
/// `group_size` of 1 (or 0) removes every row.
///
/// # Arguments
/// * `table` - The table to filter
/// * `columns` - Ordered grouping columns
/// * `group_size` - Group cardinality at which a cluster is removed
///
/// # Returns
/// A new table containing only rows from groups below the threshold.
pub fn filter_duplicates(
    table: &ObservationTable,
    columns: &[String],
    group_size: usize,
) -> Result<ObservationTable> {
    let keep = keep_mask(table, columns, group_size)?;
    table.select_mask(&keep)
}

/// In-place counterpart of [`filter_duplicates`].
pub fn drop_duplicates(
    table: &mut ObservationTable,
    columns: &[String],
    group_size: usize,
) -> Result<()> {
    let keep = keep_mask(table, columns, group_size)?;
    table.retain_mask(&keep)
}

/// Filter with statistics about what was filtered.
pub fn filter_duplicates_with_stats(
    table: &ObservationTable,
    columns: &[String],
    group_size: usize,
) -> Result<(ObservationTable, FilterStats)> {
    let n_before = table.n_rows();
    let filtered = filter_duplicates(table, columns, group_size)?;
    let stats = FilterStats::new(n_before, filtered.n_rows());
    Ok((filtered, stats))
}
