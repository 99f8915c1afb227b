//! Coordinate-validity filtering for observation tables.

use crate::data::ObservationTable;
use crate::error::Result;
use crate::filter::FilterStats;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Interval check applied to the coordinate ranges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordBounds {
    /// Keep only coordinates strictly inside the valid range.
    #[default]
    Exclusive,
    /// Keep coordinates on the range boundary as well.
    Inclusive,
}

fn keep_mask(
    table: &ObservationTable,
    latitude_col: &str,
    longitude_col: &str,
    bounds: CoordBounds,
) -> Result<Vec<bool>> {
    let lat_pos = table.column_position(latitude_col)?;
    let lon_pos = table.column_position(longitude_col)?;

    let in_range = |value: Option<f64>, limit: f64| match value {
        Some(v) => match bounds {
            CoordBounds::Exclusive => -limit < v && v < limit,
            CoordBounds::Inclusive => -limit <= v && v <= limit,
        },
        None => false,
    };

    Ok((0..table.n_rows())
        .into_par_iter()
        .map(|row| {
            let row = table.row(row);
            in_range(row.at(lat_pos).as_f64(), 90.0) && in_range(row.at(lon_pos).as_f64(), 180.0)
        })
        .collect())
}

/// Filter rows by coordinate validity.
///
/// Keeps rows whose latitude lies within (-90, 90) and longitude within
/// (-180, 180); with [`CoordBounds::Inclusive`] the closed intervals are
/// used instead. A null or non-numeric coordinate never passes the range
/// check, so such rows are removed rather than reported as errors.
///
/// # Arguments
/// * `table` - The table to filter
/// * `latitude_col` - Name of the latitude column
/// * `longitude_col` - Name of the longitude column
/// * `bounds` - Exclusive or inclusive range check
///
/// # Returns
/// A new table containing only rows with valid coordinates.
pub fn filter_invalid_coords(
    table: &ObservationTable,
    latitude_col: &str,
    longitude_col: &str,
    bounds: CoordBounds,
) -> Result<ObservationTable> {
    let keep = keep_mask(table, latitude_col, longitude_col, bounds)?;
    table.select_mask(&keep)
}

/// In-place counterpart of [`filter_invalid_coords`].
pub fn drop_invalid_coords(
    table: &mut ObservationTable,
    latitude_col: &str,
    longitude_col: &str,
    bounds: CoordBounds,
) -> Result<()> {
    let keep = keep_mask(table, latitude_col, longitude_col, bounds)?;
    table.retain_mask(&keep)
}

/// Filter with statistics about what was filtered.
pub fn filter_invalid_coords_with_stats(
    table: &ObservationTable,
    latitude_col: &str,
    longitude_col: &str,
    bounds: CoordBounds,
) -> Result<(ObservationTable, FilterStats)> {
    let n_before = table.n_rows();
    let filtered = filter_invalid_coords(table, latitude_col, longitude_col, bounds)?;
    let stats = FilterStats::new(n_before, filtered.n_rows());
    Ok((filtered, stats))
}
