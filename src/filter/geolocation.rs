//! Geolocation-quality filtering for observation tables.

use crate::data::{ObservationTable, RowRef};
use crate::error::{Result, ScrubError};
use crate::filter::FilterStats;

fn numeric(row: RowRef<'_>, position: usize, column: &str) -> Result<f64> {
    let value = row.at(position);
    value.as_f64().ok_or_else(|| ScrubError::TypeMismatch {
        column: column.to_string(),
        row: row.index(),
        expected: "numeric coordinate".to_string(),
        found: value.type_name().to_string(),
    })
}

// Sequential on purpose: the mask is fallible and the first offending row
// must produce the error.
fn keep_mask(
    table: &ObservationTable,
    latitude_col: &str,
    longitude_col: &str,
    grid_latitude_col: &str,
    grid_longitude_col: &str,
) -> Result<Vec<bool>> {
    let lat_pos = table.column_position(latitude_col)?;
    let lon_pos = table.column_position(longitude_col)?;
    let grid_lat_pos = table.column_position(grid_latitude_col)?;
    let grid_lon_pos = table.column_position(grid_longitude_col)?;

    let mut keep = Vec::with_capacity(table.n_rows());
    for row in table.rows() {
        let lat = numeric(row, lat_pos, latitude_col)?;
        let lon = numeric(row, lon_pos, longitude_col)?;
        let grid_lat = row.at(grid_lat_pos).as_f64();
        let grid_lon = row.at(grid_lon_pos).as_f64();

        let on_grid_center = grid_lat == Some(lat) && grid_lon == Some(lon);
        let truncated = lat.fract() == 0.0 || lon.fract() == 0.0;
        keep.push(!(on_grid_center || truncated));
    }
    Ok(keep)
}

/// Filter rows by geolocation quality.
///
/// A row is removed when its GPS coordinates exactly equal the grid-center
/// coordinates the platform assigns, or when either GPS coordinate is an
/// exact integer. Both conditions indicate a device default or manual
/// truncation rather than a real reading. Comparisons use exact float
/// equality, so a coordinate that was rounded but not exactly representable
/// passes the check.
///
/// GPS coordinates must be numeric; a null or non-numeric GPS cell fails
/// with [`ScrubError::TypeMismatch`]. Non-numeric grid cells just never
/// match the GPS pair.
///
/// # Arguments
/// * `table` - The table to filter
/// * `latitude_col` - Name of the GPS latitude column
/// * `longitude_col` - Name of the GPS longitude column
/// * `grid_latitude_col` - Name of the grid-center latitude column
/// * `grid_longitude_col` - Name of the grid-center longitude column
///
/// # Returns
/// A new table containing only rows with plausible GPS coordinates.
pub fn filter_poor_geolocation(
    table: &ObservationTable,
    latitude_col: &str,
    longitude_col: &str,
    grid_latitude_col: &str,
    grid_longitude_col: &str,
) -> Result<ObservationTable> {
    let keep = keep_mask(
        table,
        latitude_col,
        longitude_col,
        grid_latitude_col,
        grid_longitude_col,
    )?;
    table.select_mask(&keep)
}

/// In-place counterpart of [`filter_poor_geolocation`].
///
/// The table is only modified once the whole mask has been computed, so a
/// type error part-way through leaves it untouched.
pub fn drop_poor_geolocation(
    table: &mut ObservationTable,
    latitude_col: &str,
    longitude_col: &str,
    grid_latitude_col: &str,
    grid_longitude_col: &str,
) -> Result<()> {
    let keep = keep_mask(
        table,
        latitude_col,
        longitude_col,
        grid_latitude_col,
        grid_longitude_col,
    )?;
    table.retain_mask(&keep)
}

/// Filter with statistics about what was filtered.
pub fn filter_poor_geolocation_with_stats(
    table: &ObservationTable,
    latitude_col: &str,
    longitude_col: &str,
    grid_latitude_col: &str,
    grid_longitude_col: &str,
) -> Result<(ObservationTable, FilterStats)> {
    let n_before = table.n_rows();
    let filtered = filter_poor_geolocation(
        table,
        latitude_col,
        longitude_col,
        grid_latitude_col,
        grid_longitude_col,
    )?;
    let stats = FilterStats::new(n_before, filtered.n_rows());
    Ok((filtered, stats))
}
