//! Column-level cleanup: pruning, prefixes, coordinate naming.

use crate::data::{ObservationTable, Value};
use crate::error::{Result, ScrubError};
use std::collections::HashSet;

/// Drop every column that holds a single unique value across all rows.
///
/// Such columns carry no information for filtering or grouping. Returns
/// the names of the dropped columns.
pub fn remove_homogenous_columns(table: &mut ObservationTable) -> Result<Vec<String>> {
    let names: Vec<String> = table.column_names().to_vec();
    let mut dropped = Vec::new();

    for name in names {
        let unique: HashSet<&Value> = table.column_values(&name)?.into_iter().collect();
        if unique.len() == 1 {
            table.drop_column(&name)?;
            log::info!("Dropped homogenous column: {}", name);
            dropped.push(name);
        }
    }

    Ok(dropped)
}

/// Rename every column from a raw protocol prefix to a short one.
///
/// The protocol name is stripped of underscores first, matching how the
/// raw feed glues it onto field names. Every column is renamed to
/// `{replacement}_{name with the protocol substring removed}`, so columns
/// without the protocol substring still gain the short prefix.
pub fn replace_column_prefix(
    table: &mut ObservationTable,
    protocol: &str,
    replacement: &str,
) -> Result<()> {
    let protocol = protocol.replace('_', "");
    let names: Vec<String> = table
        .column_names()
        .iter()
        .map(|name| format!("{}_{}", replacement, name.replace(&protocol, "")))
        .collect();
    table.set_column_names(names)
}

/// First column whose name contains the keyword.
pub fn find_column<'a>(table: &'a ObservationTable, keyword: &str) -> Result<&'a str> {
    table
        .column_names()
        .iter()
        .find(|name| name.contains(keyword))
        .map(|name| name.as_str())
        .ok_or_else(|| ScrubError::MissingColumn(keyword.to_string()))
}

/// Rename raw-feed coordinate columns to their canonical names.
///
/// The feed stores GPS coordinates in `*MeasurementLatitude` /
/// `*MeasurementLongitude` and the grid-center coordinates in plain
/// `latitude` / `longitude`. The GPS columns become `Latitude` /
/// `Longitude` and the grid columns `MGRSLatitude` / `MGRSLongitude`.
/// The GPS columns must exist; the grid renames are skipped when absent.
pub fn rename_latlon_columns(table: &mut ObservationTable) -> Result<()> {
    let gps_latitude = find_column(table, "MeasurementLatitude")?.to_string();
    let gps_longitude = find_column(table, "MeasurementLongitude")?.to_string();
    table.rename_column(&gps_latitude, "Latitude")?;
    table.rename_column(&gps_longitude, "Longitude")?;

    if table.column_position("latitude").is_ok() {
        table.rename_column("latitude", "MGRSLatitude")?;
    }
    if table.column_position("longitude").is_ok() {
        table.rename_column("longitude", "MGRSLongitude")?;
    }
    Ok(())
}
