//! Value-level cleanup: numeric rounding and null standardization.

use crate::data::{ObservationTable, Value};
use crate::error::Result;

fn is_numeric_column(values: &[Value]) -> bool {
    let mut has_numeric = false;
    for value in values {
        match value {
            Value::Integer(_) | Value::Float(_) => has_numeric = true,
            Value::Null => {}
            _ => return false,
        }
    }
    has_numeric
}

/// Normalize every numeric column for export.
///
/// Latitude and longitude columns (matched by name, case insensitive) are
/// rounded to 5 decimal places; every other numeric column is truncated to
/// integer. Nulls in a numeric column become the -9999 sentinel the feed
/// consumers expect. Columns containing any text or boolean cells are left
/// alone.
pub fn round_columns(table: &mut ObservationTable) -> Result<()> {
    let names: Vec<String> = table.column_names().to_vec();

    for name in names {
        let values: Vec<Value> = table
            .column_values(&name)?
            .into_iter()
            .cloned()
            .collect();
        if !is_numeric_column(&values) {
            continue;
        }

        let lowered = name.to_lowercase();
        let replaced: Vec<Value> = if lowered.contains("latitude") || lowered.contains("longitude")
        {
            log::info!("Rounded to 5 decimals: {}", name);
            values
                .iter()
                .map(|value| match value.as_f64() {
                    Some(v) => Value::Float((v * 1e5).round() / 1e5),
                    None => Value::Float(-9999.0),
                })
                .collect()
        } else {
            log::info!("Converted to integer: {}", name);
            values
                .iter()
                .map(|value| match value.as_f64() {
                    Some(v) => Value::Integer(v as i64),
                    None => Value::Integer(-9999),
                })
                .collect()
        };
        table.set_column(&name, replaced)?;
    }

    Ok(())
}

/// Markers the raw feed uses for missing data, beyond genuinely empty cells.
const MISSING_MARKERS: &[&str] = &["null", "", "NaN", "nan"];

/// Replace the feed's assorted no-data markers with the typed null.
pub fn standardize_missing_values(table: &mut ObservationTable) -> Result<()> {
    let names: Vec<String> = table.column_names().to_vec();

    for name in names {
        let values: Vec<Value> = table
            .column_values(&name)?
            .into_iter()
            .map(|value| match value {
                Value::Text(s) if MISSING_MARKERS.contains(&s.as_str()) => Value::Null,
                other => other.clone(),
            })
            .collect();
        table.set_column(&name, values)?;
    }

    Ok(())
}
