//! Flags and quality filtering for land cover observations.
//!
//! Raw land cover records pack every classification for a direction into a
//! single text field, one entry per observed land cover type with its area
//! percentage, such as `"60% MUC 02 (b) [Trees, Closely Spaced]"`. The
//! functions here unpack those fields into one numeric column per observed
//! type, derive photo and classification bit flags for the six camera
//! directions and four classification directions, and score record
//! completeness for downstream quality filtering.

use crate::clean::{
    remove_homogenous_columns, rename_latlon_columns, replace_column_prefix, round_columns,
    standardize_missing_values,
};
use crate::data::{ObservationTable, Value};
use crate::error::{Result, ScrubError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The packed per-direction classification columns of cleaned data.
const CLASSIFICATION_COLUMNS: &[&str] = &[
    "lc_WestClassifications",
    "lc_EastClassifications",
    "lc_NorthClassifications",
    "lc_SouthClassifications",
];

/// Word separators collapsed when land cover type names become column names.
const CLASSIFICATION_DELIMITERS: &[char] = &[' ', ',', '-', '/'];

/// Converts text to camel case, capitalizing after each delimiter and
/// removing the delimiters themselves.
pub fn camel_case(text: &str, delimiters: &[char]) -> String {
    let mut result = text.to_string();
    for &delimiter in delimiters {
        result = result.split(delimiter).map(capitalize_first).collect();
    }
    result
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The land cover description inside the square brackets of a single
/// classification entry.
pub fn extract_classification_name(entry: &str) -> Option<String> {
    let bracketed = Regex::new(r"\[(.*)\]").unwrap();
    capture_name(&bracketed, entry)
}

/// The leading area percentage of a single classification entry.
pub fn extract_classification_percentage(entry: &str) -> Option<f64> {
    let leading = Regex::new(r"(.*)%").unwrap();
    capture_percentage(&leading, entry)
}

fn capture_name(bracketed: &Regex, entry: &str) -> Option<String> {
    bracketed
        .captures(entry)
        .and_then(|caps| caps.get(1))
        .map(|found| found.as_str().to_string())
}

fn capture_percentage(leading: &Regex, entry: &str) -> Option<f64> {
    leading
        .captures(entry)
        .and_then(|caps| caps.get(1))
        .and_then(|found| found.as_str().trim().parse().ok())
}

/// Expands the packed classification fields into one numeric column per
/// observed land cover type.
///
/// For every distinct type reported in a direction, a column named
/// `{direction}_{CamelCasedType}` is added (e.g. `lc_West_TreesCloselySpaced`)
/// holding that row's percentage, 0 where the row did not report the type.
/// The packed source columns are kept.
///
/// # Arguments
///
/// * `table` - A table with the four `lc_*Classifications` columns
///
/// # Returns
///
/// * `Result<()>` - Errors if a classification column is missing or an
///   entry cannot be parsed
pub fn unpack_classifications(table: &mut ObservationTable) -> Result<()> {
    let bracketed = Regex::new(r"\[(.*)\]").unwrap();
    let leading = Regex::new(r"(.*)%").unwrap();

    for &direction in CLASSIFICATION_COLUMNS {
        let pos = table.column_position(direction)?;
        let prefix = direction.replace("Classifications", "_");

        // Parse each packed field once. Non-text cells are skipped, so a
        // direction nobody reported adds no columns.
        let mut names = BTreeSet::new();
        let mut parsed: Vec<Vec<(String, f64)>> = Vec::with_capacity(table.n_rows());
        for row in table.rows() {
            let mut entries = Vec::new();
            if let Value::Text(info) = row.at(pos) {
                for entry in info.split(';') {
                    let (name, percentage) = capture_name(&bracketed, entry)
                        .zip(capture_percentage(&leading, entry))
                        .ok_or_else(|| ScrubError::TypeMismatch {
                            column: direction.to_string(),
                            row: row.index(),
                            expected: "classification entry".to_string(),
                            found: entry.trim().to_string(),
                        })?;
                    let name = camel_case(&name, CLASSIFICATION_DELIMITERS);
                    names.insert(name.clone());
                    entries.push((name, percentage));
                }
            }
            parsed.push(entries);
        }

        // One column per type, sorted by name, defaulting to a 0 percentage
        // rather than null.
        let mut columns: BTreeMap<String, Vec<Value>> = names
            .into_iter()
            .map(|name| (name, vec![Value::Float(0.0); parsed.len()]))
            .collect();
        for (i, entries) in parsed.iter().enumerate() {
            for (name, percentage) in entries {
                if let Some(values) = columns.get_mut(name) {
                    values[i] = Value::Float(*percentage);
                }
            }
        }
        for (name, values) in columns {
            table.add_column(&format!("{}{}", prefix, name), values)?;
        }
    }
    Ok(())
}

/// Adds photo accounting flags from the six directional photo url columns.
///
/// Each url field may hold several urls separated by semicolons, alongside
/// `pending` and `rejected` review markers. The flags added are:
///
/// * `lc_PhotoCount` - valid photo urls across all six fields
/// * `lc_RejectedCount` - rejected photos across all six fields
/// * `lc_PendingCount` - photos still awaiting review
/// * `lc_EmptyCount` - directions with no photo field at all
/// * `lc_PhotoBitBinary` - presence bits in up, down, north, south, east,
///   west order
/// * `lc_PhotoBitDecimal` - the same bits read as a number
pub fn photo_bit_flags(
    table: &mut ObservationTable,
    up: &str,
    down: &str,
    north: &str,
    south: &str,
    east: &str,
    west: &str,
) -> Result<()> {
    let positions = [
        table.column_position(up)?,
        table.column_position(down)?,
        table.column_position(north)?,
        table.column_position(south)?,
        table.column_position(east)?,
        table.column_position(west)?,
    ];

    let n = table.n_rows();
    let mut photo_counts = Vec::with_capacity(n);
    let mut rejected_counts = Vec::with_capacity(n);
    let mut pending_counts = Vec::with_capacity(n);
    let mut empty_counts = Vec::with_capacity(n);
    let mut bit_masks = Vec::with_capacity(n);
    let mut bit_decimals = Vec::with_capacity(n);
    for row in table.rows() {
        let mut photos = 0i64;
        let mut rejected = 0i64;
        let mut pending = 0i64;
        let mut empty = 0i64;
        let mut mask = String::with_capacity(positions.len());
        let mut decimal = 0i64;
        for &pos in &positions {
            let value = row.at(pos);
            let mut valid = false;
            if value.is_null() {
                empty += 1;
            } else {
                let text = value.to_string();
                valid = text.contains("http");
                if valid {
                    photos += text.matches("http").count() as i64;
                }
                pending += text.matches("pending").count() as i64;
                rejected += text.matches("rejected").count() as i64;
            }
            mask.push(if valid { '1' } else { '0' });
            decimal = decimal * 2 + i64::from(valid);
        }
        photo_counts.push(Value::Integer(photos));
        rejected_counts.push(Value::Integer(rejected));
        pending_counts.push(Value::Integer(pending));
        empty_counts.push(Value::Integer(empty));
        bit_masks.push(Value::Text(mask));
        bit_decimals.push(Value::Integer(decimal));
    }

    table.add_column("lc_PhotoCount", photo_counts)?;
    table.add_column("lc_RejectedCount", rejected_counts)?;
    table.add_column("lc_PendingCount", pending_counts)?;
    table.add_column("lc_EmptyCount", empty_counts)?;
    table.add_column("lc_PhotoBitBinary", bit_masks)?;
    table.add_column("lc_PhotoBitDecimal", bit_decimals)
}

/// Adds classification presence flags for the four directions.
///
/// * `lc_ClassificationCount` - directions with a classification
/// * `lc_ClassificationBitBinary` - presence bits in north, south, east,
///   west order
/// * `lc_ClassificationBitDecimal` - the same bits read as a number
pub fn classification_bit_flags(
    table: &mut ObservationTable,
    north: &str,
    south: &str,
    east: &str,
    west: &str,
) -> Result<()> {
    let positions = [
        table.column_position(north)?,
        table.column_position(south)?,
        table.column_position(east)?,
        table.column_position(west)?,
    ];

    let n = table.n_rows();
    let mut counts = Vec::with_capacity(n);
    let mut bit_masks = Vec::with_capacity(n);
    let mut bit_decimals = Vec::with_capacity(n);
    for row in table.rows() {
        let mut count = 0i64;
        let mut mask = String::with_capacity(positions.len());
        let mut decimal = 0i64;
        for &pos in &positions {
            let present = !row.at(pos).is_null();
            count += i64::from(present);
            mask.push(if present { '1' } else { '0' });
            decimal = decimal * 2 + i64::from(present);
        }
        counts.push(Value::Integer(count));
        bit_masks.push(Value::Text(mask));
        bit_decimals.push(Value::Integer(decimal));
    }

    table.add_column("lc_ClassificationCount", counts)?;
    table.add_column("lc_ClassificationBitBinary", bit_masks)?;
    table.add_column("lc_ClassificationBitDecimal", bit_decimals)
}

/// Adds completeness scores summarizing how much of a record is filled in.
///
/// `lc_SubCompletenessScore` is the fraction of the ten photo and
/// classification slots present, read from the `lc_PhotoBitBinary` and
/// `lc_ClassificationBitBinary` flags. `lc_CumulativeCompletenessScore` is
/// the fraction of non-null cells across all columns, rounded to two
/// decimals.
pub fn completion_scores(table: &mut ObservationTable) -> Result<()> {
    let photo_pos = table.column_position("lc_PhotoBitBinary")?;
    let class_pos = table.column_position("lc_ClassificationBitBinary")?;
    // Scores describe the table as it stands, without the two score
    // columns added below.
    let n_columns = table.n_columns();

    let n = table.n_rows();
    let mut sub_scores = Vec::with_capacity(n);
    let mut cumulative_scores = Vec::with_capacity(n);
    for row in table.rows() {
        let photo_mask = row.at(photo_pos).as_str().unwrap_or("");
        let class_mask = row.at(class_pos).as_str().unwrap_or("");
        let slots = photo_mask.len() + class_mask.len();
        let filled_slots = photo_mask.matches('1').count() + class_mask.matches('1').count();
        let sub = if slots == 0 {
            0.0
        } else {
            filled_slots as f64 / slots as f64
        };
        sub_scores.push(Value::Float(sub));

        let filled = (0..n_columns)
            .filter(|&pos| !row.at(pos).is_null())
            .count();
        cumulative_scores.push(Value::Float(round2(filled as f64 / n_columns as f64)));
    }

    table.add_column("lc_SubCompletenessScore", sub_scores)?;
    table.add_column("lc_CumulativeCompletenessScore", cumulative_scores)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Runs the full cleanup chain on raw land cover records.
///
/// The steps are:
/// 1. Drop homogenous columns
/// 2. Standardize latitude and longitude column names
/// 3. Shorten the `land_covers` column prefix to `lc`
/// 4. Unpack the packed classification fields
/// 5. Round coordinate columns and truncate other numeric columns
/// 6. Standardize missing value markers
///
/// # Arguments
///
/// * `table` - Raw land cover records
///
/// # Returns
///
/// * `Result<ObservationTable>` - The cleaned table
pub fn apply_cleanup(table: &ObservationTable) -> Result<ObservationTable> {
    let mut cleaned = table.clone();
    remove_homogenous_columns(&mut cleaned)?;
    rename_latlon_columns(&mut cleaned)?;
    replace_column_prefix(&mut cleaned, "land_covers", "lc")?;
    unpack_classifications(&mut cleaned)?;
    round_columns(&mut cleaned)?;
    standardize_missing_values(&mut cleaned)?;
    Ok(cleaned)
}

/// Adds every land cover flag to a cleaned table.
///
/// Expects the column names produced by [`apply_cleanup`].
pub fn add_flags(table: &mut ObservationTable) -> Result<()> {
    photo_bit_flags(
        table,
        "lc_UpwardPhotoUrl",
        "lc_DownwardPhotoUrl",
        "lc_NorthPhotoUrl",
        "lc_SouthPhotoUrl",
        "lc_EastPhotoUrl",
        "lc_WestPhotoUrl",
    )?;
    classification_bit_flags(
        table,
        "lc_NorthClassifications",
        "lc_SouthClassifications",
        "lc_EastClassifications",
        "lc_WestClassifications",
    )?;
    completion_scores(table)
}

/// Record-quality criteria for flagged land cover data.
///
/// Every criterion defaults to off, so the default filter keeps all rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityFilter {
    /// Keep only rows with at least one classification.
    pub has_classification: bool,
    /// Keep only rows with at least one valid photo.
    pub has_photo: bool,
    /// Keep only rows classified in all four directions.
    pub has_all_classifications: bool,
    /// Keep only rows with valid photos in all six directions.
    pub has_all_photos: bool,
}

/// Subsets flagged land cover data to rows meeting the given quality
/// criteria.
///
/// # Arguments
///
/// * `table` - A flagged table, ideally from [`add_flags`]
/// * `criteria` - Which quality checks to apply
///
/// # Returns
///
/// * `Result<ObservationTable>` - The surviving rows
pub fn quality_filter(
    table: &ObservationTable,
    criteria: QualityFilter,
) -> Result<ObservationTable> {
    let classifications = if criteria.has_classification || criteria.has_all_classifications {
        Some(table.column_position("lc_ClassificationBitDecimal")?)
    } else {
        None
    };
    let photos = if criteria.has_photo || criteria.has_all_photos {
        Some(table.column_position("lc_PhotoBitDecimal")?)
    } else {
        None
    };

    Ok(table.select_rows(|row| {
        let class_decimal = classifications.map(|pos| row.at(pos).as_f64().unwrap_or(-1.0));
        let photo_decimal = photos.map(|pos| row.at(pos).as_f64().unwrap_or(-1.0));
        (!criteria.has_classification || class_decimal.is_some_and(|decimal| decimal > 0.0))
            && (!criteria.has_all_classifications || class_decimal == Some(15.0))
            && (!criteria.has_photo || photo_decimal.is_some_and(|decimal| decimal > 0.0))
            && (!criteria.has_all_photos || photo_decimal == Some(63.0))
    }))
}
