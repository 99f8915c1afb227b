//! Flags and quality filtering for mosquito habitat observations.
//!
//! Raw mosquito habitat records store larvae counts as free text ("10",
//! "25-50", "more than 100") and bundle photo urls with review markers in
//! single fields. The functions here convert counts to numbers, derive bit
//! flags describing what each record contains, and score how complete a
//! record is, so that downstream filtering can select by data quality.

use crate::clean::{
    remove_homogenous_columns, rename_latlon_columns, replace_column_prefix, round_columns,
    standardize_missing_values,
};
use crate::data::{ObservationTable, Value};
use crate::error::{Result, ScrubError};
use serde::{Deserialize, Serialize};

/// Mosquito genera known to carry human diseases.
const GENERA_OF_INTEREST: &[&str] = &["Aedes", "Anopheles", "Culex"];

/// Water source descriptions that rule out an artificial container.
const NON_CONTAINER_KEYWORDS: &[&str] = &[
    "puddle",
    "still water",
    "stream",
    "estuary",
    "lake",
    "pond",
    "ditch",
    "bay",
    "ocean",
    "swamp",
    "wetland",
];

/// Convert one raw larvae count entry to `(count, magnitude, is_range)`.
///
/// Counts above 100 are clamped to 101, with the magnitude flag recording
/// by how many orders of magnitude (1 to 4) the original value exceeded
/// 100. Range entries such as `"25-50"` keep their lower bound and set the
/// range flag. Nulls become -9999.
fn convert_entry(value: &Value) -> Option<(f64, i64, i64)> {
    match value {
        Value::Null => Some((-9999.0, 0, 0)),
        Value::Integer(count) => Some(convert_count(*count as f64)),
        Value::Float(count) => Some(convert_count(*count)),
        Value::Text(text) => {
            if text == "more than 100" {
                return Some((101.0, 1, 1));
            }
            // Feed artifacts like "1e+27" stand in for uncountably many.
            if text.contains("e+") {
                return Some(convert_count(100_000.0));
            }
            if let Ok(count) = text.trim().parse::<f64>() {
                return Some(convert_count(count));
            }
            let lower = text.split('-').next()?.trim().parse::<f64>().ok()?;
            Some((lower, 0, 1))
        }
        Value::Bool(_) => None,
    }
}

fn convert_count(count: f64) -> (f64, i64, i64) {
    if count > 100.0 {
        let magnitude = ((count / 100.0).log10().floor() as i64 + 1).min(4);
        (101.0, magnitude, 0)
    } else {
        (count, 0, 0)
    }
}

/// Converts a free-text larvae count column to numbers, adding magnitude
/// and range flags alongside.
///
/// The new columns are named `{prefix}LarvaeCountMagnitude` and
/// `{prefix}LarvaeCountIsRangeFlag`, where the prefix is everything
/// preceding `LarvaeCount` in the source column name, lowercased.
///
/// # Arguments
///
/// * `table` - The table to modify
/// * `larvae_count_col` - Name of the column holding raw larvae counts
///
/// # Returns
///
/// * `Result<()>` - Errors if the column is missing or an entry cannot be
///   read as a count
pub fn larvae_to_count(table: &mut ObservationTable, larvae_count_col: &str) -> Result<()> {
    let pos = table.column_position(larvae_count_col)?;
    let prefix = larvae_count_col.to_lowercase().replace("larvaecount", "");

    let n = table.n_rows();
    let mut counts = Vec::with_capacity(n);
    let mut magnitudes = Vec::with_capacity(n);
    let mut range_flags = Vec::with_capacity(n);
    for row in table.rows() {
        let value = row.at(pos);
        let (count, magnitude, is_range) =
            convert_entry(value).ok_or_else(|| ScrubError::TypeMismatch {
                column: larvae_count_col.to_string(),
                row: row.index(),
                expected: "larvae count".to_string(),
                found: value.to_string(),
            })?;
        counts.push(Value::Float(count));
        magnitudes.push(Value::Integer(magnitude));
        range_flags.push(Value::Integer(is_range));
    }

    table.set_column(larvae_count_col, counts)?;
    table.add_column(&format!("{}LarvaeCountMagnitude", prefix), magnitudes)?;
    table.add_column(&format!("{}LarvaeCountIsRangeFlag", prefix), range_flags)
}

fn flag_values<F>(table: &ObservationTable, column: &str, predicate: F) -> Result<Vec<Value>>
where
    F: Fn(&Value) -> bool,
{
    let pos = table.column_position(column)?;
    Ok(table
        .rows()
        .map(|row| Value::Integer(i64::from(predicate(row.at(pos)))))
        .collect())
}

/// Adds `mhm_HasGenus`, 1 where the genus column holds a value.
pub fn has_genus_flag(table: &mut ObservationTable, genus_col: &str) -> Result<()> {
    let flags = flag_values(table, genus_col, |value| !value.is_null())?;
    table.add_column("mhm_HasGenus", flags)
}

/// Adds `mhm_IsGenusOfInterest`, 1 where the recorded genus is a known
/// disease vector.
pub fn infectious_genus_flag(table: &mut ObservationTable, genus_col: &str) -> Result<()> {
    let flags = flag_values(table, genus_col, |value| {
        value
            .as_str()
            .is_some_and(|genus| GENERA_OF_INTEREST.contains(&genus))
    })?;
    table.add_column("mhm_IsGenusOfInterest", flags)
}

/// Adds `mhm_IsWaterSourceContainer`, 1 where the water source reads like
/// an artificial container (ovitrap, pot, tire) rather than a natural body
/// of water. Missing water sources are flagged 0.
pub fn is_container_flag(table: &mut ObservationTable, watersource_col: &str) -> Result<()> {
    let flags = flag_values(table, watersource_col, |value| {
        if value.is_null() {
            return false;
        }
        let lowercase = value.to_string().to_lowercase();
        !NON_CONTAINER_KEYWORDS
            .iter()
            .any(|keyword| lowercase.contains(keyword))
    })?;
    table.add_column("mhm_IsWaterSourceContainer", flags)
}

/// Adds `mhm_HasWaterSource`, 1 where a water source is recorded.
pub fn has_watersource_flag(table: &mut ObservationTable, watersource_col: &str) -> Result<()> {
    let flags = flag_values(table, watersource_col, |value| !value.is_null())?;
    table.add_column("mhm_HasWaterSource", flags)
}

/// Adds photo accounting flags from the three photo url columns.
///
/// Each url field may hold several urls separated by semicolons, alongside
/// `pending` and `rejected` review markers. The flags added are:
///
/// * `mhm_PhotoCount` - valid photo urls across all three fields
/// * `mhm_RejectedCount` - rejected photos across all three fields
/// * `mhm_PendingCount` - photos still awaiting review
/// * `mhm_PhotoBitBinary` - presence bits in water source, larvae, abdomen order
/// * `mhm_PhotoBitDecimal` - the same bits read as a number
///
/// # Arguments
///
/// * `table` - The table to modify
/// * `watersource_photos` - Column with water source photo urls
/// * `larvae_photos` - Column with larvae photo urls
/// * `abdomen_photos` - Column with abdomen closeup photo urls
pub fn photo_bit_flags(
    table: &mut ObservationTable,
    watersource_photos: &str,
    larvae_photos: &str,
    abdomen_photos: &str,
) -> Result<()> {
    let positions = [
        table.column_position(watersource_photos)?,
        table.column_position(larvae_photos)?,
        table.column_position(abdomen_photos)?,
    ];

    let n = table.n_rows();
    let mut photo_counts = Vec::with_capacity(n);
    let mut rejected_counts = Vec::with_capacity(n);
    let mut pending_counts = Vec::with_capacity(n);
    let mut bit_masks = Vec::with_capacity(n);
    let mut bit_decimals = Vec::with_capacity(n);
    for row in table.rows() {
        let mut photos = 0i64;
        let mut rejected = 0i64;
        let mut pending = 0i64;
        let mut mask = String::with_capacity(positions.len());
        let mut decimal = 0i64;
        for &pos in &positions {
            let value = row.at(pos);
            let mut valid = false;
            if !value.is_null() {
                let text = value.to_string();
                valid = text.contains("http");
                photos += text.matches("http").count() as i64;
                pending += text.matches("pending").count() as i64;
                rejected += text.matches("rejected").count() as i64;
            }
            mask.push(if valid { '1' } else { '0' });
            decimal = decimal * 2 + i64::from(valid);
        }
        photo_counts.push(Value::Integer(photos));
        rejected_counts.push(Value::Integer(rejected));
        pending_counts.push(Value::Integer(pending));
        bit_masks.push(Value::Text(mask));
        bit_decimals.push(Value::Integer(decimal));
    }

    table.add_column("mhm_PhotoCount", photo_counts)?;
    table.add_column("mhm_RejectedCount", rejected_counts)?;
    table.add_column("mhm_PendingCount", pending_counts)?;
    table.add_column("mhm_PhotoBitBinary", bit_masks)?;
    table.add_column("mhm_PhotoBitDecimal", bit_decimals)
}

/// Adds completeness scores summarizing how much of a record is filled in.
///
/// `mhm_SubCompletenessScore` is the fraction of the genus field and three
/// photo fields present, read from the `mhm_HasGenus` and
/// `mhm_PhotoBitBinary` flags. `mhm_CumulativeCompletenessScore` is the
/// fraction of non-null cells across all columns, rounded to two decimals.
pub fn completion_score_flag(table: &mut ObservationTable) -> Result<()> {
    let genus_pos = table.column_position("mhm_HasGenus")?;
    let bits_pos = table.column_position("mhm_PhotoBitBinary")?;
    // Scores describe the table as it stands, without the two score
    // columns added below.
    let n_columns = table.n_columns();

    let n = table.n_rows();
    let mut sub_scores = Vec::with_capacity(n);
    let mut cumulative_scores = Vec::with_capacity(n);
    for row in table.rows() {
        let photo_bits = match row.at(bits_pos) {
            Value::Text(mask) => mask.matches('1').count() as f64,
            _ => 0.0,
        };
        let genus = row.at(genus_pos).as_f64().unwrap_or(0.0);
        sub_scores.push(Value::Float((genus + photo_bits) / 4.0));

        let filled = (0..n_columns)
            .filter(|&pos| !row.at(pos).is_null())
            .count();
        cumulative_scores.push(Value::Float(round2(filled as f64 / n_columns as f64)));
    }

    table.add_column("mhm_SubCompletenessScore", sub_scores)?;
    table.add_column("mhm_CumulativeCompletenessScore", cumulative_scores)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Runs the full cleanup chain on raw mosquito habitat mapper records.
///
/// The steps are:
/// 1. Drop homogenous columns
/// 2. Standardize latitude and longitude column names
/// 3. Shorten the `mosquito_habitat_mapper` column prefix to `mhm`
/// 4. Convert larvae counts to numbers
/// 5. Round coordinate columns and truncate other numeric columns
/// 6. Standardize missing value markers
///
/// # Arguments
///
/// * `table` - Raw mosquito habitat mapper records
///
/// # Returns
///
/// * `Result<ObservationTable>` - The cleaned table
pub fn apply_cleanup(table: &ObservationTable) -> Result<ObservationTable> {
    let mut cleaned = table.clone();
    remove_homogenous_columns(&mut cleaned)?;
    rename_latlon_columns(&mut cleaned)?;
    replace_column_prefix(&mut cleaned, "mosquito_habitat_mapper", "mhm")?;
    larvae_to_count(&mut cleaned, "mhm_LarvaeCount")?;
    round_columns(&mut cleaned)?;
    standardize_missing_values(&mut cleaned)?;
    Ok(cleaned)
}

/// Adds every mosquito habitat mapper flag to a cleaned table.
///
/// Expects the column names produced by [`apply_cleanup`].
pub fn add_flags(table: &mut ObservationTable) -> Result<()> {
    has_genus_flag(table, "mhm_Genus")?;
    infectious_genus_flag(table, "mhm_Genus")?;
    is_container_flag(table, "mhm_WaterSource")?;
    has_watersource_flag(table, "mhm_WaterSource")?;
    photo_bit_flags(
        table,
        "mhm_WaterSourcePhotoUrls",
        "mhm_LarvaFullBodyPhotoUrls",
        "mhm_AbdomenCloseupPhotoUrls",
    )?;
    completion_score_flag(table)
}

/// Record-quality criteria for flagged mosquito habitat mapper data.
///
/// Every criterion defaults to off, so the default filter keeps all rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityFilter {
    /// Keep only rows with a recorded genus.
    pub has_genus: bool,
    /// Keep only rows whose water source is a container.
    pub is_container: bool,
    /// Keep only rows with at least one valid photo.
    pub has_photos: bool,
    /// Keep only rows with at least this many larvae.
    pub min_larvae_count: Option<i64>,
}

/// Subsets flagged mosquito habitat mapper data to rows meeting the given
/// quality criteria.
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
    let genus = if criteria.has_genus {
        Some(table.column_position("mhm_HasGenus")?)
    } else {
        None
    };
    let container = if criteria.is_container {
        Some(table.column_position("mhm_IsWaterSourceContainer")?)
    } else {
        None
    };
    let photos = if criteria.has_photos {
        Some(table.column_position("mhm_PhotoBitDecimal")?)
    } else {
        None
    };
    let larvae = if let Some(min) = criteria.min_larvae_count {
        Some((table.column_position("mhm_LarvaeCount")?, min as f64))
    } else {
        None
    };

    Ok(table.select_rows(|row| {
        let bit_set = |pos: usize| row.at(pos).as_f64() == Some(1.0);
        genus.map_or(true, bit_set)
            && container.map_or(true, bit_set)
            && photos.map_or(true, |pos| {
                row.at(pos).as_f64().is_some_and(|decimal| decimal > 0.0)
            })
            && larvae.map_or(true, |(pos, min)| {
                row.at(pos).as_f64().is_some_and(|count| count >= min)
            })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_column_table(name: &str, values: &[&str]) -> ObservationTable {
        ObservationTable::from_rows(
            vec![name.to_string()],
            values.iter().map(|raw| vec![Value::parse(raw)]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_larvae_to_count() {
        let mut table = single_column_table(
            "mhm_LarvaeCount",
            &[
                "",
                "more than 100",
                "25-50",
                "10",
                "200",
                "1000",
                "10000",
                "1e+27",
            ],
        );
        larvae_to_count(&mut table, "mhm_LarvaeCount").unwrap();

        let expected = [
            (-9999.0, 0, 0),
            (101.0, 1, 1),
            (25.0, 0, 1),
            (10.0, 0, 0),
            (101.0, 1, 0),
            (101.0, 2, 0),
            (101.0, 3, 0),
            (101.0, 4, 0),
        ];
        for (i, (count, magnitude, is_range)) in expected.iter().enumerate() {
            let row = table.row(i);
            assert_eq!(row.get("mhm_LarvaeCount"), Some(&Value::Float(*count)));
            assert_eq!(
                row.get("mhm_LarvaeCountMagnitude"),
                Some(&Value::Integer(*magnitude))
            );
            assert_eq!(
                row.get("mhm_LarvaeCountIsRangeFlag"),
                Some(&Value::Integer(*is_range))
            );
        }
    }

    #[test]
    fn test_larvae_count_unreadable_text() {
        let mut table = single_column_table("mhm_LarvaeCount", &["several"]);
        let result = larvae_to_count(&mut table, "mhm_LarvaeCount");
        assert!(matches!(
            result,
            Err(ScrubError::TypeMismatch { ref column, row: 0, .. }) if column == "mhm_LarvaeCount"
        ));
    }

    #[test]
    fn test_has_flags() {
        let cases: [(fn(&mut ObservationTable, &str) -> Result<()>, &str); 2] = [
            (has_genus_flag, "mhm_HasGenus"),
            (has_watersource_flag, "mhm_HasWaterSource"),
        ];
        for (flag, output_col) in cases {
            let mut table =
                single_column_table("col_of_interest", &["", "pot", "container", "lake", ""]);
            flag(&mut table, "col_of_interest").unwrap();

            let expected = [0, 1, 1, 1, 0];
            for (i, flag_value) in expected.iter().enumerate() {
                assert_eq!(
                    table.row(i).get(output_col),
                    Some(&Value::Integer(*flag_value))
                );
            }
        }
    }

    #[test]
    fn test_infectious_genus_flag() {
        let mut table = single_column_table(
            "mhm_Genus",
            &["Aedes", "Anopheles", "test", "Culex", "test"],
        );
        infectious_genus_flag(&mut table, "mhm_Genus").unwrap();

        let expected = [1, 1, 0, 1, 0];
        for (i, flag_value) in expected.iter().enumerate() {
            assert_eq!(
                table.row(i).get("mhm_IsGenusOfInterest"),
                Some(&Value::Integer(*flag_value))
            );
        }
    }

    #[test]
    fn test_is_container_flag() {
        let mut table = single_column_table(
            "mhm_WaterSource",
            &[
                "container",
                "pot",
                "lake",
                "swamp",
                "tire",
                "ovitrap",
                "pond or estuary",
                "test or ocean",
                "",
            ],
        );
        is_container_flag(&mut table, "mhm_WaterSource").unwrap();

        let expected = [1, 1, 0, 0, 1, 1, 0, 0, 0];
        for (i, flag_value) in expected.iter().enumerate() {
            assert_eq!(
                table.row(i).get("mhm_IsWaterSourceContainer"),
                Some(&Value::Integer(*flag_value))
            );
        }
    }

    fn create_photo_table() -> ObservationTable {
        let watersource = [
            "",
            "https://test;https://test;https://test",
            "pending;rejected;pending",
            "rejected;pending;rejected",
            "",
        ];
        let larvae = [
            "rejected",
            "https://test",
            "rejected;https://test",
            "https://test",
            "pending",
        ];
        let abdomen = [
            "https://test;rejected;https://test",
            "pending;rejected",
            "",
            "rejected",
            "pending",
        ];
        ObservationTable::from_rows(
            vec![
                "watersource".to_string(),
                "larvae".to_string(),
                "abdomen".to_string(),
            ],
            (0..5)
                .map(|i| {
                    vec![
                        Value::parse(watersource[i]),
                        Value::parse(larvae[i]),
                        Value::parse(abdomen[i]),
                    ]
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_photo_bit_flags() {
        let mut table = create_photo_table();
        photo_bit_flags(&mut table, "watersource", "larvae", "abdomen").unwrap();

        let photos = [2, 4, 1, 1, 0];
        let rejected = [2, 1, 2, 3, 0];
        let pending = [0, 1, 2, 1, 2];
        let masks = ["001", "110", "010", "010", "000"];
        let decimals = [1, 6, 2, 2, 0];
        for i in 0..5 {
            let row = table.row(i);
            assert_eq!(row.get("mhm_PhotoCount"), Some(&Value::Integer(photos[i])));
            assert_eq!(
                row.get("mhm_RejectedCount"),
                Some(&Value::Integer(rejected[i]))
            );
            assert_eq!(
                row.get("mhm_PendingCount"),
                Some(&Value::Integer(pending[i]))
            );
            assert_eq!(
                row.get("mhm_PhotoBitBinary"),
                Some(&Value::Text(masks[i].to_string()))
            );
            assert_eq!(
                row.get("mhm_PhotoBitDecimal"),
                Some(&Value::Integer(decimals[i]))
            );
        }
    }

    #[test]
    fn test_completion_scores() {
        let abdomen = ["https://test", "pending", "", "rejected", "pending"];
        let larvae = [
            "rejected",
            "https://test",
            "rejected",
            "https://test",
            "pending",
        ];
        let watersource = [
            "",
            "https://test",
            "pending;rejected;pending",
            "rejected;pending;rejected",
            "",
        ];
        let genus = ["", "test", "", "test", "test"];
        let filler = ["test", "", "test", "test", ""];
        let mut table = ObservationTable::from_rows(
            vec![
                "abdomen".to_string(),
                "larvae".to_string(),
                "watersource".to_string(),
                "genus".to_string(),
                "filler".to_string(),
            ],
            (0..5)
                .map(|i| {
                    vec![
                        Value::parse(abdomen[i]),
                        Value::parse(larvae[i]),
                        Value::parse(watersource[i]),
                        Value::parse(genus[i]),
                        Value::parse(filler[i]),
                    ]
                })
                .collect(),
        )
        .unwrap();

        has_genus_flag(&mut table, "genus").unwrap();
        photo_bit_flags(&mut table, "watersource", "larvae", "abdomen").unwrap();
        completion_score_flag(&mut table).unwrap();

        let sub = [0.25, 0.75, 0.0, 0.5, 0.25];
        let cumulative = [0.82, 0.91, 0.82, 1.0, 0.82];
        for i in 0..5 {
            let row = table.row(i);
            assert_eq!(
                row.get("mhm_SubCompletenessScore"),
                Some(&Value::Float(sub[i]))
            );
            assert_eq!(
                row.get("mhm_CumulativeCompletenessScore"),
                Some(&Value::Float(cumulative[i]))
            );
        }
    }

    #[test]
    fn test_apply_cleanup() {
        let table = ObservationTable::from_rows(
            vec![
                "mosquitohabitatmapperMeasurementLatitude".to_string(),
                "mosquitohabitatmapperMeasurementLongitude".to_string(),
                "mosquitohabitatmapperLarvaeCount".to_string(),
                "mosquitohabitatmapperGenus".to_string(),
                "mosquitohabitatmapperDataSource".to_string(),
            ],
            vec![
                vec![
                    Value::parse("36.123456789"),
                    Value::parse("-95.123456789"),
                    Value::parse("25-50"),
                    Value::parse("Aedes"),
                    Value::parse("GLOBE Observer App"),
                ],
                vec![
                    Value::parse("52.5"),
                    Value::parse("13.4"),
                    Value::parse(""),
                    Value::parse(""),
                    Value::parse("GLOBE Observer App"),
                ],
            ],
        )
        .unwrap();

        let cleaned = apply_cleanup(&table).unwrap();

        let names: Vec<&str> = cleaned.column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "mhm_Latitude",
                "mhm_Longitude",
                "mhm_LarvaeCount",
                "mhm_Genus",
                "mhm_LarvaeCountMagnitude",
                "mhm_LarvaeCountIsRangeFlag",
            ]
        );

        let row = cleaned.row(0);
        assert_eq!(row.get("mhm_Latitude"), Some(&Value::Float(36.12346)));
        assert_eq!(row.get("mhm_Longitude"), Some(&Value::Float(-95.12346)));
        assert_eq!(row.get("mhm_LarvaeCount"), Some(&Value::Integer(25)));
        assert_eq!(
            row.get("mhm_LarvaeCountIsRangeFlag"),
            Some(&Value::Integer(1))
        );
        assert_eq!(row.get("mhm_Genus"), Some(&Value::Text("Aedes".to_string())));

        let row = cleaned.row(1);
        assert_eq!(row.get("mhm_LarvaeCount"), Some(&Value::Integer(-9999)));
        assert_eq!(row.get("mhm_Genus"), Some(&Value::Null));
    }

    #[test]
    fn test_add_flags() {
        let mut table = ObservationTable::from_rows(
            vec![
                "mhm_Genus".to_string(),
                "mhm_WaterSource".to_string(),
                "mhm_WaterSourcePhotoUrls".to_string(),
                "mhm_LarvaFullBodyPhotoUrls".to_string(),
                "mhm_AbdomenCloseupPhotoUrls".to_string(),
            ],
            vec![
                vec![
                    Value::parse("Aedes"),
                    Value::parse("ovitrap"),
                    Value::parse("https://test"),
                    Value::parse("https://test;pending"),
                    Value::parse(""),
                ],
                vec![
                    Value::parse(""),
                    Value::parse("lake"),
                    Value::parse(""),
                    Value::parse("https://a;https://b"),
                    Value::parse(""),
                ],
            ],
        )
        .unwrap();

        add_flags(&mut table).unwrap();

        let appended: &[&str] = &[
            "mhm_HasGenus",
            "mhm_IsGenusOfInterest",
            "mhm_IsWaterSourceContainer",
            "mhm_HasWaterSource",
            "mhm_PhotoCount",
            "mhm_RejectedCount",
            "mhm_PendingCount",
            "mhm_PhotoBitBinary",
            "mhm_PhotoBitDecimal",
            "mhm_SubCompletenessScore",
            "mhm_CumulativeCompletenessScore",
        ];
        let names: Vec<&str> = table.column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(&names[5..], appended);

        let row = table.row(0);
        assert_eq!(row.get("mhm_HasGenus"), Some(&Value::Integer(1)));
        assert_eq!(row.get("mhm_IsGenusOfInterest"), Some(&Value::Integer(1)));
        assert_eq!(
            row.get("mhm_IsWaterSourceContainer"),
            Some(&Value::Integer(1))
        );
        assert_eq!(
            row.get("mhm_PhotoBitBinary"),
            Some(&Value::Text("110".to_string()))
        );
        assert_eq!(row.get("mhm_PhotoCount"), Some(&Value::Integer(2)));

        let row = table.row(1);
        assert_eq!(row.get("mhm_HasGenus"), Some(&Value::Integer(0)));
        assert_eq!(
            row.get("mhm_IsWaterSourceContainer"),
            Some(&Value::Integer(0))
        );
        assert_eq!(row.get("mhm_PhotoBitDecimal"), Some(&Value::Integer(2)));
    }

    fn create_flagged_table() -> ObservationTable {
        ObservationTable::from_rows(
            vec![
                "mhm_HasGenus".to_string(),
                "mhm_IsWaterSourceContainer".to_string(),
                "mhm_PhotoBitDecimal".to_string(),
                "mhm_LarvaeCount".to_string(),
            ],
            vec![
                vec![
                    Value::Integer(1),
                    Value::Integer(1),
                    Value::Integer(6),
                    Value::Integer(25),
                ],
                vec![
                    Value::Integer(0),
                    Value::Integer(1),
                    Value::Integer(0),
                    Value::Integer(0),
                ],
                vec![
                    Value::Integer(1),
                    Value::Integer(0),
                    Value::Integer(2),
                    Value::Integer(-9999),
                ],
                vec![
                    Value::Integer(0),
                    Value::Integer(0),
                    Value::Integer(0),
                    Value::Integer(101),
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_quality_filter() {
        let table = create_flagged_table();

        let unfiltered = quality_filter(&table, QualityFilter::default()).unwrap();
        assert_eq!(unfiltered.n_rows(), table.n_rows());

        let genus = quality_filter(
            &table,
            QualityFilter {
                has_genus: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(genus.index(), &[0, 2]);

        let container = quality_filter(
            &table,
            QualityFilter {
                is_container: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(container.index(), &[0, 1]);

        let photos = quality_filter(
            &table,
            QualityFilter {
                has_photos: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(photos.index(), &[0, 2]);

        let larvae = quality_filter(
            &table,
            QualityFilter {
                min_larvae_count: Some(1),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(larvae.index(), &[0, 3]);

        let combined = quality_filter(
            &table,
            QualityFilter {
                has_genus: true,
                has_photos: true,
                min_larvae_count: Some(1),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(combined.index(), &[0]);
    }

    #[test]
    fn test_quality_filter_missing_flag_column() {
        let table = single_column_table("mhm_LarvaeCount", &["10"]);
        let result = quality_filter(
            &table,
            QualityFilter {
                has_genus: true,
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(ScrubError::MissingColumn(_))));
    }
}
