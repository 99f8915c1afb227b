//! Integration tests for the observation quality control pipeline.

use geoscrub::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

/// Write a raw mosquito habitat feed with the usual defects: an
/// out-of-range latitude, a grid-center GPS fix, an over-duplicated
/// cluster, and a homogenous data source column.
fn write_raw_mosquito_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "mosquitohabitatmapperMeasurementLatitude,\
         mosquitohabitatmapperMeasurementLongitude,\
         latitude,longitude,\
         mosquitohabitatmapperLarvaeCount,\
         mosquitohabitatmapperGenus,\
         mosquitohabitatmapperWaterSource,\
         mosquitohabitatmapperWaterSourcePhotoUrls,\
         mosquitohabitatmapperLarvaFullBodyPhotoUrls,\
         mosquitohabitatmapperAbdomenCloseupPhotoUrls,\
         mosquitohabitatmapperDataSource"
    )
    .unwrap();

    let rows = [
        "36.12345678,-95.123,36.1,-95.1,10,Aedes,can or bottle,https://a,https://b,,GLOBE Observer App",
        "40.2,12.05,40.0,12.0,more than 100,Anopheles,pond,https://c;rejected,,https://d,GLOBE Observer App",
        "52.55,13.4,52.5,13.5,,,ditch,pending,,,GLOBE Observer App",
        "95.0,10.0,36.1,-95.1,3,Culex,lake,,https://e,,GLOBE Observer App",
        "33.0,-5.0,33.0,-5.0,7,Aedes,puddle,https://f,,,GLOBE Observer App",
    ];
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    // Five identical submissions at the same site
    for _ in 0..5 {
        writeln!(
            file,
            "10.5,20.5,10.0,20.0,5,Culex,swamp,,,,GLOBE Observer App"
        )
        .unwrap();
    }

    file.flush().unwrap();
    file
}

fn grouping() -> Vec<String> {
    vec![
        "mhm_Latitude".to_string(),
        "mhm_Longitude".to_string(),
        "mhm_Genus".to_string(),
    ]
}

#[test]
fn test_full_mosquito_workflow() {
    let file = write_raw_mosquito_csv();
    let raw = ObservationTable::from_csv(file.path()).unwrap();
    assert_eq!(raw.n_rows(), 10);
    assert_eq!(raw.n_columns(), 11);

    // Cleanup drops the homogenous data source column and appends the two
    // larvae conversion columns.
    let cleaned = mosquito::apply_cleanup(&raw).unwrap();
    assert_eq!(cleaned.n_columns(), 12);
    assert!(!cleaned
        .column_names()
        .iter()
        .any(|name| name.contains("DataSource")));
    assert_eq!(
        cleaned.row(1).get("mhm_LarvaeCount"),
        Some(&Value::Integer(101))
    );
    assert_eq!(
        cleaned.row(1).get("mhm_LarvaeCountIsRangeFlag"),
        Some(&Value::Integer(1))
    );
    assert_eq!(
        cleaned.row(2).get("mhm_LarvaeCount"),
        Some(&Value::Integer(-9999))
    );
    assert_eq!(
        cleaned.row(0).get("mhm_Latitude"),
        Some(&Value::Float(36.12346))
    );

    // The out-of-range latitude goes first.
    let (table, stats) = filter_invalid_coords_with_stats(
        &cleaned,
        "mhm_Latitude",
        "mhm_Longitude",
        CoordBounds::Exclusive,
    )
    .unwrap();
    assert_eq!(stats.n_removed, 1);

    // Then the row whose GPS fix repeats the grid center.
    let (table, stats) = filter_poor_geolocation_with_stats(
        &table,
        "mhm_Latitude",
        "mhm_Longitude",
        "mhm_MGRSLatitude",
        "mhm_MGRSLongitude",
    )
    .unwrap();
    assert_eq!(stats.n_removed, 1);

    // Then the cluster of five identical submissions, as a whole.
    let (table, stats) = filter_duplicates_with_stats(&table, &grouping(), 5).unwrap();
    assert_eq!(stats.n_removed, 5);
    assert_eq!(table.index(), &[0, 1, 2]);

    let mut flagged = table;
    mosquito::add_flags(&mut flagged).unwrap();
    assert_eq!(flagged.n_columns(), 23);
    assert_eq!(
        flagged.row(1).get("mhm_IsGenusOfInterest"),
        Some(&Value::Integer(1))
    );
    assert_eq!(
        flagged.row(1).get("mhm_PhotoBitBinary"),
        Some(&Value::Text("101".to_string()))
    );
    assert_eq!(
        flagged.row(1).get("mhm_SubCompletenessScore"),
        Some(&Value::Float(0.75))
    );

    // The genus-less record fails the quality filter.
    let final_table = mosquito::quality_filter(
        &flagged,
        mosquito::QualityFilter {
            has_genus: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(final_table.index(), &[0, 1]);
}

#[test]
fn test_yaml_config_matches_builder() {
    let file = write_raw_mosquito_csv();
    let raw = ObservationTable::from_csv(file.path()).unwrap();

    let yaml = "\
name: mosquito-habitat-mapper
steps:
- RemoveHomogenousColumns
- RenameLatlonColumns
- !ReplaceColumnPrefix
  prefix: mosquito_habitat_mapper
  replacement: mhm
- !ConvertLarvaeCount
  column: mhm_LarvaeCount
- RoundColumns
- StandardizeNulls
- MosquitoFlags
";
    let config = PipelineConfig::from_yaml(yaml).unwrap();
    let (from_config, config_report) = Pipeline::from_config(&config).run(&raw).unwrap();
    let (from_builder, builder_report) = mosquito_pipeline().run(&raw).unwrap();

    assert_eq!(from_config.column_names(), from_builder.column_names());
    assert_eq!(from_config.n_rows(), from_builder.n_rows());
    assert_eq!(config_report.steps.len(), builder_report.steps.len());

    let rendered = format!("{}", config_report);
    assert!(rendered.contains("Pipeline Report: mosquito-habitat-mapper"));
    assert!(rendered.contains("convert-larvae-count"));
}

#[test]
fn test_filter_and_drop_agree() {
    let file = write_raw_mosquito_csv();
    let raw = ObservationTable::from_csv(file.path()).unwrap();
    let cleaned = mosquito::apply_cleanup(&raw).unwrap();

    let filtered = filter_invalid_coords(
        &cleaned,
        "mhm_Latitude",
        "mhm_Longitude",
        CoordBounds::Exclusive,
    )
    .unwrap();

    let mut dropped = cleaned.clone();
    drop_invalid_coords(
        &mut dropped,
        "mhm_Latitude",
        "mhm_Longitude",
        CoordBounds::Exclusive,
    )
    .unwrap();

    assert_eq!(filtered.index(), dropped.index());
    assert_eq!(filtered.column_names(), dropped.column_names());
    assert_eq!(filtered.n_rows(), 9);
}

#[test]
fn test_completeness_profile_after_cleanup() {
    let file = write_raw_mosquito_csv();
    let raw = ObservationTable::from_csv(file.path()).unwrap();
    let cleaned = mosquito::apply_cleanup(&raw).unwrap();

    let profile = profile_completeness(&cleaned);
    assert_eq!(profile.n_rows, 10);
    assert_eq!(profile.n_columns, 12);
    assert_eq!(profile.total_cells, 120);
    // Only the photo url and genus columns still hold nulls; the numeric
    // columns were filled with the missing marker during rounding.
    assert_eq!(profile.null_cells, 24);
    assert!((profile.completeness - 0.8).abs() < 1e-10);
    assert!(!profile.is_complete());
}

#[test]
fn test_flagged_csv_roundtrip() {
    let file = write_raw_mosquito_csv();
    let raw = ObservationTable::from_csv(file.path()).unwrap();
    let mut flagged = mosquito::apply_cleanup(&raw).unwrap();
    mosquito::add_flags(&mut flagged).unwrap();

    let out = NamedTempFile::new().unwrap();
    flagged.to_csv(out.path()).unwrap();
    let loaded = ObservationTable::from_csv(out.path()).unwrap();

    assert_eq!(loaded.n_rows(), flagged.n_rows());
    assert_eq!(loaded.column_names(), flagged.column_names());
    assert_eq!(loaded.row(0).get("mhm_Genus"), Some(&Value::Text("Aedes".to_string())));
    assert_eq!(loaded.row(0).get("mhm_PhotoCount"), Some(&Value::Integer(2)));
    assert_eq!(
        loaded.row(0).get("mhm_SubCompletenessScore"),
        Some(&Value::Float(0.75))
    );
}

#[test]
fn test_landcover_cleanup_and_flags() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "landcoversMeasurementLatitude,landcoversMeasurementLongitude,\
         landcoversUpwardPhotoUrl,landcoversDownwardPhotoUrl,\
         landcoversNorthPhotoUrl,landcoversSouthPhotoUrl,\
         landcoversEastPhotoUrl,landcoversWestPhotoUrl,\
         landcoversNorthClassifications,landcoversSouthClassifications,\
         landcoversEastClassifications,landcoversWestClassifications"
    )
    .unwrap();
    let rows = [
        "36.5,-95.5,https://u,,https://n,,,https://w,50% MUC 02 [Trees],50% MUC 05 [Grass],,100% MUC 02 [Trees]",
        "40.25,12.75,,https://d,,,pending,,100% MUC 05 [Grass],,100% MUC 91 [Asphalt],",
        "52.125,13.625,rejected,,,https://s,,,,100% MUC 02 [Trees],,100% MUC 05 [Grass]",
    ];
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file.flush().unwrap();

    let raw = ObservationTable::from_csv(file.path()).unwrap();
    let mut flagged = landcover::apply_cleanup(&raw).unwrap();
    landcover::add_flags(&mut flagged).unwrap();

    let row = flagged.row(0);
    assert_eq!(row.get("lc_West_Trees"), Some(&Value::Integer(100)));
    assert_eq!(row.get("lc_PhotoBitDecimal"), Some(&Value::Integer(41)));
    assert_eq!(row.get("lc_ClassificationBitDecimal"), Some(&Value::Integer(13)));
    assert_eq!(row.get("lc_SubCompletenessScore"), Some(&Value::Float(0.6)));

    let classified = landcover::quality_filter(
        &flagged,
        landcover::QualityFilter {
            has_classification: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(classified.n_rows(), 3);

    let fully_classified = landcover::quality_filter(
        &flagged,
        landcover::QualityFilter {
            has_all_classifications: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(fully_classified.n_rows(), 0);
}
