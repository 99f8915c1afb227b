//! Pipeline runner for composing and executing quality control steps.

use crate::clean::{
    remove_homogenous_columns, rename_latlon_columns, replace_column_prefix, round_columns,
    standardize_missing_values,
};
use crate::data::ObservationTable;
use crate::error::{Result, ScrubError};
use crate::filter::{drop_duplicates, drop_invalid_coords, drop_poor_geolocation, CoordBounds};
use crate::flag::{landcover, mosquito};
use serde::{Deserialize, Serialize};

/// A step in the quality control pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineStep {
    // === Row Filtering ===
    /// Remove rows with out-of-range coordinates.
    FilterInvalidCoords {
        latitude_column: String,
        longitude_column: String,
        #[serde(default)]
        bounds: CoordBounds,
    },
    /// Remove whole groups of near-identical rows.
    FilterDuplicates {
        columns: Vec<String>,
        group_size: usize,
    },
    /// Remove rows whose GPS fix merely repeats the grid center.
    FilterPoorGeolocation {
        latitude_column: String,
        longitude_column: String,
        grid_latitude_column: String,
        grid_longitude_column: String,
    },

    // === Column Cleanup ===
    /// Drop columns holding a single repeated value.
    RemoveHomogenousColumns,
    /// Standardize latitude and longitude column names.
    RenameLatlonColumns,
    /// Replace a verbose column name prefix.
    ReplaceColumnPrefix { prefix: String, replacement: String },
    /// Round coordinate columns and truncate other numeric columns.
    RoundColumns,
    /// Standardize missing value markers.
    StandardizeNulls,

    // === Protocol Enrichment ===
    /// Convert textual larvae counts to numbers with range flags.
    ConvertLarvaeCount { column: String },
    /// Unpack packed land cover classification fields.
    UnpackClassifications,
    /// Add the mosquito habitat flag bundle.
    MosquitoFlags,
    /// Add the land cover flag bundle.
    LandcoverFlags,
}

impl PipelineStep {
    /// Short step name used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineStep::FilterInvalidCoords { .. } => "filter-invalid-coords",
            PipelineStep::FilterDuplicates { .. } => "filter-duplicates",
            PipelineStep::FilterPoorGeolocation { .. } => "filter-poor-geolocation",
            PipelineStep::RemoveHomogenousColumns => "remove-homogenous-columns",
            PipelineStep::RenameLatlonColumns => "rename-latlon-columns",
            PipelineStep::ReplaceColumnPrefix { .. } => "replace-column-prefix",
            PipelineStep::RoundColumns => "round-columns",
            PipelineStep::StandardizeNulls => "standardize-nulls",
            PipelineStep::ConvertLarvaeCount { .. } => "convert-larvae-count",
            PipelineStep::UnpackClassifications => "unpack-classifications",
            PipelineStep::MosquitoFlags => "mosquito-flags",
            PipelineStep::LandcoverFlags => "landcover-flags",
        }
    }
}

/// Pipeline configuration for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Name of the pipeline.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Steps to execute.
    pub steps: Vec<PipelineStep>,
}

impl PipelineConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(ScrubError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(ScrubError::from)
    }
}

/// Shape of the working table before and after one executed step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSummary {
    /// Short step name.
    pub step: String,
    /// Rows going into the step.
    pub rows_before: usize,
    /// Rows coming out of the step.
    pub rows_after: usize,
    /// Columns going into the step.
    pub columns_before: usize,
    /// Columns coming out of the step.
    pub columns_after: usize,
}

/// Record of what a pipeline run did to the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Name of the pipeline that produced the report.
    pub pipeline: String,
    /// One summary per executed step, in order.
    pub steps: Vec<StepSummary>,
}

impl RunReport {
    fn new(pipeline: &str) -> Self {
        Self {
            pipeline: pipeline.to_string(),
            steps: Vec::new(),
        }
    }

    /// Total rows removed across all steps.
    pub fn rows_removed(&self) -> usize {
        self.steps
            .iter()
            .map(|step| step.rows_before.saturating_sub(step.rows_after))
            .sum()
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Pipeline Report: {}", self.pipeline)?;
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(
                f,
                "  {}. {}: {} -> {} rows, {} -> {} columns",
                i + 1,
                step.step,
                step.rows_before,
                step.rows_after,
                step.columns_before,
                step.columns_after
            )?;
        }
        Ok(())
    }
}

/// Builder for constructing and running quality control pipelines.
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<PipelineStep>,
    name: String,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            name: "unnamed".to_string(),
        }
    }

    /// Create from a config.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            steps: config.steps.clone(),
            name: config.name.clone(),
        }
    }

    /// Set the pipeline name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Add coordinate-validity filtering.
    pub fn filter_invalid_coords(
        mut self,
        latitude_column: &str,
        longitude_column: &str,
        bounds: CoordBounds,
    ) -> Self {
        self.steps.push(PipelineStep::FilterInvalidCoords {
            latitude_column: latitude_column.to_string(),
            longitude_column: longitude_column.to_string(),
            bounds,
        });
        self
    }

    /// Add duplicate-group filtering over the given columns.
    pub fn filter_duplicates(mut self, columns: &[String], group_size: usize) -> Self {
        self.steps.push(PipelineStep::FilterDuplicates {
            columns: columns.to_vec(),
            group_size,
        });
        self
    }

    /// Add poor-geolocation filtering.
    pub fn filter_poor_geolocation(
        mut self,
        latitude_column: &str,
        longitude_column: &str,
        grid_latitude_column: &str,
        grid_longitude_column: &str,
    ) -> Self {
        self.steps.push(PipelineStep::FilterPoorGeolocation {
            latitude_column: latitude_column.to_string(),
            longitude_column: longitude_column.to_string(),
            grid_latitude_column: grid_latitude_column.to_string(),
            grid_longitude_column: grid_longitude_column.to_string(),
        });
        self
    }

    /// Drop columns holding a single repeated value.
    pub fn remove_homogenous_columns(mut self) -> Self {
        self.steps.push(PipelineStep::RemoveHomogenousColumns);
        self
    }

    /// Standardize latitude and longitude column names.
    pub fn rename_latlon_columns(mut self) -> Self {
        self.steps.push(PipelineStep::RenameLatlonColumns);
        self
    }

    /// Replace a verbose column name prefix.
    pub fn replace_column_prefix(mut self, prefix: &str, replacement: &str) -> Self {
        self.steps.push(PipelineStep::ReplaceColumnPrefix {
            prefix: prefix.to_string(),
            replacement: replacement.to_string(),
        });
        self
    }

    /// Round coordinate columns and truncate other numeric columns.
    pub fn round_columns(mut self) -> Self {
        self.steps.push(PipelineStep::RoundColumns);
        self
    }

    /// Standardize missing value markers.
    pub fn standardize_nulls(mut self) -> Self {
        self.steps.push(PipelineStep::StandardizeNulls);
        self
    }

    /// Convert textual larvae counts in the given column.
    pub fn convert_larvae_count(mut self, column: &str) -> Self {
        self.steps.push(PipelineStep::ConvertLarvaeCount {
            column: column.to_string(),
        });
        self
    }

    /// Unpack packed land cover classification fields.
    pub fn unpack_classifications(mut self) -> Self {
        self.steps.push(PipelineStep::UnpackClassifications);
        self
    }

    /// Add the mosquito habitat flag bundle.
    pub fn mosquito_flags(mut self) -> Self {
        self.steps.push(PipelineStep::MosquitoFlags);
        self
    }

    /// Add the land cover flag bundle.
    pub fn landcover_flags(mut self) -> Self {
        self.steps.push(PipelineStep::LandcoverFlags);
        self
    }

    /// Convert to config for serialization.
    pub fn to_config(&self, description: Option<&str>) -> PipelineConfig {
        PipelineConfig {
            name: self.name.clone(),
            description: description.map(String::from),
            steps: self.steps.clone(),
        }
    }

    /// Run the pipeline on a table.
    ///
    /// The input is left untouched. Each step works on a private copy, and
    /// the report records the table shape around every step.
    pub fn run(&self, table: &ObservationTable) -> Result<(ObservationTable, RunReport)> {
        let mut working = table.clone();
        let mut report = RunReport::new(&self.name);

        for (i, step) in self.steps.iter().enumerate() {
            let rows_before = working.n_rows();
            let columns_before = working.n_columns();
            apply(&mut working, step).map_err(|e| {
                ScrubError::Pipeline(format!("Step {} ({:?}) failed: {}", i + 1, step, e))
            })?;
            report.steps.push(StepSummary {
                step: step.label().to_string(),
                rows_before,
                rows_after: working.n_rows(),
                columns_before,
                columns_after: working.n_columns(),
            });
        }

        Ok((working, report))
    }
}

fn apply(table: &mut ObservationTable, step: &PipelineStep) -> Result<()> {
    match step {
        PipelineStep::FilterInvalidCoords {
            latitude_column,
            longitude_column,
            bounds,
        } => drop_invalid_coords(table, latitude_column, longitude_column, *bounds),
        PipelineStep::FilterDuplicates {
            columns,
            group_size,
        } => drop_duplicates(table, columns, *group_size),
        PipelineStep::FilterPoorGeolocation {
            latitude_column,
            longitude_column,
            grid_latitude_column,
            grid_longitude_column,
        } => drop_poor_geolocation(
            table,
            latitude_column,
            longitude_column,
            grid_latitude_column,
            grid_longitude_column,
        ),
        PipelineStep::RemoveHomogenousColumns => remove_homogenous_columns(table).map(|_| ()),
        PipelineStep::RenameLatlonColumns => rename_latlon_columns(table),
        PipelineStep::ReplaceColumnPrefix {
            prefix,
            replacement,
        } => replace_column_prefix(table, prefix, replacement),
        PipelineStep::RoundColumns => round_columns(table),
        PipelineStep::StandardizeNulls => standardize_missing_values(table),
        PipelineStep::ConvertLarvaeCount { column } => mosquito::larvae_to_count(table, column),
        PipelineStep::UnpackClassifications => landcover::unpack_classifications(table),
        PipelineStep::MosquitoFlags => mosquito::add_flags(table),
        PipelineStep::LandcoverFlags => landcover::add_flags(table),
    }
}

/// Convenience function building the standard mosquito habitat QC pipeline.
///
/// Covers the full cleanup chain followed by the flag bundle, matching
/// [`mosquito::apply_cleanup`] and [`mosquito::add_flags`].
pub fn mosquito_pipeline() -> Pipeline {
    Pipeline::new()
        .name("mosquito-habitat-mapper")
        .remove_homogenous_columns()
        .rename_latlon_columns()
        .replace_column_prefix("mosquito_habitat_mapper", "mhm")
        .convert_larvae_count("mhm_LarvaeCount")
        .round_columns()
        .standardize_nulls()
        .mosquito_flags()
}

/// Convenience function building the standard land cover QC pipeline.
pub fn landcover_pipeline() -> Pipeline {
    Pipeline::new()
        .name("land-covers")
        .remove_homogenous_columns()
        .rename_latlon_columns()
        .replace_column_prefix("land_covers", "lc")
        .unpack_classifications()
        .round_columns()
        .standardize_nulls()
        .landcover_flags()
}
