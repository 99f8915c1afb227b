//! Quality Control for Crowdsourced Geolocated Observations
//!
//! This library cleans, flags, and filters tables of citizen science
//! observation records, with protocol-aware enrichment for mosquito
//! habitat and land cover data.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (ObservationTable, Value)
//! - **clean**: Column and value cleanup for raw observation feeds
//! - **filter**: Row filtering (coordinates, duplicates, geolocation)
//! - **flag**: Protocol enrichment flags (mosquito habitat, land cover)
//! - **profile**: Dataset completeness profiling
//! - **pipeline**: Pipeline composition and execution
//!
//! # Example
//!
//! ```no_run
//! use geoscrub::prelude::*;
//!
//! // Load observations
//! let table = ObservationTable::from_csv("observations.csv").unwrap();
//!
//! // Run a QC pipeline
//! let (filtered, report) = Pipeline::new()
//!     .filter_invalid_coords("Latitude", "Longitude", CoordBounds::Exclusive)
//!     .filter_duplicates(&["Latitude".to_string(), "Longitude".to_string()], 10)
//!     .run(&table)
//!     .unwrap();
//!
//! println!("{}", report);
//! filtered.to_csv("observations_qc.csv").unwrap();
//! ```

pub mod clean;
pub mod data;
pub mod error;
pub mod filter;
pub mod flag;
pub mod pipeline;
pub mod profile;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::clean::{
        find_column, remove_homogenous_columns, rename_latlon_columns, replace_column_prefix,
        round_columns, standardize_missing_values,
    };
    pub use crate::data::{ObservationTable, RowRef, Value};
    pub use crate::error::{Result, ScrubError};
    pub use crate::filter::{
        drop_duplicates, drop_invalid_coords, drop_poor_geolocation, filter_duplicates,
        filter_duplicates_with_stats, filter_invalid_coords, filter_invalid_coords_with_stats,
        filter_poor_geolocation, filter_poor_geolocation_with_stats, CoordBounds, FilterStats,
    };
    // The flag modules are re-exported whole since both define a
    // protocol-specific `QualityFilter`.
    pub use crate::flag::{landcover, mosquito};
    pub use crate::pipeline::{
        landcover_pipeline, mosquito_pipeline, Pipeline, PipelineConfig, PipelineStep, RunReport,
    };
    pub use crate::profile::{profile_completeness, CompletenessProfile};
}
