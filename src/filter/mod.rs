//! Row filters for observation tables.

pub mod coords;
pub mod duplicates;
pub mod geolocation;
mod stats;

pub use coords::{
    drop_invalid_coords, filter_invalid_coords, filter_invalid_coords_with_stats, CoordBounds,
};
pub use duplicates::{drop_duplicates, filter_duplicates, filter_duplicates_with_stats};
pub use geolocation::{
    drop_poor_geolocation, filter_poor_geolocation, filter_poor_geolocation_with_stats,
};
pub use stats::FilterStats;
