//! Data profiling primitives for understanding observation table quality.

mod completeness;

pub use completeness::{profile_completeness, CompletenessProfile};
