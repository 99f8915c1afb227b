//! Pipeline composition and execution for observation quality control.

mod runner;

pub use runner::{
    landcover_pipeline, mosquito_pipeline, Pipeline, PipelineConfig, PipelineStep, RunReport,
    StepSummary,
};
