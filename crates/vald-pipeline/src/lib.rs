//! # vald-pipeline
//!
//! Consolidation and orchestration for a VALD extraction run.
//!
//! - [`consolidate`]: joins (groups with categories, tests with profiles),
//!   ages, left/right imbalance, and the person-oriented report view
//! - [`orchestrator`]: the eight-step run from token to sinks, reporting
//!   through a [`vald_core::RunObserver`]

pub mod consolidate;
pub mod orchestrator;

mod error;

pub use error::PipelineError;
pub use orchestrator::{
    DeviceSummary, Orchestrator, RunSummary, TOTAL_STEPS, TenantRun, run_extraction,
};
