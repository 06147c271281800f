#![cfg_attr(all(not(test), feature = "fail-on-warnings"), deny(warnings))]

//! Eight-stage recommendation consensus pipeline (§2, §4).
//!
//! The [`Orchestrator`] owns the long-lived provider/geocoder/places/cache
//! handles; [`Orchestrator::run`] drives one [`PipelineContext`] through
//! every stage for a single request.

pub mod context;
pub mod error;
pub mod orchestrator;
pub mod stage_cache_check;
pub mod stage_cache_write;
pub mod stage_consensus;
pub mod stage_enrichment;
pub mod stage_generation;
pub mod stage_geocode;
pub mod stage_synthesis;
pub mod stage_validation;

pub use context::PipelineContext;
pub use error::PipelineError;
pub use orchestrator::Orchestrator;
