#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Prompt construction and response parsing shared by every pipeline stage
//! that talks to an LLM provider.

pub mod extract;
pub mod normalize;
pub mod parse;
pub mod prompts;

pub use extract::{extract_balanced, extract_candidate, sanitize};
pub use parse::{GeneratedCandidate, SynthesizedEntry, ValidationItem};
