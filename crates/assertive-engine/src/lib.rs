#![doc = include_str!("../README.md")]

//! Verification pipeline: loading, preflight, generation, proving,
//! reporting and rendering.

pub mod pipeline;
pub mod render;
pub mod result;

pub use pipeline::{run, verify_unit, PipelineError, PipelineOptions};
pub use render::{render, OutputFormat};
pub use result::{PhaseProfile, Summary, VcStatus, VcVerdict, VerificationReport};
