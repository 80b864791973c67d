#![doc = include_str!("../README.md")]

//! Backward proof-rule engine: turns procedures, facility declarations and
//! type representations into verification conditions.

pub mod assertive_code;
pub mod collector;
pub mod error;
pub mod generator;
pub mod nqv;
pub mod trace;

mod obligations;
mod rules;

#[cfg(test)]
mod test_support;

pub use assertive_code::{AssertiveCode, ConcType, RecursionContext, VerificationStatement};
pub use error::{RuleError, VcGenError};
pub use generator::{generate, GenerationOutput, GeneratorOptions, ObligationFailure, VcGenerator};
pub use trace::ProofTrace;
