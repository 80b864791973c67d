#![doc = include_str!("../README.md")]

//! Match-replace rewriting and bounded proof search over verification
//! conditions.

pub mod chooser;
pub mod error;
pub mod library;
pub mod prover;
pub mod rule;
pub mod simplify;
pub mod state;

pub use chooser::{GuidedChooser, LegacyChooser, Strategy, Suggestion, TransformationChooser};
pub use error::RuleRegistrationError;
pub use library::TheoremLibrary;
pub use prover::{ProofOutcome, Prover, ProverOptions, UnprovedReason, Verdict};
pub use rule::{MatchReplace, Occurrence, Rewrite, RuleOrigin};
pub use state::{ProofState, ProofStep};
