#![doc = include_str!("../README.md")]

//! Term model shared by the proof-rule engine and the prover.
//!
//! [`Exp`] is the owned, mutable expression tree rules rewrite by
//! substitution; [`PExp`] is the persistent form search works on. The only
//! bridge between the two is [`convert::Converter`], which converts facts
//! and goals differently.

pub mod convert;
pub mod error;
pub mod exp;
pub mod location;
pub mod pexp;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest_generators;
pub mod types;
pub mod vc;

pub use convert::{goal_to_pexp, is_universal, to_pexp, Converter};
pub use error::TermError;
pub use exp::{ops, ApplyStyle, BoundVar, Exp, ExpKind, Literal, Quantifier};
pub use location::Location;
pub use pexp::{Bindings, PExp, Quantification};
pub use types::MathType;
pub use vc::VerificationCondition;
