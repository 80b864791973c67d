use thiserror::Error;

use crate::exp::Exp;
use crate::location::Location;

/// Errors raised while moving expressions between representations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermError {
    /// Upstream phases promised a fully typed tree and did not deliver one.
    #[error(
        "expression `{expression}` has no resolved type{}",
        .location.as_ref().filter(|l| l.has_position()).map(|l| format!(" at {l}")).unwrap_or_default()
    )]
    UnresolvedType {
        expression: String,
        location: Option<Location>,
    },
}

impl TermError {
    pub fn unresolved(exp: &Exp) -> Self {
        TermError::UnresolvedType {
            expression: exp.to_string(),
            location: exp.location.clone(),
        }
    }
}
