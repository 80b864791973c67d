use thiserror::Error;

use assertive_term::TermError;

/// Why a theorem could not become a rewrite rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleRegistrationError {
    #[error("theorem `{name}` is not an equality: {found}")]
    MalformedRule { name: String, found: String },

    #[error("theorem `{name}`: `{variable}` occurs only in the replacement")]
    UnboundReplacement { name: String, variable: String },

    #[error("theorem `{name}` is not universally quantified")]
    NotUniversal { name: String },

    #[error("theorem `{name}`: pattern `{pattern}` matches every term")]
    UnguardedPattern { name: String, pattern: String },

    #[error(transparent)]
    Term(#[from] TermError),
}

impl RuleRegistrationError {
    pub fn code(&self) -> &'static str {
        match self {
            RuleRegistrationError::Term(_) => "unresolved-type",
            _ => "malformed-rule",
        }
    }
}
