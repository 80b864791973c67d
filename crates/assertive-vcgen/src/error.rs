use thiserror::Error;

use assertive_term::{Location, TermError};

/// Failure of one proof rule on one branch.
///
/// Everything except [`RuleError::Term`] is a problem with the program under
/// verification: it is reported and only the affected branch is abandoned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("no specification found for {subject}")]
    MissingSpecification {
        subject: String,
        location: Option<Location>,
    },

    #[error("`{operation}` expects {expected} argument(s) but is given {found}")]
    ArityMismatch {
        operation: String,
        expected: usize,
        found: usize,
        location: Option<Location>,
    },

    #[error("argument `{argument}` of `{operation}` is passed in {mode} mode and must be a variable")]
    NotAVariable {
        operation: String,
        argument: String,
        mode: String,
        location: Option<Location>,
    },

    #[error("cannot instantiate {facility}: {message}")]
    Instantiation {
        facility: String,
        message: String,
        location: Option<Location>,
    },

    #[error(transparent)]
    Term(#[from] TermError),
}

impl RuleError {
    pub fn missing(subject: impl Into<String>, location: Option<&Location>) -> Self {
        RuleError::MissingSpecification {
            subject: subject.into(),
            location: location.cloned(),
        }
    }

    /// True when the failure indicates a bug upstream of the rules rather
    /// than a problem in the verified program.
    pub fn is_internal(&self) -> bool {
        matches!(self, RuleError::Term(_))
    }

    pub fn code(&self) -> &'static str {
        match self {
            RuleError::MissingSpecification { .. } => "missing-specification",
            RuleError::ArityMismatch { .. } => "arity-mismatch",
            RuleError::NotAVariable { .. } => "not-a-variable",
            RuleError::Instantiation { .. } => "instantiation",
            RuleError::Term(_) => "unresolved-type",
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            RuleError::MissingSpecification { location, .. }
            | RuleError::ArityMismatch { location, .. }
            | RuleError::NotAVariable { location, .. }
            | RuleError::Instantiation { location, .. } => location.as_ref(),
            RuleError::Term(TermError::UnresolvedType { location, .. }) => location.as_ref(),
        }
    }
}

#[derive(Debug, Error)]
pub enum VcGenError {
    #[error("internal error in `{obligation}` at `{statement}`: {source}")]
    Internal {
        obligation: String,
        statement: String,
        #[source]
        source: TermError,
    },
}

impl VcGenError {
    pub fn internal(obligation: &str, statement: impl Into<String>, source: TermError) -> Self {
        VcGenError::Internal {
            obligation: obligation.to_string(),
            statement: statement.into(),
            source,
        }
    }
}
