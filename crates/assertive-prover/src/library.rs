//! The global theorem library.

use tracing::{debug, warn};

use assertive_ir::{Diagnostic, DiagnosticSink, TheoremDecl};
use assertive_term::{is_universal, to_pexp, PExp};

use crate::error::RuleRegistrationError;
use crate::rule::{MatchReplace, RuleOrigin};

/// Rewrite rules from equational theorems, each usable in whichever
/// directions bind all of its variables.
#[derive(Debug, Clone, Default)]
pub struct TheoremLibrary {
    rules: Vec<MatchReplace>,
}

impl TheoremLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from declared theorems. Theorems that cannot become rules are
    /// reported to `sink` and skipped; an untyped theorem is an error.
    pub fn from_theorems<'a>(
        theorems: impl IntoIterator<Item = &'a TheoremDecl>,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Self, RuleRegistrationError> {
        let mut library = Self::new();
        for theorem in theorems {
            let equation = to_pexp(&theorem.assertion)?;
            let registered = if is_universal(&theorem.assertion) {
                library.register(&theorem.name, &equation)
            } else {
                Err(RuleRegistrationError::NotUniversal {
                    name: theorem.name.clone(),
                })
            };
            if let Err(err) = registered {
                warn!(theorem = %theorem.name, error = %err, "dropping theorem");
                sink.report(Diagnostic::warning(
                    err.code(),
                    err.to_string(),
                    theorem.assertion.location.clone(),
                ));
            }
        }
        debug!(rules = library.len(), "theorem library ready");
        Ok(library)
    }

    /// Add both orientations of `equation` that make valid rules. Fails
    /// when neither does.
    pub fn register(&mut self, name: &str, equation: &PExp) -> Result<(), RuleRegistrationError> {
        let (lhs, rhs) = equation.equality().ok_or_else(|| RuleRegistrationError::MalformedRule {
            name: name.to_string(),
            found: equation.to_string(),
        })?;
        let forward = MatchReplace::oriented(name, lhs, rhs, RuleOrigin::Library);
        let backward = MatchReplace::oriented(&format!("{name} (reversed)"), rhs, lhs, RuleOrigin::Library);
        match (forward, backward) {
            (Err(err), Err(_)) => Err(err),
            (forward, backward) => {
                self.rules.extend(forward.ok());
                self.rules.extend(backward.ok());
                Ok(())
            }
        }
    }

    pub fn add(&mut self, rule: MatchReplace) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[MatchReplace] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
