//! Search-ordering policies.
//!
//! A chooser turns a proof state into a lazy sequence of candidate steps.
//! The prover consumes the sequence one element at a time and resumes it
//! after backtracking, so the order must be deterministic.

mod guided;
mod legacy;

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

pub use guided::GuidedChooser;
pub use legacy::LegacyChooser;

use crate::library::TheoremLibrary;
use crate::rule::{MatchReplace, RuleOrigin};
use crate::simplify::has_existential;
use crate::state::{ProofState, ProofStep};

/// A candidate step and the normalized state it leads to.
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub step: ProofStep,
    pub state: ProofState,
    pub origin: RuleOrigin,
}

pub type Suggestions<'c> = Box<dyn Iterator<Item = Suggestion> + 'c>;

pub trait TransformationChooser {
    fn name(&self) -> &'static str;

    fn suggest<'c>(&'c self, state: &ProofState) -> Suggestions<'c>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    #[default]
    Guided,
    Legacy,
}

impl Strategy {
    pub fn chooser<'l>(self, library: &'l TheoremLibrary) -> Box<dyn TransformationChooser + 'l> {
        match self {
            Strategy::Guided => Box::new(GuidedChooser::new(library)),
            Strategy::Legacy => Box::new(LegacyChooser::new(library)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Guided => write!(f, "default"),
            Strategy::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" | "guided" => Ok(Strategy::Guided),
            "legacy" => Ok(Strategy::Legacy),
            other => Err(format!("unknown strategy `{other}` (expected `default` or `legacy`)")),
        }
    }
}

/// Rules read off the hypotheses: each equality `a = b` in both
/// directions, skipping directions that would rewrite a literal. A fact
/// carrying a witness marker says nothing about any particular term and
/// gives no rule.
pub fn local_rules(state: &ProofState) -> Vec<MatchReplace> {
    let mut rules = Vec::new();
    for (i, fact) in state.antecedent().iter().enumerate() {
        if has_existential(fact) {
            continue;
        }
        let Some((lhs, rhs)) = fact.equality() else {
            continue;
        };
        let name = format!("Given {}", i + 1);
        for (pattern, replacement) in [(lhs, rhs), (rhs, lhs)] {
            if pattern.is_literal() || pattern == replacement {
                continue;
            }
            if let Ok(rule) = MatchReplace::oriented(&name, pattern, replacement, RuleOrigin::Antecedent) {
                rules.push(rule);
            }
        }
    }
    rules
}

/// Every occurrence of `rule` in the goals of `state`, in enumeration
/// order, skipping rewrites that change nothing.
pub(crate) fn rewrites<'c>(rule: Cow<'c, MatchReplace>, state: ProofState) -> impl Iterator<Item = Suggestion> + 'c {
    let mut n = 0;
    std::iter::from_fn(move || loop {
        let rewrite = rule.nth_occurrence(state.consequent(), n)?;
        n += 1;
        let index = rewrite.occurrence.conjunct;
        if state.consequent().get(index) == Some(&rewrite.result) {
            continue;
        }
        let step = ProofStep {
            rule: rule.name().to_string(),
            equation: rule.equation(),
            conjunct: index,
            position: rewrite.occurrence.position,
            result: rewrite.result.to_string(),
        };
        return Some(Suggestion {
            step,
            state: state.with_goal(index, rewrite.result).normalized(),
            origin: rule.origin(),
        });
    })
}
