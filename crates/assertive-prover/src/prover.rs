//! Bounded depth-first proof search.

use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use assertive_term::VerificationCondition;

use crate::chooser::{Suggestions, TransformationChooser};
use crate::state::{ProofState, ProofStep};

pub const DEFAULT_MAX_PATH_LENGTH: usize = 6;
pub const DEFAULT_MAX_STEPS: usize = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProverOptions {
    /// Longest chain of rewrites explored from the initial state.
    pub max_path_length: usize,
    /// Suggestions tried per condition before giving up.
    pub max_steps: usize,
    /// Wall-clock limit per condition, checked between steps.
    pub timeout: Option<Duration>,
}

impl Default for ProverOptions {
    fn default() -> Self {
        Self {
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            max_steps: DEFAULT_MAX_STEPS,
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnprovedReason {
    /// Every suggestion within the path budget was tried.
    SearchExhausted,
    StepBudget,
    Timeout,
}

impl fmt::Display for UnprovedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnprovedReason::SearchExhausted => write!(f, "search exhausted"),
            UnprovedReason::StepBudget => write!(f, "step budget exceeded"),
            UnprovedReason::Timeout => write!(f, "timeout"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Proved { log: Vec<ProofStep> },
    Unproved { reason: UnprovedReason },
}

impl Verdict {
    pub fn is_proved(&self) -> bool {
        matches!(self, Verdict::Proved { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProofOutcome {
    pub vc: String,
    pub verdict: Verdict,
    pub steps: usize,
    pub elapsed_ms: u128,
}

struct Frame<'c> {
    fingerprint: u64,
    arrived_by: Option<ProofStep>,
    suggestions: Suggestions<'c>,
}

pub struct Prover<'c> {
    chooser: &'c dyn TransformationChooser,
    options: ProverOptions,
}

impl<'c> Prover<'c> {
    pub fn new(chooser: &'c dyn TransformationChooser, options: ProverOptions) -> Self {
        Self { chooser, options }
    }

    pub fn options(&self) -> ProverOptions {
        self.options
    }

    pub fn prove(&self, vc: &VerificationCondition) -> ProofOutcome {
        self.prove_state(vc.name(), ProofState::from_vc(vc))
    }

    /// Search from `initial`. Each suggestion is one step; a state already on
    /// the current path is not entered again, and no path grows past the
    /// configured length.
    pub fn prove_state(&self, name: &str, initial: ProofState) -> ProofOutcome {
        let started = Instant::now();
        let deadline = self.options.timeout.map(|t| started + t);
        let finish = |verdict: Verdict, steps: usize| {
            info!(vc = name, proved = verdict.is_proved(), steps, "search finished");
            ProofOutcome {
                vc: name.to_string(),
                verdict,
                steps,
                elapsed_ms: started.elapsed().as_millis(),
            }
        };

        let root = initial.normalized();
        if root.is_proved() {
            return finish(Verdict::Proved { log: Vec::new() }, 0);
        }

        let mut on_path = HashSet::from([root.fingerprint()]);
        let mut frames = vec![Frame {
            fingerprint: root.fingerprint(),
            arrived_by: None,
            suggestions: self.chooser.suggest(&root),
        }];
        let mut steps = 0;

        while let Some(frame) = frames.last_mut() {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return finish(Verdict::Unproved { reason: UnprovedReason::Timeout }, steps);
            }
            if steps >= self.options.max_steps {
                return finish(Verdict::Unproved { reason: UnprovedReason::StepBudget }, steps);
            }
            let Some(suggestion) = frame.suggestions.next() else {
                on_path.remove(&frame.fingerprint);
                frames.pop();
                continue;
            };
            steps += 1;
            debug!(
                vc = name,
                depth = frames.len(),
                step = %suggestion.step,
                open = suggestion.state.consequent().len(),
                "applying rewrite"
            );

            if suggestion.state.is_proved() {
                let mut log: Vec<ProofStep> = frames.iter().filter_map(|f| f.arrived_by.clone()).collect();
                log.push(suggestion.step);
                return finish(Verdict::Proved { log }, steps);
            }
            let fingerprint = suggestion.state.fingerprint();
            if frames.len() >= self.options.max_path_length || on_path.contains(&fingerprint) {
                continue;
            }
            on_path.insert(fingerprint);
            let suggestions = self.chooser.suggest(&suggestion.state);
            frames.push(Frame {
                fingerprint,
                arrived_by: Some(suggestion.step),
                suggestions,
            });
        }
        finish(Verdict::Unproved { reason: UnprovedReason::SearchExhausted }, steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chooser::{GuidedChooser, LegacyChooser};
    use crate::library::TheoremLibrary;
    use assertive_term::{ops, ApplyStyle, MathType, PExp, Quantification};

    fn z(name: &str) -> PExp {
        PExp::symbol(name, MathType::Integer)
    }

    fn var(name: &str) -> PExp {
        z(name).with_quantification(Quantification::ForAll)
    }

    fn bin(op: &str, a: PExp, b: PExp) -> PExp {
        let ty = match op {
            ops::PLUS | ops::TIMES => MathType::Integer,
            _ => MathType::Boolean,
        };
        PExp::apply(op, vec![a, b], ApplyStyle::Infix, ty)
    }

    fn commutative_library() -> TheoremLibrary {
        let mut library = TheoremLibrary::new();
        library
            .register("Plus_Comm", &bin(ops::EQUALS, bin(ops::PLUS, var("a"), var("b")), bin(ops::PLUS, var("b"), var("a"))))
            .unwrap();
        library
    }

    #[test]
    fn trivially_true_needs_no_steps() {
        let library = TheoremLibrary::new();
        let chooser = GuidedChooser::new(&library);
        let state = ProofState::new(vec![], vec![bin(ops::LESS, PExp::int(1), PExp::int(2))]);
        let out = Prover::new(&chooser, ProverOptions::default()).prove_state("1_1", state);
        assert_eq!(out.verdict, Verdict::Proved { log: vec![] });
        assert_eq!(out.steps, 0);
    }

    #[test]
    fn hypothesis_equality_closes_the_goal() {
        let library = TheoremLibrary::new();
        let chooser = GuidedChooser::new(&library);
        let state = ProofState::new(
            vec![bin(ops::EQUALS, z("x"), bin(ops::PLUS, z("y"), PExp::int(1))), bin(ops::LESS, bin(ops::PLUS, z("y"), PExp::int(1)), z("n"))],
            vec![bin(ops::LESS, z("x"), z("n"))],
        );
        let out = Prover::new(&chooser, ProverOptions::default()).prove_state("1_1", state);
        match out.verdict {
            Verdict::Proved { log } => {
                assert_eq!(log.len(), 1);
                assert_eq!(log[0].rule, "Given 1");
            }
            other => panic!("expected a proof, got {other:?}"),
        }
    }

    #[test]
    fn library_theorem_closes_the_goal() {
        let library = commutative_library();
        let chooser = LegacyChooser::new(&library);
        let state = ProofState::new(
            vec![bin(ops::LESS, bin(ops::PLUS, z("p"), z("q")), z("r"))],
            vec![bin(ops::LESS, bin(ops::PLUS, z("q"), z("p")), z("r"))],
        );
        let out = Prover::new(&chooser, ProverOptions::default()).prove_state("1_1", state);
        assert!(out.verdict.is_proved());
    }

    #[test]
    fn cyclic_rules_terminate_unproved() {
        let library = commutative_library();
        let chooser = LegacyChooser::new(&library);
        let state = ProofState::new(vec![], vec![bin(ops::LESS, bin(ops::PLUS, z("q"), z("p")), z("r"))]);
        let out = Prover::new(&chooser, ProverOptions::default()).prove_state("1_1", state);
        assert_eq!(out.verdict, Verdict::Unproved { reason: UnprovedReason::SearchExhausted });
    }

    #[test]
    fn step_budget_is_enforced() {
        let library = commutative_library();
        let chooser = LegacyChooser::new(&library);
        let goal = bin(
            ops::LESS,
            bin(ops::PLUS, bin(ops::PLUS, z("a"), z("b")), bin(ops::PLUS, z("c"), z("d"))),
            z("e"),
        );
        let options = ProverOptions {
            max_steps: 3,
            ..ProverOptions::default()
        };
        let out = Prover::new(&chooser, options).prove_state("1_1", ProofState::new(vec![], vec![goal]));
        assert_eq!(out.verdict, Verdict::Unproved { reason: UnprovedReason::StepBudget });
        assert_eq!(out.steps, 3);
    }
}
