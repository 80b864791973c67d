//! Proof states and the steps between them.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use assertive_term::{PExp, Quantification, VerificationCondition};

use crate::rule::{MatchReplace, RuleOrigin};
use crate::simplify::{has_existential, simplify, simplify_conjuncts};

/// The conjuncts a search step works on. Consequent conjuncts that already
/// hold are removed by [`ProofState::normalized`]; an empty consequent
/// means the condition is proved.
#[derive(Debug, Clone, PartialEq)]
pub struct ProofState {
    antecedent: Vec<PExp>,
    consequent: Vec<PExp>,
}

impl ProofState {
    pub fn new(antecedent: Vec<PExp>, consequent: Vec<PExp>) -> Self {
        Self {
            antecedent,
            consequent,
        }
    }

    pub fn from_vc(vc: &VerificationCondition) -> Self {
        Self::new(vc.antecedent().to_vec(), vc.consequent().to_vec())
    }

    pub fn antecedent(&self) -> &[PExp] {
        &self.antecedent
    }

    pub fn consequent(&self) -> &[PExp] {
        &self.consequent
    }

    pub fn is_proved(&self) -> bool {
        self.consequent.is_empty()
    }

    /// Simplify both sides and drop every goal that already holds.
    pub fn normalized(&self) -> Self {
        let antecedent = simplify_conjuncts(&self.antecedent);
        let consequent = simplify_conjuncts(&self.consequent);
        let mut state = Self::new(antecedent, Vec::new());
        if state.antecedent.iter().any(|f| f.is_truth(false)) {
            return state;
        }
        state.consequent = consequent.into_iter().filter(|g| !state.holds(g)).collect();
        state
    }

    /// A goal holds if it is a hypothesis or, when it has existential
    /// symbols, if some choice of witnesses turns its parts into
    /// hypotheses or literal truths.
    pub fn holds(&self, goal: &PExp) -> bool {
        if goal.is_truth(true) || self.antecedent.contains(goal) {
            return true;
        }
        has_existential(goal) && witnessed(&goal.conjuncts(), &self.antecedent)
    }

    /// Replace the consequent conjunct at `index`.
    pub fn with_goal(&self, index: usize, goal: PExp) -> Self {
        let mut consequent = self.consequent.clone();
        if let Some(slot) = consequent.get_mut(index) {
            *slot = goal;
        }
        Self::new(self.antecedent.clone(), consequent)
    }

    /// Use hypotheses `v = e`, with `v` a plain symbol not occurring in
    /// `e`, to replace `v` everywhere else, dropping the hypothesis.
    pub fn eliminate_variables(&self) -> Self {
        let mut state = self.clone();
        while let Some((index, rule)) = state.elimination_candidate() {
            state.antecedent.remove(index);
            state.antecedent = state.antecedent.iter().map(|f| rule.apply_all(f)).collect();
            state.consequent = state.consequent.iter().map(|g| rule.apply_all(g)).collect();
        }
        state.normalized()
    }

    fn elimination_candidate(&self) -> Option<(usize, MatchReplace)> {
        self.antecedent.iter().enumerate().find_map(|(i, fact)| {
            if has_existential(fact) {
                return None;
            }
            let (lhs, rhs) = fact.equality()?;
            [(lhs, rhs), (rhs, lhs)]
                .into_iter()
                .find(|(v, e)| is_plain_symbol(v) && !e.contains(v))
                .map(|(v, e)| {
                    let rule = MatchReplace::new(format!("Given {}", i + 1), v.clone(), e.clone(), RuleOrigin::Antecedent);
                    (i, rule)
                })
        })
    }

    pub fn size(&self) -> usize {
        self.antecedent.iter().chain(&self.consequent).map(PExp::size).sum()
    }

    /// Structural hash, used to avoid revisiting a state on one search path.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.antecedent.hash(&mut hasher);
        self.consequent.hash(&mut hasher);
        hasher.finish()
    }
}

fn is_plain_symbol(exp: &PExp) -> bool {
    exp.args().is_empty() && exp.quantification() == Quantification::None && !exp.is_literal()
}

fn witnessed(goals: &[PExp], facts: &[PExp]) -> bool {
    let Some((first, rest)) = goals.split_first() else {
        return true;
    };
    if first.is_truth(true) {
        return witnessed(rest, facts);
    }
    if !has_existential(first) {
        return facts.contains(first) && witnessed(rest, facts);
    }
    let mut ground = facts.iter().filter(|fact| !has_existential(fact));
    ground.any(|fact| match first.match_against(fact, Quantification::ThereExists) {
        Some(bindings) => {
            let rest: Vec<PExp> = rest.iter().map(|g| simplify(&g.substitute(&bindings))).collect();
            witnessed(&rest, facts)
        }
        None => false,
    })
}

/// One rewrite on the way to a proof.
#[derive(Debug, Clone, PartialEq)]
pub struct ProofStep {
    pub rule: String,
    pub equation: String,
    pub conjunct: usize,
    pub position: usize,
    pub result: String,
}

impl fmt::Display for ProofStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] on goal {} at {}: {}",
            self.rule,
            self.equation,
            self.conjunct + 1,
            self.position,
            self.result
        )
    }
}
