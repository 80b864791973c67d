use std::borrow::Cow;
use std::collections::HashSet;

use crate::library::TheoremLibrary;
use crate::rule::RuleOrigin;
use crate::state::ProofState;

use super::{local_rules, rewrites, Suggestion, Suggestions, TransformationChooser};

/// Default policy: all candidates of a state are ranked before any is
/// tried. Steps leaving fewer open goals come first, then hypothesis
/// equalities before library theorems, then smaller states. Steps reaching
/// an already offered state are dropped.
pub struct GuidedChooser<'l> {
    library: &'l TheoremLibrary,
}

impl<'l> GuidedChooser<'l> {
    pub fn new(library: &'l TheoremLibrary) -> Self {
        Self { library }
    }

    fn fitness(suggestion: &Suggestion) -> (usize, u8, usize) {
        let origin = match suggestion.origin {
            RuleOrigin::Antecedent => 0,
            RuleOrigin::Library => 1,
        };
        (suggestion.state.consequent().len(), origin, suggestion.state.size())
    }
}

impl TransformationChooser for GuidedChooser<'_> {
    fn name(&self) -> &'static str {
        "default"
    }

    fn suggest<'c>(&'c self, state: &ProofState) -> Suggestions<'c> {
        let local = local_rules(state)
            .into_iter()
            .flat_map(|rule| rewrites(Cow::Owned(rule), state.clone()));
        let global = self
            .library
            .rules()
            .iter()
            .flat_map(|rule| rewrites(Cow::Borrowed(rule), state.clone()));

        let mut seen = HashSet::new();
        let mut candidates: Vec<Suggestion> = local
            .chain(global)
            .filter(|s| seen.insert(s.state.fingerprint()))
            .collect();
        candidates.sort_by_key(Self::fitness);
        Box::new(candidates.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertive_term::{ops, ApplyStyle, MathType, PExp, Quantification};

    fn z(name: &str) -> PExp {
        PExp::symbol(name, MathType::Integer)
    }

    fn bin(op: &str, a: PExp, b: PExp) -> PExp {
        let ty = if op == ops::PLUS { MathType::Integer } else { MathType::Boolean };
        PExp::apply(op, vec![a, b], ApplyStyle::Infix, ty)
    }

    #[test]
    fn closing_steps_are_offered_first() {
        let n = z("n").with_quantification(Quantification::ForAll);
        let mut library = TheoremLibrary::new();
        library
            .register("Swap_Plus", &bin(ops::EQUALS, bin(ops::PLUS, n.clone(), z("k")), bin(ops::PLUS, z("k"), n)))
            .unwrap();
        let state = ProofState::new(
            vec![bin(ops::EQUALS, z("a"), z("b")), bin(ops::LESS, z("b"), z("c"))],
            vec![bin(ops::LESS, z("a"), z("c")), bin(ops::LESS, bin(ops::PLUS, z("d"), z("k")), z("e"))],
        );
        let chooser = GuidedChooser::new(&library);
        let first = chooser.suggest(&state).next().unwrap();
        assert_eq!(first.step.rule, "Given 1");
        assert_eq!(first.state.consequent().len(), 1);
    }
}
