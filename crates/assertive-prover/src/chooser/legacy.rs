use std::borrow::Cow;

use crate::library::TheoremLibrary;
use crate::state::ProofState;

use super::{local_rules, rewrites, Suggestions, TransformationChooser};

/// Library theorems in declaration order, then the hypotheses' equalities.
/// Nothing is ranked; candidates are produced on demand.
pub struct LegacyChooser<'l> {
    library: &'l TheoremLibrary,
}

impl<'l> LegacyChooser<'l> {
    pub fn new(library: &'l TheoremLibrary) -> Self {
        Self { library }
    }
}

impl TransformationChooser for LegacyChooser<'_> {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn suggest<'c>(&'c self, state: &ProofState) -> Suggestions<'c> {
        let global_state = state.clone();
        let global = self
            .library
            .rules()
            .iter()
            .flat_map(move |rule| rewrites(Cow::Borrowed(rule), global_state.clone()));
        let local_state = state.clone();
        let local = local_rules(state)
            .into_iter()
            .flat_map(move |rule| rewrites(Cow::Owned(rule), local_state.clone()));
        Box::new(global.chain(local))
    }
}
