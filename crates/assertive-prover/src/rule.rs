//! Equational rewrite rules and occurrence enumeration.
//!
//! A rule rewrites instances of its pattern into its replacement. Symbols
//! marked [`Quantification::ForAll`] in the pattern are pattern variables.
//! Occurrences are numbered in one fixed order: conjuncts left to right,
//! each traversed in pre-order.

use assertive_term::{PExp, Quantification};

use crate::error::RuleRegistrationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleOrigin {
    /// An equality among the condition's own hypotheses.
    Antecedent,
    /// A theorem from the library.
    Library,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub conjunct: usize,
    /// Pre-order index inside the conjunct; 0 is the conjunct itself.
    pub position: usize,
}

/// One applied occurrence: where, and the rewritten conjunct.
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    pub occurrence: Occurrence,
    pub result: PExp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchReplace {
    name: String,
    pattern: PExp,
    replacement: PExp,
    origin: RuleOrigin,
}

impl MatchReplace {
    pub fn new(name: impl Into<String>, pattern: PExp, replacement: PExp, origin: RuleOrigin) -> Self {
        Self {
            name: name.into(),
            pattern,
            replacement,
            origin,
        }
    }

    /// Left-to-right rule of an equation `lhs = rhs`.
    pub fn from_equation(name: &str, equation: &PExp, origin: RuleOrigin) -> Result<Self, RuleRegistrationError> {
        let (lhs, rhs) = equation.equality().ok_or_else(|| RuleRegistrationError::MalformedRule {
            name: name.to_string(),
            found: equation.to_string(),
        })?;
        Self::oriented(name, lhs, rhs, origin)
    }

    /// Rule rewriting `pattern` into `replacement`, rejected when the
    /// pattern is a bare variable or the replacement has variables the
    /// pattern cannot bind.
    pub fn oriented(
        name: &str,
        pattern: &PExp,
        replacement: &PExp,
        origin: RuleOrigin,
    ) -> Result<Self, RuleRegistrationError> {
        if pattern.is_pattern_variable(Quantification::ForAll) {
            return Err(RuleRegistrationError::UnguardedPattern {
                name: name.to_string(),
                pattern: pattern.to_string(),
            });
        }
        let bound = pattern.pattern_variables(Quantification::ForAll);
        if let Some(unbound) = replacement
            .pattern_variables(Quantification::ForAll)
            .into_iter()
            .find(|v| !bound.contains(v))
        {
            return Err(RuleRegistrationError::UnboundReplacement {
                name: name.to_string(),
                variable: unbound.to_string(),
            });
        }
        Ok(Self::new(name, pattern.clone(), replacement.clone(), origin))
    }

    /// The same equation read right to left.
    pub fn reversed(&self) -> Result<Self, RuleRegistrationError> {
        Self::oriented(
            &format!("{} (reversed)", self.name),
            &self.replacement,
            &self.pattern,
            self.origin,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &PExp {
        &self.pattern
    }

    pub fn replacement(&self) -> &PExp {
        &self.replacement
    }

    pub fn origin(&self) -> RuleOrigin {
        self.origin
    }

    pub fn equation(&self) -> String {
        format!("{} = {}", self.pattern, self.replacement)
    }

    /// Instance of the replacement if `node` matches the pattern.
    pub fn rewrite_node(&self, node: &PExp) -> Option<PExp> {
        let bindings = self.pattern.match_against(node, Quantification::ForAll)?;
        Some(self.replacement.substitute(&bindings))
    }

    /// Every match, in enumeration order.
    pub fn occurrences(&self, conjuncts: &[PExp]) -> Vec<Occurrence> {
        let mut out = Vec::new();
        for (conjunct, exp) in conjuncts.iter().enumerate() {
            for (position, node) in exp.preorder().enumerate() {
                if self.pattern.match_against(node, Quantification::ForAll).is_some() {
                    out.push(Occurrence { conjunct, position });
                }
            }
        }
        out
    }

    /// Rewrite only the `n`-th match (0-based). Depends on nothing but `n`
    /// and the inputs, so a search can resume at any index.
    pub fn nth_occurrence(&self, conjuncts: &[PExp], n: usize) -> Option<Rewrite> {
        let mut seen = 0;
        for (conjunct, exp) in conjuncts.iter().enumerate() {
            for (position, node) in exp.preorder().enumerate() {
                let Some(replacement) = self.rewrite_node(node) else {
                    continue;
                };
                if seen == n {
                    let result = exp.replace_at(position, &replacement)?;
                    return Some(Rewrite {
                        occurrence: Occurrence { conjunct, position },
                        result,
                    });
                }
                seen += 1;
            }
        }
        None
    }

    /// Rewrite every maximal match, top-down. Replacements are not
    /// searched again.
    pub fn apply_all(&self, exp: &PExp) -> PExp {
        if let Some(out) = self.rewrite_node(exp) {
            return out;
        }
        if exp.args().is_empty() {
            return exp.clone();
        }
        let args: Vec<PExp> = exp.args().iter().map(|a| self.apply_all(a)).collect();
        if args.iter().zip(exp.args()).all(|(new, old)| new.ptr_eq(old)) {
            exp.clone()
        } else {
            exp.with_args(args)
        }
    }
}
