//! One-way conversion from the mutable [`Exp`] tree to the persistent
//! [`PExp`] form consumed by the prover.
//!
//! * quantifiers disappear. Where the prover may instantiate one, its bound
//!   symbols keep a marker: [`Quantification::ForAll`] in facts (rule
//!   variables), [`Quantification::ThereExists`] in goals (witness wanted).
//!   Every other quantifier is skolemized and its symbols become fresh
//!   constants
//! * a quantifier under an operator with no polarity (an argument of `=` or
//!   of any function) becomes one fresh opaque atom
//! * an old-value snapshot `#x` becomes the symbol `#x`
//! * a field access on a variable becomes one dotted symbol (`S.Top`),
//!   other field accesses become a `.Field` application
//! * qualified variables become `Q::name`

use std::collections::BTreeSet;

use crate::error::TermError;
use crate::exp::{ops, ApplyStyle, Exp, ExpKind, Quantifier};
use crate::pexp::{PExp, Quantification};

/// Convert a fully typed expression in the role of a fact. Fails on the
/// first untyped node.
pub fn to_pexp(exp: &Exp) -> Result<PExp, TermError> {
    Converter::new([exp]).fact(exp)
}

/// Convert a fully typed expression in the role of a goal.
pub fn goal_to_pexp(exp: &Exp) -> Result<PExp, TermError> {
    Converter::new([exp]).goal(exp)
}

/// True when every quantifier of the fact `exp` is universal, so that it
/// converts to a rule with no skolem constants.
pub fn is_universal(exp: &Exp) -> bool {
    uniform(exp, Polarity::Positive, Quantifier::ForAll)
}

/// Converts the facts and goals of one condition, sharing a supply of
/// fresh constant names that avoids every free name of the condition.
#[derive(Debug, Default)]
pub struct Converter {
    reserved: BTreeSet<String>,
    scopes: Vec<(String, Bound)>,
}

#[derive(Debug, Clone)]
enum Bound {
    Pattern(Quantification),
    Constant(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Fact,
    Goal,
}

impl Role {
    /// The quantifier the prover may instantiate in this role.
    fn instantiable(self) -> Quantifier {
        match self {
            Role::Fact => Quantifier::ForAll,
            Role::Goal => Quantifier::Exists,
        }
    }

    fn marker(self) -> Quantification {
        match self {
            Role::Fact => Quantification::ForAll,
            Role::Goal => Quantification::ThereExists,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polarity {
    Positive,
    Negative,
    Mixed,
}

impl Polarity {
    fn flipped(self) -> Self {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
            Polarity::Mixed => Polarity::Mixed,
        }
    }

    fn of_arg(self, operator: &str, index: usize) -> Self {
        match operator {
            ops::AND | ops::OR => self,
            ops::NOT => self.flipped(),
            ops::IMPLIES if index == 0 => self.flipped(),
            ops::IMPLIES => self,
            _ => Polarity::Mixed,
        }
    }

    /// What `quantifier` amounts to at this polarity.
    fn effective(self, quantifier: Quantifier) -> Option<Quantifier> {
        match (self, quantifier) {
            (Polarity::Positive, q) => Some(q),
            (Polarity::Negative, Quantifier::ForAll) => Some(Quantifier::Exists),
            (Polarity::Negative, Quantifier::Exists) => Some(Quantifier::ForAll),
            (Polarity::Mixed, _) => None,
        }
    }
}

fn uniform(exp: &Exp, polarity: Polarity, wanted: Quantifier) -> bool {
    match &exp.kind {
        ExpKind::Var { .. } | ExpKind::Literal { .. } => true,
        ExpKind::Apply { operator, args, .. } => args
            .iter()
            .enumerate()
            .all(|(i, a)| uniform(a, polarity.of_arg(operator, i), wanted)),
        ExpKind::Quantified { quantifier, body, .. } => {
            polarity.effective(*quantifier) == Some(wanted) && uniform(body, polarity, wanted)
        }
        ExpKind::Old { exp } => uniform(exp, polarity, wanted),
        ExpKind::Dot { base, .. } => uniform(base, Polarity::Mixed, wanted),
    }
}

impl Converter {
    pub fn new<'a>(exps: impl IntoIterator<Item = &'a Exp>) -> Self {
        Self {
            reserved: exps.into_iter().flat_map(Exp::free_variable_names).collect(),
            scopes: Vec::new(),
        }
    }

    /// A hypothesis: universals become rule variables, existentials are
    /// skolemized.
    pub fn fact(&mut self, exp: &Exp) -> Result<PExp, TermError> {
        self.convert(exp, Role::Fact, Polarity::Positive, false)
    }

    /// A goal: existentials become witness variables, universals are
    /// replaced by arbitrary constants.
    pub fn goal(&mut self, exp: &Exp) -> Result<PExp, TermError> {
        self.convert(exp, Role::Goal, Polarity::Positive, false)
    }

    fn fresh(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        while self.reserved.contains(&name) {
            name.push('\'');
        }
        self.reserved.insert(name.clone());
        name
    }

    fn binding(&self, name: &str) -> Option<&Bound> {
        self.scopes.iter().rev().find(|(bound, _)| bound == name).map(|(_, b)| b)
    }

    fn atom(&mut self, exp: &Exp) -> Result<PExp, TermError> {
        if let Some(untyped) = exp.first_untyped() {
            return Err(TermError::unresolved(untyped));
        }
        let ty = exp.ty.clone().ok_or_else(|| TermError::unresolved(exp))?;
        Ok(PExp::symbol(self.fresh("Q"), ty))
    }

    fn convert(&mut self, exp: &Exp, role: Role, polarity: Polarity, in_old: bool) -> Result<PExp, TermError> {
        let ty = exp.ty.clone().ok_or_else(|| TermError::unresolved(exp))?;
        match &exp.kind {
            ExpKind::Var { name, qualifier } => {
                let (mut symbol, quantification, free) = match (qualifier, self.binding(name)) {
                    (Some(q), _) => (format!("{q}::{name}"), Quantification::None, true),
                    (None, Some(Bound::Pattern(q))) => (name.clone(), *q, false),
                    (None, Some(Bound::Constant(c))) => (c.clone(), Quantification::None, false),
                    (None, None) => (name.clone(), Quantification::None, true),
                };
                if in_old && free {
                    symbol.insert(0, '#');
                }
                Ok(PExp::new(symbol, Vec::new(), ApplyStyle::Prefix, quantification, ty))
            }
            ExpKind::Literal { value } => Ok(PExp::symbol(value.to_string(), ty)),
            ExpKind::Apply {
                operator,
                style,
                args,
            } => {
                let args = args
                    .iter()
                    .enumerate()
                    .map(|(i, a)| self.convert(a, role, polarity.of_arg(operator, i), in_old))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(PExp::apply(operator.clone(), args, *style, ty))
            }
            ExpKind::Quantified {
                quantifier,
                vars,
                body,
            } => {
                let Some(effective) = polarity.effective(*quantifier) else {
                    return self.atom(exp);
                };
                let pattern = effective == role.instantiable() && uniform(body, polarity, effective);
                if effective == role.instantiable() && !pattern && role == Role::Goal {
                    return self.atom(exp);
                }
                let depth = self.scopes.len();
                for var in vars {
                    let bound = if pattern {
                        Bound::Pattern(role.marker())
                    } else {
                        Bound::Constant(self.fresh(&var.name))
                    };
                    self.scopes.push((var.name.clone(), bound));
                }
                let body = self.convert(body, role, polarity, in_old);
                self.scopes.truncate(depth);
                body
            }
            ExpKind::Old { exp: inner } => self.convert(inner, role, polarity, true),
            ExpKind::Dot { base, fields } => {
                let base = self.convert(base, role, Polarity::Mixed, in_old)?;
                let path = fields.join(".");
                if base.args().is_empty() {
                    Ok(PExp::new(
                        format!("{}.{path}", base.name()),
                        Vec::new(),
                        ApplyStyle::Prefix,
                        base.quantification(),
                        ty,
                    ))
                } else {
                    Ok(PExp::apply(format!(".{path}"), vec![base], ApplyStyle::Prefix, ty))
                }
            }
        }
    }
}
