//! Mutable expression trees used while proof rules execute.
//!
//! Every node carries an optional resolved [`MathType`] and an optional
//! [`Location`]. Structural equality ignores both: two expressions are equal
//! when their shapes, names and literals agree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::location::Location;
use crate::types::MathType;

/// Operator spellings the rule engine and prover rely on.
pub mod ops {
    pub const AND: &str = "and";
    pub const OR: &str = "or";
    pub const NOT: &str = "not";
    pub const IMPLIES: &str = "implies";
    pub const EQUALS: &str = "=";
    pub const NOT_EQUALS: &str = "/=";
    pub const LESS: &str = "<";
    pub const LESS_EQ: &str = "<=";
    pub const GREATER: &str = ">";
    pub const GREATER_EQ: &str = ">=";
    pub const PLUS: &str = "+";
    pub const MINUS: &str = "-";
    pub const TIMES: &str = "*";
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Char(char),
    Str(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Char(c) => write!(f, "'{c}'"),
            Literal::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

/// How an application is written back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyStyle {
    #[default]
    Prefix,
    Infix,
    /// Delimited application such as `|S|` or `<E>`.
    Outfix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantifier {
    ForAll,
    Exists,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundVar {
    pub name: String,
    pub ty: MathType,
}

impl BoundVar {
    pub fn new(name: impl Into<String>, ty: MathType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum ExpKind {
    Var {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        qualifier: Option<String>,
    },
    Literal {
        value: Literal,
    },
    Apply {
        operator: String,
        #[serde(default)]
        style: ApplyStyle,
        #[serde(default)]
        args: Vec<Exp>,
    },
    Quantified {
        quantifier: Quantifier,
        vars: Vec<BoundVar>,
        body: Box<Exp>,
    },
    /// Snapshot of a value on entry to the enclosing operation (`#x`).
    Old {
        exp: Box<Exp>,
    },
    /// Qualified field access such as `S.Contents`.
    Dot {
        base: Box<Exp>,
        fields: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exp {
    pub kind: ExpKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<MathType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl PartialEq for Exp {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Exp {}

#[allow(clippy::should_implement_trait)]
impl Exp {
    pub fn new(kind: ExpKind, ty: MathType) -> Self {
        Self {
            kind,
            ty: Some(ty),
            location: None,
        }
    }

    /// Build a node with no resolved type. Only upstream phases and tests
    /// should produce these.
    pub fn untyped(kind: ExpKind) -> Self {
        Self {
            kind,
            ty: None,
            location: None,
        }
    }

    pub fn var(name: impl Into<String>, ty: MathType) -> Self {
        Self::new(
            ExpKind::Var {
                name: name.into(),
                qualifier: None,
            },
            ty,
        )
    }

    pub fn qualified_var(qualifier: impl Into<String>, name: impl Into<String>, ty: MathType) -> Self {
        Self::new(
            ExpKind::Var {
                name: name.into(),
                qualifier: Some(qualifier.into()),
            },
            ty,
        )
    }

    pub fn bool(value: bool) -> Self {
        Self::new(
            ExpKind::Literal {
                value: Literal::Bool(value),
            },
            MathType::Boolean,
        )
    }

    pub fn int(value: i64) -> Self {
        Self::new(
            ExpKind::Literal {
                value: Literal::Int(value),
            },
            MathType::Integer,
        )
    }

    pub fn apply(operator: impl Into<String>, args: Vec<Exp>, ty: MathType) -> Self {
        Self::new(
            ExpKind::Apply {
                operator: operator.into(),
                style: ApplyStyle::Prefix,
                args,
            },
            ty,
        )
    }

    pub fn infix(operator: impl Into<String>, lhs: Exp, rhs: Exp, ty: MathType) -> Self {
        Self::new(
            ExpKind::Apply {
                operator: operator.into(),
                style: ApplyStyle::Infix,
                args: vec![lhs, rhs],
            },
            ty,
        )
    }

    pub fn outfix(operator: impl Into<String>, arg: Exp, ty: MathType) -> Self {
        Self::new(
            ExpKind::Apply {
                operator: operator.into(),
                style: ApplyStyle::Outfix,
                args: vec![arg],
            },
            ty,
        )
    }

    pub fn old(inner: Exp) -> Self {
        let ty = inner.ty.clone();
        let location = inner.location.clone();
        Self {
            kind: ExpKind::Old {
                exp: Box::new(inner),
            },
            ty,
            location,
        }
    }

    pub fn dot(base: Exp, fields: Vec<String>, ty: MathType) -> Self {
        Self::new(
            ExpKind::Dot {
                base: Box::new(base),
                fields,
            },
            ty,
        )
    }

    pub fn quantified(quantifier: Quantifier, vars: Vec<BoundVar>, body: Exp) -> Self {
        Self::new(
            ExpKind::Quantified {
                quantifier,
                vars,
                body: Box::new(body),
            },
            MathType::Boolean,
        )
    }

    pub fn for_all(vars: Vec<BoundVar>, body: Exp) -> Self {
        Self::quantified(Quantifier::ForAll, vars, body)
    }

    pub fn exists(vars: Vec<BoundVar>, body: Exp) -> Self {
        Self::quantified(Quantifier::Exists, vars, body)
    }

    pub fn located(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    // Logical builders. These fold literal `true` away so that goals built
    // from optional clauses stay small.

    pub fn and(lhs: Exp, rhs: Exp) -> Exp {
        if lhs.is_true() {
            rhs
        } else if rhs.is_true() {
            lhs
        } else {
            Exp::infix(ops::AND, lhs, rhs, MathType::Boolean)
        }
    }

    pub fn conjunction(parts: impl IntoIterator<Item = Exp>) -> Exp {
        parts.into_iter().fold(Exp::bool(true), Exp::and)
    }

    pub fn or(lhs: Exp, rhs: Exp) -> Exp {
        Exp::infix(ops::OR, lhs, rhs, MathType::Boolean)
    }

    pub fn not(exp: Exp) -> Exp {
        if let ExpKind::Literal {
            value: Literal::Bool(b),
        } = exp.kind
        {
            return Exp::bool(!b);
        }
        if let ExpKind::Apply {
            ref operator,
            ref args,
            ..
        } = exp.kind
        {
            if operator == ops::NOT && args.len() == 1 {
                return args[0].clone();
            }
        }
        let location = exp.location.clone();
        let mut negated = Exp::apply(ops::NOT, vec![exp], MathType::Boolean);
        negated.location = location;
        negated
    }

    pub fn implies(hypothesis: Exp, conclusion: Exp) -> Exp {
        if hypothesis.is_true() || conclusion.is_true() {
            conclusion
        } else {
            Exp::infix(ops::IMPLIES, hypothesis, conclusion, MathType::Boolean)
        }
    }

    pub fn equals(lhs: Exp, rhs: Exp) -> Exp {
        Exp::infix(ops::EQUALS, lhs, rhs, MathType::Boolean)
    }

    pub fn less_than(lhs: Exp, rhs: Exp) -> Exp {
        Exp::infix(ops::LESS, lhs, rhs, MathType::Boolean)
    }

    // Queries

    pub fn is_bool_literal(&self, value: bool) -> bool {
        matches!(self.kind, ExpKind::Literal { value: Literal::Bool(b) } if b == value)
    }

    pub fn is_true(&self) -> bool {
        self.is_bool_literal(true)
    }

    pub fn is_false(&self) -> bool {
        self.is_bool_literal(false)
    }

    pub fn var_name(&self) -> Option<&str> {
        match &self.kind {
            ExpKind::Var { name, .. } => Some(name),
            _ => None,
        }
    }

    /// True for variables and field accesses, the only assignable shapes.
    pub fn is_assignable(&self) -> bool {
        match &self.kind {
            ExpKind::Var { .. } => true,
            ExpKind::Dot { base, .. } => base.is_assignable(),
            _ => false,
        }
    }

    pub fn operator(&self) -> Option<&str> {
        match &self.kind {
            ExpKind::Apply { operator, .. } => Some(operator),
            _ => None,
        }
    }

    pub fn args(&self) -> &[Exp] {
        match &self.kind {
            ExpKind::Apply { args, .. } => args,
            _ => &[],
        }
    }

    pub fn binary(&self, op: &str) -> Option<(&Exp, &Exp)> {
        match &self.kind {
            ExpKind::Apply { operator, args, .. } if operator == op && args.len() == 2 => {
                Some((&args[0], &args[1]))
            }
            _ => None,
        }
    }

    pub fn equality(&self) -> Option<(&Exp, &Exp)> {
        self.binary(ops::EQUALS)
    }

    pub fn implication(&self) -> Option<(&Exp, &Exp)> {
        self.binary(ops::IMPLIES)
    }

    pub fn conjuncts(&self) -> Vec<&Exp> {
        match self.binary(ops::AND) {
            Some((lhs, rhs)) => {
                let mut out = lhs.conjuncts();
                out.extend(rhs.conjuncts());
                out
            }
            None => vec![self],
        }
    }

    pub fn into_conjuncts(self) -> Vec<Exp> {
        match self.kind {
            ExpKind::Apply { operator, args, .. } if operator == ops::AND && args.len() == 2 => {
                args.into_iter().flat_map(Exp::into_conjuncts).collect()
            }
            kind => vec![Exp {
                kind,
                ty: self.ty,
                location: self.location,
            }],
        }
    }

    pub fn detail(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.detail.as_deref())
    }

    /// Attach `detail` to every top-level conjunct that has none yet.
    pub fn labelled(self, detail: &str) -> Exp {
        Exp::conjunction(self.into_conjuncts().into_iter().map(|mut c| {
            let location = c.location.get_or_insert_with(Location::default);
            if location.detail.is_none() {
                location.detail = Some(detail.to_string());
            }
            c
        }))
    }

    pub fn size(&self) -> usize {
        1 + match &self.kind {
            ExpKind::Var { .. } | ExpKind::Literal { .. } => 0,
            ExpKind::Apply { args, .. } => args.iter().map(Exp::size).sum(),
            ExpKind::Quantified { body, .. } => body.size(),
            ExpKind::Old { exp } => exp.size(),
            ExpKind::Dot { base, .. } => base.size(),
        }
    }

    /// First node in pre-order that is missing its resolved type.
    pub fn first_untyped(&self) -> Option<&Exp> {
        if self.ty.is_none() {
            return Some(self);
        }
        match &self.kind {
            ExpKind::Var { .. } | ExpKind::Literal { .. } => None,
            ExpKind::Apply { args, .. } => args.iter().find_map(Exp::first_untyped),
            ExpKind::Quantified { body, .. } => body.first_untyped(),
            ExpKind::Old { exp } => exp.first_untyped(),
            ExpKind::Dot { base, .. } => base.first_untyped(),
        }
    }

    /// Does a free occurrence of `name` appear in this expression?
    ///
    /// Occurrences under an old-value wrapper only count when `include_old`
    /// is set.
    pub fn contains_variable(&self, name: &str, include_old: bool) -> bool {
        match &self.kind {
            ExpKind::Var { name: n, .. } => n == name,
            ExpKind::Literal { .. } => false,
            ExpKind::Apply { args, .. } => args.iter().any(|a| a.contains_variable(name, include_old)),
            ExpKind::Quantified { vars, body, .. } => {
                !vars.iter().any(|v| v.name == name) && body.contains_variable(name, include_old)
            }
            ExpKind::Old { exp } => include_old && exp.contains_variable(name, include_old),
            ExpKind::Dot { base, .. } => base.contains_variable(name, include_old),
        }
    }

    /// Is there a node, visible to [`Exp::substitute`], equal to `target`?
    ///
    /// Old-value snapshots and occurrences captured by a quantifier are not
    /// visible.
    pub fn contains_exp(&self, target: &Exp) -> bool {
        if self == target {
            return true;
        }
        match &self.kind {
            ExpKind::Var { .. } | ExpKind::Literal { .. } | ExpKind::Old { .. } => false,
            ExpKind::Apply { args, .. } => args.iter().any(|a| a.contains_exp(target)),
            ExpKind::Quantified { vars, body, .. } => {
                !vars.iter().any(|v| target.contains_variable(&v.name, true))
                    && body.contains_exp(target)
            }
            ExpKind::Dot { base, .. } => base.contains_exp(target),
        }
    }

    /// Names of all free variables, including those inside old-value
    /// snapshots.
    pub fn free_variable_names(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_free_names(&mut Vec::new(), &mut out);
        out
    }

    fn collect_free_names(&self, bound: &mut Vec<String>, out: &mut BTreeSet<String>) {
        match &self.kind {
            ExpKind::Var { name, .. } => {
                if !bound.iter().any(|b| b == name) {
                    out.insert(name.clone());
                }
            }
            ExpKind::Literal { .. } => {}
            ExpKind::Apply { args, .. } => {
                for a in args {
                    a.collect_free_names(bound, out);
                }
            }
            ExpKind::Quantified { vars, body, .. } => {
                let depth = bound.len();
                bound.extend(vars.iter().map(|v| v.name.clone()));
                body.collect_free_names(bound, out);
                bound.truncate(depth);
            }
            ExpKind::Old { exp } => exp.collect_free_names(bound, out),
            ExpKind::Dot { base, .. } => base.collect_free_names(bound, out),
        }
    }

    /// Replace every node structurally equal to `old` with a copy of `new`.
    pub fn substitute(&self, old: &Exp, new: &Exp) -> Exp {
        self.substitute_all(&[(old.clone(), new.clone())])
    }

    /// Simultaneous substitution: each node is matched against the pairs in
    /// order and replaced by the first hit, without rescanning the
    /// replacement.
    ///
    /// Old-value snapshots are only replaced as a whole, so `x := e` leaves
    /// `#x` alone. Occurrences bound by a quantifier are skipped, and bound
    /// variables are renamed when a replacement would be captured.
    pub fn substitute_all(&self, pairs: &[(Exp, Exp)]) -> Exp {
        if pairs.is_empty() {
            return self.clone();
        }
        if let Some((_, new)) = pairs.iter().find(|(old, _)| old == self) {
            return new.clone();
        }
        let kind = match &self.kind {
            ExpKind::Var { .. } | ExpKind::Literal { .. } | ExpKind::Old { .. } => self.kind.clone(),
            ExpKind::Apply {
                operator,
                style,
                args,
            } => ExpKind::Apply {
                operator: operator.clone(),
                style: *style,
                args: args.iter().map(|a| a.substitute_all(pairs)).collect(),
            },
            ExpKind::Quantified {
                quantifier,
                vars,
                body,
            } => {
                let active: Vec<(Exp, Exp)> = pairs
                    .iter()
                    .filter(|(old, _)| !vars.iter().any(|v| old.contains_variable(&v.name, true)))
                    .cloned()
                    .collect();
                let (vars, body) = avoid_capture(vars, body, &active);
                ExpKind::Quantified {
                    quantifier: *quantifier,
                    vars,
                    body: Box::new(body.substitute_all(&active)),
                }
            }
            ExpKind::Dot { base, fields } => ExpKind::Dot {
                base: Box::new(base.substitute_all(pairs)),
                fields: fields.clone(),
            },
        };
        Exp {
            kind,
            ty: self.ty.clone(),
            location: self.location.clone(),
        }
    }

    /// Replace every old-value snapshot `#e` with `e`.
    pub fn remember(&self) -> Exp {
        let kind = match &self.kind {
            ExpKind::Old { exp } => return exp.remember(),
            ExpKind::Var { .. } | ExpKind::Literal { .. } => self.kind.clone(),
            ExpKind::Apply {
                operator,
                style,
                args,
            } => ExpKind::Apply {
                operator: operator.clone(),
                style: *style,
                args: args.iter().map(Exp::remember).collect(),
            },
            ExpKind::Quantified {
                quantifier,
                vars,
                body,
            } => ExpKind::Quantified {
                quantifier: *quantifier,
                vars: vars.clone(),
                body: Box::new(body.remember()),
            },
            ExpKind::Dot { base, fields } => ExpKind::Dot {
                base: Box::new(base.remember()),
                fields: fields.clone(),
            },
        };
        Exp {
            kind,
            ty: self.ty.clone(),
            location: self.location.clone(),
        }
    }

    /// Rename the named type `name` to `replacement` on every node.
    pub fn rename_type(&self, name: &str, replacement: &MathType) -> Exp {
        self.map_nodes(&|mut e: Exp| {
            e.ty = e.ty.map(|t| t.rename(name, replacement));
            if let ExpKind::Quantified { vars, .. } = &mut e.kind {
                for v in vars.iter_mut() {
                    v.ty = v.ty.rename(name, replacement);
                }
            }
            e
        })
    }

    /// Rename applications of operator `from` to `to`.
    pub fn rename_operator(&self, from: &str, to: &str) -> Exp {
        self.map_nodes(&|mut e: Exp| {
            if let ExpKind::Apply { operator, .. } = &mut e.kind {
                if operator == from {
                    *operator = to.to_string();
                }
            }
            e
        })
    }

    /// Bottom-up rebuild applying `f` to every node after its children.
    fn map_nodes(&self, f: &dyn Fn(Exp) -> Exp) -> Exp {
        let kind = match &self.kind {
            ExpKind::Var { .. } | ExpKind::Literal { .. } => self.kind.clone(),
            ExpKind::Apply {
                operator,
                style,
                args,
            } => ExpKind::Apply {
                operator: operator.clone(),
                style: *style,
                args: args.iter().map(|a| a.map_nodes(f)).collect(),
            },
            ExpKind::Quantified {
                quantifier,
                vars,
                body,
            } => ExpKind::Quantified {
                quantifier: *quantifier,
                vars: vars.clone(),
                body: Box::new(body.map_nodes(f)),
            },
            ExpKind::Old { exp } => ExpKind::Old {
                exp: Box::new(exp.map_nodes(f)),
            },
            ExpKind::Dot { base, fields } => ExpKind::Dot {
                base: Box::new(base.map_nodes(f)),
                fields: fields.clone(),
            },
        };
        f(Exp {
            kind,
            ty: self.ty.clone(),
            location: self.location.clone(),
        })
    }
}

/// Rename bound variables that a pending replacement would capture.
fn avoid_capture(vars: &[BoundVar], body: &Exp, pairs: &[(Exp, Exp)]) -> (Vec<BoundVar>, Exp) {
    let mut vars = vars.to_vec();
    let mut body = body.clone();
    for i in 0..vars.len() {
        let name = vars[i].name.clone();
        let captured = pairs
            .iter()
            .any(|(old, new)| new.contains_variable(&name, true) && body.contains_exp(old));
        if !captured {
            continue;
        }
        let mut fresh = format!("{name}'");
        while body.contains_variable(&fresh, true)
            || vars.iter().any(|v| v.name == fresh)
            || pairs
                .iter()
                .any(|(o, n)| o.contains_variable(&fresh, true) || n.contains_variable(&fresh, true))
        {
            fresh.push('\'');
        }
        let ty = vars[i].ty.clone();
        body = body.substitute(&Exp::var(name, ty.clone()), &Exp::var(fresh.clone(), ty));
        vars[i].name = fresh;
    }
    (vars, body)
}

pub(crate) fn closing_delimiter(open: &str) -> &str {
    match open {
        "<" => ">",
        "(" => ")",
        "[" => "]",
        "{" => "}",
        "\u{27e8}" => "\u{27e9}",
        other => other,
    }
}

fn needs_parens(exp: &Exp) -> bool {
    match &exp.kind {
        ExpKind::Apply {
            style: ApplyStyle::Infix,
            args,
            ..
        } => args.len() == 2,
        ExpKind::Quantified { .. } => true,
        _ => false,
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, exp: &Exp) -> fmt::Result {
    if needs_parens(exp) {
        write!(f, "({exp})")
    } else {
        write!(f, "{exp}")
    }
}

impl fmt::Display for Exp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExpKind::Var {
                name,
                qualifier: Some(q),
            } => write!(f, "{q}::{name}"),
            ExpKind::Var { name, .. } => write!(f, "{name}"),
            ExpKind::Literal { value } => write!(f, "{value}"),
            ExpKind::Apply {
                operator,
                style,
                args,
            } => match (style, args.as_slice()) {
                (ApplyStyle::Infix, [lhs, rhs]) => {
                    write_operand(f, lhs)?;
                    write!(f, " {operator} ")?;
                    write_operand(f, rhs)
                }
                (ApplyStyle::Outfix, [arg]) => {
                    write!(f, "{operator}{arg}{}", closing_delimiter(operator))
                }
                _ => {
                    write!(f, "{operator}(")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ")")
                }
            },
            ExpKind::Quantified {
                quantifier,
                vars,
                body,
            } => {
                let keyword = match quantifier {
                    Quantifier::ForAll => "For all",
                    Quantifier::Exists => "There exists",
                };
                let vars: Vec<String> = vars.iter().map(|v| format!("{}: {}", v.name, v.ty)).collect();
                write!(f, "{keyword} {}, {body}", vars.join(", "))
            }
            ExpKind::Old { exp } => match exp.kind {
                ExpKind::Var { .. } | ExpKind::Dot { .. } => write!(f, "#{exp}"),
                _ => write!(f, "#({exp})"),
            },
            ExpKind::Dot { base, fields } => {
                write_operand(f, base)?;
                write!(f, ".{}", fields.join("."))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn z(name: &str) -> Exp {
        Exp::var(name, MathType::Integer)
    }

    fn plus(a: Exp, b: Exp) -> Exp {
        Exp::infix(ops::PLUS, a, b, MathType::Integer)
    }

    // ------------------------------------------------------------------
    // Construction and display
    // ------------------------------------------------------------------

    #[test]
    fn display_parenthesises_nested_infix() {
        let e = Exp::equals(plus(z("x"), Exp::int(1)), Exp::old(z("x")));
        assert_eq!(e.to_string(), "(x + 1) = #x");
    }

    #[test]
    fn display_outfix_and_dot() {
        let s = Exp::var("S", MathType::named("Stack"));
        let len = Exp::outfix("|", s.clone(), MathType::Natural);
        assert_eq!(len.to_string(), "|S|");
        let top = Exp::dot(s, vec!["Top".into()], MathType::Integer);
        assert_eq!(Exp::old(top).to_string(), "#S.Top");
    }

    #[test]
    fn logical_builders_fold_true() {
        let g = z("x");
        assert_eq!(Exp::and(Exp::bool(true), g.clone()), g);
        assert_eq!(Exp::implies(Exp::bool(true), g.clone()), g);
        assert!(Exp::implies(g.clone(), Exp::bool(true)).is_true());
        assert!(Exp::conjunction(Vec::new()).is_true());
        assert_eq!(Exp::not(Exp::not(g.clone())), g);
    }

    #[test]
    fn equality_ignores_type_and_location() {
        let a = z("x").located(Location::new("a.rb", 1, 2));
        let b = Exp::var("x", MathType::Natural);
        assert_eq!(a, b);
    }

    #[test]
    fn conjuncts_flatten_nested_and() {
        let e = Exp::conjunction(vec![z("a"), z("b"), z("c")]);
        let names: Vec<String> = e.conjuncts().iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(e.into_conjuncts().len(), 3);
    }

    #[test]
    fn labelled_marks_each_conjunct_once() {
        let first = z("a").labelled("Requires Clause of Op");
        let e = Exp::and(first, z("b")).labelled("Ensures Clause of Op");
        let details: Vec<Option<&str>> = e.conjuncts().iter().map(|c| c.detail()).collect();
        assert_eq!(
            details,
            vec![Some("Requires Clause of Op"), Some("Ensures Clause of Op")]
        );
    }

    // ------------------------------------------------------------------
    // Substitution
    // ------------------------------------------------------------------

    #[test]
    fn substitute_replaces_every_occurrence() {
        let e = Exp::less_than(plus(z("x"), z("x")), z("y"));
        let out = e.substitute(&z("x"), &Exp::int(3));
        assert_eq!(out.to_string(), "(3 + 3) < y");
    }

    #[test]
    fn substitute_leaves_old_snapshots() {
        let e = Exp::equals(z("x"), Exp::old(z("x")));
        let out = e.substitute(&z("x"), &z("?x"));
        assert_eq!(out.to_string(), "?x = #x");
        let out = out.substitute(&Exp::old(z("x")), &z("y"));
        assert_eq!(out.to_string(), "?x = y");
    }

    #[test]
    fn substitute_all_is_simultaneous() {
        let e = Exp::less_than(z("x"), z("y"));
        let out = e.substitute_all(&[(z("x"), z("y")), (z("y"), z("x"))]);
        assert_eq!(out.to_string(), "y < x");
    }

    #[test]
    fn substitute_skips_bound_occurrences() {
        let e = Exp::for_all(
            vec![BoundVar::new("x", MathType::Integer)],
            Exp::less_than(z("x"), z("y")),
        );
        let out = e.substitute(&z("x"), &Exp::int(0));
        assert_eq!(out, e);
    }

    #[test]
    fn substitute_renames_to_avoid_capture() {
        let e = Exp::exists(
            vec![BoundVar::new("x", MathType::Integer)],
            Exp::less_than(z("x"), z("y")),
        );
        let out = e.substitute(&z("y"), &plus(z("x"), Exp::int(1)));
        assert_eq!(out.to_string(), "There exists x': Z, x' < (x + 1)");
    }

    #[test]
    fn substitute_reaches_dot_bases() {
        let s = Exp::var("S", MathType::named("Stack"));
        let top = Exp::dot(s.clone(), vec!["Top".into()], MathType::Integer);
        let out = top.substitute(&s, &Exp::var("?S", MathType::named("Stack")));
        assert_eq!(out.to_string(), "?S.Top");
    }

    #[test]
    fn contains_variable_respects_include_old() {
        let e = Exp::equals(z("y"), Exp::old(z("x")));
        assert!(!e.contains_variable("x", false));
        assert!(e.contains_variable("x", true));
        assert!(e.contains_variable("y", false));
    }

    #[test]
    fn remember_strips_old_wrappers() {
        let e = Exp::equals(z("x"), plus(Exp::old(z("x")), Exp::int(1)));
        assert_eq!(e.remember().to_string(), "x = (x + 1)");
    }

    #[test]
    fn rename_type_and_operator() {
        let entry = MathType::named("Entry");
        let e = Exp::apply("Are_Ordered", vec![Exp::var("e", entry.clone())], MathType::Boolean);
        let out = e
            .rename_operator("Are_Ordered", "Int_Less")
            .rename_type("Entry", &MathType::Integer);
        assert_eq!(out.to_string(), "Int_Less(e)");
        assert_eq!(out.args()[0].ty, Some(MathType::Integer));
    }

    #[test]
    fn first_untyped_finds_missing_type() {
        let bad = Exp::untyped(ExpKind::Var {
            name: "q".into(),
            qualifier: None,
        });
        let e = Exp::less_than(z("x"), bad);
        assert_eq!(e.first_untyped().map(|u| u.to_string()), Some("q".to_string()));
        assert!(z("x").first_untyped().is_none());
    }

    #[test]
    fn json_round_trip_keeps_shape() {
        let e = Exp::equals(z("x"), Exp::old(z("x")));
        let json = serde_json::to_string(&e).unwrap();
        let back: Exp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
        assert_eq!(back.ty, Some(MathType::Boolean));
    }
}
