//! Immutable, structurally shared expressions used during proof search.
//!
//! A [`PExp`] is a reference-counted node; cloning is a pointer copy and
//! rewriting a subterm rebuilds only the spine above it. Symbols carry a
//! [`Quantification`] so that universally quantified theorem variables can
//! act as pattern variables and existentially quantified goal variables can
//! be bound against facts.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::exp::{closing_delimiter, ops, ApplyStyle};
use crate::types::MathType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quantification {
    #[default]
    None,
    ForAll,
    ThereExists,
}

/// Pattern-variable bindings produced by [`PExp::match_against`].
pub type Bindings = HashMap<PExp, PExp>;

#[derive(Clone)]
pub struct PExp(Arc<PNode>);

struct PNode {
    name: String,
    args: Vec<PExp>,
    style: ApplyStyle,
    quantification: Quantification,
    ty: MathType,
    size: usize,
    structural_hash: u64,
}

impl PExp {
    pub fn new(
        name: impl Into<String>,
        args: Vec<PExp>,
        style: ApplyStyle,
        quantification: Quantification,
        ty: MathType,
    ) -> Self {
        let name = name.into();
        let size = 1 + args.iter().map(PExp::size).sum::<usize>();
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        quantification.hash(&mut hasher);
        for arg in &args {
            hasher.write_u64(arg.0.structural_hash);
        }
        PExp(Arc::new(PNode {
            name,
            args,
            style,
            quantification,
            ty,
            size,
            structural_hash: hasher.finish(),
        }))
    }

    pub fn symbol(name: impl Into<String>, ty: MathType) -> Self {
        Self::new(name, Vec::new(), ApplyStyle::Prefix, Quantification::None, ty)
    }

    pub fn apply(name: impl Into<String>, args: Vec<PExp>, style: ApplyStyle, ty: MathType) -> Self {
        Self::new(name, args, style, Quantification::None, ty)
    }

    pub fn truth(value: bool) -> Self {
        Self::symbol(if value { "true" } else { "false" }, MathType::Boolean)
    }

    pub fn int(value: i64) -> Self {
        Self::symbol(value.to_string(), MathType::Integer)
    }

    pub fn with_quantification(&self, quantification: Quantification) -> Self {
        Self::new(
            self.name(),
            self.args().to_vec(),
            self.style(),
            quantification,
            self.ty().clone(),
        )
    }

    /// Same head symbol, new arguments.
    pub fn with_args(&self, args: Vec<PExp>) -> Self {
        Self::new(
            self.name(),
            args,
            self.style(),
            self.quantification(),
            self.ty().clone(),
        )
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn args(&self) -> &[PExp] {
        &self.0.args
    }

    pub fn style(&self) -> ApplyStyle {
        self.0.style
    }

    pub fn quantification(&self) -> Quantification {
        self.0.quantification
    }

    pub fn ty(&self) -> &MathType {
        &self.0.ty
    }

    /// Number of nodes, which is also the number of pre-order positions.
    pub fn size(&self) -> usize {
        self.0.size
    }

    pub fn ptr_eq(&self, other: &PExp) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_truth(&self, value: bool) -> bool {
        self.args().is_empty()
            && self.quantification() == Quantification::None
            && self.name() == if value { "true" } else { "false" }
    }

    pub fn int_value(&self) -> Option<i64> {
        if self.args().is_empty()
            && self.quantification() == Quantification::None
            && self.ty().is_numeric()
        {
            self.name().parse().ok()
        } else {
            None
        }
    }

    pub fn is_literal(&self) -> bool {
        self.is_truth(true) || self.is_truth(false) || self.int_value().is_some()
    }

    pub fn is_pattern_variable(&self, marker: Quantification) -> bool {
        marker != Quantification::None && self.args().is_empty() && self.quantification() == marker
    }

    pub fn binary(&self, op: &str) -> Option<(&PExp, &PExp)> {
        match self.args() {
            [lhs, rhs] if self.name() == op => Some((lhs, rhs)),
            _ => None,
        }
    }

    pub fn equality(&self) -> Option<(&PExp, &PExp)> {
        self.binary(ops::EQUALS)
    }

    /// Split nested conjunctions into their leaves, left to right.
    pub fn conjuncts(&self) -> Vec<PExp> {
        match self.binary(ops::AND) {
            Some((lhs, rhs)) => {
                let mut out = lhs.conjuncts();
                out.extend(rhs.conjuncts());
                out
            }
            None => vec![self.clone()],
        }
    }

    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }

    pub fn subterm_at(&self, index: usize) -> Option<&PExp> {
        self.preorder().nth(index)
    }

    /// Replace the subterm at pre-order position `index` (0 is the root).
    pub fn replace_at(&self, index: usize, replacement: &PExp) -> Option<PExp> {
        if index == 0 {
            return Some(replacement.clone());
        }
        let mut offset = index - 1;
        for (i, arg) in self.args().iter().enumerate() {
            if offset < arg.size() {
                let mut args = self.args().to_vec();
                args[i] = arg.replace_at(offset, replacement)?;
                return Some(self.with_args(args));
            }
            offset -= arg.size();
        }
        None
    }

    /// Top-down replacement of every subterm that is a key of `map`.
    /// Replacements are not revisited. Untouched subtrees stay shared.
    pub fn substitute(&self, map: &HashMap<PExp, PExp>) -> PExp {
        if let Some(replacement) = map.get(self) {
            return replacement.clone();
        }
        if self.args().is_empty() {
            return self.clone();
        }
        let args: Vec<PExp> = self.args().iter().map(|a| a.substitute(map)).collect();
        if args.iter().zip(self.args()).all(|(new, old)| new.ptr_eq(old)) {
            self.clone()
        } else {
            self.with_args(args)
        }
    }

    pub fn contains(&self, target: &PExp) -> bool {
        self.preorder().any(|node| node == target)
    }

    /// Every head and leaf symbol name.
    pub fn symbols(&self) -> BTreeSet<&str> {
        self.preorder().map(PExp::name).collect()
    }

    /// Distinct pattern variables in pre-order.
    pub fn pattern_variables(&self, marker: Quantification) -> Vec<PExp> {
        let mut out: Vec<PExp> = Vec::new();
        for node in self.preorder() {
            if node.is_pattern_variable(marker) && !out.contains(node) {
                out.push(node.clone());
            }
        }
        out
    }

    /// Try to bind `self`, read as a pattern whose `marker`-quantified
    /// symbols are variables, against `target`.
    pub fn match_against(&self, target: &PExp, marker: Quantification) -> Option<Bindings> {
        let mut bindings = Bindings::new();
        self.bind(target, marker, &mut bindings).then_some(bindings)
    }

    fn bind(&self, target: &PExp, marker: Quantification, bindings: &mut Bindings) -> bool {
        if self.is_pattern_variable(marker) {
            if let Some(existing) = bindings.get(self) {
                return existing == target;
            }
            if !target.ty().is_subtype_of(self.ty()) {
                return false;
            }
            bindings.insert(self.clone(), target.clone());
            return true;
        }
        if self.name() != target.name()
            || self.quantification() != target.quantification()
            || self.args().len() != target.args().len()
        {
            return false;
        }
        self.args()
            .iter()
            .zip(target.args())
            .all(|(p, t)| p.bind(t, marker, bindings))
    }
}

impl PartialEq for PExp {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.0.structural_hash == other.0.structural_hash
            && self.0.name == other.0.name
            && self.0.quantification == other.0.quantification
            && self.0.args == other.0.args
    }
}

impl Eq for PExp {}

impl Hash for PExp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.structural_hash);
    }
}

/// Pre-order traversal: a node, then its arguments left to right.
pub struct Preorder<'a> {
    stack: Vec<&'a PExp>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a PExp;

    fn next(&mut self) -> Option<&'a PExp> {
        let node = self.stack.pop()?;
        self.stack.extend(node.args().iter().rev());
        Some(node)
    }
}

fn needs_parens(exp: &PExp) -> bool {
    exp.style() == ApplyStyle::Infix && exp.args().len() == 2
}

fn write_operand(f: &mut fmt::Formatter<'_>, exp: &PExp) -> fmt::Result {
    if needs_parens(exp) {
        write!(f, "({exp})")
    } else {
        write!(f, "{exp}")
    }
}

impl fmt::Display for PExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match (self.style(), self.args()) {
            (_, []) => write!(f, "{name}"),
            (ApplyStyle::Infix, [lhs, rhs]) => {
                write_operand(f, lhs)?;
                write!(f, " {name} ")?;
                write_operand(f, rhs)
            }
            (ApplyStyle::Outfix, [arg]) => write!(f, "{name}{arg}{}", closing_delimiter(name)),
            (_, [base]) if name.starts_with('.') => {
                write_operand(f, base)?;
                write!(f, "{name}")
            }
            (_, args) => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Debug for PExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PExp({self})")
    }
}
