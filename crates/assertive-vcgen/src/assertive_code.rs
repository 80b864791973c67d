//! One in-flight proof branch.

use indexmap::IndexSet;
use std::fmt;

use assertive_ir::{Statement, VariableDecl};
use assertive_term::{Exp, ExpKind, MathType, TermError};

use crate::nqv::next_quantified_name;

/// Pending item of a branch, consumed last-pushed-first.
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationStatement {
    Assume(Exp),
    Confirm(Exp),
    Code(Statement),
    /// The listed variables receive arbitrary new values.
    Change(Vec<Exp>),
    VariableDecl(VariableDecl),
    /// Old-value snapshots refer to the current state from here on.
    Remember,
}

impl VerificationStatement {
    pub fn rule_name(&self) -> &'static str {
        match self {
            VerificationStatement::Assume(_) => "Assume",
            VerificationStatement::Confirm(_) => "Confirm",
            VerificationStatement::Code(stmt) => stmt.kind_name(),
            VerificationStatement::Change(_) => "Change",
            VerificationStatement::VariableDecl(_) => "Variable Declaration",
            VerificationStatement::Remember => "Remember",
        }
    }
}

impl fmt::Display for VerificationStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationStatement::Assume(e) => write!(f, "Assume {e}"),
            VerificationStatement::Confirm(e) => write!(f, "Confirm {e}"),
            VerificationStatement::Code(stmt) => write!(f, "{stmt}"),
            VerificationStatement::Change(vars) => {
                let names: Vec<String> = vars.iter().map(|v| v.to_string()).collect();
                write!(f, "Change {}", names.join(", "))
            }
            VerificationStatement::VariableDecl(decl) => write!(f, "Var {}: {}", decl.name, decl.ty),
            VerificationStatement::Remember => write!(f, "Remember"),
        }
    }
}

/// A free variable in scope for a branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConcType {
    pub module: String,
    pub name: String,
    pub ty: MathType,
}

impl fmt::Display for ConcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{} : {}", self.module, self.name, self.ty)
    }
}

/// Termination context of a recursive procedure: its metric over the
/// formal parameters and the ghost variable holding the metric's entry
/// value.
#[derive(Debug, Clone, PartialEq)]
pub struct RecursionContext {
    pub operation: String,
    pub metric: Exp,
    pub ghost: Exp,
}

#[derive(Debug, Clone)]
pub struct AssertiveCode {
    name: String,
    module: String,
    pending: Vec<VerificationStatement>,
    free_vars: IndexSet<ConcType>,
    assumptions: Vec<Exp>,
    final_confirm: Exp,
    recursion: Option<RecursionContext>,
}

impl AssertiveCode {
    pub fn new(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            pending: Vec::new(),
            free_vars: IndexSet::new(),
            assumptions: Vec::new(),
            final_confirm: Exp::bool(true),
            recursion: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn final_confirm(&self) -> &Exp {
        &self.final_confirm
    }

    pub fn assumptions(&self) -> &[Exp] {
        &self.assumptions
    }

    pub fn free_vars(&self) -> &IndexSet<ConcType> {
        &self.free_vars
    }

    pub fn pending(&self) -> &[VerificationStatement] {
        &self.pending
    }

    pub fn recursion(&self) -> Option<&RecursionContext> {
        self.recursion.as_ref()
    }

    pub fn set_recursion(&mut self, recursion: RecursionContext) {
        self.recursion = Some(recursion);
    }

    pub fn set_final_confirm(&mut self, goal: Exp) {
        self.final_confirm = goal;
    }

    pub fn add_free_var(&mut self, name: &str, ty: MathType) {
        if !self.declares(name) {
            self.free_vars.insert(ConcType {
                module: self.module.clone(),
                name: name.to_string(),
                ty,
            });
        }
    }

    pub fn declares(&self, name: &str) -> bool {
        self.free_vars.iter().any(|v| v.name == name)
    }

    pub fn push(&mut self, stmt: VerificationStatement) {
        self.pending.push(stmt);
    }

    /// Push items given in program order; the last one is consumed first.
    pub fn push_all(&mut self, stmts: impl IntoIterator<Item = VerificationStatement>) {
        self.pending.extend(stmts);
    }

    pub fn pop(&mut self) -> Option<VerificationStatement> {
        self.pending.pop()
    }

    pub fn assume(&mut self, exp: Exp) {
        if !exp.is_true() {
            self.assumptions.push(exp);
        }
    }

    /// Fold the accumulated assumptions into the goal and conjoin `exp`.
    pub fn confirm(&mut self, exp: Exp) {
        if exp.is_true() {
            return;
        }
        let goal = std::mem::replace(&mut self.final_confirm, Exp::bool(true));
        let hypotheses = Exp::conjunction(std::mem::take(&mut self.assumptions));
        self.final_confirm = Exp::and(exp, Exp::implies(hypotheses, goal));
    }

    /// Apply a substitution to the goal and to every pending assumption.
    pub fn substitute(&mut self, old: &Exp, new: &Exp) {
        self.substitute_all(&[(old.clone(), new.clone())]);
    }

    pub fn substitute_all(&mut self, pairs: &[(Exp, Exp)]) {
        self.final_confirm = self.final_confirm.substitute_all(pairs);
        for a in self.assumptions.iter_mut() {
            *a = a.substitute_all(pairs);
        }
    }

    pub fn remember(&mut self) {
        self.final_confirm = self.final_confirm.remember();
        for a in self.assumptions.iter_mut() {
            *a = a.remember();
        }
    }

    /// The whole remaining obligation as one expression.
    pub fn folded_goal(&self) -> Exp {
        Exp::implies(
            Exp::conjunction(self.assumptions.iter().cloned()),
            self.final_confirm.clone(),
        )
    }

    /// Independent copy for a second path through the same program point.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Start a fresh goal, keeping pending items and free variables.
    pub fn reset_goal(&mut self) {
        self.final_confirm = Exp::bool(true);
        self.assumptions.clear();
    }

    pub fn is_name_taken(&self, name: &str) -> bool {
        self.declares(name)
            || self.final_confirm.contains_variable(name, true)
            || self.assumptions.iter().any(|a| a.contains_variable(name, true))
    }

    /// Next quantified version of `base` not yet used in this branch.
    pub fn fresh_name(&self, base: &str) -> String {
        next_quantified_name(base, |candidate| self.is_name_taken(candidate))
    }

    pub fn fresh_variable(&mut self, base: &str, ty: MathType) -> Exp {
        let name = self.fresh_name(base);
        self.add_free_var(&name, ty.clone());
        Exp::var(name, ty)
    }

    /// Fresh stand-in for an assignable expression: `x` becomes `?x`,
    /// `S.Top` becomes `?S.Top`.
    pub fn fresh_version(&mut self, target: &Exp) -> Result<Exp, TermError> {
        let ty = target.ty.clone().ok_or_else(|| TermError::unresolved(target))?;
        let mut fresh = match &target.kind {
            ExpKind::Var { name, .. } => self.fresh_variable(name, ty),
            ExpKind::Dot { base, fields } => {
                let base = self.fresh_version(base)?;
                Exp::dot(base, fields.clone(), ty)
            }
            ExpKind::Old { exp } => self.fresh_version(exp)?,
            _ => self.fresh_variable(&target.to_string(), ty),
        };
        fresh.location = target.location.clone();
        Ok(fresh)
    }

    pub fn into_goal(self) -> (String, Vec<Exp>, Exp) {
        (self.name, self.assumptions, self.final_confirm)
    }
}
