//! Proof rules: one backward step per pending verification statement.
//!
//! Every rule consumes the branch it is applied to and hands back the
//! branches that continue from it, in the order they should be explored.
//! Sequential rules return one branch; conditionals and loops return two.

mod assignment;
mod call;
mod conditional;
mod evaluation;
mod loops;

use tracing::trace;

use assertive_ir::{ScopeLookup, Statement, VariableDecl};
use assertive_term::{Exp, Location};

use crate::assertive_code::{AssertiveCode, VerificationStatement};
use crate::error::RuleError;

pub(crate) use evaluation::{evaluate, split_defining_equation};

pub(crate) type RuleResult = Result<Vec<AssertiveCode>, RuleError>;

#[derive(Clone, Copy)]
pub(crate) struct RuleContext<'a> {
    pub scope: &'a dyn ScopeLookup,
}

impl<'a> RuleContext<'a> {
    pub fn new(scope: &'a dyn ScopeLookup) -> Self {
        Self { scope }
    }
}

pub(crate) fn apply(ctx: RuleContext<'_>, mut code: AssertiveCode, stmt: VerificationStatement) -> RuleResult {
    trace!(rule = stmt.rule_name(), branch = code.name(), "applying rule");
    match stmt {
        VerificationStatement::Assume(exp) => {
            code.assume(exp);
            Ok(vec![code])
        }
        VerificationStatement::Confirm(exp) => {
            code.confirm(exp);
            Ok(vec![code])
        }
        VerificationStatement::Change(vars) => {
            let mut pairs = Vec::with_capacity(vars.len());
            for var in &vars {
                pairs.push((var.clone(), code.fresh_version(var)?));
            }
            code.substitute_all(&pairs);
            Ok(vec![code])
        }
        VerificationStatement::VariableDecl(decl) => {
            declare_variable(ctx, &mut code, &decl);
            Ok(vec![code])
        }
        VerificationStatement::Remember => {
            code.remember();
            Ok(vec![code])
        }
        VerificationStatement::Code(stmt) => apply_statement(ctx, code, stmt),
    }
}

fn apply_statement(ctx: RuleContext<'_>, mut code: AssertiveCode, stmt: Statement) -> RuleResult {
    match stmt {
        Statement::Assign { target, value, .. } => assignment::assign(ctx, code, &target, &value),
        Statement::Swap { left, right, .. } => assignment::swap(code, &left, &right),
        Statement::Call { call } => call::call(ctx, code, &call),
        Statement::If {
            test,
            then_branch,
            else_branch,
            ..
        } => conditional::if_then_else(ctx, code, &test, then_branch, else_branch),
        Statement::While {
            test,
            changing,
            maintaining,
            decreasing,
            body,
            location,
        } => loops::while_loop(
            ctx,
            code,
            loops::LoopClauses {
                changing,
                maintaining,
                decreasing,
                location,
            },
            &test,
            body,
        ),
        Statement::Iterate {
            changing,
            maintaining,
            decreasing,
            items,
            location,
        } => loops::iterate(
            ctx,
            code,
            loops::LoopClauses {
                changing,
                maintaining,
                decreasing,
                location,
            },
            items,
        ),
        Statement::Confirm { assertion, location } => {
            code.confirm(label_at(assertion, "Confirm Statement", location.as_ref()));
            Ok(vec![code])
        }
        Statement::Assume { assertion, .. } => {
            code.assume(assertion);
            Ok(vec![code])
        }
    }
}

/// A local variable comes into scope holding its type's initial value.
fn declare_variable(ctx: RuleContext<'_>, code: &mut AssertiveCode, decl: &VariableDecl) {
    code.add_free_var(&decl.name, decl.ty.clone());
    let var = decl.as_exp();
    if let Some(init) = ctx
        .scope
        .find_type_family(&decl.ty)
        .and_then(|family| family.initialization_for(&var))
    {
        code.assume(init);
    }
}

/// Label every conjunct of `exp` with `detail`, positioning unlocated ones
/// at `location`.
pub(crate) fn label_at(exp: Exp, detail: &str, location: Option<&Location>) -> Exp {
    let exp = match location {
        Some(location) => Exp::conjunction(exp.into_conjuncts().into_iter().map(|mut c| {
            if c.location.is_none() {
                c.location = Some(location.clone());
            }
            c
        })),
        None => exp,
    };
    exp.labelled(detail)
}
