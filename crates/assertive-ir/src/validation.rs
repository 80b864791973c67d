//! Preflight check that every expression in a unit carries a resolved type.
//!
//! An untyped expression is a broken upstream contract, not a user error;
//! callers abort the pass when this check fails.

use thiserror::Error;

use assertive_term::{Exp, Location};

use crate::ast::{CompilationUnit, ModuleArgument, ModuleDecl, ModuleParameter, OperationDecl, ProcedureDecl};
use crate::stmt::{IterateItem, ProgramExp, Statement};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("untyped expression `{expression}` in {context}")]
pub struct UntypedExpression {
    pub context: String,
    pub expression: String,
    pub location: Option<Location>,
}

pub fn ensure_fully_typed(unit: &CompilationUnit) -> Result<(), UntypedExpression> {
    for module in &unit.modules {
        let m = module.name();
        for param in module.params() {
            if let ModuleParameter::Operation { operation } = param {
                check_operation(m, operation)?;
            }
        }
        match module {
            ModuleDecl::Concept(c) => {
                check_opt(c.requires.as_ref(), &format!("requires clause of {m}"))?;
                for e in &c.constraints {
                    check(e, &format!("constraint of {m}"))?;
                }
                for family in &c.type_families {
                    let ctx = format!("type family {}.{}", m, family.name);
                    check_opt(family.constraint.as_ref(), &ctx)?;
                    check_opt(family.initialization.as_ref(), &ctx)?;
                }
            }
            ModuleDecl::Realization(r) => {
                check_opt(r.requires.as_ref(), &format!("requires clause of {m}"))?;
                for rep in &r.representations {
                    let ctx = format!("representation of {} in {m}", rep.type_name);
                    check_opt(rep.convention.as_ref(), &ctx)?;
                    check_opt(rep.correspondence.as_ref(), &ctx)?;
                    check_statements(&rep.initialization, &ctx)?;
                }
            }
            ModuleDecl::Facility(_) => {}
            ModuleDecl::Theory(t) => {
                for theorem in &t.theorems {
                    check(&theorem.assertion, &format!("theorem {}.{}", m, theorem.name))?;
                }
            }
        }
        for facility in module.facilities() {
            let ctx = format!("facility {} in {m}", facility.name);
            for arg in facility.concept_args.iter().chain(&facility.realization_args) {
                if let ModuleArgument::Constant { value } = arg {
                    check(value, &ctx)?;
                }
            }
        }
        for op in module.operations() {
            check_operation(m, op)?;
        }
        for procedure in module.procedures() {
            check_procedure(m, procedure)?;
        }
    }
    Ok(())
}

fn check(exp: &Exp, context: &str) -> Result<(), UntypedExpression> {
    match exp.first_untyped() {
        Some(bad) => Err(UntypedExpression {
            context: context.to_string(),
            expression: bad.to_string(),
            location: bad.location.clone().or_else(|| exp.location.clone()),
        }),
        None => Ok(()),
    }
}

fn check_opt(exp: Option<&Exp>, context: &str) -> Result<(), UntypedExpression> {
    exp.map_or(Ok(()), |e| check(e, context))
}

fn check_operation(module: &str, op: &OperationDecl) -> Result<(), UntypedExpression> {
    check_opt(op.requires.as_ref(), &format!("requires clause of {module}.{}", op.name))?;
    check_opt(op.ensures.as_ref(), &format!("ensures clause of {module}.{}", op.name))
}

fn check_procedure(module: &str, procedure: &ProcedureDecl) -> Result<(), UntypedExpression> {
    let ctx = format!("procedure {module}.{}", procedure.name);
    check_opt(procedure.decreasing.as_ref(), &ctx)?;
    check_statements(&procedure.body, &ctx)
}

fn check_program(exp: &ProgramExp, context: &str) -> Result<(), UntypedExpression> {
    match exp {
        ProgramExp::Math { exp } => check(exp, context),
        ProgramExp::Call { call, .. } => call.args.iter().try_for_each(|a| check_program(a, context)),
    }
}

fn check_loop_clauses(
    changing: Option<&Vec<Exp>>,
    maintaining: Option<&Exp>,
    decreasing: Option<&Exp>,
    context: &str,
) -> Result<(), UntypedExpression> {
    for e in changing.into_iter().flatten() {
        check(e, context)?;
    }
    check_opt(maintaining, context)?;
    check_opt(decreasing, context)
}

fn check_statements(statements: &[Statement], context: &str) -> Result<(), UntypedExpression> {
    for stmt in statements {
        match stmt {
            Statement::Assign { target, value, .. } => {
                check(target, context)?;
                check_program(value, context)?;
            }
            Statement::Swap { left, right, .. } => {
                check(left, context)?;
                check(right, context)?;
            }
            Statement::Call { call } => {
                for arg in &call.args {
                    check_program(arg, context)?;
                }
            }
            Statement::If {
                test,
                then_branch,
                else_branch,
                ..
            } => {
                check_program(test, context)?;
                check_statements(then_branch, context)?;
                check_statements(else_branch, context)?;
            }
            Statement::While {
                test,
                changing,
                maintaining,
                decreasing,
                body,
                ..
            } => {
                check_program(test, context)?;
                check_loop_clauses(changing.as_ref(), maintaining.as_ref(), decreasing.as_ref(), context)?;
                check_statements(body, context)?;
            }
            Statement::Iterate {
                changing,
                maintaining,
                decreasing,
                items,
                ..
            } => {
                check_loop_clauses(changing.as_ref(), maintaining.as_ref(), decreasing.as_ref(), context)?;
                for item in items {
                    match item {
                        IterateItem::Statement { statement } => {
                            check_statements(std::slice::from_ref(statement), context)?
                        }
                        IterateItem::Exit {
                            test, statements, ..
                        } => {
                            check_program(test, context)?;
                            check_statements(statements, context)?;
                        }
                    }
                }
            }
            Statement::Confirm { assertion, .. } | Statement::Assume { assertion, .. } => {
                check(assertion, context)?;
            }
        }
    }
    Ok(())
}
