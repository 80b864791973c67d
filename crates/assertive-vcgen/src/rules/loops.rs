use std::slice;

use assertive_ir::{IterateItem, ProgramExp, Statement};
use assertive_term::{Exp, Location, MathType};

use crate::assertive_code::{AssertiveCode, VerificationStatement};
use crate::rules::{evaluate, label_at, RuleContext, RuleResult};

const BASE_CASE: &str = "Base Case of the Invariant of While Statement";
const INDUCTIVE_CASE: &str = "Inductive Case of Invariant of While Statement";
const TERMINATION: &str = "Termination of While Statement";
const ITERATE_BASE_CASE: &str = "Base Case of the Invariant of Iterate Statement";
const ITERATE_INDUCTIVE_CASE: &str = "Inductive Case of Invariant of Iterate Statement";
const ITERATE_TERMINATION: &str = "Termination of Iterate Statement";
const ITERATE_EXIT: &str = "Exit of Iterate Statement";

pub(super) struct LoopClauses {
    pub changing: Option<Vec<Exp>>,
    pub maintaining: Option<Exp>,
    pub decreasing: Option<Exp>,
    pub location: Option<Location>,
}

impl LoopClauses {
    fn invariant(&self) -> Exp {
        self.maintaining.clone().unwrap_or_else(|| Exp::bool(true))
    }

    fn changing(&self, ctx: RuleContext<'_>, body: &[Statement]) -> Vec<Exp> {
        self.changing.clone().unwrap_or_else(|| modified_variables(ctx, body))
    }
}

/// Entry assumption and exit confirm of one iteration. With a decreasing
/// clause, a ghost variable records the metric on entry and the exit
/// confirm demands it shrank.
fn iteration_bounds(
    code: &mut AssertiveCode,
    clauses: &LoopClauses,
    inductive_label: &str,
    termination_label: &str,
) -> (Exp, Exp) {
    let location = clauses.location.as_ref();
    let invariant = clauses.invariant();
    let mut entry = invariant.clone();
    let mut exit = label_at(invariant, inductive_label, location);
    if let Some(metric) = &clauses.decreasing {
        let ty = metric.ty.clone().unwrap_or(MathType::Natural);
        let ghost = code.fresh_variable("P_Val", ty);
        entry = Exp::and(entry, Exp::equals(ghost.clone(), metric.clone()));
        exit = Exp::and(exit, label_at(Exp::less_than(metric.clone(), ghost), termination_label, location));
    }
    (entry, exit)
}

/// `While c changing V maintaining I decreasing M do S end`.
///
/// The incoming branch becomes the base case: confirm `I`, forget `V`,
/// assume `I and not c`, and continue with what follows the loop. A second
/// branch with an empty goal checks one arbitrary iteration: from `I` and
/// `c`, running `S` re-establishes `I` and decreases `M`.
pub(super) fn while_loop(
    ctx: RuleContext<'_>,
    mut code: AssertiveCode,
    clauses: LoopClauses,
    test: &ProgramExp,
    body: Vec<Statement>,
) -> RuleResult {
    let changing = clauses.changing(ctx, &body);
    let invariant = clauses.invariant();
    let evaluated = evaluate(ctx, &mut code, test)?;

    let mut inductive = code.fork();
    inductive.reset_goal();
    let (entry, exit) = iteration_bounds(&mut inductive, &clauses, INDUCTIVE_CASE, TERMINATION);
    inductive.push(VerificationStatement::Change(changing.clone()));
    inductive.push(VerificationStatement::Assume(entry));
    inductive.push_all(evaluated.obligations.iter().cloned());
    inductive.push(VerificationStatement::Assume(evaluated.value.clone()));
    inductive.push_all(body.into_iter().map(VerificationStatement::Code));
    inductive.push(VerificationStatement::Confirm(exit));

    code.push(VerificationStatement::Confirm(label_at(
        invariant.clone(),
        BASE_CASE,
        clauses.location.as_ref(),
    )));
    code.push(VerificationStatement::Change(changing));
    code.push(VerificationStatement::Assume(invariant));
    code.push_all(evaluated.assumptions());
    code.push(VerificationStatement::Assume(Exp::not(evaluated.value)));

    Ok(vec![code, inductive])
}

/// `Iterate ... repeat` with `when c do S exit` items.
///
/// Control leaves only through an exit, so the goal that follows the loop
/// is confirmed at each exit and the path past an exit is cut off with
/// `Assume false`. The incoming branch only has to establish the invariant.
pub(super) fn iterate(
    ctx: RuleContext<'_>,
    mut code: AssertiveCode,
    clauses: LoopClauses,
    items: Vec<IterateItem>,
) -> RuleResult {
    let after = label_at(code.folded_goal(), ITERATE_EXIT, clauses.location.as_ref());
    code.reset_goal();

    let body: Vec<Statement> = items
        .into_iter()
        .map(|item| match item {
            IterateItem::Statement { statement } => statement,
            IterateItem::Exit {
                test,
                mut statements,
                location,
            } => {
                statements.push(Statement::confirm(after.clone()));
                statements.push(Statement::assume(Exp::bool(false)));
                Statement::If {
                    test,
                    then_branch: statements,
                    else_branch: Vec::new(),
                    location,
                }
            }
        })
        .collect();
    let changing = clauses.changing(ctx, &body);

    let mut inductive = code.fork();
    let (entry, exit) = iteration_bounds(&mut inductive, &clauses, ITERATE_INDUCTIVE_CASE, ITERATE_TERMINATION);
    inductive.push(VerificationStatement::Change(changing));
    inductive.push(VerificationStatement::Assume(entry));
    inductive.push_all(body.into_iter().map(VerificationStatement::Code));
    inductive.push(VerificationStatement::Confirm(exit));

    code.push(VerificationStatement::Confirm(label_at(
        clauses.invariant(),
        ITERATE_BASE_CASE,
        clauses.location.as_ref(),
    )));

    Ok(vec![code, inductive])
}

/// Variables a statement list may modify, in order of first appearance.
/// Calls of operations without a specification count every variable
/// argument as modified.
pub(crate) fn modified_variables(ctx: RuleContext<'_>, body: &[Statement]) -> Vec<Exp> {
    let mut out = Vec::new();
    collect_modified(ctx, body, &mut out);
    out
}

fn collect_modified(ctx: RuleContext<'_>, stmts: &[Statement], out: &mut Vec<Exp>) {
    for stmt in stmts {
        match stmt {
            Statement::Assign { target, .. } => note(out, target),
            Statement::Swap { left, right, .. } => {
                note(out, left);
                note(out, right);
            }
            Statement::Call { call } => {
                let operation = ctx.scope.find_operation(call.qualifier.as_deref(), &call.name);
                for (index, arg) in call.args.iter().enumerate() {
                    let ProgramExp::Math { exp } = arg else {
                        continue;
                    };
                    let changes = operation
                        .as_ref()
                        .and_then(|op| op.decl.params.get(index))
                        .map_or(true, |p| p.mode.may_change());
                    if changes && exp.is_assignable() {
                        note(out, exp);
                    }
                }
            }
            Statement::If {
                then_branch,
                else_branch,
                ..
            } => {
                collect_modified(ctx, then_branch, out);
                collect_modified(ctx, else_branch, out);
            }
            Statement::While { changing, body, .. } => match changing {
                Some(vars) => vars.iter().for_each(|v| note(out, v)),
                None => collect_modified(ctx, body, out),
            },
            Statement::Iterate { changing, items, .. } => match changing {
                Some(vars) => vars.iter().for_each(|v| note(out, v)),
                None => {
                    for item in items {
                        match item {
                            IterateItem::Statement { statement } => {
                                collect_modified(ctx, slice::from_ref(statement), out)
                            }
                            IterateItem::Exit { statements, .. } => collect_modified(ctx, statements, out),
                        }
                    }
                }
            },
            Statement::Confirm { .. } | Statement::Assume { .. } => {}
        }
    }
}

fn note(out: &mut Vec<Exp>, exp: &Exp) {
    if !out.contains(exp) {
        out.push(exp.clone());
    }
}
