use tracing::debug;

use assertive_ir::{ParameterMode, ProgramCall, ProgramExp};
use assertive_term::Exp;

use crate::assertive_code::{AssertiveCode, VerificationStatement};
use crate::error::RuleError;
use crate::rules::evaluation::resolve_call;
use crate::rules::{evaluate, label_at, RuleContext, RuleResult};

/// Operation call statement.
///
/// Arguments in a changing mode get fresh post-call names in the goal. The
/// callee's requires clause is confirmed over the pre-call values and its
/// ensures clause, with `#formal` bound to the pre-call value and `formal`
/// to the post-call one, is assumed.
pub(super) fn call(ctx: RuleContext<'_>, mut code: AssertiveCode, call: &ProgramCall) -> RuleResult {
    let operation = resolve_call(ctx, call)?;
    let mut obligations = Vec::new();
    let mut pre = Vec::with_capacity(call.args.len() * 2);
    let mut post = Vec::with_capacity(call.args.len() * 2);
    let mut havoc = Vec::new();
    let mut extra_ensures = Vec::new();

    for (index, (param, arg)) in operation.decl.params.iter().zip(&call.args).enumerate() {
        let formal = param.as_exp();
        if param.mode.requires_variable() {
            let actual = match arg {
                ProgramExp::Math { exp } if exp.is_assignable() => exp.clone(),
                other => {
                    return Err(RuleError::NotAVariable {
                        operation: operation.display_name(),
                        argument: other.to_string(),
                        mode: param.mode.to_string(),
                        location: call.location.clone(),
                    })
                }
            };
            pre.push((Exp::old(formal.clone()), actual.clone()));
            pre.push((formal.clone(), actual.clone()));
            post.push((Exp::old(formal.clone()), actual.clone()));
            if param.mode.may_change() {
                let fresh = code.fresh_version(&actual)?;
                if param.mode == ParameterMode::Clears {
                    let cleared = operation
                        .param_type(index)
                        .and_then(|ty| ctx.scope.find_type_family(&ty))
                        .and_then(|family| family.initialization_for(&fresh));
                    extra_ensures.extend(cleared);
                }
                post.push((formal, fresh.clone()));
                havoc.push((actual, fresh));
            } else {
                post.push((formal, actual));
            }
        } else {
            let evaluated = evaluate(ctx, &mut code, arg)?;
            obligations.extend(evaluated.obligations);
            pre.push((Exp::old(formal.clone()), evaluated.value.clone()));
            pre.push((formal.clone(), evaluated.value.clone()));
            post.push((Exp::old(formal.clone()), evaluated.value.clone()));
            post.push((formal, evaluated.value));
        }
    }

    code.substitute_all(&havoc);

    let name = operation.display_name();
    let mut requires = label_at(
        operation.requires().substitute_all(&pre),
        &format!("Requires Clause of {name}"),
        call.location.as_ref(),
    );
    if let Some(recursion) = code.recursion() {
        if recursion.operation == operation.decl.name && operation.facility.is_none() {
            debug!(operation = %name, "recursive call, confirming metric decrease");
            // One ghost per procedure, bound to the metric at entry. The body
            // never renames it, so every call site compares against the entry
            // value.
            let decrease = Exp::less_than(recursion.metric.substitute_all(&pre), recursion.ghost.clone());
            requires = Exp::and(
                requires,
                label_at(
                    decrease,
                    &format!("Termination of Recursive Call to {name}"),
                    call.location.as_ref(),
                ),
            );
        }
    }
    obligations.push(VerificationStatement::Confirm(requires));

    let ensures = Exp::conjunction(std::iter::once(operation.ensures().substitute_all(&post)).chain(extra_ensures));
    obligations.push(VerificationStatement::Assume(ensures));
    code.push_all(obligations);
    Ok(vec![code])
}
