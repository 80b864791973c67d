use assertive_ir::{FacilityDecl, Instantiation, ModuleArgument, ModuleParameter, OperationDecl};
use assertive_term::Exp;

use crate::assertive_code::{AssertiveCode, VerificationStatement};
use crate::error::RuleError;
use crate::rules::{label_at, RuleContext};

/// Obligations of a facility declaration: the concept's and realization's
/// requires clauses hold of the actual arguments, and every operation
/// passed for an operation parameter is at least as strong as the formal.
pub(crate) fn facility_obligation(ctx: RuleContext<'_>, facility: &FacilityDecl) -> Result<AssertiveCode, RuleError> {
    let location = facility.location.as_ref();
    let concept = ctx
        .scope
        .lookup_module(&facility.concept)
        .and_then(|m| m.as_concept())
        .ok_or_else(|| RuleError::missing(format!("concept `{}`", facility.concept), location))?;
    let instantiation = Instantiation::between(&concept.params, &facility.concept_args).map_err(|message| {
        RuleError::Instantiation {
            facility: facility.name.clone(),
            message,
            location: facility.location.clone(),
        }
    })?;

    let mut code = AssertiveCode::new(
        format!("Facility Instantiation of {}", facility.name),
        ctx.scope.target().name(),
    );
    let mut goals = Vec::new();
    if let Some(requires) = &concept.requires {
        goals.push(label_at(
            instantiation.apply(requires),
            &format!("Requires Clause of {} in Facility Instantiation of {}", concept.name, facility.name),
            location,
        ));
    }

    if let Some(realization_name) = &facility.realization {
        let realization = ctx
            .scope
            .lookup_module(realization_name)
            .and_then(|m| m.as_realization())
            .ok_or_else(|| RuleError::missing(format!("realization `{realization_name}`"), location))?;
        let mut combined = instantiation.clone();
        combined.extend(
            Instantiation::between(&realization.params, &facility.realization_args).map_err(|message| {
                RuleError::Instantiation {
                    facility: facility.name.clone(),
                    message,
                    location: facility.location.clone(),
                }
            })?,
        );
        if let Some(requires) = &realization.requires {
            goals.push(label_at(
                combined.apply(requires),
                &format!("Requires Clause of {realization_name} in Facility Instantiation of {}", facility.name),
                location,
            ));
        }
        for (param, arg) in realization.params.iter().zip(&facility.realization_args) {
            goals.extend(operation_parameter(ctx, &combined, param, arg, facility)?);
        }
    }

    for (param, arg) in concept.params.iter().zip(&facility.concept_args) {
        goals.extend(operation_parameter(ctx, &instantiation, param, arg, facility)?);
    }

    code.push(VerificationStatement::Confirm(Exp::conjunction(goals)));
    Ok(code)
}

/// For `formal` bound to `actual`: the formal's requires implies the
/// actual's, and the actual's ensures (under the formal's requires)
/// implies the formal's.
fn operation_parameter(
    ctx: RuleContext<'_>,
    instantiation: &Instantiation,
    param: &ModuleParameter,
    arg: &ModuleArgument,
    facility: &FacilityDecl,
) -> Result<Vec<Exp>, RuleError> {
    let (ModuleParameter::Operation { operation: formal }, ModuleArgument::Operation { name, qualifier }) = (param, arg)
    else {
        return Ok(Vec::new());
    };
    let location = facility.location.as_ref();
    let actual = ctx
        .scope
        .find_operation(qualifier.as_deref(), name)
        .ok_or_else(|| RuleError::missing(format!("operation `{name}`"), location))?;
    if actual.decl.params.len() != formal.params.len() {
        return Err(RuleError::ArityMismatch {
            operation: actual.display_name(),
            expected: formal.params.len(),
            found: actual.decl.params.len(),
            location: facility.location.clone(),
        });
    }

    let renaming = actual_to_formal(actual.decl, formal);
    let formal_requires = instantiation.apply(&formal.requires_or_true());
    let formal_ensures = instantiation.apply(&formal.ensures_or_true());
    let actual_requires = actual.requires().substitute_all(&renaming);
    let actual_ensures = actual.ensures().substitute_all(&renaming);

    let display = actual.display_name();
    Ok(vec![
        label_at(
            Exp::implies(formal_requires.clone(), actual_requires),
            &format!("Requires Clause of {display} for Operation Parameter {}", formal.name),
            location,
        ),
        label_at(
            Exp::implies(Exp::and(formal_requires, actual_ensures), formal_ensures),
            &format!("Ensures Clause of {} for Operation Parameter {display}", formal.name),
            location,
        ),
    ])
}

/// Rename the actual operation's parameters (and its result) to the
/// formal's so both specifications talk about the same variables.
fn actual_to_formal(actual: &OperationDecl, formal: &OperationDecl) -> Vec<(Exp, Exp)> {
    let mut pairs: Vec<(Exp, Exp)> = actual
        .params
        .iter()
        .zip(&formal.params)
        .flat_map(|(a, f)| [(Exp::old(a.as_exp()), Exp::old(f.as_exp())), (a.as_exp(), f.as_exp())])
        .collect();
    if let (Some(a), Some(f)) = (actual.result_exp(), formal.result_exp()) {
        pairs.push((a, f));
    }
    pairs
}
