//! Initial assertive code for each kind of proof obligation a module
//! gives rise to.

mod facility;
mod representation;

pub(crate) use facility::facility_obligation;
pub(crate) use representation::{correspondence_obligation, initialization_obligation};

use std::iter::once;

use tracing::debug;

use assertive_ir::{
    ConceptModule, ModuleDecl, ParameterMode, ProcedureDecl, RepresentationDecl, ResolvedTypeFamily,
    ScopeLookup,
};
use assertive_term::{Exp, Location, MathType};

use crate::assertive_code::{AssertiveCode, RecursionContext, VerificationStatement};
use crate::error::RuleError;
use crate::rules::{label_at, RuleContext};

pub(crate) fn home_concept(scope: &dyn ScopeLookup) -> Option<&ConceptModule> {
    match scope.target() {
        ModuleDecl::Concept(concept) => Some(concept),
        ModuleDecl::Realization(r) => scope.lookup_module(&r.concept)?.as_concept(),
        ModuleDecl::Facility(_) | ModuleDecl::Theory(_) => None,
    }
}

/// Module-level facts every procedure of the target may assume.
fn module_assumptions(scope: &dyn ScopeLookup) -> Vec<Exp> {
    let mut facts = Vec::new();
    if let Some(concept) = home_concept(scope) {
        facts.extend(concept.requires.iter().cloned());
        facts.extend(concept.constraints.iter().cloned());
    }
    if let Some(realization) = scope.target().as_realization() {
        facts.extend(realization.requires.iter().cloned());
    }
    facts
}

fn mode_label(mode: ParameterMode, name: &str) -> String {
    let mode = mode.to_string();
    let mut chars = mode.chars();
    let title: String = chars
        .next()
        .map(|c| c.to_uppercase().chain(chars).collect())
        .unwrap_or_default();
    format!("{title} Parameter Rule for {name}")
}

/// The obligation that a procedure body meets its operation's
/// specification.
///
/// Program order of the initial code: module facts, requires, facts about
/// parameters, `Remember`, local declarations, the body, and finally the
/// confirm of ensures together with the parameter-mode obligations.
///
/// Parameters of a locally represented type are checked through their
/// abstract value `Conc.p`: the convention and correspondence are assumed
/// on entry, and on exit the convention is confirmed and the ensures clause
/// must hold for any abstract value `?Conc.p` corresponding to the result.
pub(crate) fn procedure_obligation(ctx: RuleContext<'_>, procedure: &ProcedureDecl) -> Result<AssertiveCode, RuleError> {
    let scope = ctx.scope;
    let spec = scope
        .find_operation(None, &procedure.name)
        .filter(|op| op.facility.is_none())
        .ok_or_else(|| RuleError::missing(format!("procedure `{}`", procedure.name), procedure.location.as_ref()))?;
    if spec.decl.params.len() != procedure.params.len() {
        return Err(RuleError::ArityMismatch {
            operation: procedure.name.clone(),
            expected: spec.decl.params.len(),
            found: procedure.params.len(),
            location: procedure.location.clone(),
        });
    }

    let mut code = AssertiveCode::new(format!("Procedure {}", procedure.name), scope.target().name());
    let location = procedure.location.as_ref();

    let renamed: Vec<(Exp, Exp)> = spec
        .decl
        .params
        .iter()
        .zip(&procedure.params)
        .filter(|(formal, actual)| formal.name != actual.name)
        .flat_map(|(formal, actual)| {
            [
                (Exp::old(formal.as_exp()), Exp::old(actual.as_exp())),
                (formal.as_exp(), actual.as_exp()),
            ]
        })
        .collect();
    let requires = spec.requires().substitute_all(&renamed);
    let ensures = spec.ensures().substitute_all(&renamed);

    for name in requires.free_variable_names().into_iter().chain(ensures.free_variable_names()) {
        if let Some(ty) = scope.resolve(None, &name) {
            code.add_free_var(&name, ty);
        }
    }
    for param in &procedure.params {
        code.add_free_var(&param.name, param.ty.clone());
    }
    if let Some(ty) = &procedure.return_ty {
        code.add_free_var(&procedure.name, ty.clone());
    }

    let mut entry = module_assumptions(scope);
    let mut pre_abstract = Vec::new();
    let mut post_abstract = Vec::new();
    let mut identities = Vec::new();
    let mut exit_conventions = Vec::new();
    let mut exit_correspondences = Vec::new();

    for param in &procedure.params {
        let var = param.as_exp();
        let family = scope.find_type_family(&param.ty);
        match scope.find_representation(&param.ty) {
            Some(rep) => {
                let family = family.ok_or_else(|| {
                    RuleError::missing(format!("type family of `{}`", param.ty), param.location.as_ref())
                })?;
                let abstract_name = RepresentationDecl::abstract_name(&param.name);
                let incoming = Exp::var(abstract_name.clone(), family.decl.model.clone());
                let outgoing = code.fresh_variable(&abstract_name, family.decl.model.clone());
                code.add_free_var(&abstract_name, family.decl.model.clone());

                entry.push(representation::convention(rep, &var));
                entry.push(representation::correspondence(rep, &var, &incoming));
                entry.extend(family.constraint_for(&incoming));

                pre_abstract.push((Exp::old(var.clone()), incoming.clone()));
                pre_abstract.push((var.clone(), incoming.clone()));
                post_abstract.push((Exp::old(var.clone()), incoming.clone()));
                post_abstract.push((var.clone(), outgoing.clone()));

                exit_conventions.push(label_at(
                    representation::convention(rep, &var),
                    &format!("Convention for {}", rep.type_name),
                    location,
                ));
                exit_correspondences.push(representation::correspondence(rep, &var, &outgoing));
                identities.extend(mode_obligation(param.mode, &outgoing, &incoming, Some(&family), &param.name, location));
            }
            None => {
                if let Some(family) = &family {
                    entry.extend(family.constraint_for(&var));
                }
                let incoming = Exp::old(var.clone());
                identities.extend(mode_obligation(param.mode, &var, &incoming, family.as_ref(), &param.name, location));
            }
        }
    }

    entry.push(requires.substitute_all(&pre_abstract));

    if procedure.recursive {
        match &procedure.decreasing {
            Some(metric) => {
                let ty = metric.ty.clone().unwrap_or(MathType::Natural);
                let ghost = code.fresh_variable("P_Val", ty);
                entry.push(Exp::equals(ghost.clone(), metric.clone()));
                code.set_recursion(RecursionContext {
                    operation: procedure.name.clone(),
                    metric: metric.clone(),
                    ghost,
                });
            }
            None => debug!(procedure = %procedure.name, "recursive procedure without decreasing clause"),
        }
    }

    let ensures = label_at(
        ensures.substitute_all(&post_abstract),
        &format!("Ensures Clause of {}", procedure.name),
        location,
    );
    let post = Exp::conjunction(once(ensures).chain(identities));
    let post = if exit_correspondences.is_empty() {
        post
    } else {
        Exp::implies(Exp::conjunction(exit_correspondences), post)
    };
    let goal = Exp::conjunction(exit_conventions.into_iter().chain(once(post)));

    code.push_all(entry.into_iter().map(VerificationStatement::Assume));
    code.push(VerificationStatement::Remember);
    code.push_all(procedure.variables.iter().cloned().map(VerificationStatement::VariableDecl));
    code.push_all(procedure.body.iter().cloned().map(VerificationStatement::Code));
    code.push(VerificationStatement::Confirm(goal));
    Ok(code)
}

/// What a parameter mode demands of the value handed back: `restores` and
/// `preserves` give back the incoming value, `clears` the initial one.
fn mode_obligation(
    mode: ParameterMode,
    outgoing: &Exp,
    incoming: &Exp,
    family: Option<&ResolvedTypeFamily<'_>>,
    name: &str,
    location: Option<&Location>,
) -> Option<Exp> {
    let obligation = match mode {
        ParameterMode::Restores | ParameterMode::Preserves => Exp::equals(outgoing.clone(), incoming.clone()),
        ParameterMode::Clears => family?.initialization_for(outgoing)?,
        _ => return None,
    };
    Some(label_at(obligation, &mode_label(mode, name), location))
}
