use assertive_ir::{RepresentationDecl, ResolvedTypeFamily};
use assertive_term::{BoundVar, Exp, MathType};

use crate::assertive_code::{AssertiveCode, VerificationStatement};
use crate::error::RuleError;
use crate::rules::{label_at, split_defining_equation, RuleContext};

pub(super) fn convention(rep: &RepresentationDecl, target: &Exp) -> Exp {
    rep.convention_or_true().substitute(&rep.concrete_exemplar(), target)
}

/// The correspondence between concrete `target` and abstract `value`.
pub(super) fn correspondence(rep: &RepresentationDecl, target: &Exp, value: &Exp) -> Exp {
    let abstract_exemplar = Exp::var(
        RepresentationDecl::abstract_name(&rep.exemplar),
        value.ty.clone().unwrap_or(MathType::Entity),
    );
    rep.correspondence_or_true().substitute_all(&[
        (rep.concrete_exemplar(), target.clone()),
        (abstract_exemplar, value.clone()),
    ])
}

fn family_of<'a>(ctx: RuleContext<'a>, rep: &RepresentationDecl) -> Result<ResolvedTypeFamily<'a>, RuleError> {
    ctx.scope
        .find_type_family(&MathType::named(rep.type_name.clone()))
        .ok_or_else(|| RuleError::missing(format!("type family `{}`", rep.type_name), rep.location.as_ref()))
}

/// `facts` must hold of some abstract value the concrete exemplar
/// corresponds to. An explicit correspondence `Conc.S = e` is used as the
/// witness directly; otherwise the witness is existentially quantified.
fn abstraction_goal(rep: &RepresentationDecl, abstract_exemplar: &Exp, model: &MathType, facts: Exp) -> Exp {
    let (defined, rest) = split_defining_equation(rep.correspondence_or_true(), abstract_exemplar);
    let body = Exp::and(rest, facts);
    match defined {
        Some(witness) => body.substitute(abstract_exemplar, &witness),
        None if body.is_true() => body,
        None => Exp::exists(
            vec![BoundVar::new(RepresentationDecl::abstract_name(&rep.exemplar), model.clone())],
            body,
        ),
    }
}

/// Every concrete value satisfying the convention represents some abstract
/// value meeting the type's constraint.
pub(crate) fn correspondence_obligation(ctx: RuleContext<'_>, rep: &RepresentationDecl) -> Result<AssertiveCode, RuleError> {
    let family = family_of(ctx, rep)?;
    let model = family.decl.model.clone();
    let mut code = AssertiveCode::new(
        format!("Correspondence Rule for {}", rep.type_name),
        ctx.scope.target().name(),
    );
    code.add_free_var(&rep.exemplar, rep.representation.clone());

    let abstract_exemplar = Exp::var(RepresentationDecl::abstract_name(&rep.exemplar), model.clone());
    let constraint = family
        .constraint_for(&abstract_exemplar)
        .unwrap_or_else(|| Exp::bool(true));
    let goal = abstraction_goal(rep, &abstract_exemplar, &model, constraint);

    code.push(VerificationStatement::Assume(rep.convention_or_true()));
    code.push(VerificationStatement::Confirm(label_at(
        goal,
        &format!("Well Defined Correspondence for {}", rep.type_name),
        rep.location.as_ref(),
    )));
    Ok(code)
}

/// The representation's initialization code establishes the convention and
/// a concrete value whose abstraction is the type's initial value.
pub(crate) fn initialization_obligation(ctx: RuleContext<'_>, rep: &RepresentationDecl) -> Result<AssertiveCode, RuleError> {
    let family = family_of(ctx, rep)?;
    let model = family.decl.model.clone();
    let mut code = AssertiveCode::new(
        format!("Initialization Rule for {}", rep.type_name),
        ctx.scope.target().name(),
    );
    let concrete = rep.concrete_exemplar();
    code.add_free_var(&rep.exemplar, rep.representation.clone());

    if rep.fields.is_empty() {
        if let Some(init) = ctx
            .scope
            .find_type_family(&rep.representation)
            .and_then(|f| f.initialization_for(&concrete))
        {
            code.push(VerificationStatement::Assume(init));
        }
    }
    for field in &rep.fields {
        let access = Exp::dot(concrete.clone(), vec![field.name.clone()], field.ty.clone());
        if let Some(init) = ctx
            .scope
            .find_type_family(&field.ty)
            .and_then(|f| f.initialization_for(&access))
        {
            code.push(VerificationStatement::Assume(init));
        }
    }
    code.push_all(rep.initialization.iter().cloned().map(VerificationStatement::Code));

    let abstract_exemplar = Exp::var(RepresentationDecl::abstract_name(&rep.exemplar), model.clone());
    let facts = Exp::and(
        family
            .constraint_for(&abstract_exemplar)
            .unwrap_or_else(|| Exp::bool(true)),
        family
            .initialization_for(&abstract_exemplar)
            .unwrap_or_else(|| Exp::bool(true)),
    );
    let location = rep.location.as_ref();
    let goal = Exp::and(
        label_at(convention(rep, &concrete), &format!("Convention for {}", rep.type_name), location),
        label_at(
            abstraction_goal(rep, &abstract_exemplar, &model, facts),
            &format!("Initialization Rule for {}", rep.type_name),
            location,
        ),
    );
    code.push(VerificationStatement::Confirm(goal));
    Ok(code)
}
