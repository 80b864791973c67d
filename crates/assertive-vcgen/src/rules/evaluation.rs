use assertive_ir::{ProgramCall, ProgramExp, ResolvedOperation};
use assertive_term::{Exp, MathType};

use crate::assertive_code::{AssertiveCode, VerificationStatement};
use crate::error::RuleError;
use crate::rules::{label_at, RuleContext};

/// A program expression reduced to a mathematical value, plus what has to
/// hold (and what becomes known) while computing it, in program order.
#[derive(Debug, Clone)]
pub(crate) struct Evaluated {
    pub value: Exp,
    pub obligations: Vec<VerificationStatement>,
}

impl Evaluated {
    /// The obligations without their confirms: what a second evaluation of
    /// the same expression contributes.
    pub fn assumptions(&self) -> impl Iterator<Item = VerificationStatement> + '_ {
        self.obligations
            .iter()
            .filter(|o| matches!(o, VerificationStatement::Assume(_)))
            .cloned()
    }
}

pub(crate) fn evaluate(ctx: RuleContext<'_>, code: &mut AssertiveCode, exp: &ProgramExp) -> Result<Evaluated, RuleError> {
    match exp {
        ProgramExp::Math { exp } => Ok(Evaluated {
            value: exp.clone(),
            obligations: Vec::new(),
        }),
        ProgramExp::Call { call, ty } => evaluate_call(ctx, code, call, ty),
    }
}

pub(crate) fn resolve_call<'a>(ctx: RuleContext<'a>, call: &ProgramCall) -> Result<ResolvedOperation<'a>, RuleError> {
    let operation = ctx
        .scope
        .find_operation(call.qualifier.as_deref(), &call.name)
        .ok_or_else(|| RuleError::missing(format!("operation `{}`", qualified_name(call)), call.location.as_ref()))?;
    if operation.decl.params.len() != call.args.len() {
        return Err(RuleError::ArityMismatch {
            operation: operation.display_name(),
            expected: operation.decl.params.len(),
            found: call.args.len(),
            location: call.location.clone(),
        });
    }
    Ok(operation)
}

fn qualified_name(call: &ProgramCall) -> String {
    match &call.qualifier {
        Some(q) => format!("{q}.{}", call.name),
        None => call.name.clone(),
    }
}

/// Function call inside an expression: confirm its requires clause on the
/// evaluated arguments and stand its result in by the value its ensures
/// clause defines, or by a fresh variable constrained by that clause.
fn evaluate_call(ctx: RuleContext<'_>, code: &mut AssertiveCode, call: &ProgramCall, ty: &MathType) -> Result<Evaluated, RuleError> {
    let operation = resolve_call(ctx, call)?;
    let mut obligations = Vec::new();
    let mut pairs = Vec::with_capacity(call.args.len() * 2);
    for (param, arg) in operation.decl.params.iter().zip(&call.args) {
        let evaluated = evaluate(ctx, code, arg)?;
        obligations.extend(evaluated.obligations);
        let formal = param.as_exp();
        pairs.push((Exp::old(formal.clone()), evaluated.value.clone()));
        pairs.push((formal, evaluated.value));
    }

    let requires = operation.requires().substitute_all(&pairs);
    if !requires.is_true() {
        let detail = format!("Requires Clause of {}", operation.display_name());
        obligations.push(VerificationStatement::Confirm(label_at(requires, &detail, call.location.as_ref())));
    }

    let ensures = operation.ensures().substitute_all(&pairs);
    let result = Exp::var(operation.decl.name.clone(), ty.clone());
    let (defined, rest) = split_defining_equation(ensures, &result);
    let value = match defined {
        Some(value) => value,
        None => code.fresh_variable(&operation.decl.name, ty.clone()),
    };
    let rest = rest.substitute(&result, &value);
    if !rest.is_true() {
        obligations.push(VerificationStatement::Assume(rest));
    }
    Ok(Evaluated { value, obligations })
}

/// Find a conjunct `result = e` (either orientation) with `e` free of
/// `result`, and return `e` with the remaining conjuncts.
pub(crate) fn split_defining_equation(ensures: Exp, result: &Exp) -> (Option<Exp>, Exp) {
    let mut defined = None;
    let mut rest = Vec::new();
    for conjunct in ensures.into_conjuncts() {
        if defined.is_none() {
            if let Some((lhs, rhs)) = conjunct.equality() {
                if lhs == result && !rhs.contains_exp(result) {
                    defined = Some(rhs.clone());
                    continue;
                }
                if rhs == result && !lhs.contains_exp(result) {
                    defined = Some(lhs.clone());
                    continue;
                }
            }
        }
        rest.push(conjunct);
    }
    (defined, Exp::conjunction(rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertive_term::ops;

    fn z(name: &str) -> Exp {
        Exp::var(name, MathType::Integer)
    }

    #[test]
    fn defining_equation_is_extracted_in_either_orientation() {
        let result = z("Max");
        let ensures = Exp::and(
            Exp::less_than(z("i"), z("Max")),
            Exp::equals(Exp::infix(ops::PLUS, z("i"), Exp::int(1), MathType::Integer), z("Max")),
        );
        let (defined, rest) = split_defining_equation(ensures, &result);
        assert_eq!(defined.unwrap().to_string(), "i + 1");
        assert_eq!(rest.to_string(), "i < Max");
    }

    #[test]
    fn self_referential_equation_is_not_a_definition() {
        let result = z("F");
        let ensures = Exp::equals(z("F"), Exp::infix(ops::PLUS, z("F"), Exp::int(0), MathType::Integer));
        let (defined, rest) = split_defining_equation(ensures, &result);
        assert!(defined.is_none());
        assert_eq!(rest.to_string(), "F = (F + 0)");
    }
}
