use assertive_ir::ProgramExp;
use assertive_term::{Exp, TermError};

use crate::assertive_code::AssertiveCode;
use crate::rules::{evaluate, RuleContext, RuleResult};

/// `x := e`: the goal after the statement holds of `e` before it.
pub(super) fn assign(ctx: RuleContext<'_>, mut code: AssertiveCode, target: &Exp, value: &ProgramExp) -> RuleResult {
    let evaluated = evaluate(ctx, &mut code, value)?;
    code.substitute(target, &evaluated.value);
    code.push_all(evaluated.obligations);
    Ok(vec![code])
}

/// `x :=: y` exchanges through a temporary name.
pub(super) fn swap(mut code: AssertiveCode, left: &Exp, right: &Exp) -> RuleResult {
    let ty = left.ty.clone().ok_or_else(|| TermError::unresolved(left))?;
    let pivot = Exp::var(code.fresh_name(&left.to_string()), ty);
    code.substitute(left, &pivot);
    code.substitute(right, left);
    code.substitute(&pivot, right);
    Ok(vec![code])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{empty_scope, z};
    use assertive_term::{ops, MathType};

    #[test]
    fn assignment_substitutes_value_for_target() {
        let scope = empty_scope();
        let mut code = AssertiveCode::new("P", "M");
        code.confirm(Exp::less_than(z("x"), z("y")));
        let value = Exp::infix(ops::PLUS, z("x"), Exp::int(1), MathType::Integer);
        let out = assign(RuleContext::new(&scope), code, &z("x"), &value.into()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].final_confirm().to_string(), "(x + 1) < y");
    }

    #[test]
    fn swap_exchanges_both_sides() {
        let mut code = AssertiveCode::new("P", "M");
        code.confirm(Exp::less_than(z("x"), z("y")));
        let out = swap(code, &z("x"), &z("y")).unwrap();
        assert_eq!(out[0].final_confirm().to_string(), "y < x");
    }
}
