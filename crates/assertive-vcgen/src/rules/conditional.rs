use assertive_ir::{ProgramExp, Statement};
use assertive_term::Exp;

use crate::assertive_code::{AssertiveCode, VerificationStatement};
use crate::rules::{evaluate, RuleContext, RuleResult};

/// `If c then S1 else S2`: fork into one branch assuming `c` before `S1`
/// and one assuming `not c` before `S2`. Both carry the goal built from the
/// statements that follow the conditional.
pub(super) fn if_then_else(
    ctx: RuleContext<'_>,
    mut code: AssertiveCode,
    test: &ProgramExp,
    then_branch: Vec<Statement>,
    else_branch: Vec<Statement>,
) -> RuleResult {
    let evaluated = evaluate(ctx, &mut code, test)?;
    let mut negated = code.fork();

    negated.push_all(evaluated.assumptions());
    negated.push(VerificationStatement::Assume(Exp::not(evaluated.value.clone())));
    negated.push_all(else_branch.into_iter().map(VerificationStatement::Code));

    code.push_all(evaluated.obligations);
    code.push(VerificationStatement::Assume(evaluated.value));
    code.push_all(then_branch.into_iter().map(VerificationStatement::Code));

    Ok(vec![code, negated])
}
