//! Turns a finished branch into verification conditions.
//!
//! The branch's goal is split along conjunctions and implications into
//! leaves `hypotheses => goal`. Leaves with a literal `false` hypothesis are
//! discarded, and leaves sharing the same hypotheses become one condition
//! with several consequents.

use tracing::trace;

use assertive_term::{ops, Converter, Exp, ExpKind, Location, TermError, VerificationCondition};

use crate::assertive_code::AssertiveCode;

struct Leaf {
    hypotheses: Vec<Exp>,
    goal: Exp,
}

/// Numbering continues from `counter` so one obligation's branches get
/// distinct names.
pub fn collect(code: AssertiveCode, obligation: usize, counter: &mut usize) -> Result<Vec<VerificationCondition>, TermError> {
    let (name, assumptions, goal) = code.into_goal();
    let hypotheses: Vec<Exp> = assumptions.into_iter().flat_map(Exp::into_conjuncts).collect();

    let mut leaves = Vec::new();
    split(&hypotheses, goal, None, &mut leaves);

    let mut groups: Vec<(Vec<Exp>, Vec<Exp>)> = Vec::new();
    for leaf in leaves {
        if leaf.hypotheses.iter().any(Exp::is_false) {
            continue;
        }
        let hypotheses = without_duplicates(leaf.hypotheses);
        match groups.iter_mut().find(|(h, _)| *h == hypotheses) {
            Some((_, goals)) => {
                if !goals.contains(&leaf.goal) {
                    goals.push(leaf.goal);
                }
            }
            None => groups.push((hypotheses, vec![leaf.goal])),
        }
    }

    let mut vcs = Vec::with_capacity(groups.len());
    for (hypotheses, goals) in groups {
        *counter += 1;
        let description = goals
            .iter()
            .find_map(Exp::detail)
            .map(str::to_string)
            .unwrap_or_else(|| name.clone());
        let location = goals
            .iter()
            .filter_map(|g| g.location.as_ref())
            .find(|l| l.has_position())
            .cloned()
            .map(|l| Location { detail: Some(description.clone()), ..l });
        let mut converter = Converter::new(hypotheses.iter().chain(&goals));
        let antecedent = hypotheses
            .iter()
            .map(|h| converter.fact(h))
            .collect::<Result<Vec<_>, _>>()?;
        let consequent = goals
            .iter()
            .map(|g| converter.goal(g))
            .collect::<Result<Vec<_>, _>>()?;
        let vc = VerificationCondition::new(
            format!("{obligation}_{counter}"),
            description,
            location,
            antecedent,
            consequent,
        );
        trace!(vc = vc.name(), "collected verification condition");
        vcs.push(vc);
    }
    Ok(vcs)
}

fn split(hypotheses: &[Exp], goal: Exp, inherited: Option<&str>, out: &mut Vec<Leaf>) {
    if goal.is_true() {
        return;
    }
    let detail = goal.detail().or(inherited).map(str::to_string);
    let detail = detail.as_deref();
    let Exp { kind, ty, location } = goal;
    match kind {
        ExpKind::Apply { operator, args, .. } if operator == ops::AND && args.len() == 2 => {
            for part in args {
                split(hypotheses, part, detail, out);
            }
        }
        ExpKind::Apply { operator, args, .. } if operator == ops::IMPLIES && args.len() == 2 => {
            let mut args = args.into_iter();
            if let (Some(lhs), Some(rhs)) = (args.next(), args.next()) {
                let mut extended = hypotheses.to_vec();
                extended.extend(lhs.into_conjuncts());
                split(&extended, rhs, detail, out);
            }
        }
        kind => {
            let mut goal = Exp { kind, ty, location };
            if let Some(detail) = detail {
                goal = goal.labelled(detail);
            }
            out.push(Leaf {
                hypotheses: hypotheses.to_vec(),
                goal,
            });
        }
    }
}

fn without_duplicates(exps: Vec<Exp>) -> Vec<Exp> {
    let mut out: Vec<Exp> = Vec::with_capacity(exps.len());
    for e in exps {
        if !e.is_true() && !out.contains(&e) {
            out.push(e);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertive_term::MathType;

    fn b(name: &str) -> Exp {
        Exp::var(name, MathType::Boolean)
    }

    fn collect_goal(assumptions: Vec<Exp>, goal: Exp) -> Vec<VerificationCondition> {
        let mut code = AssertiveCode::new("Procedure P", "M");
        code.set_final_confirm(goal);
        for a in assumptions {
            code.assume(a);
        }
        let mut counter = 0;
        collect(code, 3, &mut counter).unwrap()
    }

    #[test]
    fn implications_become_antecedents() {
        let goal = Exp::implies(Exp::and(b("a"), b("b")), Exp::implies(b("c"), b("g")));
        let vcs = collect_goal(vec![b("h")], goal);
        assert_eq!(vcs.len(), 1);
        let names: Vec<String> = vcs[0].antecedent().iter().map(|p| p.to_string()).collect();
        assert_eq!(names, ["h", "a", "b", "c"]);
        assert_eq!(vcs[0].consequent()[0].to_string(), "g");
        assert_eq!(vcs[0].name(), "3_1");
        assert_eq!(vcs[0].description(), "Procedure P");
    }

    #[test]
    fn goals_with_equal_hypotheses_share_a_condition() {
        let goal = Exp::and(
            Exp::and(b("g1").labelled("Ensures Clause of P"), b("g2")),
            Exp::implies(b("x"), b("g3")),
        );
        let vcs = collect_goal(vec![], goal);
        assert_eq!(vcs.len(), 2);
        assert_eq!(vcs[0].consequent().len(), 2);
        assert_eq!(vcs[0].description(), "Ensures Clause of P");
        assert_eq!(vcs[1].name(), "3_2");
    }

    #[test]
    fn false_hypothesis_and_true_goal_are_dropped() {
        let goal = Exp::and(Exp::implies(Exp::bool(false), b("g")), Exp::bool(true));
        assert!(collect_goal(vec![], goal).is_empty());
        assert!(collect_goal(vec![Exp::bool(false)], b("g")).is_empty());
    }

    #[test]
    fn labels_flow_from_implication_to_conclusion() {
        let goal = Exp::implies(b("h"), b("g")).labelled("Requires Clause of Q");
        let vcs = collect_goal(vec![], goal);
        assert_eq!(vcs[0].description(), "Requires Clause of Q");
    }

    #[test]
    fn hypothesis_existential_is_a_constant_and_goal_existential_wants_a_witness() {
        let z = |name: &str| Exp::var(name, MathType::Integer);
        let w = || vec![assertive_term::BoundVar::new("w", MathType::Integer)];
        let hypothesis = Exp::exists(w(), Exp::equals(z("x"), z("w")));
        let goal = Exp::exists(w(), Exp::less_than(z("x"), z("w")));
        let vcs = collect_goal(vec![hypothesis], goal);
        let fact = &vcs[0].antecedent()[0];
        assert_eq!(fact.args()[1].quantification(), assertive_term::Quantification::None);
        let wanted = &vcs[0].consequent()[0];
        assert_eq!(wanted.args()[1].quantification(), assertive_term::Quantification::ThereExists);
    }

    #[test]
    fn untyped_goal_is_reported() {
        let mut code = AssertiveCode::new("P", "M");
        code.set_final_confirm(Exp::untyped(ExpKind::Var {
            name: "q".into(),
            qualifier: None,
        }));
        let mut counter = 0;
        assert!(collect(code, 1, &mut counter).is_err());
    }
}
