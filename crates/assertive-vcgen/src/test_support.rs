//! Fixtures shared by the rule unit tests.

use assertive_ir::{
    CompilationUnit, FacilityModule, ModuleDecl, OperationDecl, ParameterMode, ScopeLookup,
    SymbolTable,
};
use assertive_term::{ops, Exp, MathType};

use crate::assertive_code::AssertiveCode;
use crate::rules::{apply, RuleContext};

pub(crate) fn z(name: &str) -> Exp {
    Exp::var(name, MathType::Integer)
}

fn scope_with(operations: Vec<OperationDecl>) -> SymbolTable {
    let module = ModuleDecl::Facility(FacilityModule {
        name: "M".into(),
        facilities: vec![],
        operations,
        procedures: vec![],
    });
    SymbolTable::new(CompilationUnit::new("M", vec![module])).expect("fixture scope")
}

pub(crate) fn empty_scope() -> SymbolTable {
    scope_with(vec![])
}

/// Integer operations:
/// `Increment(updates x)` ensures `x = #x + 1`,
/// `Check(restores x)` requires `x > 0` ensures `x = #x`,
/// `Succ(evaluates i): Z` ensures `Succ = i + 1`,
/// `Pick(evaluates i): Z` requires `0 < i` ensures `i < Pick`.
pub(crate) fn counter_scope() -> SymbolTable {
    let int = MathType::Integer;
    let plus_one = |e: Exp| Exp::infix(ops::PLUS, e, Exp::int(1), MathType::Integer);
    scope_with(vec![
        OperationDecl::new("Increment")
            .with_param("x", ParameterMode::Updates, int.clone())
            .with_ensures(Exp::equals(z("x"), plus_one(Exp::old(z("x"))))),
        OperationDecl::new("Check")
            .with_param("x", ParameterMode::Restores, int.clone())
            .with_requires(Exp::infix(ops::GREATER, z("x"), Exp::int(0), MathType::Boolean))
            .with_ensures(Exp::equals(z("x"), Exp::old(z("x")))),
        OperationDecl::new("Succ")
            .with_param("i", ParameterMode::Evaluates, int.clone())
            .returning(int.clone())
            .with_ensures(Exp::equals(z("Succ"), plus_one(z("i")))),
        OperationDecl::new("Pick")
            .with_param("i", ParameterMode::Evaluates, int.clone())
            .returning(int)
            .with_requires(Exp::less_than(Exp::int(0), z("i")))
            .with_ensures(Exp::less_than(z("i"), z("Pick"))),
    ])
}

/// Apply rules until every branch has an empty pending stack. Branches are
/// returned in completion order.
pub(crate) fn run_to_end(scope: &dyn ScopeLookup, code: AssertiveCode) -> Vec<AssertiveCode> {
    let mut done = Vec::new();
    let mut work = vec![code];
    while let Some(mut branch) = work.pop() {
        match branch.pop() {
            Some(stmt) => {
                let mut next = apply(RuleContext::new(scope), branch, stmt).expect("rule application");
                next.reverse();
                work.extend(next);
            }
            None => done.push(branch),
        }
    }
    done
}
