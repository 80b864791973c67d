#![allow(dead_code)]

use assertive_ir::{
    CompilationUnit, FacilityModule, ModuleDecl, OperationDecl, ParameterMode, ProcedureDecl,
    ProgramCall, ProgramExp, Statement, TheoremDecl, TheoryModule,
};
use assertive_term::{ops, BoundVar, Exp, MathType};

pub fn z(name: &str) -> Exp {
    Exp::var(name, MathType::Integer)
}

pub fn plus(lhs: Exp, rhs: Exp) -> Exp {
    Exp::infix(ops::PLUS, lhs, rhs, MathType::Integer)
}

pub fn le(lhs: Exp, rhs: Exp) -> Exp {
    Exp::infix(ops::LESS_EQ, lhs, rhs, MathType::Boolean)
}

pub fn gt(lhs: Exp, rhs: Exp) -> Exp {
    Exp::infix(ops::GREATER, lhs, rhs, MathType::Boolean)
}

pub fn call(name: &str, args: Vec<Exp>) -> Statement {
    Statement::call(ProgramCall::new(
        name,
        args.into_iter().map(ProgramExp::from).collect(),
    ))
}

pub fn main_module(operations: Vec<OperationDecl>, procedures: Vec<ProcedureDecl>) -> ModuleDecl {
    ModuleDecl::Facility(FacilityModule {
        name: "Main".into(),
        facilities: vec![],
        operations,
        procedures,
    })
}

/// `(n + m) + k = n + (m + k)` and a non-equational theorem.
pub fn arithmetic_theory() -> ModuleDecl {
    let ints = |names: &[&str]| {
        names
            .iter()
            .map(|n| BoundVar::new(*n, MathType::Integer))
            .collect::<Vec<_>>()
    };
    ModuleDecl::Theory(TheoryModule {
        name: "Integer_Theory".into(),
        theorems: vec![
            TheoremDecl {
                name: "Plus_Assoc".into(),
                assertion: Exp::for_all(
                    ints(&["n", "m", "k"]),
                    Exp::equals(
                        plus(plus(z("n"), z("m")), z("k")),
                        plus(z("n"), plus(z("m"), z("k"))),
                    ),
                ),
            },
            TheoremDecl {
                name: "Le_Refl".into(),
                assertion: Exp::for_all(ints(&["n"]), le(z("n"), z("n"))),
            },
        ],
    })
}

pub fn bump_op() -> OperationDecl {
    OperationDecl::new("Bump")
        .with_param("x", ParameterMode::Updates, MathType::Integer)
        .with_requires(Exp::less_than(z("x"), Exp::int(100)))
        .with_ensures(Exp::equals(z("x"), plus(Exp::old(z("x")), Exp::int(1))))
}

/// `Add_Two` implemented by two calls of `Bump`.
pub fn add_two_unit() -> CompilationUnit {
    let add_two = OperationDecl::new("Add_Two")
        .with_param("x", ParameterMode::Updates, MathType::Integer)
        .with_requires(Exp::less_than(z("x"), Exp::int(50)))
        .with_ensures(Exp::equals(z("x"), plus(Exp::old(z("x")), Exp::int(2))));
    let body = ProcedureDecl::new("Add_Two")
        .with_param("x", ParameterMode::Updates, MathType::Integer)
        .with_body(vec![call("Bump", vec![z("x")]), call("Bump", vec![z("x")])]);
    CompilationUnit::new(
        "Main",
        vec![arithmetic_theory(), main_module(vec![bump_op(), add_two], vec![body])],
    )
}
