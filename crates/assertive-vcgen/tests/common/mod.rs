#![allow(dead_code)]

use assertive_ir::{
    CompilationUnit, ConceptModule, FacilityDecl, FacilityModule, ModuleArgument, ModuleDecl,
    ModuleParameter, OperationDecl, ParameterMode, ProcedureDecl, RealizationModule,
    RepresentationDecl, Statement, SymbolTable, TypeFamilyDecl, VariableDecl,
};
use assertive_term::{ops, Exp, Location, MathType};

pub fn z(name: &str) -> Exp {
    Exp::var(name, MathType::Integer)
}

pub fn plus(lhs: Exp, rhs: Exp) -> Exp {
    Exp::infix(ops::PLUS, lhs, rhs, MathType::Integer)
}

pub fn minus(lhs: Exp, rhs: Exp) -> Exp {
    Exp::infix(ops::MINUS, lhs, rhs, MathType::Integer)
}

pub fn le(lhs: Exp, rhs: Exp) -> Exp {
    Exp::infix(ops::LESS_EQ, lhs, rhs, MathType::Boolean)
}

pub fn gt(lhs: Exp, rhs: Exp) -> Exp {
    Exp::infix(ops::GREATER, lhs, rhs, MathType::Boolean)
}

pub fn at(line: u32) -> Location {
    Location::new("Main.fa", line, 5)
}

pub fn counter_ty() -> MathType {
    MathType::named("Counter")
}

pub fn field(base: &str, ty: MathType, name: &str) -> Exp {
    Exp::dot(Exp::var(base, ty), vec![name.into()], MathType::Integer)
}

/// `Counter_Template(max)`: a bounded counter modelled by an integer.
pub fn counter_concept() -> ModuleDecl {
    let c = Exp::var("c", counter_ty());
    ModuleDecl::Concept(ConceptModule {
        name: "Counter_Template".into(),
        params: vec![ModuleParameter::Constant {
            name: "max".into(),
            ty: MathType::Integer,
        }],
        requires: Some(Exp::less_than(Exp::int(0), z("max"))),
        constraints: vec![],
        type_families: vec![TypeFamilyDecl {
            name: "Counter".into(),
            model: MathType::Integer,
            exemplar: "c".into(),
            constraint: Some(le(Exp::int(0), z("c"))),
            initialization: Some(Exp::equals(z("c"), Exp::int(0))),
            location: None,
        }],
        operations: vec![
            OperationDecl::new("Increment")
                .with_param("c", ParameterMode::Updates, counter_ty())
                .with_requires(Exp::less_than(c.clone(), z("max")))
                .with_ensures(Exp::equals(c.clone(), plus(Exp::old(c.clone()), Exp::int(1)))),
            OperationDecl::new("Reset").with_param("c", ParameterMode::Clears, counter_ty()),
            OperationDecl::new("Value")
                .with_param("c", ParameterMode::Restores, counter_ty())
                .returning(MathType::Integer)
                .with_ensures(Exp::equals(z("Value"), c)),
        ],
    })
}

/// Record representation `C.Count` with `Conc.C = C.Count`.
pub fn counter_realization() -> ModuleDecl {
    let rec = MathType::named("Counter_Rec");
    let count = field("C", rec.clone(), "Count");
    let c_count = field("c", counter_ty(), "Count");
    ModuleDecl::Realization(RealizationModule {
        name: "Counter_Realiz".into(),
        concept: "Counter_Template".into(),
        params: vec![],
        requires: None,
        representations: vec![RepresentationDecl {
            type_name: "Counter".into(),
            exemplar: "C".into(),
            representation: rec,
            fields: vec![VariableDecl::new("Count", MathType::Integer)],
            convention: Some(le(Exp::int(0), count.clone())),
            correspondence: Some(Exp::equals(Exp::var("Conc.C", MathType::Integer), count.clone())),
            initialization: vec![Statement::assign(count, Exp::int(0))],
            location: Some(at(3)),
        }],
        facilities: vec![],
        operations: vec![],
        procedures: vec![ProcedureDecl::new("Increment")
            .with_param("c", ParameterMode::Updates, counter_ty())
            .with_body(vec![Statement::assign(c_count.clone(), plus(c_count, Exp::int(1)))])],
    })
}

pub fn counter_facility() -> FacilityDecl {
    FacilityDecl {
        name: "CF".into(),
        concept: "Counter_Template".into(),
        concept_args: vec![ModuleArgument::Constant { value: Exp::int(10) }],
        realization: Some("Counter_Realiz".into()),
        realization_args: vec![],
        location: Some(at(2)),
    }
}

/// A facility module named `Main` with the given local specifications and
/// procedures.
pub fn main_module(operations: Vec<OperationDecl>, procedures: Vec<ProcedureDecl>) -> ModuleDecl {
    ModuleDecl::Facility(FacilityModule {
        name: "Main".into(),
        facilities: vec![],
        operations,
        procedures,
    })
}

/// Like [`main_module`], also declaring the counter facility `CF`.
pub fn client_module(operations: Vec<OperationDecl>, procedures: Vec<ProcedureDecl>) -> ModuleDecl {
    ModuleDecl::Facility(FacilityModule {
        name: "Main".into(),
        facilities: vec![counter_facility()],
        operations,
        procedures,
    })
}

pub fn table(target: &str, modules: Vec<ModuleDecl>) -> SymbolTable {
    SymbolTable::new(CompilationUnit::new(target, modules)).expect("fixture unit")
}

pub fn with_counter(target: &str, module: ModuleDecl) -> SymbolTable {
    table(target, vec![counter_concept(), counter_realization(), module])
}
