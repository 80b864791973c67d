#![doc = include_str!("../README.md")]

//! Resolved declaration tree and the read-only services the verifier core
//! consumes: scope/type lookup and a diagnostics sink.

pub mod ast;
pub mod diagnostics;
pub mod errors;
pub mod instantiation;
pub mod scope;
pub mod stmt;
pub mod validation;

pub use ast::{
    CompilationUnit, ConceptModule, FacilityDecl, FacilityModule, ModuleArgument, ModuleDecl,
    ModuleParameter, OperationDecl, ParameterDecl, ParameterMode, ProcedureDecl,
    RealizationModule, RepresentationDecl, TheoremDecl, TheoryModule, TypeFamilyDecl,
    VariableDecl,
};
pub use diagnostics::{Diagnostic, DiagnosticBuffer, DiagnosticSink, Severity};
pub use errors::IrError;
pub use instantiation::Instantiation;
pub use scope::{ResolvedOperation, ResolvedTypeFamily, ScopeLookup, SymbolTable};
pub use stmt::{IterateItem, ProgramCall, ProgramExp, Statement};
