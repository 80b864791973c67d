#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Problems with the declaration tree itself, reported before any proof
/// rule runs.
#[derive(Debug, Error, Diagnostic)]
pub enum IrError {
    #[error("Malformed declaration tree at {line}:{column}: {message}")]
    #[diagnostic(
        code(assertive::ir::json),
        help("the input must be a serialized compilation unit with `target` and `modules`")
    )]
    Json {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Target module `{name}` is not part of the compilation unit")]
    #[diagnostic(code(assertive::ir::unknown_target))]
    UnknownTarget { name: String },

    #[error("Duplicate module `{name}`")]
    #[diagnostic(code(assertive::ir::duplicate_module))]
    DuplicateModule { name: String },
}
