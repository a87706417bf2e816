// src/crates/callsite-codegen/src/errors.rs
//! Compilation errors.
//!
//! Error code ranges:
//! - E21xx: Call construction errors (callsite-sema)
//! - E3xxx: Compilation errors (this module)
//! - E5xxx: Invocation errors (callsite-runtime)

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("parameter '{name}' is not bound by the lambda")]
    #[diagnostic(
        code(E3001),
        help("add the parameter expression to the lambda's parameter list")
    )]
    UnboundParameter { name: String },

    #[error("lambda parameter {index} is not a parameter expression")]
    #[diagnostic(code(E3002))]
    NotAParameter { index: usize },

    #[error("no body registered for method '{method}'")]
    #[diagnostic(code(E3003), help("register a native body before compiling calls to it"))]
    MissingBody { method: String },

    #[error("property '{property}' has no getter")]
    #[diagnostic(code(E3004))]
    WriteOnly { property: String },
}

pub type CompileResult<T> = Result<T, CompileError>;
