// src/crates/callsite-runtime/src/errors.rs
//! Invocation failures (E50xx).

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("object reference not set to an instance of an object ({context})")]
    #[diagnostic(code(E5001))]
    NullReference { context: String },

    #[error("index was outside the bounds of the array")]
    #[diagnostic(code(E5002))]
    IndexOutOfRange,

    #[error("specified cast is not valid: expected {expected}, found {found}")]
    #[diagnostic(code(E5003))]
    InvalidCast { expected: String, found: String },

    #[error("no body registered for method '{method}'")]
    #[diagnostic(code(E5004), help("register a native body for the method definition"))]
    MissingBody { method: String },

    #[error("incorrect number of arguments: expected {expected}, found {found}")]
    #[diagnostic(code(E5005))]
    ArgumentCount { expected: usize, found: usize },

    /// Raised by a method body; passes through call boundaries unchanged.
    #[error("{method} failed: {message}")]
    #[diagnostic(code(E5006))]
    MethodFailed { method: String, message: String },
}

impl RuntimeError {
    pub fn null_reference(context: impl Into<String>) -> Self {
        RuntimeError::NullReference {
            context: context.into(),
        }
    }

    pub fn invalid_cast(expected: impl Into<String>, found: impl Into<String>) -> Self {
        RuntimeError::InvalidCast {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn failed(method: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeError::MethodFailed {
            method: method.into(),
            message: message.into(),
        }
    }
}
