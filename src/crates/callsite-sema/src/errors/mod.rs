// src/crates/callsite-sema/src/errors/mod.rs
//! Expression and call construction errors (E21xx).
//!
//! Every failure is raised synchronously while a call is being built; none is
//! deferred to invocation time. `ArgumentNull` and `ArgumentInvalid` always name
//! the logical slot that was at fault.

#![allow(unused_assignments)] // False positives from thiserror derive

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// The logical argument slot a construction failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Method,
    Instance,
    Type,
    MethodName,
    Arguments,
    TypeArguments,
    /// Operand of a member access or unbox
    Expression,
    Array,
    Indexes,
    /// Positional argument `argN`
    Arg(usize),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Method => f.write_str("method"),
            Slot::Instance => f.write_str("instance"),
            Slot::Type => f.write_str("type"),
            Slot::MethodName => f.write_str("methodName"),
            Slot::Arguments => f.write_str("arguments"),
            Slot::TypeArguments => f.write_str("typeArguments"),
            Slot::Expression => f.write_str("expression"),
            Slot::Array => f.write_str("array"),
            Slot::Indexes => f.write_str("indexes"),
            Slot::Arg(i) => write!(f, "arg{i}"),
        }
    }
}

/// Why a present value was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    #[error("method '{method}' contains unbound generic parameters")]
    OpenGenericMethod { method: String },

    #[error("static method '{method}' requires a null instance")]
    StaticWithInstance { method: String },

    #[error("instance method '{method}' requires a non-null instance")]
    InstanceWithoutReceiver { method: String },

    #[error("method '{method}' is not defined for an instance of type '{found}'")]
    ReceiverTypeMismatch { method: String, found: String },

    #[error("incorrect number of arguments for '{method}': expected {expected}, found {found}")]
    ArgumentCount {
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("incorrect number of indexes: expected {expected}, found {found}")]
    IndexCount { expected: usize, found: usize },

    #[error("expression is write-only and cannot be read")]
    NotReadable,

    #[error("expression of type '{found}' cannot be used for parameter of type '{expected}'")]
    TypeMismatch { expected: String, found: String },

    #[error("'{member}' is static and cannot be accessed through an instance")]
    StaticMemberWithOwner { member: String },

    #[error("'{member}' is an instance member and requires an owner expression")]
    MissingOwner { member: String },

    #[error("expression of type '{found}' cannot be used here; expected {expected}")]
    UnexpectedOperand { expected: &'static str, found: String },
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("value cannot be null (parameter '{slot}')")]
    #[diagnostic(code(E2101))]
    ArgumentNull { slot: Slot },

    #[error("{reason} (parameter '{slot}')")]
    #[diagnostic(code(E2102))]
    ArgumentInvalid { slot: Slot, reason: InvalidReason },

    #[error("no method '{name}' on type '{type_name}' is compatible with the supplied arguments")]
    #[diagnostic(
        code(E2103),
        help("check the method name, the static/instance form, the type-argument count and the argument types; ambiguous matches are reported the same way")
    )]
    MethodNotFound { name: String, type_name: String },

    #[error("'{name}' is not a member of type '{type_name}'")]
    #[diagnostic(code(E2105))]
    MemberNotFound { name: String, type_name: String },

    #[error(
        "type '{type_name}' violates the constraint '{constraint}' of type parameter '{param}' of method '{method}'"
    )]
    #[diagnostic(code(E2104))]
    ConstraintViolation {
        method: String,
        param: String,
        type_name: String,
        constraint: String,
    },
}

impl CallError {
    pub fn null(slot: Slot) -> Self {
        CallError::ArgumentNull { slot }
    }

    pub fn invalid(slot: Slot, reason: InvalidReason) -> Self {
        CallError::ArgumentInvalid { slot, reason }
    }

    /// The slot named by `ArgumentNull`/`ArgumentInvalid` failures.
    pub fn slot(&self) -> Option<Slot> {
        match self {
            CallError::ArgumentNull { slot } | CallError::ArgumentInvalid { slot, .. } => {
                Some(*slot)
            }
            CallError::MethodNotFound { .. }
            | CallError::MemberNotFound { .. }
            | CallError::ConstraintViolation { .. } => None,
        }
    }

    pub fn is_argument_null(&self) -> bool {
        matches!(self, CallError::ArgumentNull { .. })
    }

    pub fn is_argument_invalid(&self) -> bool {
        matches!(self, CallError::ArgumentInvalid { .. })
    }
}
