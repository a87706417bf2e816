// src/lib.rs
//! callsite: build method-call expressions against a typed entity model,
//! resolve calls by name, and execute them with addressable write-back.

pub mod cli;
pub mod commands;
pub mod errors;
pub mod fixtures;
pub mod scenarios;

pub use callsite_codegen::{Callable, CompileError, ExecutionStrategy, compile};
pub use callsite_expr::{
    AddressableLocation, CallNode, CallTarget, Expr, ExprFactory, ExprKind, Lambda, classify,
    display,
};
pub use callsite_identity::{FieldId, MethodId, ParamId, PropertyId, TypeDefId};
pub use callsite_runtime::{NativeRegistry, Runtime, RuntimeError, Value};
pub use callsite_sema::{
    CallError, CompilationDb, FieldKind, MethodDefBuilder, ParamMode, ResolveTarget, Slot,
    TypeDefKind, TypeId, resolve_method,
};
