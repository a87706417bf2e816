//! Callsite runtime: values, shared storage, static fields, and native method bodies.

pub mod errors;
pub mod native_registry;
pub mod runtime;
pub mod value;

pub use errors::RuntimeError;
pub use native_registry::{CallArgs, NativeBody, NativeRegistry};
pub use runtime::{Runtime, StaticKey};
pub use value::{ArrayRef, BoxRef, Dims, Instance, ObjectRef, StructValue, Value};
