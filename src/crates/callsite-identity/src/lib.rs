//! Shared identity types for the callsite crates.

mod entities;

pub use entities::{FieldId, MethodId, ParamId, PropertyId, TypeDefId, TypeParamId};
