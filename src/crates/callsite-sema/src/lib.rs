//! Callsite semantic layer: type arena, entity registry, generics, and method resolution.

pub mod compilation_db;
pub mod entity_defs;
pub mod entity_registry;
pub mod errors;
pub mod generic;
pub mod reflection;
pub mod resolve;
pub mod type_arena;
pub mod types;

// Internal modules (extend CompilationDb)
pub(crate) mod compatibility;
pub(crate) mod type_display;

// Re-exports: public API surface
pub use compilation_db::CompilationDb;
pub use entity_defs::{
    FieldDef, GenericOrigin, MethodDef, ParamDef, ParamMode, PropertyDef, TypeDef, TypeDefKind,
};
pub use entity_registry::{EntityRegistry, FieldKind, MethodDefBuilder};
pub use errors::{CallError, InvalidReason, Slot};
pub use generic::{TypeConstraint, TypeParamInfo};
pub use reflection::Reflection;
pub use resolve::{CallForm, ResolveTarget, resolve_method};
pub use type_arena::{SemaType, TypeArena, TypeId, TypeIdVec};
pub use types::{ConstantValue, PrimitiveType};
