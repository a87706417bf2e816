//! Central registry for all reflected entities.
//!
//! EntityRegistry is the explicit descriptor arena: it stores type definitions,
//! methods, fields and properties, and hands out typed ids into its vectors.
//!
//! This module is split into submodules by functionality:
//! - `types` - Type and type-parameter registration and lookup
//! - `methods` - Method registration, lookup, and generic instantiation
//! - `fields` - Field and property registration, lookup, and substitution helpers
//! - `method_builder` - Fluent builder for method descriptors

mod fields;
mod method_builder;
mod methods;
mod types;

pub use fields::FieldKind;
pub use method_builder::MethodDefBuilder;

use rustc_hash::FxHashMap;

use crate::entity_defs::{FieldDef, MethodDef, PropertyDef, TypeDef};
use crate::generic::TypeParamInfo;
use crate::type_arena::{TypeId, TypeIdVec};
use callsite_identity::{MethodId, TypeDefId, TypeParamId};

/// Central registry for all reflected entities
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    // Storage - IDs are indices into these vectors
    pub(crate) type_defs: Vec<TypeDef>,
    pub(crate) method_defs: Vec<MethodDef>,
    pub(crate) field_defs: Vec<FieldDef>,
    pub(crate) property_defs: Vec<PropertyDef>,

    pub(crate) type_by_name: FxHashMap<String, TypeDefId>,
    pub(crate) type_params: FxHashMap<TypeParamId, TypeParamInfo>,
    pub(crate) next_type_param: u32,
    /// Definition carrying the members of the built-in `object` type
    pub(crate) object_def: Option<TypeDefId>,

    /// (member of an open generic type, closed declaring type) -> re-issued member
    pub(crate) member_instances: FxHashMap<(MethodId, TypeId), MethodId>,
    /// (generic method definition, bound type arguments) -> closed method
    pub(crate) method_instances: FxHashMap<(MethodId, TypeIdVec), MethodId>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_count(&self) -> usize {
        self.type_defs.len()
    }

    pub fn method_count(&self) -> usize {
        self.method_defs.len()
    }
}
