//! Builder for method registration to reduce argument boilerplate.

use crate::entity_defs::{MethodDef, ParamDef, ParamMode};
use crate::generic::TypeParamInfo;
use crate::type_arena::{TypeArena, TypeId};
use callsite_identity::{MethodId, TypeDefId};

use super::EntityRegistry;

/// Builder for registering methods on types.
///
/// Provides a fluent API for method registration with sensible defaults:
/// - `is_static`: false
/// - `is_public`: true
/// - `is_extension`: false
/// - `type_params`: empty
///
/// # Example
/// ```ignore
/// let foo = MethodDefBuilder::new(mutable, "Foo", TypeId::I32)
///     .register(&mut registry, &mut arena);
/// let by_ref = MethodDefBuilder::new(methods, "ByRef", TypeId::VOID)
///     .is_static(true)
///     .ref_param("x", TypeId::I32)
///     .register(&mut registry, &mut arena);
/// ```
pub struct MethodDefBuilder {
    defining_type: TypeDefId,
    name: String,
    return_type: TypeId,
    params: Vec<(String, TypeId, ParamMode)>,
    type_params: Vec<TypeParamInfo>,
    is_static: bool,
    is_public: bool,
    is_extension: bool,
}

impl MethodDefBuilder {
    /// Create a new method builder with required fields.
    pub fn new(defining_type: TypeDefId, name: &str, return_type: TypeId) -> Self {
        Self {
            defining_type,
            name: name.to_string(),
            return_type,
            params: Vec::new(),
            type_params: Vec::new(),
            is_static: false,
            is_public: true,
            is_extension: false,
        }
    }

    /// Set whether this is a static method (called on type, not instance).
    pub fn is_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn is_public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    /// Mark as extension-shaped: static, first parameter renders as the receiver.
    pub fn extension(mut self) -> Self {
        self.is_extension = true;
        self.is_static = true;
        self
    }

    /// Append a by-value parameter.
    pub fn param(mut self, name: &str, ty: TypeId) -> Self {
        self.params.push((name.to_string(), ty, ParamMode::Value));
        self
    }

    /// Append a `ref` parameter of element type `ty`.
    pub fn ref_param(mut self, name: &str, ty: TypeId) -> Self {
        self.params.push((name.to_string(), ty, ParamMode::Ref));
        self
    }

    /// Append an `out` parameter of element type `ty`.
    pub fn out_param(mut self, name: &str, ty: TypeId) -> Self {
        self.params.push((name.to_string(), ty, ParamMode::Out));
        self
    }

    /// Add a method-level type parameter (allocate it with
    /// `EntityRegistry::fresh_type_param` first so signatures can mention it).
    pub fn type_param(mut self, info: TypeParamInfo) -> Self {
        self.type_params.push(info);
        self
    }

    /// Register the method on the EntityRegistry.
    pub fn register(self, registry: &mut EntityRegistry, arena: &mut TypeArena) -> MethodId {
        let id = MethodId::new(registry.method_defs.len() as u32);
        let declaring_type = registry.get_type(self.defining_type).self_type;
        let params = self
            .params
            .into_iter()
            .map(|(name, ty, mode)| ParamDef {
                name,
                ty: if mode.is_by_ref() { arena.by_ref(ty) } else { ty },
                mode,
            })
            .collect();
        for info in &self.type_params {
            registry.set_type_param_constraints(info);
        }

        registry.method_defs.push(MethodDef {
            id,
            name: self.name,
            defining_type: self.defining_type,
            declaring_type,
            is_static: self.is_static,
            is_public: self.is_public,
            is_extension: self.is_extension,
            params,
            type_params: self.type_params,
            return_type: self.return_type,
            generic_origin: None,
            body: id,
        });
        registry.get_type_mut(self.defining_type).methods.push(id);
        id
    }
}
