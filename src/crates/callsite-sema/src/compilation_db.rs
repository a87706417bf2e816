// src/crates/callsite-sema/src/compilation_db.rs
//
// Unified database containing the type arena and the entity registry.
//
// Construction (registering types, building calls, resolving by name) needs
// `&mut CompilationDb` because generic instantiation interns new types and
// descriptors. Once calls are built the database is frozen behind an `Arc` and
// shared read-only with the runtime and every compiled callable.

use crate::entity_defs::{FieldDef, MethodDef, PropertyDef, TypeDef, TypeDefKind};
use crate::entity_registry::{EntityRegistry, FieldKind, MethodDefBuilder};
use crate::generic::TypeParamInfo;
use crate::type_arena::{TypeArena, TypeId};
use callsite_identity::{FieldId, MethodId, ParamId, PropertyId, TypeDefId};

/// Unified database containing all type/entity registries.
#[derive(Debug, Clone, Default)]
pub struct CompilationDb {
    /// Interned type representations (TypeId -> SemaType)
    pub types: TypeArena,
    /// Type/method/field/property definitions
    pub entities: EntityRegistry,
    next_param: u32,
}

impl CompilationDb {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Registration
    // ========================================================================

    pub fn define_type(&mut self, name: &str, kind: TypeDefKind, type_params: &[&str]) -> TypeDefId {
        self.entities
            .register_type(&mut self.types, name, kind, type_params)
    }

    /// The definition holding members declared on `object` (e.g. `GetType`).
    pub fn object_type_def(&mut self) -> TypeDefId {
        self.entities.register_object_type(&mut self.types)
    }

    pub fn define_field(&mut self, owner: TypeDefId, name: &str, ty: TypeId, kind: FieldKind) -> FieldId {
        self.entities.register_field(owner, name, ty, kind)
    }

    pub fn define_method(&mut self, builder: MethodDefBuilder) -> MethodId {
        builder.register(&mut self.entities, &mut self.types)
    }

    /// Define a read/write (or read-only / write-only) property.
    pub fn define_property(
        &mut self,
        owner: TypeDefId,
        name: &str,
        ty: TypeId,
        readable: bool,
        writable: bool,
    ) -> PropertyId {
        self.entities.register_property(
            &mut self.types,
            owner,
            name,
            ty,
            &[],
            readable,
            writable,
            false,
        )
    }

    pub fn define_static_property(
        &mut self,
        owner: TypeDefId,
        name: &str,
        ty: TypeId,
        readable: bool,
        writable: bool,
    ) -> PropertyId {
        self.entities.register_property(
            &mut self.types,
            owner,
            name,
            ty,
            &[],
            readable,
            writable,
            true,
        )
    }

    /// Define an indexer named `Item` taking `index_params`.
    pub fn define_indexer(&mut self, owner: TypeDefId, ty: TypeId, index_params: &[TypeId]) -> PropertyId {
        self.entities.register_property(
            &mut self.types,
            owner,
            "Item",
            ty,
            index_params,
            true,
            true,
            false,
        )
    }

    pub fn fresh_type_param(&mut self, name: &str) -> (TypeParamInfo, TypeId) {
        let info = self.entities.fresh_type_param(name);
        let ty = self.types.type_param(info.id);
        (info, ty)
    }

    /// The i-th type parameter of a generic definition, as a type.
    pub fn type_param_of(&mut self, def: TypeDefId, index: usize) -> TypeId {
        let id = self.entities.get_type(def).type_params[index].id;
        self.types.type_param(id)
    }

    pub fn closed_type(&mut self, def: TypeDefId, args: &[TypeId]) -> TypeId {
        self.entities.instantiate_type(&mut self.types, def, args)
    }

    pub fn array_type(&mut self, elem: TypeId, rank: u8) -> TypeId {
        self.types.array(elem, rank)
    }

    /// Allocate a fresh identity for a parameter expression.
    pub fn fresh_param_id(&mut self) -> ParamId {
        let id = ParamId::new(self.next_param);
        self.next_param += 1;
        id
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn type_def(&self, id: TypeDefId) -> &TypeDef {
        self.entities.get_type(id)
    }

    /// The definition's own type (`Wrapper<T>`, `Mutable`).
    pub fn self_type(&self, id: TypeDefId) -> TypeId {
        self.entities.get_type(id).self_type
    }

    pub fn method(&self, id: MethodId) -> &MethodDef {
        self.entities.method(id)
    }

    pub fn field(&self, id: FieldId) -> &FieldDef {
        self.entities.field(id)
    }

    pub fn property(&self, id: PropertyId) -> &PropertyDef {
        self.entities.property(id)
    }

    /// First declared method with exactly this name (no case folding).
    pub fn method_by_name(&self, def: TypeDefId, name: &str) -> Option<MethodId> {
        self.entities
            .get_type(def)
            .methods
            .iter()
            .copied()
            .find(|&m| self.entities.method(m).name == name)
    }

    pub fn field_by_name(&self, ty: TypeId, name: &str) -> Option<FieldId> {
        self.entities.field_by_name(&self.types, ty, name)
    }

    pub fn property_by_name(&self, ty: TypeId, name: &str) -> Option<PropertyId> {
        self.entities.property_by_name(&self.types, ty, name)
    }

    /// `ty` or the first of its bases that is an instance of `def`.
    pub fn ancestor_of_def(&self, ty: TypeId, def: TypeDefId) -> Option<TypeId> {
        let mut current = Some(ty);
        while let Some(candidate) = current {
            if self.entities.def_of(&self.types, candidate) == Some(def) {
                return Some(candidate);
            }
            current = self.entities.base_of(&self.types, candidate);
        }
        None
    }

    pub fn field_type_in(&mut self, field: FieldId, owner: TypeId) -> TypeId {
        self.entities.field_type_in(&mut self.types, field, owner)
    }

    /// A member method re-issued for a closed declaring type.
    pub fn method_in(&mut self, method: MethodId, owner: TypeId) -> MethodId {
        self.entities
            .instantiate_for_type(&mut self.types, method, owner)
    }

    /// The property's type as seen through a closed owner.
    pub fn property_type_in(&mut self, property: PropertyId, owner: TypeId) -> TypeId {
        let declared = self.entities.property(property).ty;
        let subs = self.entities.substitutions_for(&self.types, owner);
        self.types.substitute(declared, &subs)
    }

    /// Whether the method may be used in a call: no unbound method-level
    /// parameters and a declaring type without type parameters.
    pub fn is_closed(&self, method: MethodId) -> bool {
        let def = self.method(method);
        !def.is_generic_definition() && !self.types.contains_type_params(def.declaring_type)
    }
}
