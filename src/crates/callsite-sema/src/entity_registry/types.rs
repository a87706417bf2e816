//! Type registration and lookup for EntityRegistry.

use rustc_hash::FxHashMap;

use crate::entity_defs::{TypeDef, TypeDefKind};
use crate::generic::{TypeParamInfo, TypeSubstitutions};
use crate::type_arena::{NominalKind, TypeArena, TypeId, TypeIdVec};
use callsite_identity::{TypeDefId, TypeParamId};

use super::EntityRegistry;

impl EntityRegistry {
    /// Register a new type definition with the given generic parameter names.
    pub fn register_type(
        &mut self,
        arena: &mut TypeArena,
        name: &str,
        kind: TypeDefKind,
        type_param_names: &[&str],
    ) -> TypeDefId {
        let id = TypeDefId::new(self.type_defs.len() as u32);
        let type_params: Vec<TypeParamInfo> = type_param_names
            .iter()
            .map(|name| self.fresh_type_param(name))
            .collect();
        let args: TypeIdVec = type_params
            .iter()
            .map(|tp| arena.type_param(tp.id))
            .collect();
        let nominal_kind = match kind {
            TypeDefKind::Class => NominalKind::Class,
            TypeDefKind::Struct => NominalKind::Struct,
        };
        let self_type = arena.nominal(id, args, nominal_kind);

        self.type_defs.push(TypeDef {
            id,
            name: name.to_string(),
            kind,
            type_params,
            self_type,
            base: None,
            is_public: true,
            has_default_ctor: true,
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            instance_field_count: 0,
        });
        self.type_by_name.insert(name.to_string(), id);
        tracing::trace!(name, ?id, ?self_type, "registered type");
        id
    }

    /// Register the definition that holds members of the built-in `object`
    /// type. Its self type is `TypeId::OBJECT`.
    pub fn register_object_type(&mut self, arena: &mut TypeArena) -> TypeDefId {
        if let Some(id) = self.object_def {
            return id;
        }
        let id = self.register_type(arena, "object", TypeDefKind::Class, &[]);
        self.get_type_mut(id).self_type = TypeId::OBJECT;
        self.object_def = Some(id);
        id
    }

    /// The definition whose members are visible on `ty`, if any.
    pub fn def_of(&self, arena: &TypeArena, ty: TypeId) -> Option<TypeDefId> {
        match arena.unwrap_nominal(ty) {
            Some((def_id, _, _)) => Some(def_id),
            None if ty == TypeId::OBJECT => self.object_def,
            None => None,
        }
    }

    /// Allocate a type parameter (type-level or method-level).
    pub fn fresh_type_param(&mut self, name: &str) -> TypeParamInfo {
        let id = TypeParamId::new(self.next_type_param);
        self.next_type_param += 1;
        let info = TypeParamInfo::new(id, name);
        self.type_params.insert(id, info.clone());
        info
    }

    /// Record constraints declared on a type parameter after allocation.
    pub fn set_type_param_constraints(&mut self, info: &TypeParamInfo) {
        self.type_params.insert(info.id, info.clone());
    }

    pub fn type_param(&self, id: TypeParamId) -> Option<&TypeParamInfo> {
        self.type_params.get(&id)
    }

    /// Get a type definition by ID
    pub fn get_type(&self, id: TypeDefId) -> &TypeDef {
        &self.type_defs[id.index() as usize]
    }

    pub(crate) fn get_type_mut(&mut self, id: TypeDefId) -> &mut TypeDef {
        &mut self.type_defs[id.index() as usize]
    }

    pub fn type_by_name(&self, name: &str) -> Option<TypeDefId> {
        self.type_by_name.get(name).copied()
    }

    pub fn set_base(&mut self, id: TypeDefId, base: TypeId) {
        self.get_type_mut(id).base = Some(base);
    }

    pub fn set_public(&mut self, id: TypeDefId, is_public: bool) {
        self.get_type_mut(id).is_public = is_public;
    }

    pub fn set_default_ctor(&mut self, id: TypeDefId, has_default_ctor: bool) {
        let def = self.get_type_mut(id);
        // structs always have one
        def.has_default_ctor = has_default_ctor || def.kind == TypeDefKind::Struct;
    }

    /// Close a generic type definition over concrete arguments.
    pub fn instantiate_type(
        &self,
        arena: &mut TypeArena,
        id: TypeDefId,
        args: &[TypeId],
    ) -> TypeId {
        let def = self.get_type(id);
        let kind = match def.kind {
            TypeDefKind::Class => NominalKind::Class,
            TypeDefKind::Struct => NominalKind::Struct,
        };
        let ty = arena.nominal(id, args.iter().copied().collect(), kind);
        // Intern the closed base chain so `base_of` can walk it read-only
        if let Some(base) = def.base {
            let subs = self.substitutions_for(arena, ty);
            let closed_base = arena.substitute(base, &subs);
            if let Some((base_def, base_args, _)) = arena.unwrap_nominal(closed_base) {
                let base_args: TypeIdVec = base_args.iter().copied().collect();
                self.instantiate_type(arena, base_def, &base_args);
            }
        }
        ty
    }

    /// Map a nominal type's definition parameters to the type's arguments.
    pub fn substitutions_for(&self, arena: &TypeArena, ty: TypeId) -> TypeSubstitutions {
        let Some((def_id, args, _)) = arena.unwrap_nominal(ty) else {
            return FxHashMap::default();
        };
        self.get_type(def_id)
            .type_params
            .iter()
            .zip(args.iter())
            .filter(|(tp, arg)| arena.unwrap_type_param(**arg) != Some(tp.id))
            .map(|(tp, &arg)| (tp.id, arg))
            .collect()
    }

    /// The base type of `ty` with the derived type's arguments applied.
    /// Every class and struct ultimately derives from `object`.
    pub fn base_of(&self, arena: &TypeArena, ty: TypeId) -> Option<TypeId> {
        if ty == TypeId::OBJECT {
            return None;
        }
        let Some((def_id, _, _)) = arena.unwrap_nominal(ty) else {
            return (!ty.is_invalid() && !ty.is_void()).then_some(TypeId::OBJECT);
        };
        match self.get_type(def_id).base {
            Some(base) => {
                let subs = self.substitutions_for(arena, ty);
                arena.try_substitute(base, &subs)
            }
            None => Some(TypeId::OBJECT),
        }
    }
}
