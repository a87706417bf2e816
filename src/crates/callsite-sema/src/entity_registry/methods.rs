//! Method lookup and generic instantiation for EntityRegistry.

use crate::entity_defs::{GenericOrigin, MethodDef, ParamDef};
use crate::generic::{TypeConstraint, TypeParamInfo, TypeSubstitutions};
use crate::type_arena::{TypeArena, TypeId, TypeIdVec};
use callsite_identity::MethodId;

use super::EntityRegistry;

impl EntityRegistry {
    /// Get a method descriptor by ID
    pub fn method(&self, id: MethodId) -> &MethodDef {
        &self.method_defs[id.index() as usize]
    }

    /// Methods declared on `ty`'s definition and its bases whose name matches
    /// ignoring ASCII case, re-issued for `ty`'s closed type arguments.
    pub fn methods_named(
        &mut self,
        arena: &mut TypeArena,
        ty: TypeId,
        name: &str,
    ) -> Vec<MethodId> {
        let mut found = Vec::new();
        let mut current = Some(ty);
        while let Some(owner) = current {
            if let Some(def_id) = self.def_of(arena, owner) {
                let declared: Vec<MethodId> = self
                    .get_type(def_id)
                    .methods
                    .iter()
                    .copied()
                    .filter(|&m| self.method(m).name.eq_ignore_ascii_case(name))
                    .collect();
                for method in declared {
                    found.push(self.instantiate_for_type(arena, method, owner));
                }
            }
            current = self.base_of(arena, owner);
        }
        found
    }

    /// Re-issue a member of an open generic type for a closed declaring type.
    /// Members of non-generic types (or an already matching owner) come back as-is.
    pub fn instantiate_for_type(
        &mut self,
        arena: &mut TypeArena,
        method: MethodId,
        owner: TypeId,
    ) -> MethodId {
        let def = self.method(method);
        if def.declaring_type == owner || !arena.contains_type_params(def.declaring_type) {
            return method;
        }
        let key = (method, owner);
        if let Some(&id) = self.member_instances.get(&key) {
            return id;
        }

        let subs = self.substitutions_for(arena, owner);
        let origin = GenericOrigin {
            definition: method,
            type_args: TypeIdVec::new(),
        };
        let id = self.push_substituted(arena, method, owner, &subs, origin, true);
        self.member_instances.insert(key, id);
        id
    }

    /// Bind a generic method definition's own type parameters.
    /// The caller is responsible for constraint checking.
    pub fn instantiate_generic(
        &mut self,
        arena: &mut TypeArena,
        method: MethodId,
        type_args: &[TypeId],
    ) -> MethodId {
        let key: (MethodId, TypeIdVec) = (method, type_args.iter().copied().collect());
        if let Some(&id) = self.method_instances.get(&key) {
            return id;
        }

        let def = self.method(method);
        let subs: TypeSubstitutions = def
            .type_params
            .iter()
            .zip(type_args)
            .map(|(tp, &arg)| (tp.id, arg))
            .collect();
        let owner = def.declaring_type;
        let origin = GenericOrigin {
            definition: method,
            type_args: key.1.clone(),
        };
        let id = self.push_substituted(arena, method, owner, &subs, origin, false);
        tracing::trace!(?method, ?type_args, instance = ?id, "instantiated generic method");
        self.method_instances.insert(key, id);
        id
    }

    fn push_substituted(
        &mut self,
        arena: &mut TypeArena,
        method: MethodId,
        owner: TypeId,
        subs: &TypeSubstitutions,
        origin: GenericOrigin,
        keep_type_params: bool,
    ) -> MethodId {
        let def = self.method(method).clone();
        let id = MethodId::new(self.method_defs.len() as u32);
        let params = def
            .params
            .iter()
            .map(|p| ParamDef {
                name: p.name.clone(),
                ty: arena.substitute(p.ty, subs),
                mode: p.mode,
            })
            .collect();
        let type_params: Vec<TypeParamInfo> = if keep_type_params {
            def.type_params
                .iter()
                .map(|tp| TypeParamInfo {
                    constraints: tp
                        .constraints
                        .iter()
                        .map(|c| match *c {
                            TypeConstraint::Subtype(base) => {
                                TypeConstraint::Subtype(arena.substitute(base, subs))
                            }
                            other => other,
                        })
                        .collect(),
                    ..tp.clone()
                })
                .collect()
        } else {
            Vec::new()
        };

        self.method_defs.push(MethodDef {
            id,
            name: def.name,
            defining_type: def.defining_type,
            declaring_type: owner,
            is_static: def.is_static,
            is_public: def.is_public,
            is_extension: def.is_extension,
            params,
            type_params,
            return_type: arena.substitute(def.return_type, subs),
            generic_origin: Some(origin),
            body: def.body,
        });
        id
    }
}
