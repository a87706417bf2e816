// src/crates/callsite-sema/src/reflection.rs
//
// The reflection capability consumed by the resolver: member enumeration,
// generic binding inference, constraint checking and assignability.

use crate::compilation_db::CompilationDb;
use crate::generic::{TypeConstraint, infer_type_params};
use crate::type_arena::{SemaType, TypeId, TypeIdVec};
use callsite_identity::MethodId;

/// Reflective queries over an explicit descriptor arena.
pub trait Reflection {
    /// Methods named `name` (ASCII case-insensitive) visible on `ty`,
    /// including inherited ones, with `ty`'s type arguments applied.
    fn members_named(&mut self, ty: TypeId, name: &str) -> Vec<MethodId>;

    /// Infer the method-level type arguments of a generic definition from the
    /// static argument types. `None` when inference is inconclusive.
    fn infer_generic_binding(&self, method: MethodId, arg_types: &[TypeId]) -> Option<TypeIdVec>;

    /// Whether `ty` satisfies every constraint in `constraints`.
    fn satisfies_constraints(&self, ty: TypeId, constraints: &[TypeConstraint]) -> bool;

    /// Whether an argument of type `arg` may be passed for a parameter of type `param`.
    fn is_assignable(&self, param: TypeId, arg: TypeId) -> bool;
}

impl Reflection for CompilationDb {
    fn members_named(&mut self, ty: TypeId, name: &str) -> Vec<MethodId> {
        self.entities.methods_named(&mut self.types, ty, name)
    }

    fn infer_generic_binding(&self, method: MethodId, arg_types: &[TypeId]) -> Option<TypeIdVec> {
        let def = self.method(method);
        if !def.is_generic_definition() || arg_types.is_empty() {
            return None;
        }
        let param_types: Vec<TypeId> = def.param_types().collect();
        let subs = infer_type_params(&self.types, &def.type_params, &param_types, arg_types)?;
        def.type_params
            .iter()
            .map(|tp| subs.get(&tp.id).copied())
            .collect()
    }

    fn satisfies_constraints(&self, ty: TypeId, constraints: &[TypeConstraint]) -> bool {
        constraints.iter().all(|c| self.satisfies(ty, *c))
    }

    fn is_assignable(&self, param: TypeId, arg: TypeId) -> bool {
        self.parameter_accepts(param, arg)
    }
}

impl CompilationDb {
    fn satisfies(&self, ty: TypeId, constraint: TypeConstraint) -> bool {
        match constraint {
            TypeConstraint::ValueType => self.types.is_value_type(ty),
            TypeConstraint::ReferenceType => self.types.is_reference_type(ty),
            TypeConstraint::DefaultConstructor => match self.types.get(ty) {
                SemaType::Primitive(_) | SemaType::Object => true,
                SemaType::Nominal { def, .. } => self.entities.get_type(*def).has_default_ctor,
                _ => false,
            },
            TypeConstraint::Subtype(base) => ty == base || self.derives_from(ty, base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_defs::TypeDefKind;
    use crate::entity_registry::MethodDefBuilder;

    #[test]
    fn value_type_constraint() {
        let mut db = CompilationDb::new();
        let point = db.define_type("Point", TypeDefKind::Struct, &[]);
        let point_ty = db.self_type(point);
        let constraints = [TypeConstraint::ValueType];
        assert!(db.satisfies_constraints(TypeId::I32, &constraints));
        assert!(db.satisfies_constraints(point_ty, &constraints));
        assert!(!db.satisfies_constraints(TypeId::STRING, &constraints));
    }

    #[test]
    fn default_constructor_constraint() {
        let mut db = CompilationDb::new();
        let sealed = db.define_type("NoCtor", TypeDefKind::Class, &[]);
        db.entities.set_default_ctor(sealed, false);
        let sealed_ty = db.self_type(sealed);
        let constraints = [TypeConstraint::DefaultConstructor];
        assert!(db.satisfies_constraints(TypeId::I32, &constraints));
        assert!(!db.satisfies_constraints(sealed_ty, &constraints));
        assert!(!db.satisfies_constraints(TypeId::STRING, &constraints));
    }

    #[test]
    fn infers_from_argument_types() {
        let mut db = CompilationDb::new();
        let host = db.define_type("Host", TypeDefKind::Class, &[]);
        let (tp, t) = db.fresh_type_param("T");
        let method = db.define_method(
            MethodDefBuilder::new(host, "Identity", t)
                .is_static(true)
                .type_param(tp)
                .param("value", t),
        );

        let bound = db.infer_generic_binding(method, &[TypeId::STRING]);
        assert_eq!(bound.as_deref(), Some(&[TypeId::STRING][..]));
        assert!(db.infer_generic_binding(method, &[]).is_none());
    }

    #[test]
    fn members_named_ignores_case() {
        let mut db = CompilationDb::new();
        let host = db.define_type("Host", TypeDefKind::Class, &[]);
        db.define_method(MethodDefBuilder::new(host, "Foo", TypeId::VOID));
        let host_ty = db.self_type(host);
        assert_eq!(db.members_named(host_ty, "foo").len(), 1);
        assert_eq!(db.members_named(host_ty, "bar").len(), 0);
    }
}
