// src/crates/callsite-sema/src/compatibility.rs
//
// Assignability rules used by call validation and overload resolution.

use crate::compilation_db::CompilationDb;
use crate::type_arena::TypeId;

impl CompilationDb {
    /// Reference assignability: identity, or a reference type flowing into one
    /// of its base types. Value types never convert implicitly (no boxing).
    pub fn is_reference_assignable(&self, to: TypeId, from: TypeId) -> bool {
        if to == from {
            return true;
        }
        if !self.types.is_reference_type(to) || !self.types.is_reference_type(from) {
            return false;
        }
        self.derives_from(from, to)
    }

    /// Walk the base chain of `from` looking for `to`.
    pub fn derives_from(&self, from: TypeId, to: TypeId) -> bool {
        let mut current = self.entities.base_of(&self.types, from);
        while let Some(ty) = current {
            if ty == to {
                return true;
            }
            current = self.entities.base_of(&self.types, ty);
        }
        false
    }

    /// Whether an argument of static type `arg` may be passed to a parameter of
    /// type `param`. By-ref parameters require the exact element type.
    pub fn parameter_accepts(&self, param: TypeId, arg: TypeId) -> bool {
        match self.types.unwrap_by_ref(param) {
            Some(element) => element == arg,
            None => self.is_reference_assignable(param, arg),
        }
    }

    /// Whether an instance of `instance` may receive a call declared on
    /// `declaring`. Value types may call members declared on `object`.
    pub fn is_valid_instance_type(&self, declaring: TypeId, instance: TypeId) -> bool {
        if self.is_reference_assignable(declaring, instance) {
            return true;
        }
        self.types.is_value_type(instance) && self.derives_from(instance, declaring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_defs::TypeDefKind;

    #[test]
    fn identity_is_assignable() {
        let db = CompilationDb::new();
        assert!(db.is_reference_assignable(TypeId::I32, TypeId::I32));
        assert!(!db.is_reference_assignable(TypeId::I32, TypeId::U32));
    }

    #[test]
    fn reference_types_flow_to_object_but_values_do_not() {
        let db = CompilationDb::new();
        assert!(db.is_reference_assignable(TypeId::OBJECT, TypeId::STRING));
        assert!(!db.is_reference_assignable(TypeId::OBJECT, TypeId::I32));
        assert!(!db.is_reference_assignable(TypeId::I32, TypeId::STRING));
    }

    #[test]
    fn derived_classes_flow_to_their_base() {
        let mut db = CompilationDb::new();
        let animal = db.define_type("Animal", TypeDefKind::Class, &[]);
        let dog = db.define_type("Dog", TypeDefKind::Class, &[]);
        let animal_ty = db.self_type(animal);
        let dog_ty = db.self_type(dog);
        db.entities.set_base(dog, animal_ty);

        assert!(db.is_reference_assignable(animal_ty, dog_ty));
        assert!(db.is_reference_assignable(TypeId::OBJECT, dog_ty));
        assert!(!db.is_reference_assignable(dog_ty, animal_ty));
    }

    #[test]
    fn value_types_may_receive_object_members() {
        let mut db = CompilationDb::new();
        let point = db.define_type("Point", TypeDefKind::Struct, &[]);
        let point_ty = db.self_type(point);
        assert!(db.is_valid_instance_type(TypeId::OBJECT, TypeId::I32));
        assert!(db.is_valid_instance_type(TypeId::OBJECT, point_ty));
        assert!(db.is_valid_instance_type(point_ty, point_ty));
        assert!(!db.is_valid_instance_type(point_ty, TypeId::I32));
    }

    #[test]
    fn by_ref_parameters_need_exact_element_type() {
        let mut db = CompilationDb::new();
        let by_ref_object = db.types.by_ref(TypeId::OBJECT);
        assert!(db.parameter_accepts(by_ref_object, TypeId::OBJECT));
        assert!(!db.parameter_accepts(by_ref_object, TypeId::STRING));
    }
}
