//! Field and property registration, lookup, and substitution helpers.

use crate::entity_defs::{FieldDef, MethodDef, PropertyDef};
use crate::type_arena::{TypeArena, TypeId, TypeIdVec};
use crate::types::ConstantValue;
use callsite_identity::{FieldId, PropertyId, TypeDefId};

use super::{EntityRegistry, MethodDefBuilder};

/// Storage class of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Instance,
    ReadOnly,
    Static,
    /// Literal field: static, read-only, value fixed at registration
    Const(ConstantValue),
}

impl EntityRegistry {
    /// Register a field; instance fields get the next slot of the defining type.
    pub fn register_field(
        &mut self,
        defining_type: TypeDefId,
        name: &str,
        ty: TypeId,
        kind: FieldKind,
    ) -> FieldId {
        let id = FieldId::new(self.field_defs.len() as u32);
        let (is_static, is_readonly, constant) = match kind {
            FieldKind::Instance => (false, false, None),
            FieldKind::ReadOnly => (false, true, None),
            FieldKind::Static => (true, false, None),
            FieldKind::Const(value) => (true, true, Some(value)),
        };
        let type_def = self.get_type_mut(defining_type);
        let slot = if is_static {
            None
        } else {
            let slot = type_def.instance_field_count;
            type_def.instance_field_count += 1;
            Some(slot)
        };
        type_def.fields.push(id);
        self.field_defs.push(FieldDef {
            id,
            name: name.to_string(),
            defining_type,
            ty,
            is_static,
            is_readonly,
            constant,
            slot,
        });
        id
    }

    pub fn field(&self, id: FieldId) -> &FieldDef {
        &self.field_defs[id.index() as usize]
    }

    /// Find a field by exact name on the type or any of its bases.
    pub fn field_by_name(&self, arena: &TypeArena, ty: TypeId, name: &str) -> Option<FieldId> {
        let mut current = Some(ty);
        while let Some(ty) = current {
            if let Some((def_id, _, _)) = arena.unwrap_nominal(ty)
                && let Some(&id) = self
                    .get_type(def_id)
                    .fields
                    .iter()
                    .find(|&&f| self.field(f).name == name)
            {
                return Some(id);
            }
            current = self.base_of(arena, ty);
        }
        None
    }

    /// Instance fields of a type in slot order.
    pub fn instance_fields(&self, def: TypeDefId) -> impl Iterator<Item = &FieldDef> + '_ {
        let mut fields: Vec<&FieldDef> = self
            .get_type(def)
            .fields
            .iter()
            .map(|&f| self.field(f))
            .filter(|f| f.slot.is_some())
            .collect();
        fields.sort_by_key(|f| f.slot);
        fields.into_iter()
    }

    /// The field's type as seen through a (possibly closed) owner type.
    pub fn field_type_in(&self, arena: &mut TypeArena, field: FieldId, owner: TypeId) -> TypeId {
        let declared = self.field(field).ty;
        let subs = self.substitutions_for(arena, owner);
        arena.substitute(declared, &subs)
    }

    /// Register a property (or an indexer when `index_params` is non-empty) with
    /// the requested accessors. Accessors are ordinary methods named
    /// `get_<Name>` / `set_<Name>`.
    #[allow(clippy::too_many_arguments)]
    pub fn register_property(
        &mut self,
        arena: &mut TypeArena,
        defining_type: TypeDefId,
        name: &str,
        ty: TypeId,
        index_params: &[TypeId],
        readable: bool,
        writable: bool,
        is_static: bool,
    ) -> PropertyId {
        let id = PropertyId::new(self.property_defs.len() as u32);
        let owner_type = self.get_type(defining_type).self_type;

        let getter = readable.then(|| {
            let mut builder = MethodDefBuilder::new(defining_type, &format!("get_{name}"), ty)
                .is_static(is_static);
            for (i, &p) in index_params.iter().enumerate() {
                builder = builder.param(&format!("index{i}"), p);
            }
            builder.register(self, arena)
        });
        let setter = writable.then(|| {
            let mut builder =
                MethodDefBuilder::new(defining_type, &format!("set_{name}"), TypeId::VOID)
                    .is_static(is_static);
            for (i, &p) in index_params.iter().enumerate() {
                builder = builder.param(&format!("index{i}"), p);
            }
            builder.param("value", ty).register(self, arena)
        });

        self.property_defs.push(PropertyDef {
            id,
            name: name.to_string(),
            defining_type: owner_type,
            ty,
            index_params: index_params.iter().copied().collect::<TypeIdVec>(),
            getter,
            setter,
            is_static,
        });
        self.get_type_mut(defining_type).properties.push(id);
        id
    }

    pub fn property(&self, id: PropertyId) -> &PropertyDef {
        &self.property_defs[id.index() as usize]
    }

    /// Find a property by exact name on the type or any of its bases.
    pub fn property_by_name(
        &self,
        arena: &TypeArena,
        ty: TypeId,
        name: &str,
    ) -> Option<PropertyId> {
        let mut current = Some(ty);
        while let Some(ty) = current {
            if let Some((def_id, _, _)) = arena.unwrap_nominal(ty)
                && let Some(&id) = self
                    .get_type(def_id)
                    .properties
                    .iter()
                    .find(|&&p| self.property(p).name == name)
            {
                return Some(id);
            }
            current = self.base_of(arena, ty);
        }
        None
    }

    /// The getter descriptor of a property as seen through `owner`.
    pub fn property_getter_in(
        &mut self,
        arena: &mut TypeArena,
        property: PropertyId,
        owner: TypeId,
    ) -> Option<&MethodDef> {
        let getter = self.property(property).getter?;
        let id = self.instantiate_for_type(arena, getter, owner);
        Some(self.method(id))
    }
}
