// src/crates/callsite-sema/src/entity_defs.rs
//
// Entity definition records stored in the EntityRegistry arena.

use crate::generic::TypeParamInfo;
use crate::type_arena::{TypeId, TypeIdVec};
use crate::types::ConstantValue;
use callsite_identity::{FieldId, MethodId, PropertyId, TypeDefId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeDefKind {
    Class,
    Struct,
}

/// A type definition (class or struct), possibly generic.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub id: TypeDefId,
    pub name: String,
    pub kind: TypeDefKind,
    pub type_params: Vec<TypeParamInfo>,
    /// The definition's own type: `Wrapper<T>` for generics, `Mutable` otherwise
    pub self_type: TypeId,
    pub base: Option<TypeId>,
    pub is_public: bool,
    /// Whether `new()` is available (always true for structs)
    pub has_default_ctor: bool,
    pub fields: Vec<FieldId>,
    pub properties: Vec<PropertyId>,
    pub methods: Vec<MethodId>,
    /// Number of instance field slots, in declaration order
    pub instance_field_count: usize,
}

impl TypeDef {
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

/// A field on a type. Static and literal fields have no instance slot.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub id: FieldId,
    pub name: String,
    pub defining_type: TypeDefId,
    /// Declared type, expressed in terms of the defining type's parameters
    pub ty: TypeId,
    pub is_static: bool,
    pub is_readonly: bool,
    /// Literal (`const`) value; implies static and read-only
    pub constant: Option<ConstantValue>,
    /// Instance slot index, `None` for static fields
    pub slot: Option<usize>,
}

impl FieldDef {
    pub fn is_literal(&self) -> bool {
        self.constant.is_some()
    }
}

/// A property or indexer, backed by accessor methods.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub id: PropertyId,
    pub name: String,
    pub defining_type: TypeId,
    pub ty: TypeId,
    /// Indexer parameters; empty for plain properties
    pub index_params: TypeIdVec,
    pub getter: Option<MethodId>,
    pub setter: Option<MethodId>,
    pub is_static: bool,
}

impl PropertyDef {
    pub fn is_indexer(&self) -> bool {
        !self.index_params.is_empty()
    }

    pub fn can_read(&self) -> bool {
        self.getter.is_some()
    }
}

/// How an argument is passed to a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamMode {
    Value,
    /// `ref`: read before the call, written back after it
    Ref,
    /// `out`: starts from the default value, written back after the call
    Out,
}

impl ParamMode {
    pub fn is_by_ref(self) -> bool {
        !matches!(self, ParamMode::Value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDef {
    pub name: String,
    /// Parameter type; `ByRef(T)` for ref/out parameters
    pub ty: TypeId,
    pub mode: ParamMode,
}

/// Where a closed method descriptor came from.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericOrigin {
    /// The descriptor this one was instantiated from
    pub definition: MethodId,
    /// Bound method-level type arguments (empty when only the declaring type was closed)
    pub type_args: TypeIdVec,
}

/// A method descriptor.
///
/// Generic method definitions keep their `type_params`; binding them produces a
/// new descriptor with empty `type_params` and a `generic_origin`. Members of
/// generic types are registered against the open declaring type and re-issued
/// per closed declaring type the same way.
#[derive(Debug, Clone)]
pub struct MethodDef {
    pub id: MethodId,
    pub name: String,
    pub defining_type: TypeDefId,
    /// Declaring type as seen by callers (`Wrapper<T>` or `Wrapper<Mutable>`)
    pub declaring_type: TypeId,
    pub is_static: bool,
    pub is_public: bool,
    /// Static method whose first parameter renders as the receiver
    pub is_extension: bool,
    pub params: Vec<ParamDef>,
    pub type_params: Vec<TypeParamInfo>,
    pub return_type: TypeId,
    pub generic_origin: Option<GenericOrigin>,
    /// Descriptor that owns the executable body (root of the origin chain)
    pub body: MethodId,
}

impl MethodDef {
    /// An unbound generic method definition (`Method<T>`)
    pub fn is_generic_definition(&self) -> bool {
        !self.type_params.is_empty()
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn param_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.params.iter().map(|p| p.ty)
    }

    pub fn has_by_ref_params(&self) -> bool {
        self.params.iter().any(|p| p.mode.is_by_ref())
    }
}
