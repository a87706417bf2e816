// src/crates/callsite-sema/src/type_arena.rs
//
// Interned type system using TypeId handles for O(1) equality and minimal allocations.
//
// - TypeId: u32 handle to an interned type (Copy, trivial Eq/Hash)
// - TypeArena: per-database storage with automatic deduplication
// - SemaType: the canonical type representation using TypeId for child types

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::types::PrimitiveType;
use callsite_identity::{TypeDefId, TypeParamId};

/// Concrete type identity in the TypeArena.
///
/// Unlike `TypeDefId` (which identifies a type *definition* like `class Wrapper<T>`),
/// `TypeId` identifies an instantiated type (like `Wrapper<Mutable>`), or an open
/// one when its arguments are type parameters.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    // ========================================================================
    // Reserved TypeIds, interned at these indices by TypeArena::new()
    // ========================================================================

    pub const INVALID: TypeId = TypeId(0);
    pub const VOID: TypeId = TypeId(1);

    // Value-type primitives
    pub const BOOL: TypeId = TypeId(2);
    pub const I32: TypeId = TypeId(3);
    pub const U32: TypeId = TypeId(4);
    pub const I64: TypeId = TypeId(5);
    pub const F64: TypeId = TypeId(6);

    // Built-in reference types
    pub const STRING: TypeId = TypeId(7);
    pub const OBJECT: TypeId = TypeId(8);
    pub const METATYPE: TypeId = TypeId(9);

    /// First non-reserved TypeId index
    pub const FIRST_DYNAMIC: u32 = 10;

    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_invalid(self) -> bool {
        self == Self::INVALID
    }

    #[inline]
    pub fn is_void(self) -> bool {
        self == Self::VOID
    }

    /// Bool and numeric primitives (no arena needed)
    #[inline]
    pub fn is_primitive(self) -> bool {
        self.0 >= Self::BOOL.0 && self.0 <= Self::F64.0
    }
}

/// SmallVec for type children - inline up to 4 (covers most argument lists)
pub type TypeIdVec = SmallVec<[TypeId; 4]>;

/// Nominal type kind: classes are reference types, structs are value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NominalKind {
    Class,
    Struct,
}

/// The canonical type representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SemaType {
    Invalid,
    Void,
    Primitive(PrimitiveType),
    String,
    Object,
    /// The runtime type object returned by `GetType`
    Metatype,
    Nominal {
        def: TypeDefId,
        args: TypeIdVec,
        kind: NominalKind,
    },
    Array {
        elem: TypeId,
        rank: u8,
    },
    TypeParam(TypeParamId),
    /// Element type of a `ref`/`out` parameter slot
    ByRef(TypeId),
}

/// Per-database type storage with structural interning.
#[derive(Debug, Clone)]
pub struct TypeArena {
    types: Vec<SemaType>,
    intern_map: FxHashMap<SemaType, TypeId>,
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    pub fn new() -> Self {
        let mut arena = Self {
            types: Vec::with_capacity(64),
            intern_map: FxHashMap::default(),
        };
        // Order must match the reserved TypeId constants.
        for ty in [
            SemaType::Invalid,
            SemaType::Void,
            SemaType::Primitive(PrimitiveType::Bool),
            SemaType::Primitive(PrimitiveType::I32),
            SemaType::Primitive(PrimitiveType::U32),
            SemaType::Primitive(PrimitiveType::I64),
            SemaType::Primitive(PrimitiveType::F64),
            SemaType::String,
            SemaType::Object,
            SemaType::Metatype,
        ] {
            arena.intern(ty);
        }
        debug_assert_eq!(arena.types.len() as u32, TypeId::FIRST_DYNAMIC);
        arena
    }

    /// Intern a type, returning the existing handle for structurally equal types.
    pub fn intern(&mut self, ty: SemaType) -> TypeId {
        if let Some(&id) = self.intern_map.get(&ty) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty.clone());
        self.intern_map.insert(ty, id);
        id
    }

    pub fn get(&self, id: TypeId) -> &SemaType {
        static INVALID: SemaType = SemaType::Invalid;
        self.types.get(id.0 as usize).unwrap_or(&INVALID)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // ========================================================================
    // Builders
    // ========================================================================

    pub fn primitive(&self, prim: PrimitiveType) -> TypeId {
        match prim {
            PrimitiveType::Bool => TypeId::BOOL,
            PrimitiveType::I32 => TypeId::I32,
            PrimitiveType::U32 => TypeId::U32,
            PrimitiveType::I64 => TypeId::I64,
            PrimitiveType::F64 => TypeId::F64,
        }
    }

    pub fn nominal(&mut self, def: TypeDefId, args: TypeIdVec, kind: NominalKind) -> TypeId {
        self.intern(SemaType::Nominal { def, args, kind })
    }

    pub fn array(&mut self, elem: TypeId, rank: u8) -> TypeId {
        self.intern(SemaType::Array {
            elem,
            rank: rank.max(1),
        })
    }

    pub fn type_param(&mut self, id: TypeParamId) -> TypeId {
        self.intern(SemaType::TypeParam(id))
    }

    pub fn by_ref(&mut self, inner: TypeId) -> TypeId {
        // ref-of-ref collapses
        if let SemaType::ByRef(_) = self.get(inner) {
            return inner;
        }
        self.intern(SemaType::ByRef(inner))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn unwrap_nominal(&self, id: TypeId) -> Option<(TypeDefId, &[TypeId], NominalKind)> {
        match self.get(id) {
            SemaType::Nominal { def, args, kind } => Some((*def, args.as_slice(), *kind)),
            _ => None,
        }
    }

    pub fn unwrap_array(&self, id: TypeId) -> Option<(TypeId, u8)> {
        match self.get(id) {
            SemaType::Array { elem, rank } => Some((*elem, *rank)),
            _ => None,
        }
    }

    pub fn unwrap_type_param(&self, id: TypeId) -> Option<TypeParamId> {
        match self.get(id) {
            SemaType::TypeParam(p) => Some(*p),
            _ => None,
        }
    }

    pub fn unwrap_by_ref(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            SemaType::ByRef(inner) => Some(*inner),
            _ => None,
        }
    }

    /// Strip a by-ref wrapper, if any.
    pub fn element_of_by_ref(&self, id: TypeId) -> TypeId {
        self.unwrap_by_ref(id).unwrap_or(id)
    }

    /// Value types are copied on read; mutation through a copy is lost.
    pub fn is_value_type(&self, id: TypeId) -> bool {
        matches!(
            self.get(id),
            SemaType::Primitive(_)
                | SemaType::Nominal {
                    kind: NominalKind::Struct,
                    ..
                }
        )
    }

    pub fn is_reference_type(&self, id: TypeId) -> bool {
        matches!(
            self.get(id),
            SemaType::String
                | SemaType::Object
                | SemaType::Metatype
                | SemaType::Array { .. }
                | SemaType::Nominal {
                    kind: NominalKind::Class,
                    ..
                }
        )
    }

    /// True if the type mentions any type parameter (an open type).
    pub fn contains_type_params(&self, id: TypeId) -> bool {
        match self.get(id) {
            SemaType::TypeParam(_) => true,
            SemaType::Nominal { args, .. } => {
                args.iter().any(|&arg| self.contains_type_params(arg))
            }
            SemaType::Array { elem, .. } => self.contains_type_params(*elem),
            SemaType::ByRef(inner) => self.contains_type_params(*inner),
            _ => false,
        }
    }

    /// Replace type parameters by their bindings. Unbound parameters are kept.
    pub fn substitute(&mut self, id: TypeId, subs: &FxHashMap<TypeParamId, TypeId>) -> TypeId {
        if subs.is_empty() {
            return id;
        }
        match self.get(id).clone() {
            SemaType::TypeParam(p) => subs.get(&p).copied().unwrap_or(id),
            SemaType::Nominal { def, args, kind } => {
                let args: TypeIdVec = args.iter().map(|&a| self.substitute(a, subs)).collect();
                self.nominal(def, args, kind)
            }
            SemaType::Array { elem, rank } => {
                let elem = self.substitute(elem, subs);
                self.array(elem, rank)
            }
            SemaType::ByRef(inner) => {
                let inner = self.substitute(inner, subs);
                self.by_ref(inner)
            }
            _ => id,
        }
    }

    /// Non-interning variant of `substitute`: returns the handle of the substituted
    /// type only if that type has already been interned.
    pub fn try_substitute(
        &self,
        id: TypeId,
        subs: &FxHashMap<TypeParamId, TypeId>,
    ) -> Option<TypeId> {
        if subs.is_empty() {
            return Some(id);
        }
        let ty = match self.get(id) {
            SemaType::TypeParam(p) => return Some(subs.get(p).copied().unwrap_or(id)),
            SemaType::Nominal { def, args, kind } => SemaType::Nominal {
                def: *def,
                args: args
                    .iter()
                    .map(|&a| self.try_substitute(a, subs))
                    .collect::<Option<TypeIdVec>>()?,
                kind: *kind,
            },
            SemaType::Array { elem, rank } => SemaType::Array {
                elem: self.try_substitute(*elem, subs)?,
                rank: *rank,
            },
            SemaType::ByRef(inner) => SemaType::ByRef(self.try_substitute(*inner, subs)?),
            _ => return Some(id),
        };
        self.intern_map.get(&ty).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_ids_are_interned_in_order() {
        let arena = TypeArena::new();
        assert_eq!(arena.get(TypeId::INVALID), &SemaType::Invalid);
        assert_eq!(
            arena.get(TypeId::I32),
            &SemaType::Primitive(PrimitiveType::I32)
        );
        assert_eq!(arena.get(TypeId::OBJECT), &SemaType::Object);
        assert_eq!(arena.len() as u32, TypeId::FIRST_DYNAMIC);
    }

    #[test]
    fn interning_deduplicates() {
        let mut arena = TypeArena::new();
        let a = arena.array(TypeId::I32, 1);
        let b = arena.array(TypeId::I32, 1);
        let c = arena.array(TypeId::I32, 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn by_ref_collapses() {
        let mut arena = TypeArena::new();
        let r = arena.by_ref(TypeId::I32);
        assert_eq!(arena.by_ref(r), r);
        assert_eq!(arena.element_of_by_ref(r), TypeId::I32);
    }

    #[test]
    fn substitute_replaces_nested_params() {
        let mut arena = TypeArena::new();
        let t = arena.type_param(TypeParamId::new(0));
        let arr = arena.array(t, 1);
        let open = arena.nominal(TypeDefId::new(0), smallvec::smallvec![arr], NominalKind::Class);
        assert!(arena.contains_type_params(open));

        let mut subs = FxHashMap::default();
        subs.insert(TypeParamId::new(0), TypeId::STRING);
        let closed = arena.substitute(open, &subs);
        assert!(!arena.contains_type_params(closed));
        let (_, args, _) = arena.unwrap_nominal(closed).unwrap();
        assert_eq!(arena.unwrap_array(args[0]), Some((TypeId::STRING, 1)));
    }

    #[test]
    fn value_and_reference_classification() {
        let mut arena = TypeArena::new();
        let s = arena.nominal(TypeDefId::new(1), TypeIdVec::new(), NominalKind::Struct);
        let c = arena.nominal(TypeDefId::new(2), TypeIdVec::new(), NominalKind::Class);
        assert!(arena.is_value_type(TypeId::I32));
        assert!(arena.is_value_type(s));
        assert!(arena.is_reference_type(c));
        assert!(arena.is_reference_type(TypeId::STRING));
        let t = arena.type_param(TypeParamId::new(9));
        assert!(!arena.is_value_type(t) && !arena.is_reference_type(t));
    }
}
