// src/crates/callsite-sema/src/generic.rs
//
// Generic type parameter handling: parameter descriptors, constraint sets, and
// type parameter inference by structural unification.

use std::fmt;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::type_arena::{SemaType, TypeArena, TypeId};
use callsite_identity::TypeParamId;

/// A single constraint on a generic type parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeConstraint {
    /// `where T : struct`
    ValueType,
    /// `where T : class`
    ReferenceType,
    /// `where T : new()`
    DefaultConstructor,
    /// `where T : Base`
    Subtype(TypeId),
}

impl fmt::Display for TypeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeConstraint::ValueType => f.write_str("struct"),
            TypeConstraint::ReferenceType => f.write_str("class"),
            TypeConstraint::DefaultConstructor => f.write_str("new()"),
            TypeConstraint::Subtype(base) => write!(f, "subtype of #{}", base.index()),
        }
    }
}

/// The full constraint set declared on one type parameter.
pub type ConstraintSet = SmallVec<[TypeConstraint; 2]>;

/// Information about a type parameter in scope
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParamInfo {
    /// Unique identity of this parameter
    pub id: TypeParamId,
    /// Source name, used only for diagnostics and display
    pub name: String,
    pub constraints: ConstraintSet,
}

impl TypeParamInfo {
    pub fn new(id: TypeParamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            constraints: ConstraintSet::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: TypeConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// Substitution map from type parameters to bound types.
pub type TypeSubstitutions = FxHashMap<TypeParamId, TypeId>;

/// Outcome of unifying one parameter position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unify {
    Ok,
    /// A parameter was bound to two different types
    Conflict,
}

/// Infer type parameters from argument types.
///
/// Every generic parameter must be bound by some parameter position and no
/// parameter may be bound to two different types; otherwise inference is
/// inconclusive and `None` is returned. Shape mismatches (e.g. array pattern
/// against a non-array) bind nothing; assignability is checked later.
pub fn infer_type_params(
    arena: &TypeArena,
    type_params: &[TypeParamInfo],
    param_types: &[TypeId],
    arg_types: &[TypeId],
) -> Option<TypeSubstitutions> {
    if type_params.is_empty() {
        return Some(TypeSubstitutions::default());
    }

    let mut inferred = TypeSubstitutions::default();
    for (&param_ty, &arg_ty) in param_types.iter().zip(arg_types) {
        if unify(arena, param_ty, arg_ty, type_params, &mut inferred) == Unify::Conflict {
            tracing::trace!(?param_ty, ?arg_ty, "conflicting inference");
            return None;
        }
    }

    if type_params.iter().all(|tp| inferred.contains_key(&tp.id)) {
        Some(inferred)
    } else {
        None
    }
}

/// Unify a parameter type pattern with an argument type.
fn unify(
    arena: &TypeArena,
    pattern: TypeId,
    actual: TypeId,
    type_params: &[TypeParamInfo],
    inferred: &mut TypeSubstitutions,
) -> Unify {
    match (arena.get(pattern), arena.get(actual)) {
        (SemaType::TypeParam(p), _) => {
            // Only bind our own parameters; outer ones are left alone
            if !type_params.iter().any(|tp| tp.id == *p) {
                return Unify::Ok;
            }
            match inferred.get(p) {
                Some(&bound) if bound != actual => Unify::Conflict,
                Some(_) => Unify::Ok,
                None => {
                    inferred.insert(*p, actual);
                    Unify::Ok
                }
            }
        }
        // ref T against a plain argument: unify the element type
        (SemaType::ByRef(inner), SemaType::ByRef(actual_inner)) => {
            unify(arena, *inner, *actual_inner, type_params, inferred)
        }
        (SemaType::ByRef(inner), _) => unify(arena, *inner, actual, type_params, inferred),
        (
            SemaType::Array { elem: p_elem, rank: p_rank },
            SemaType::Array { elem: a_elem, rank: a_rank },
        ) if p_rank == a_rank => unify(arena, *p_elem, *a_elem, type_params, inferred),
        (
            SemaType::Nominal { def: p_def, args: p_args, .. },
            SemaType::Nominal { def: a_def, args: a_args, .. },
        ) if p_def == a_def && p_args.len() == a_args.len() => {
            for (&p, &a) in p_args.iter().zip(a_args.iter()) {
                if unify(arena, p, a, type_params, inferred) == Unify::Conflict {
                    return Unify::Conflict;
                }
            }
            Unify::Ok
        }
        // Everything else: no type params to extract
        _ => Unify::Ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_arena::NominalKind;
    use callsite_identity::TypeDefId;

    fn param(arena: &mut TypeArena, index: u32) -> (TypeParamInfo, TypeId) {
        let id = TypeParamId::new(index);
        (TypeParamInfo::new(id, format!("T{index}")), arena.type_param(id))
    }

    #[test]
    fn infers_direct_parameter() {
        let mut arena = TypeArena::new();
        let (info, t) = param(&mut arena, 0);
        let subs = infer_type_params(&arena, &[info.clone()], &[t], &[TypeId::I32]).unwrap();
        assert_eq!(subs.get(&info.id), Some(&TypeId::I32));
    }

    #[test]
    fn infers_through_arrays_and_nominals() {
        let mut arena = TypeArena::new();
        let (info, t) = param(&mut arena, 0);
        let arr_t = arena.array(t, 1);
        let arr_s = arena.array(TypeId::STRING, 1);
        let list_t = arena.nominal(TypeDefId::new(4), smallvec::smallvec![t], NominalKind::Class);
        let list_s =
            arena.nominal(TypeDefId::new(4), smallvec::smallvec![TypeId::STRING], NominalKind::Class);

        let subs = infer_type_params(&arena, &[info.clone()], &[arr_t], &[arr_s]).unwrap();
        assert_eq!(subs[&info.id], TypeId::STRING);
        let subs = infer_type_params(&arena, &[info.clone()], &[list_t], &[list_s]).unwrap();
        assert_eq!(subs[&info.id], TypeId::STRING);
    }

    #[test]
    fn no_arguments_is_inconclusive() {
        let mut arena = TypeArena::new();
        let (info, t) = param(&mut arena, 0);
        assert!(infer_type_params(&arena, &[info], &[t], &[]).is_none());
    }

    #[test]
    fn conflicting_bindings_are_inconclusive() {
        let mut arena = TypeArena::new();
        let (info, t) = param(&mut arena, 0);
        let result = infer_type_params(&arena, &[info], &[t, t], &[TypeId::I32, TypeId::STRING]);
        assert!(result.is_none());
    }

    #[test]
    fn rank_mismatch_binds_nothing() {
        let mut arena = TypeArena::new();
        let (info, t) = param(&mut arena, 0);
        let pattern = arena.array(t, 2);
        let actual = arena.array(TypeId::I32, 1);
        assert!(infer_type_params(&arena, &[info], &[pattern], &[actual]).is_none());
    }
}
