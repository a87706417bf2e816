// src/crates/callsite-sema/src/resolve/mod.rs
//
// Method resolution by name: candidate enumeration, explicit type arguments,
// generic inference, constraint checking and argument compatibility.

use crate::compilation_db::CompilationDb;
use crate::errors::{CallError, Slot};
use crate::generic::{ConstraintSet, TypeConstraint, TypeSubstitutions};
use crate::reflection::Reflection;
use crate::type_arena::{TypeId, TypeIdVec};
use callsite_identity::MethodId;

/// Whether the call is made through an instance or through the type itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallForm {
    Instance,
    Static,
}

/// The type searched for candidates and the form of the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveTarget {
    pub ty: TypeId,
    pub form: CallForm,
}

impl ResolveTarget {
    pub fn instance(ty: TypeId) -> Self {
        Self {
            ty,
            form: CallForm::Instance,
        }
    }

    pub fn static_on(ty: TypeId) -> Self {
        Self {
            ty,
            form: CallForm::Static,
        }
    }
}

/// A candidate that made it through binding and compatibility checks.
#[derive(Debug, Clone, Copy)]
struct Survivor {
    method: MethodId,
    is_public: bool,
}

/// Resolve `name` on `target` to exactly one closed method.
///
/// `type_args` entries and `arg_types` entries are `None` when the caller
/// supplied a null type / null argument expression. An empty `type_args`
/// list is the same as not supplying one.
#[tracing::instrument(level = "debug", skip(db, type_args, arg_types), fields(ty = ?target.ty, form = ?target.form))]
pub fn resolve_method(
    db: &mut CompilationDb,
    target: ResolveTarget,
    name: &str,
    type_args: Option<&[Option<TypeId>]>,
    arg_types: &[Option<TypeId>],
) -> Result<MethodId, CallError> {
    let explicit = type_args.filter(|args| !args.is_empty());
    let want_static = target.form == CallForm::Static;

    let candidates: Vec<MethodId> = db
        .members_named(target.ty, name)
        .into_iter()
        .filter(|&m| db.method(m).is_static == want_static)
        .collect();
    tracing::trace!(count = candidates.len(), "candidates");

    let mut survivors: Vec<Survivor> = Vec::new();
    for candidate in candidates {
        let Some(bound) = bind_candidate(db, candidate, explicit, arg_types)? else {
            continue;
        };
        if !is_compatible(db, bound, arg_types)? {
            tracing::trace!(?candidate, "incompatible arguments");
            continue;
        }
        survivors.push(Survivor {
            method: bound,
            is_public: db.method(bound).is_public,
        });
    }

    // Public candidates shadow non-public ones.
    if survivors.iter().any(|s| s.is_public) {
        survivors.retain(|s| s.is_public);
    }

    match survivors.as_slice() {
        [only] => {
            tracing::debug!(method = ?only.method, "resolved");
            Ok(only.method)
        }
        _ => {
            tracing::debug!(survivors = survivors.len(), "no unique candidate");
            Err(CallError::MethodNotFound {
                name: name.to_string(),
                type_name: db.display_type(target.ty),
            })
        }
    }
}

/// Bind the candidate's own type parameters, explicitly or by inference.
/// `Ok(None)` excludes the candidate.
fn bind_candidate(
    db: &mut CompilationDb,
    candidate: MethodId,
    explicit: Option<&[Option<TypeId>]>,
    arg_types: &[Option<TypeId>],
) -> Result<Option<MethodId>, CallError> {
    let def = db.method(candidate);
    let is_generic = def.is_generic_definition();
    let arity = def.type_params.len();
    let param_count = def.param_count();

    match explicit {
        Some(args) => {
            if !is_generic || args.len() != arity {
                return Ok(None);
            }
            let args: TypeIdVec = args
                .iter()
                .map(|a| a.ok_or_else(|| CallError::null(Slot::TypeArguments)))
                .collect::<Result<_, _>>()?;
            bind_generic(db, candidate, &args).map(Some)
        }
        None if !is_generic => Ok(Some(candidate)),
        None => {
            if arg_types.len() != param_count {
                return Ok(None);
            }
            let arg_types: Vec<TypeId> = arg_types
                .iter()
                .map(|a| a.ok_or_else(|| CallError::null(Slot::Arguments)))
                .collect::<Result<_, _>>()?;
            match db.infer_generic_binding(candidate, &arg_types) {
                Some(args) => bind_generic(db, candidate, &args).map(Some),
                None => {
                    tracing::trace!(?candidate, "inference inconclusive");
                    Ok(None)
                }
            }
        }
    }
}

/// Check constraints, then close the generic definition over `args`.
fn bind_generic(
    db: &mut CompilationDb,
    method: MethodId,
    args: &[TypeId],
) -> Result<MethodId, CallError> {
    let type_params = db.method(method).type_params.clone();
    let subs: TypeSubstitutions = type_params
        .iter()
        .zip(args)
        .map(|(tp, &arg)| (tp.id, arg))
        .collect();

    for (tp, &arg) in type_params.iter().zip(args) {
        let constraints: ConstraintSet = tp
            .constraints
            .iter()
            .map(|c| match *c {
                TypeConstraint::Subtype(base) => {
                    TypeConstraint::Subtype(db.types.substitute(base, &subs))
                }
                other => other,
            })
            .collect();
        if let Some(violated) = constraints
            .iter()
            .find(|c| !db.satisfies_constraints(arg, std::slice::from_ref(*c)))
        {
            return Err(CallError::ConstraintViolation {
                method: db.display_method(method),
                param: tp.name.clone(),
                type_name: db.display_type(arg),
                constraint: constraint_text(db, *violated),
            });
        }
    }

    Ok(db.entities.instantiate_generic(&mut db.types, method, args))
}

fn constraint_text(db: &CompilationDb, constraint: TypeConstraint) -> String {
    match constraint {
        TypeConstraint::Subtype(base) => db.display_type(base),
        other => other.to_string(),
    }
}

/// Arity must match exactly, arguments must be present and assignable.
fn is_compatible(
    db: &CompilationDb,
    method: MethodId,
    arg_types: &[Option<TypeId>],
) -> Result<bool, CallError> {
    let def = db.method(method);
    if def.param_count() != arg_types.len() {
        return Ok(false);
    }
    for (param, arg) in def.params.iter().zip(arg_types) {
        let arg = arg.ok_or_else(|| CallError::null(Slot::Arguments))?;
        if !db.is_assignable(param.ty, arg) {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests;
