// resolve/tests.rs
//
// Unit tests for name-based method resolution.

use super::*;
use crate::entity_defs::TypeDefKind;
use crate::entity_registry::MethodDefBuilder;
use crate::generic::TypeConstraint;
use callsite_identity::TypeDefId;

struct Universe {
    db: CompilationDb,
    host: TypeDefId,
    host_ty: TypeId,
}

/// A class `Host` with a spread of overloads and generic shapes.
fn universe() -> Universe {
    let mut db = CompilationDb::new();
    let host = db.define_type("Host", TypeDefKind::Class, &[]);
    let host_ty = db.self_type(host);

    db.define_method(MethodDefBuilder::new(host, "Method", TypeId::VOID));
    db.define_method(MethodDefBuilder::new(host, "Method", TypeId::VOID).param("x", TypeId::I32));
    db.define_method(
        MethodDefBuilder::new(host, "StaticMethod", TypeId::VOID)
            .is_static(true)
            .param("s", TypeId::STRING),
    );

    let (tp, _) = db.fresh_type_param("T");
    db.define_method(
        MethodDefBuilder::new(host, "Generic", TypeId::VOID)
            .is_static(true)
            .type_param(tp),
    );

    let (tp, t2) = db.fresh_type_param("T");
    db.define_method(
        MethodDefBuilder::new(host, "Echo", t2)
            .is_static(true)
            .type_param(tp)
            .param("value", t2),
    );

    let (tp, t3) = db.fresh_type_param("T");
    let tp = tp.with_constraint(TypeConstraint::ValueType);
    db.define_method(
        MethodDefBuilder::new(host, "Constrained", TypeId::VOID)
            .is_static(true)
            .type_param(tp)
            .param("value", t3),
    );

    db.define_method(
        MethodDefBuilder::new(host, "Hidden", TypeId::VOID)
            .is_static(true)
            .is_public(false),
    );
    db.define_method(
        MethodDefBuilder::new(host, "Shadowed", TypeId::I32)
            .is_static(true)
            .is_public(false)
            .param("o", TypeId::OBJECT),
    );
    db.define_method(
        MethodDefBuilder::new(host, "Shadowed", TypeId::I64)
            .is_static(true)
            .param("s", TypeId::STRING),
    );

    Universe { db, host, host_ty }
}

#[test]
fn resolves_overload_by_arity() {
    let mut u = universe();
    let target = ResolveTarget::instance(u.host_ty);
    let none = resolve_method(&mut u.db, target, "Method", None, &[]).unwrap();
    let one = resolve_method(&mut u.db, target, "Method", None, &[Some(TypeId::I32)]).unwrap();
    assert_eq!(u.db.method(none).param_count(), 0);
    assert_eq!(u.db.method(one).param_count(), 1);
}

#[test]
fn name_matching_ignores_case() {
    let mut u = universe();
    let target = ResolveTarget::static_on(u.host_ty);
    let found =
        resolve_method(&mut u.db, target, "staticmethod", None, &[Some(TypeId::STRING)]).unwrap();
    assert_eq!(u.db.method(found).name, "StaticMethod");
}

#[test]
fn call_form_filters_candidates() {
    let mut u = universe();
    let err = resolve_method(
        &mut u.db,
        ResolveTarget::instance(u.host_ty),
        "StaticMethod",
        None,
        &[Some(TypeId::STRING)],
    )
    .unwrap_err();
    assert!(matches!(err, CallError::MethodNotFound { .. }));
}

#[test]
fn open_generic_without_inference_is_not_found() {
    let mut u = universe();
    let err = resolve_method(&mut u.db, ResolveTarget::static_on(u.host_ty), "Generic", None, &[])
        .unwrap_err();
    assert!(matches!(err, CallError::MethodNotFound { .. }));
}

#[test]
fn explicit_type_arguments_close_the_method() {
    let mut u = universe();
    let target = ResolveTarget::static_on(u.host_ty);
    let found =
        resolve_method(&mut u.db, target, "Generic", Some(&[Some(TypeId::STRING)]), &[]).unwrap();
    assert!(u.db.is_closed(found));
    let origin = u.db.method(found).generic_origin.as_ref().unwrap();
    assert_eq!(origin.type_args.as_slice(), &[TypeId::STRING]);
}

#[test]
fn wrong_type_argument_count_is_not_found() {
    let mut u = universe();
    let target = ResolveTarget::static_on(u.host_ty);
    let err = resolve_method(
        &mut u.db,
        target,
        "Generic",
        Some(&[Some(TypeId::I32), Some(TypeId::I32)]),
        &[],
    )
    .unwrap_err();
    assert!(matches!(err, CallError::MethodNotFound { .. }));

    let err = resolve_method(
        &mut u.db,
        target,
        "StaticMethod",
        Some(&[Some(TypeId::I32)]),
        &[Some(TypeId::STRING)],
    )
    .unwrap_err();
    assert!(matches!(err, CallError::MethodNotFound { .. }));
}

#[test]
fn empty_type_argument_list_means_not_supplied() {
    let mut u = universe();
    let target = ResolveTarget::static_on(u.host_ty);
    let found =
        resolve_method(&mut u.db, target, "StaticMethod", Some(&[]), &[Some(TypeId::STRING)]);
    assert!(found.is_ok());
}

#[test]
fn null_type_argument_is_argument_null() {
    let mut u = universe();
    let err = resolve_method(
        &mut u.db,
        ResolveTarget::static_on(u.host_ty),
        "Generic",
        Some(&[None]),
        &[],
    )
    .unwrap_err();
    assert_eq!(err, CallError::null(Slot::TypeArguments));
}

#[test]
fn inference_binds_from_arguments() {
    let mut u = universe();
    let found = resolve_method(
        &mut u.db,
        ResolveTarget::static_on(u.host_ty),
        "Echo",
        None,
        &[Some(TypeId::STRING)],
    )
    .unwrap();
    assert_eq!(u.db.method(found).return_type, TypeId::STRING);
}

#[test]
fn constraint_violation_is_terminal() {
    let mut u = universe();
    let target = ResolveTarget::static_on(u.host_ty);
    let err = resolve_method(
        &mut u.db,
        target,
        "Constrained",
        Some(&[Some(TypeId::STRING)]),
        &[Some(TypeId::STRING)],
    )
    .unwrap_err();
    assert!(matches!(err, CallError::ConstraintViolation { .. }));

    let err = resolve_method(&mut u.db, target, "Constrained", None, &[Some(TypeId::STRING)])
        .unwrap_err();
    assert!(matches!(err, CallError::ConstraintViolation { .. }));

    assert!(
        resolve_method(&mut u.db, target, "Constrained", None, &[Some(TypeId::I32)]).is_ok()
    );
}

#[test]
fn null_argument_at_matching_arity_is_argument_null() {
    let mut u = universe();
    let err = resolve_method(
        &mut u.db,
        ResolveTarget::static_on(u.host_ty),
        "StaticMethod",
        None,
        &[None],
    )
    .unwrap_err();
    assert_eq!(err, CallError::null(Slot::Arguments));
}

#[test]
fn public_candidates_shadow_non_public_ones() {
    let mut u = universe();
    let target = ResolveTarget::static_on(u.host_ty);
    let found =
        resolve_method(&mut u.db, target, "Shadowed", None, &[Some(TypeId::STRING)]).unwrap();
    assert_eq!(u.db.method(found).return_type, TypeId::I64);

    // A lone non-public candidate is still found.
    assert!(resolve_method(&mut u.db, target, "Hidden", None, &[]).is_ok());
}

#[test]
fn inherited_methods_are_found() {
    let mut u = universe();
    let derived = u.db.define_type("Derived", TypeDefKind::Class, &[]);
    u.db.entities.set_base(derived, u.host_ty);
    let derived_ty = u.db.self_type(derived);
    let found =
        resolve_method(&mut u.db, ResolveTarget::instance(derived_ty), "Method", None, &[]).unwrap();
    assert_eq!(u.db.method(found).defining_type, u.host);
}

#[test]
fn not_found_names_the_type() {
    let mut u = universe();
    let err = resolve_method(&mut u.db, ResolveTarget::instance(u.host_ty), "Missing", None, &[])
        .unwrap_err();
    assert!(err.to_string().contains("'Host'"));
}
