// interp/tests.rs
//
// Lowering shape tests and interpreter-specific behaviour.

use std::sync::Arc;

use super::*;
use crate::frame::Bindings;
use crate::invoke::ReceiverMode;
use crate::strategy::Executable;
use callsite_expr::{ExprFactory, Lambda};
use callsite_identity::MethodId;
use callsite_runtime::{NativeRegistry, Runtime, Value};
use callsite_sema::{CompilationDb, FieldKind, MethodDefBuilder, ParamMode, TypeDefKind, TypeId};

struct Setup {
    db: CompilationDb,
    point_ty: TypeId,
    bump: MethodId,
    by_ref: MethodId,
}

fn setup() -> Setup {
    let mut db = CompilationDb::new();
    let point = db.define_type("Point", TypeDefKind::Struct, &[]);
    let point_ty = db.self_type(point);
    db.define_field(point, "x", TypeId::I32, FieldKind::Instance);
    let bump = db.define_method(MethodDefBuilder::new(point, "Bump", TypeId::I32));
    let ops = db.define_type("Ops", TypeDefKind::Class, &[]);
    let by_ref = db.define_method(
        MethodDefBuilder::new(ops, "Inc", TypeId::VOID)
            .is_static(true)
            .ref_param("x", TypeId::I32),
    );
    Setup {
        db,
        point_ty,
        bump,
        by_ref,
    }
}

fn natives(s: &Setup) -> NativeRegistry {
    let mut natives = NativeRegistry::new();
    natives.register(s.bump, |args| {
        let x = args.load_field(0)?.as_i32().unwrap_or_default();
        args.store_field(0, Value::I32(x + 1))?;
        Ok(Value::I32(x))
    });
    natives.register(s.by_ref, |args| {
        let x = args.arg_i32(0)?;
        *args.arg_mut(0)? = Value::I32(x + 1);
        Ok(Value::Void)
    });
    natives
}

fn lower(rt: &Runtime, lambda: &Lambda) -> (Program, Bindings) {
    let mut bindings = Bindings::for_lambda(lambda).unwrap();
    let program = Lowering::new(rt, &mut bindings).lower(&lambda.body).unwrap();
    (program, bindings)
}

#[test]
fn value_type_receiver_is_passed_as_a_place() {
    let mut s = setup();
    let natives = natives(&s);
    let mut f = ExprFactory::new(&mut s.db);
    let p = f.parameter(s.point_ty, Some("p"));
    let call = f.call_instance(p.clone(), s.bump, Vec::new()).unwrap();
    let lambda = f.lambda(call, vec![p]);
    let rt = Runtime::new(Arc::new(s.db), natives);

    let (program, _) = lower(&rt, &lambda);
    assert!(matches!(
        program.instructions(),
        [
            Instr::AddrParam(0),
            Instr::Call {
                receiver: ReceiverMode::Place,
                ..
            }
        ]
    ));
}

#[test]
fn by_ref_argument_through_a_constant_is_detached() {
    let mut s = setup();
    let natives = natives(&s);
    let mut f = ExprFactory::new(&mut s.db);
    let five = f.i32(5);
    let call = f.call_static(s.by_ref, [five]).unwrap();
    let lambda = f.lambda(call, Vec::new());
    let rt = Runtime::new(Arc::new(s.db), natives);

    let (program, _) = lower(&rt, &lambda);
    match program.instructions() {
        [Instr::LoadConst(Value::I32(5)), Instr::Detach, Instr::Call { args, .. }] => {
            assert_eq!(args.as_slice(), &[ParamMode::Ref]);
        }
        other => panic!("unexpected lowering: {other:?}"),
    }
}

#[test]
fn block_pops_all_but_the_last_value() {
    let mut s = setup();
    let natives = natives(&s);
    let mut f = ExprFactory::new(&mut s.db);
    let p = f.parameter(TypeId::I32, Some("x"));
    let call = f.call_static(s.by_ref, [p.clone()]).unwrap();
    let body = f.block(vec![call, p.clone()]);
    let lambda = f.lambda(body, vec![p]);
    let rt = Runtime::new(Arc::new(s.db), natives);

    let (program, bindings) = lower(&rt, &lambda);
    assert!(matches!(program.instructions().last(), Some(Instr::LoadParam(0))));
    assert!(program.instructions().iter().any(|i| matches!(i, Instr::Pop)));

    let mut frame = crate::frame::Frame::new(&[Value::I32(41)], bindings.temp_count());
    assert_eq!(program.execute(&mut frame, &rt), Ok(Value::I32(42)));
}

#[test]
fn empty_program_yields_void() {
    let s = setup();
    let rt = Runtime::new(Arc::new(s.db), NativeRegistry::new());
    let program = Program { code: Vec::new() };
    let mut frame = crate::frame::Frame::new(&[], 0);
    assert_eq!(program.execute(&mut frame, &rt), Ok(Value::Void));
}

#[test]
fn stack_underflow_is_an_error_not_a_panic() {
    let s = setup();
    let rt = Runtime::new(Arc::new(s.db), NativeRegistry::new());
    let program = Program {
        code: vec![Instr::Pop],
    };
    let mut frame = crate::frame::Frame::new(&[], 0);
    assert!(program.execute(&mut frame, &rt).is_err());
}
