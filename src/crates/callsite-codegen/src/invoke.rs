// src/crates/callsite-codegen/src/invoke.rs
//
// The call boundary shared by both strategies: copy receiver and arguments in,
// run the body, write back whatever storage allows it.

use smallvec::SmallVec;

use crate::errors::{CompileError, CompileResult};
use crate::frame::Frame;
use crate::place::Place;
use callsite_identity::MethodId;
use callsite_runtime::{Runtime, RuntimeError, Value};
use callsite_sema::{CompilationDb, ParamMode, TypeId};

/// How the receiver of a call is passed, decided at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverMode {
    /// Static method
    Absent,
    /// Reference-typed receivers and methods declared on `object`
    Value,
    /// Value-type instance method: the receiver's storage is used in place
    Place,
}

/// An evaluated receiver.
#[derive(Debug)]
pub enum Receiver {
    Absent,
    Value(Value),
    Place(Place),
}

/// An evaluated argument.
#[derive(Debug)]
pub enum Argument {
    Value(Value),
    /// A by-reference argument; `out` arguments ignore the current value
    ByRef { place: Place, mode: ParamMode },
}

pub type Arguments = SmallVec<[Argument; 4]>;

/// Receiver passing mode for `method` called on an expression of type `receiver_ty`.
pub fn receiver_mode(db: &CompilationDb, method: MethodId, receiver_ty: Option<TypeId>) -> ReceiverMode {
    let def = db.method(method);
    if def.is_static {
        return ReceiverMode::Absent;
    }
    match receiver_ty {
        Some(ty) if db.types.is_value_type(ty) && def.declaring_type != TypeId::OBJECT => {
            ReceiverMode::Place
        }
        _ => ReceiverMode::Value,
    }
}

/// Parameter passing modes of a call, in argument order.
pub fn param_modes(db: &CompilationDb, method: MethodId) -> SmallVec<[ParamMode; 4]> {
    db.method(method).params.iter().map(|p| p.mode).collect()
}

/// Whether a method has a body the runtime can run.
pub fn check_body(rt: &Runtime, method: MethodId) -> CompileResult<()> {
    if rt.has_body(method) {
        Ok(())
    } else {
        Err(CompileError::MissingBody {
            method: rt.db().display_method(method),
        })
    }
}

/// Invoke `method`, then write the receiver and by-ref arguments back.
#[tracing::instrument(level = "trace", skip_all, fields(method = ?method))]
pub fn invoke(
    frame: &mut Frame,
    rt: &Runtime,
    method: MethodId,
    receiver: Receiver,
    args: Arguments,
) -> Result<Value, RuntimeError> {
    let def = rt.db().method(method);
    let mut values: SmallVec<[Value; 4]> = SmallVec::with_capacity(args.len());
    for (arg, param) in args.iter().zip(&def.params) {
        let value = match arg {
            Argument::Value(value) => value.clone(),
            Argument::ByRef {
                mode: ParamMode::Out,
                ..
            } => rt.default_value(rt.db().types.element_of_by_ref(param.ty)),
            Argument::ByRef { place, .. } => place.load(frame, rt)?,
        };
        values.push(value);
    }

    // Mutations made before a body fails are still written back; the body's
    // error takes precedence over a failed store.
    let result = match receiver {
        Receiver::Absent => rt.invoke_native(method, None, &mut values),
        Receiver::Value(mut value) => {
            if value.is_null() {
                return Err(RuntimeError::null_reference(def.name.clone()));
            }
            rt.invoke_native(method, Some(&mut value), &mut values)
        }
        Receiver::Place(place) => {
            let mut value = place.load(frame, rt)?;
            let result = rt.invoke_native(method, Some(&mut value), &mut values);
            if place.is_addressable() {
                let stored = place.store(frame, rt, value);
                result.and_then(|result| stored.map(|()| result))
            } else {
                result
            }
        }
    };

    let mut write_back: Result<(), RuntimeError> = Ok(());
    for (arg, value) in args.iter().zip(values) {
        if let Argument::ByRef { place, .. } = arg
            && place.is_addressable()
        {
            let stored = place.store(frame, rt, value);
            write_back = write_back.and(stored);
        }
    }
    let result = result?;
    write_back?;
    Ok(result)
}
