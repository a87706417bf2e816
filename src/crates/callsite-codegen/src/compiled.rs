// src/crates/callsite-codegen/src/compiled.rs
//
// Ahead-of-time strategy: the expression tree is compiled once into nested
// closures. Every decision that depends only on the tree (receiver mode,
// addressability, slots, temporaries, literal values) is made here; the
// closures only evaluate owners and move values.

use smallvec::SmallVec;

use crate::errors::{CompileError, CompileResult};
use crate::frame::{Bindings, Frame};
use crate::invoke::{self, Argument, Arguments, Receiver, ReceiverMode};
use crate::literal::{constant_value, literal_value};
use crate::place::{self, Place};
use crate::strategy::Executable;
use callsite_expr::{AddressableLocation, CallNode, Expr, ExprKind, FieldOwner, classify};
use callsite_identity::MethodId;
use callsite_runtime::{Runtime, RuntimeError, StaticKey, Value};
use callsite_sema::{CompilationDb, ParamMode};

type ValueFn = Box<dyn Fn(&mut Frame, &Runtime) -> Result<Value, RuntimeError> + Send + Sync>;
type PlaceFn = Box<dyn Fn(&mut Frame, &Runtime) -> Result<Place, RuntimeError> + Send + Sync>;

enum ReceiverFn {
    Absent,
    Value(ValueFn),
    Place(PlaceFn),
}

enum ArgFn {
    Value(ValueFn),
    ByRef(PlaceFn, ParamMode),
}

/// A lambda body compiled to closures.
pub struct CompiledBody {
    body: ValueFn,
}

impl Executable for CompiledBody {
    fn execute(&self, frame: &mut Frame, rt: &Runtime) -> Result<Value, RuntimeError> {
        (self.body)(frame, rt)
    }
}

pub struct ClosureCompiler<'a> {
    rt: &'a Runtime,
    bindings: &'a mut Bindings,
}

impl<'a> ClosureCompiler<'a> {
    pub fn new(rt: &'a Runtime, bindings: &'a mut Bindings) -> Self {
        Self { rt, bindings }
    }

    fn db(&self) -> &'a CompilationDb {
        self.rt.db()
    }

    pub fn compile(mut self, body: &Expr) -> CompileResult<CompiledBody> {
        let body = self.value(body)?;
        Ok(CompiledBody { body })
    }

    // ========================================================================
    // Values
    // ========================================================================

    fn value(&mut self, expr: &Expr) -> CompileResult<ValueFn> {
        match &expr.kind {
            ExprKind::Parameter(param) => {
                let slot = self.bindings.slot_of(param)?;
                Ok(Box::new(move |frame, rt| Place::Slot(slot).load(frame, rt)))
            }
            ExprKind::Constant(literal) => {
                let value = literal_value(self.rt, literal, expr.ty);
                Ok(Box::new(move |_, _| Ok(value.clone())))
            }
            ExprKind::Field { .. } | ExprKind::ArrayIndex { .. } | ExprKind::Unbox(_) => {
                let loc = classify(self.db(), expr);
                let place = self.place(&loc)?;
                Ok(Box::new(move |frame, rt| {
                    let place = place(frame, rt)?;
                    place.load(frame, rt)
                }))
            }
            ExprKind::Property {
                owner,
                property,
                getter,
                args,
            } => {
                let getter = getter.ok_or_else(|| CompileError::WriteOnly {
                    property: self.db().property(*property).name.clone(),
                })?;
                let args: Vec<&Expr> = args.iter().collect();
                self.invocation(getter, owner.as_deref(), &args)
            }
            ExprKind::Call(call) => self.call(call),
            ExprKind::Block(children) => {
                let children = children
                    .iter()
                    .map(|child| self.value(child))
                    .collect::<CompileResult<Vec<_>>>()?;
                Ok(Box::new(move |frame, rt| {
                    let mut last = Value::Void;
                    for child in &children {
                        last = child(frame, rt)?;
                    }
                    Ok(last)
                }))
            }
        }
    }

    fn call(&mut self, call: &CallNode) -> CompileResult<ValueFn> {
        let args: Vec<&Expr> = call.args().iter().collect();
        self.invocation(call.method(), call.receiver(), &args)
    }

    /// A method invocation with the receiver and by-ref rules applied.
    fn invocation(
        &mut self,
        method: MethodId,
        receiver: Option<&Expr>,
        args: &[&Expr],
    ) -> CompileResult<ValueFn> {
        invoke::check_body(self.rt, method)?;
        let mode = invoke::receiver_mode(self.db(), method, receiver.map(|r| r.ty));
        let receiver = match (mode, receiver) {
            (ReceiverMode::Absent, _) | (_, None) => ReceiverFn::Absent,
            (ReceiverMode::Value, Some(r)) => ReceiverFn::Value(self.value(r)?),
            (ReceiverMode::Place, Some(r)) => {
                let loc = classify(self.db(), r);
                ReceiverFn::Place(self.place(&loc)?)
            }
        };
        let modes = invoke::param_modes(self.db(), method);
        let mut arg_fns: SmallVec<[ArgFn; 4]> = SmallVec::with_capacity(args.len());
        for (&arg, mode) in args.iter().zip(modes) {
            let arg_fn = if mode.is_by_ref() {
                let loc = classify(self.db(), arg);
                ArgFn::ByRef(self.place(&loc)?, mode)
            } else {
                ArgFn::Value(self.value(arg)?)
            };
            arg_fns.push(arg_fn);
        }

        Ok(Box::new(move |frame, rt| {
            let receiver = match &receiver {
                ReceiverFn::Absent => Receiver::Absent,
                ReceiverFn::Value(value) => Receiver::Value(value(frame, rt)?),
                ReceiverFn::Place(place) => Receiver::Place(place(frame, rt)?),
            };
            let mut args = Arguments::with_capacity(arg_fns.len());
            for arg in &arg_fns {
                args.push(match arg {
                    ArgFn::Value(value) => Argument::Value(value(frame, rt)?),
                    ArgFn::ByRef(place, mode) => Argument::ByRef {
                        place: place(frame, rt)?,
                        mode: *mode,
                    },
                });
            }
            invoke::invoke(frame, rt, method, receiver, args)
        }))
    }

    // ========================================================================
    // Places
    // ========================================================================

    fn place(&mut self, loc: &AddressableLocation<'_>) -> CompileResult<PlaceFn> {
        match loc {
            AddressableLocation::Parameter(param) => {
                let slot = self.bindings.slot_of(param)?;
                Ok(Box::new(move |_, _| Ok(Place::Slot(slot))))
            }
            AddressableLocation::Field {
                owner,
                field,
                slot,
                readonly,
            } => {
                let index = *slot;
                let field_place: PlaceFn = match owner {
                    FieldOwner::Heap(expr) => {
                        let owner = self.value(expr)?;
                        Box::new(move |frame, rt| place::object_field(owner(frame, rt)?, index))
                    }
                    FieldOwner::Inline(inner) => {
                        let base = self.place(inner)?;
                        Box::new(move |frame, rt| {
                            Ok(Place::StructField {
                                base: Box::new(base(frame, rt)?),
                                index,
                            })
                        })
                    }
                };
                if !*readonly {
                    return Ok(field_place);
                }
                let temp = self.bindings.readonly_temp(owner, *field);
                Ok(Box::new(move |frame, rt| {
                    let current = field_place(frame, rt)?.load(frame, rt)?;
                    frame.init_temp(temp, current);
                    Ok(Place::Temp(temp))
                }))
            }
            AddressableLocation::StaticField {
                field,
                declaring,
                constant,
            } => match constant {
                Some(value) => {
                    let value = constant_value(value);
                    Ok(Box::new(move |_, _| Ok(Place::Detached(value.clone()))))
                }
                None => {
                    let key = StaticKey {
                        field: *field,
                        declaring: *declaring,
                    };
                    Ok(Box::new(move |_, _| Ok(Place::Static(key))))
                }
            },
            AddressableLocation::ArrayElement { array, indices } => {
                let array = self.value(array)?;
                let indices = indices
                    .iter()
                    .map(|index| self.value(index))
                    .collect::<CompileResult<Vec<_>>>()?;
                Ok(Box::new(move |frame, rt| {
                    let array = array(frame, rt)?;
                    let mut values: SmallVec<[Value; 2]> = SmallVec::with_capacity(indices.len());
                    for index in &indices {
                        values.push(index(frame, rt)?);
                    }
                    place::element(array, &values)
                }))
            }
            AddressableLocation::Unboxed { boxed, ty } => {
                let boxed = self.value(boxed)?;
                let ty = *ty;
                Ok(Box::new(move |frame, rt| place::unboxed(rt, boxed(frame, rt)?, ty)))
            }
            AddressableLocation::None(expr) => {
                let value = self.value(expr)?;
                Ok(Box::new(move |frame, rt| Ok(Place::Detached(value(frame, rt)?))))
            }
        }
    }
}
