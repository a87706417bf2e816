// src/crates/callsite-codegen/src/interp/lower.rs
//
// Lowering of expression trees to stack-machine instructions. Receiver modes,
// by-ref modes, slots and temporaries are resolved here exactly as the
// closure compiler resolves them.

use crate::errors::{CompileError, CompileResult};
use crate::frame::Bindings;
use crate::interp::vm::{Instr, Program};
use crate::invoke::{self, ReceiverMode};
use crate::literal::{constant_value, literal_value};
use callsite_expr::{AddressableLocation, Expr, ExprKind, FieldOwner, classify};
use callsite_identity::MethodId;
use callsite_runtime::{Runtime, StaticKey, Value};
use callsite_sema::CompilationDb;

pub struct Lowering<'a> {
    rt: &'a Runtime,
    bindings: &'a mut Bindings,
    code: Vec<Instr>,
}

impl<'a> Lowering<'a> {
    pub fn new(rt: &'a Runtime, bindings: &'a mut Bindings) -> Self {
        Self {
            rt,
            bindings,
            code: Vec::new(),
        }
    }

    fn db(&self) -> &'a CompilationDb {
        self.rt.db()
    }

    pub fn lower(mut self, body: &Expr) -> CompileResult<Program> {
        self.value(body)?;
        tracing::trace!(instructions = self.code.len(), "lowered");
        Ok(Program { code: self.code })
    }

    fn emit(&mut self, instr: Instr) {
        self.code.push(instr);
    }

    /// Emit code leaving the value of `expr` on the stack.
    fn value(&mut self, expr: &Expr) -> CompileResult<()> {
        match &expr.kind {
            ExprKind::Parameter(param) => {
                let slot = self.bindings.slot_of(param)?;
                self.emit(Instr::LoadParam(slot));
            }
            ExprKind::Constant(literal) => {
                let value = literal_value(self.rt, literal, expr.ty);
                self.emit(Instr::LoadConst(value));
            }
            ExprKind::Field { .. } | ExprKind::ArrayIndex { .. } | ExprKind::Unbox(_) => {
                let loc = classify(self.db(), expr);
                self.place(&loc)?;
                self.emit(Instr::Load);
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
                self.invocation(getter, owner.as_deref(), &args)?;
            }
            ExprKind::Call(call) => {
                let args: Vec<&Expr> = call.args().iter().collect();
                self.invocation(call.method(), call.receiver(), &args)?;
            }
            ExprKind::Block(children) => {
                if children.is_empty() {
                    self.emit(Instr::LoadConst(Value::Void));
                }
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        self.emit(Instr::Pop);
                    }
                    self.value(child)?;
                }
            }
        }
        Ok(())
    }

    fn invocation(
        &mut self,
        method: MethodId,
        receiver: Option<&Expr>,
        args: &[&Expr],
    ) -> CompileResult<()> {
        invoke::check_body(self.rt, method)?;
        let mut mode = invoke::receiver_mode(self.db(), method, receiver.map(|r| r.ty));
        match (mode, receiver) {
            (ReceiverMode::Absent, _) => {}
            (_, None) => mode = ReceiverMode::Absent,
            (ReceiverMode::Value, Some(r)) => self.value(r)?,
            (ReceiverMode::Place, Some(r)) => {
                let loc = classify(self.db(), r);
                self.place(&loc)?;
            }
        }
        let modes = invoke::param_modes(self.db(), method);
        for (&arg, param_mode) in args.iter().zip(&modes) {
            if param_mode.is_by_ref() {
                let loc = classify(self.db(), arg);
                self.place(&loc)?;
            } else {
                self.value(arg)?;
            }
        }
        self.emit(Instr::Call {
            method,
            receiver: mode,
            args: modes,
        });
        Ok(())
    }

    /// Emit code leaving the place of `loc` on the stack.
    fn place(&mut self, loc: &AddressableLocation<'_>) -> CompileResult<()> {
        match loc {
            AddressableLocation::Parameter(param) => {
                let slot = self.bindings.slot_of(param)?;
                self.emit(Instr::AddrParam(slot));
            }
            AddressableLocation::Field {
                owner,
                field,
                slot,
                readonly,
            } => {
                let owner_is_ref = match owner {
                    FieldOwner::Heap(expr) => {
                        self.value(expr)?;
                        true
                    }
                    FieldOwner::Inline(inner) => {
                        self.place(inner)?;
                        false
                    }
                };
                self.emit(Instr::AddrField {
                    index: *slot,
                    owner_is_ref,
                });
                if *readonly {
                    let temp = self.bindings.readonly_temp(owner, *field);
                    self.emit(Instr::AddrTemp(temp));
                }
            }
            AddressableLocation::StaticField {
                field,
                declaring,
                constant,
            } => match constant {
                Some(value) => {
                    self.emit(Instr::LoadConst(constant_value(value)));
                    self.emit(Instr::Detach);
                }
                None => self.emit(Instr::AddrStatic(StaticKey {
                    field: *field,
                    declaring: *declaring,
                })),
            },
            AddressableLocation::ArrayElement { array, indices } => {
                self.value(array)?;
                for index in indices.iter() {
                    self.value(index)?;
                }
                self.emit(Instr::AddrElement {
                    rank: indices.len(),
                });
            }
            AddressableLocation::Unboxed { boxed, ty } => {
                self.value(boxed)?;
                self.emit(Instr::AddrUnbox(*ty));
            }
            AddressableLocation::None(expr) => {
                self.value(expr)?;
                self.emit(Instr::Detach);
            }
        }
        Ok(())
    }
}
