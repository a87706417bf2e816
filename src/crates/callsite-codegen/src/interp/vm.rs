// src/crates/callsite-codegen/src/interp/vm.rs
//
// The stack machine. Operands are either values or places; calls pop their
// receiver and arguments in the modes fixed at lowering time.

use std::fmt;

use smallvec::SmallVec;

use crate::frame::Frame;
use crate::invoke::{self, Argument, Arguments, Receiver, ReceiverMode};
use crate::place::{self, Place};
use crate::strategy::Executable;
use callsite_identity::MethodId;
use callsite_runtime::{Runtime, RuntimeError, StaticKey, Value};
use callsite_sema::{ParamMode, TypeId};

#[derive(Debug, Clone)]
pub enum Instr {
    /// Push a copy of a parameter
    LoadParam(usize),
    LoadConst(Value),
    /// Push the storage of a parameter
    AddrParam(usize),
    AddrStatic(StaticKey),
    /// Pop an owner (a heap object value or a struct place), push its field
    AddrField { index: usize, owner_is_ref: bool },
    /// Pop `rank` indices and an array, push the element
    AddrElement { rank: usize },
    /// Pop a box, push its contents
    AddrUnbox(TypeId),
    /// Pop a place, seed the temporary from it if unset, push the temporary
    AddrTemp(usize),
    /// Pop a value, push it as a temporary place
    Detach,
    /// Pop a place, push its current value
    Load,
    /// Pop arguments (last on top) then the receiver; push the result
    Call {
        method: MethodId,
        receiver: ReceiverMode,
        args: SmallVec<[ParamMode; 4]>,
    },
    Pop,
}

enum Operand {
    Value(Value),
    Place(Place),
}

/// A lowered lambda body.
pub struct Program {
    pub(crate) code: Vec<Instr>,
}

impl Program {
    pub fn instructions(&self) -> &[Instr] {
        &self.code
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.code).finish()
    }
}

impl Executable for Program {
    fn execute(&self, frame: &mut Frame, rt: &Runtime) -> Result<Value, RuntimeError> {
        let mut vm = Machine {
            frame,
            rt,
            stack: Vec::with_capacity(8),
        };
        for instr in &self.code {
            vm.step(instr)?;
        }
        match vm.stack.pop() {
            Some(operand) => vm.read(operand),
            None => Ok(Value::Void),
        }
    }
}

struct Machine<'a> {
    frame: &'a mut Frame,
    rt: &'a Runtime,
    stack: Vec<Operand>,
}

impl Machine<'_> {
    fn step(&mut self, instr: &Instr) -> Result<(), RuntimeError> {
        tracing::trace!(?instr, depth = self.stack.len(), "step");
        match instr {
            Instr::LoadParam(slot) => {
                let value = Place::Slot(*slot).load(self.frame, self.rt)?;
                self.push_value(value);
            }
            Instr::LoadConst(value) => self.push_value(value.clone()),
            Instr::AddrParam(slot) => self.push_place(Place::Slot(*slot)),
            Instr::AddrStatic(key) => self.push_place(Place::Static(*key)),
            Instr::AddrField {
                index,
                owner_is_ref,
            } => {
                let place = if *owner_is_ref {
                    place::object_field(self.pop_value()?, *index)?
                } else {
                    Place::StructField {
                        base: Box::new(self.pop_place()?),
                        index: *index,
                    }
                };
                self.push_place(place);
            }
            Instr::AddrElement { rank } => {
                let mut indices: SmallVec<[Value; 2]> = SmallVec::with_capacity(*rank);
                for _ in 0..*rank {
                    indices.push(self.pop_value()?);
                }
                indices.reverse();
                let array = self.pop_value()?;
                self.push_place(place::element(array, &indices)?);
            }
            Instr::AddrUnbox(ty) => {
                let boxed = self.pop_value()?;
                self.push_place(place::unboxed(self.rt, boxed, *ty)?);
            }
            Instr::AddrTemp(temp) => {
                let current = self.pop_value()?;
                self.frame.init_temp(*temp, current);
                self.push_place(Place::Temp(*temp));
            }
            Instr::Detach => {
                let value = self.pop_value()?;
                self.push_place(Place::Detached(value));
            }
            Instr::Load => {
                let value = self.pop_value()?;
                self.push_value(value);
            }
            Instr::Call {
                method,
                receiver,
                args,
            } => {
                let mut popped = Arguments::with_capacity(args.len());
                for mode in args.iter().rev() {
                    popped.push(match mode {
                        ParamMode::Value => Argument::Value(self.pop_value()?),
                        ParamMode::Ref | ParamMode::Out => Argument::ByRef {
                            place: self.pop_place()?,
                            mode: *mode,
                        },
                    });
                }
                popped.reverse();
                let receiver = match receiver {
                    ReceiverMode::Absent => Receiver::Absent,
                    ReceiverMode::Value => Receiver::Value(self.pop_value()?),
                    ReceiverMode::Place => Receiver::Place(self.pop_place()?),
                };
                let result = invoke::invoke(self.frame, self.rt, *method, receiver, popped)?;
                self.push_value(result);
            }
            Instr::Pop => {
                self.pop()?;
            }
        }
        Ok(())
    }

    fn push_value(&mut self, value: Value) {
        self.stack.push(Operand::Value(value));
    }

    fn push_place(&mut self, place: Place) {
        self.stack.push(Operand::Place(place));
    }

    fn pop(&mut self) -> Result<Operand, RuntimeError> {
        self.stack
            .pop()
            .ok_or_else(|| RuntimeError::failed("interpreter", "operand stack underflow"))
    }

    /// Pop a value; a place on top is read.
    fn pop_value(&mut self) -> Result<Value, RuntimeError> {
        let operand = self.pop()?;
        self.read(operand)
    }

    /// Pop a place; a value on top becomes a temporary.
    fn pop_place(&mut self) -> Result<Place, RuntimeError> {
        Ok(match self.pop()? {
            Operand::Place(place) => place,
            Operand::Value(value) => Place::Detached(value),
        })
    }

    fn read(&self, operand: Operand) -> Result<Value, RuntimeError> {
        match operand {
            Operand::Value(value) => Ok(value),
            Operand::Place(place) => place.load(self.frame, self.rt),
        }
    }
}
