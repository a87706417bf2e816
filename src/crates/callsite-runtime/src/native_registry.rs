// src/crates/callsite-runtime/src/native_registry.rs
//! Registry of native method bodies, keyed by the method definition that owns them.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::errors::RuntimeError;
use crate::runtime::Runtime;
use crate::value::Value;
use callsite_identity::MethodId;

/// A method body. Receives copies of the receiver and arguments; whatever it
/// leaves in them is written back by the caller where the storage allows.
pub type NativeBody = Arc<dyn Fn(&mut CallArgs<'_>) -> Result<Value, RuntimeError> + Send + Sync>;

/// Receiver and arguments of one invocation, as seen by a body.
pub struct CallArgs<'a> {
    method: MethodId,
    receiver: Option<&'a mut Value>,
    args: &'a mut [Value],
    runtime: &'a Runtime,
}

impl<'a> CallArgs<'a> {
    pub fn new(
        method: MethodId,
        receiver: Option<&'a mut Value>,
        args: &'a mut [Value],
        runtime: &'a Runtime,
    ) -> Self {
        Self {
            method,
            receiver,
            args,
            runtime,
        }
    }

    /// The closed method being invoked (not the body's definition).
    pub fn method(&self) -> MethodId {
        self.method
    }

    pub fn runtime(&self) -> &Runtime {
        self.runtime
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn receiver(&self) -> Result<&Value, RuntimeError> {
        match self.receiver.as_deref() {
            Some(Value::Null) | None => Err(RuntimeError::null_reference("receiver")),
            Some(value) => Ok(value),
        }
    }

    pub fn receiver_mut(&mut self) -> Result<&mut Value, RuntimeError> {
        match self.receiver.as_deref_mut() {
            Some(Value::Null) | None => Err(RuntimeError::null_reference("receiver")),
            Some(value) => Ok(value),
        }
    }

    pub fn arg(&self, index: usize) -> Result<&Value, RuntimeError> {
        let found = self.args.len();
        self.args.get(index).ok_or(RuntimeError::ArgumentCount {
            expected: index + 1,
            found,
        })
    }

    pub fn arg_mut(&mut self, index: usize) -> Result<&mut Value, RuntimeError> {
        let found = self.args.len();
        self.args.get_mut(index).ok_or(RuntimeError::ArgumentCount {
            expected: index + 1,
            found,
        })
    }

    pub fn arg_i32(&self, index: usize) -> Result<i32, RuntimeError> {
        let value = self.arg(index)?;
        value
            .as_i32()
            .ok_or_else(|| RuntimeError::invalid_cast("i32", value.kind_name()))
    }

    /// Read an instance field of the receiver (struct copy or heap object).
    pub fn load_field(&self, slot: usize) -> Result<Value, RuntimeError> {
        let field = match self.receiver()? {
            Value::Struct(s) => s.fields.get(slot).cloned(),
            Value::Object(o) => o.field(slot),
            other => return Err(RuntimeError::invalid_cast("object", other.kind_name())),
        };
        field.ok_or(RuntimeError::IndexOutOfRange)
    }

    /// Write an instance field of the receiver. Struct receivers are mutated in
    /// place; the caller decides whether that copy reaches real storage.
    pub fn store_field(&mut self, slot: usize, value: Value) -> Result<(), RuntimeError> {
        match self.receiver_mut()? {
            Value::Struct(s) => match s.fields.get_mut(slot) {
                Some(field) => {
                    *field = value;
                    Ok(())
                }
                None => Err(RuntimeError::IndexOutOfRange),
            },
            Value::Object(o) => {
                if o.set_field(slot, value) {
                    Ok(())
                } else {
                    Err(RuntimeError::IndexOutOfRange)
                }
            }
            other => Err(RuntimeError::invalid_cast("object", other.kind_name())),
        }
    }
}

/// Native bodies for method definitions.
#[derive(Default, Clone)]
pub struct NativeRegistry {
    bodies: FxHashMap<MethodId, NativeBody>,
}

impl NativeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the body of a method definition. Closed instantiations of a
    /// generic definition share it.
    pub fn register<F>(&mut self, method: MethodId, body: F)
    where
        F: Fn(&mut CallArgs<'_>) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        self.bodies.insert(method, Arc::new(body));
    }

    pub fn get(&self, method: MethodId) -> Option<&NativeBody> {
        self.bodies.get(&method)
    }

    pub fn contains(&self, method: MethodId) -> bool {
        self.bodies.contains_key(&method)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl fmt::Debug for NativeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeRegistry")
            .field("bodies", &self.bodies.len())
            .finish()
    }
}
