// src/crates/callsite-codegen/src/place.rs
//
// Resolved storage locations.
//
// A `Place` is what an `AddressableLocation` becomes once its owner
// expressions have been evaluated for one invocation. Loads copy the current
// value out; stores write it back. Stores into a struct field are a
// read-modify-write of the enclosing place, so a write persists exactly as far
// as the outermost place allows. `Detached` places are temporaries and
// silently drop every store.

use crate::frame::Frame;
use callsite_runtime::{ArrayRef, BoxRef, ObjectRef, Runtime, RuntimeError, StaticKey, Value};
use callsite_sema::TypeId;

#[derive(Debug, Clone)]
pub enum Place {
    /// A lambda parameter
    Slot(usize),
    /// A per-invocation temporary
    Temp(usize),
    /// A field inside a struct stored at `base`
    StructField { base: Box<Place>, index: usize },
    /// A field of a heap object
    ObjectField { object: ObjectRef, index: usize },
    Static(StaticKey),
    Element { array: ArrayRef, offset: usize },
    /// The contents of a box
    Unboxed(BoxRef),
    /// A temporary copy; writes are discarded
    Detached(Value),
}

impl Place {
    pub fn is_addressable(&self) -> bool {
        match self {
            Place::Detached(_) => false,
            Place::StructField { base, .. } => base.is_addressable(),
            _ => true,
        }
    }

    pub fn load(&self, frame: &Frame, rt: &Runtime) -> Result<Value, RuntimeError> {
        match self {
            Place::Slot(index) => frame
                .slots
                .get(*index)
                .cloned()
                .ok_or(RuntimeError::IndexOutOfRange),
            Place::Temp(index) => Ok(frame
                .temps
                .get(*index)
                .cloned()
                .flatten()
                .unwrap_or(Value::Null)),
            Place::StructField { base, index } => match base.load(frame, rt)? {
                Value::Struct(s) => s
                    .fields
                    .get(*index)
                    .cloned()
                    .ok_or(RuntimeError::IndexOutOfRange),
                Value::Null => Err(RuntimeError::null_reference("field owner")),
                other => Err(RuntimeError::invalid_cast("struct", other.kind_name())),
            },
            Place::ObjectField { object, index } => {
                object.field(*index).ok_or(RuntimeError::IndexOutOfRange)
            }
            Place::Static(key) => Ok(rt.load_static(*key)),
            Place::Element { array, offset } => {
                array.get(*offset).ok_or(RuntimeError::IndexOutOfRange)
            }
            Place::Unboxed(boxed) => Ok(boxed.get()),
            Place::Detached(value) => Ok(value.clone()),
        }
    }

    pub fn store(&self, frame: &mut Frame, rt: &Runtime, value: Value) -> Result<(), RuntimeError> {
        match self {
            Place::Slot(index) => {
                let slot = frame
                    .slots
                    .get_mut(*index)
                    .ok_or(RuntimeError::IndexOutOfRange)?;
                *slot = value;
            }
            Place::Temp(index) => {
                let temp = frame
                    .temps
                    .get_mut(*index)
                    .ok_or(RuntimeError::IndexOutOfRange)?;
                *temp = Some(value);
            }
            Place::StructField { base, index } => {
                if !base.is_addressable() {
                    return Ok(());
                }
                let mut owner = base.load(frame, rt)?;
                let Some(s) = owner.as_struct_mut() else {
                    return Err(RuntimeError::invalid_cast("struct", owner.kind_name()));
                };
                let field = s
                    .fields
                    .get_mut(*index)
                    .ok_or(RuntimeError::IndexOutOfRange)?;
                *field = value;
                base.store(frame, rt, owner)?;
            }
            Place::ObjectField { object, index } => {
                if !object.set_field(*index, value) {
                    return Err(RuntimeError::IndexOutOfRange);
                }
            }
            Place::Static(key) => rt.store_static(*key, value),
            Place::Element { array, offset } => {
                if !array.set(*offset, value) {
                    return Err(RuntimeError::IndexOutOfRange);
                }
            }
            Place::Unboxed(boxed) => boxed.set(value),
            Place::Detached(_) => {}
        }
        Ok(())
    }
}

// ============================================================================
// Place construction from evaluated owners
// ============================================================================

/// The heap field `index` of an evaluated owner.
pub fn object_field(owner: Value, index: usize) -> Result<Place, RuntimeError> {
    match owner {
        Value::Object(object) => Ok(Place::ObjectField { object, index }),
        Value::Null => Err(RuntimeError::null_reference("field owner")),
        other => Err(RuntimeError::invalid_cast("object", other.kind_name())),
    }
}

/// Element `indices` of an evaluated array.
pub fn element(array: Value, indices: &[Value]) -> Result<Place, RuntimeError> {
    let array = match array {
        Value::Array(array) => array,
        Value::Null => return Err(RuntimeError::null_reference("array")),
        other => return Err(RuntimeError::invalid_cast("array", other.kind_name())),
    };
    let indices = indices
        .iter()
        .map(|i| {
            i.as_i32()
                .ok_or_else(|| RuntimeError::invalid_cast("i32", i.kind_name()))
        })
        .collect::<Result<Vec<i32>, _>>()?;
    let offset = array
        .offset(&indices)
        .ok_or(RuntimeError::IndexOutOfRange)?;
    Ok(Place::Element { array, offset })
}

/// The storage inside a box holding a `ty` value.
pub fn unboxed(rt: &Runtime, boxed: Value, ty: TypeId) -> Result<Place, RuntimeError> {
    match boxed {
        Value::Boxed(b) => {
            let found = rt.runtime_type_of(&b.get())?;
            if found != ty {
                return Err(RuntimeError::invalid_cast(
                    rt.type_name(ty),
                    rt.type_name(found),
                ));
            }
            Ok(Place::Unboxed(b))
        }
        Value::Null => Err(RuntimeError::null_reference("unbox")),
        other => Err(RuntimeError::invalid_cast(rt.type_name(ty), other.kind_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use callsite_runtime::{NativeRegistry, StructValue};
    use callsite_sema::CompilationDb;

    fn runtime() -> Runtime {
        Runtime::new(Arc::new(CompilationDb::new()), NativeRegistry::new())
    }

    fn point(x: i32) -> Value {
        Value::Struct(StructValue {
            ty: TypeId::INVALID,
            fields: vec![Value::I32(x)],
        })
    }

    #[test]
    fn struct_field_store_reaches_the_slot() {
        let rt = runtime();
        let mut frame = Frame::new(&[point(1)], 0);
        let place = Place::StructField {
            base: Box::new(Place::Slot(0)),
            index: 0,
        };
        place.store(&mut frame, &rt, Value::I32(9)).unwrap();
        assert_eq!(place.load(&frame, &rt), Ok(Value::I32(9)));
        assert_eq!(frame.slots[0], point(9));
    }

    #[test]
    fn detached_places_drop_writes() {
        let rt = runtime();
        let mut frame = Frame::new(&[], 0);
        let place = Place::StructField {
            base: Box::new(Place::Detached(point(1))),
            index: 0,
        };
        assert!(!place.is_addressable());
        place.store(&mut frame, &rt, Value::I32(9)).unwrap();
        assert_eq!(place.load(&frame, &rt), Ok(Value::I32(1)));
    }

    #[test]
    fn element_checks_bounds_and_null() {
        let array = Value::Array(ArrayRef::new(
            TypeId::INVALID,
            smallvec::smallvec![2],
            vec![Value::I32(0); 2],
        ));
        assert!(element(array.clone(), &[Value::I32(1)]).is_ok());
        assert_eq!(
            element(array, &[Value::I32(2)]).unwrap_err(),
            RuntimeError::IndexOutOfRange
        );
        assert!(matches!(
            element(Value::Null, &[Value::I32(0)]),
            Err(RuntimeError::NullReference { .. })
        ));
    }

    #[test]
    fn unbox_checks_the_boxed_type() {
        let rt = runtime();
        let boxed = Value::Boxed(BoxRef::new(Value::I32(3)));
        assert!(unboxed(&rt, boxed.clone(), TypeId::I32).is_ok());
        assert!(matches!(
            unboxed(&rt, boxed, TypeId::I64),
            Err(RuntimeError::InvalidCast { .. })
        ));
    }
}
