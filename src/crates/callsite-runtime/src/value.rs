// src/crates/callsite-runtime/src/value.rs
//
// Runtime values.
//
// Value types (primitives, structs) are copied on every load. Reference types
// share storage through `Arc<parking_lot::Mutex<_>>`: class instances, boxes
// and arrays. Loads never hold a lock beyond the copy.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

use callsite_sema::TypeId;

#[derive(Clone)]
pub enum Value {
    /// Result of a `void` method
    Void,
    Null,
    Bool(bool),
    I32(i32),
    U32(u32),
    I64(i64),
    F64(f64),
    Str(Arc<str>),
    /// A runtime type object
    Type(TypeId),
    Struct(StructValue),
    Object(ObjectRef),
    Boxed(BoxRef),
    Array(ArrayRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<TypeId> {
        match self {
            Value::Type(ty) => Some(*ty),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_struct_mut(&mut self) -> Option<&mut StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn str(value: &str) -> Self {
        Value::Str(Arc::from(value))
    }

    /// Short name of the value's variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I32(_) => "i32",
            Value::U32(_) => "u32",
            Value::I64(_) => "i64",
            Value::F64(_) => "f64",
            Value::Str(_) => "string",
            Value::Type(_) => "Type",
            Value::Struct(_) => "struct",
            Value::Object(_) => "object",
            Value::Boxed(_) => "boxed value",
            Value::Array(_) => "array",
        }
    }
}

/// Equality is structural for values and identity for shared storage.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Boxed(a), Value::Boxed(b)) => a.ptr_eq(b),
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => f.write_str("void"),
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}u"),
            Value::I64(v) => write!(f, "{v}L"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Type(ty) => write!(f, "Type(#{})", ty.index()),
            Value::Struct(s) => s.fmt(f),
            Value::Object(o) => write!(f, "Object(#{})", o.type_id().index()),
            Value::Boxed(b) => write!(f, "Box({:?})", b.get()),
            Value::Array(a) => write!(f, "Array(len {})", a.len()),
        }
    }
}

/// An unboxed struct: copied on every load.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    pub ty: TypeId,
    pub fields: Vec<Value>,
}

/// Heap storage of a class instance.
#[derive(Debug)]
pub struct Instance {
    pub ty: TypeId,
    pub fields: Vec<Value>,
}

/// Shared reference to a class instance.
#[derive(Debug, Clone)]
pub struct ObjectRef(Arc<Mutex<Instance>>);

impl ObjectRef {
    pub fn new(ty: TypeId, fields: Vec<Value>) -> Self {
        Self(Arc::new(Mutex::new(Instance { ty, fields })))
    }

    pub fn type_id(&self) -> TypeId {
        self.0.lock().ty
    }

    pub fn field(&self, index: usize) -> Option<Value> {
        self.0.lock().fields.get(index).cloned()
    }

    /// Replace a field; returns `false` when the slot does not exist.
    pub fn set_field(&self, index: usize, value: Value) -> bool {
        match self.0.lock().fields.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A boxed value type. All unboxings of the same box share its storage.
#[derive(Debug, Clone)]
pub struct BoxRef(Arc<Mutex<Value>>);

impl BoxRef {
    pub fn new(value: Value) -> Self {
        Self(Arc::new(Mutex::new(value)))
    }

    pub fn get(&self) -> Value {
        self.0.lock().clone()
    }

    pub fn set(&self, value: Value) {
        *self.0.lock() = value;
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Dimension lengths of an array.
pub type Dims = SmallVec<[usize; 2]>;

#[derive(Debug)]
pub struct ArrayData {
    /// The array type (`Mutable[,]`), not the element type
    pub ty: TypeId,
    pub dims: Dims,
    /// Row-major elements
    pub elems: Vec<Value>,
}

/// Shared reference to an array of any rank.
#[derive(Debug, Clone)]
pub struct ArrayRef(Arc<Mutex<ArrayData>>);

impl ArrayRef {
    pub fn new(ty: TypeId, dims: Dims, elems: Vec<Value>) -> Self {
        Self(Arc::new(Mutex::new(ArrayData { ty, dims, elems })))
    }

    pub fn type_id(&self) -> TypeId {
        self.0.lock().ty
    }

    pub fn len(&self) -> usize {
        self.0.lock().elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dims(&self) -> Dims {
        self.0.lock().dims.clone()
    }

    /// Row-major offset of `indices`, or `None` when any index is out of range
    /// or the rank differs.
    pub fn offset(&self, indices: &[i32]) -> Option<usize> {
        let data = self.0.lock();
        if indices.len() != data.dims.len() {
            return None;
        }
        let mut offset = 0usize;
        for (&index, &len) in indices.iter().zip(data.dims.iter()) {
            let index = usize::try_from(index).ok().filter(|&i| i < len)?;
            offset = offset * len + index;
        }
        Some(offset)
    }

    pub fn get(&self, offset: usize) -> Option<Value> {
        self.0.lock().elems.get(offset).cloned()
    }

    pub fn set(&self, offset: usize, value: Value) -> bool {
        match self.0.lock().elems.get_mut(offset) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_refs_debug_through_the_lock() {
        let object = ObjectRef::new(TypeId::OBJECT, vec![Value::I32(3)]);
        let rendered = format!("{object:?}");
        assert!(rendered.contains("I32(3)"), "{rendered}");
        assert!(format!("{:?}", BoxRef::new(Value::I32(4))).contains("I32(4)"));
    }

    #[test]
    fn boxes_share_storage() {
        let boxed = BoxRef::new(Value::I32(1));
        let alias = boxed.clone();
        alias.set(Value::I32(2));
        assert_eq!(boxed.get(), Value::I32(2));
        assert!(boxed.ptr_eq(&alias));
    }

    #[test]
    fn multi_rank_offsets_are_row_major() {
        let dims: Dims = smallvec::smallvec![2, 3];
        let array = ArrayRef::new(TypeId::INVALID, dims, vec![Value::I32(0); 6]);
        assert_eq!(array.offset(&[0, 0]), Some(0));
        assert_eq!(array.offset(&[1, 2]), Some(5));
        assert_eq!(array.offset(&[2, 0]), None);
        assert_eq!(array.offset(&[-1, 0]), None);
        assert_eq!(array.offset(&[0]), None);
    }

    #[test]
    fn struct_values_compare_structurally() {
        let a = Value::Struct(StructValue {
            ty: TypeId::INVALID,
            fields: vec![Value::I32(1)],
        });
        let b = a.clone();
        assert_eq!(a, b);
        let o1 = Value::Object(ObjectRef::new(TypeId::OBJECT, Vec::new()));
        let o2 = Value::Object(ObjectRef::new(TypeId::OBJECT, Vec::new()));
        assert_ne!(o1, o2);
    }
}
