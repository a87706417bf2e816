// src/crates/callsite-runtime/src/runtime.rs
//
// The runtime context shared by every compiled callable: the frozen
// descriptor database, native bodies, and static field storage.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::errors::RuntimeError;
use crate::native_registry::{CallArgs, NativeRegistry};
use crate::value::{ArrayRef, BoxRef, Dims, ObjectRef, StructValue, Value};
use callsite_identity::{FieldId, MethodId};
use callsite_sema::{CompilationDb, SemaType, TypeDefKind, TypeId};

/// Storage key of a static field: statics of generic types are per closed type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StaticKey {
    pub field: FieldId,
    pub declaring: TypeId,
}

pub struct Runtime {
    db: Arc<CompilationDb>,
    natives: NativeRegistry,
    statics: Mutex<FxHashMap<StaticKey, Value>>,
}

impl Runtime {
    pub fn new(db: Arc<CompilationDb>, natives: NativeRegistry) -> Self {
        tracing::debug!(
            types = db.entities.type_count(),
            methods = db.entities.method_count(),
            bodies = natives.len(),
            "runtime created"
        );
        Self {
            db,
            natives,
            statics: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn db(&self) -> &CompilationDb {
        &self.db
    }

    /// Whether the definition behind `method` has a registered body.
    pub fn has_body(&self, method: MethodId) -> bool {
        let body = self.db.method(method).body;
        self.natives.contains(body)
    }

    /// Run a method body on copies of the receiver and arguments. Failures
    /// raised by the body are returned unchanged.
    pub fn invoke_native(
        &self,
        method: MethodId,
        receiver: Option<&mut Value>,
        args: &mut [Value],
    ) -> Result<Value, RuntimeError> {
        let def = self.db.method(method);
        if args.len() != def.param_count() {
            return Err(RuntimeError::ArgumentCount {
                expected: def.param_count(),
                found: args.len(),
            });
        }
        let body = self
            .natives
            .get(def.body)
            .ok_or_else(|| RuntimeError::MissingBody {
                method: self.db.display_method(method),
            })?;
        tracing::trace!(method = %def.name, "invoke");
        let mut call_args = CallArgs::new(method, receiver, args, self);
        body(&mut call_args)
    }

    // ========================================================================
    // Allocation and defaults
    // ========================================================================

    /// The zero value of a type: numeric zero, `false`, a default struct, or null.
    pub fn default_value(&self, ty: TypeId) -> Value {
        match self.db.types.get(ty) {
            SemaType::Primitive(_) => match ty {
                TypeId::BOOL => Value::Bool(false),
                TypeId::U32 => Value::U32(0),
                TypeId::I64 => Value::I64(0),
                TypeId::F64 => Value::F64(0.0),
                _ => Value::I32(0),
            },
            SemaType::Nominal { def, .. } if self.db.type_def(*def).kind == TypeDefKind::Struct => {
                Value::Struct(StructValue {
                    ty,
                    fields: self.default_fields(ty),
                })
            }
            _ => Value::Null,
        }
    }

    /// A default-constructed instance: a fresh heap object for classes.
    pub fn new_instance(&self, ty: TypeId) -> Value {
        match self.db.types.unwrap_nominal(ty) {
            Some((def, _, _)) if self.db.type_def(def).kind == TypeDefKind::Class => {
                Value::Object(ObjectRef::new(ty, self.default_fields(ty)))
            }
            _ => self.default_value(ty),
        }
    }

    /// Instance fields of `ty` at their default values, in slot order.
    fn default_fields(&self, ty: TypeId) -> Vec<Value> {
        let Some((def, _, _)) = self.db.types.unwrap_nominal(ty) else {
            return Vec::new();
        };
        let subs = self.db.entities.substitutions_for(&self.db.types, ty);
        self.db
            .entities
            .instance_fields(def)
            .map(|field| {
                self.db
                    .types
                    .try_substitute(field.ty, &subs)
                    .map_or(Value::Null, |field_ty| self.default_value(field_ty))
            })
            .collect()
    }

    /// A new array of `array_ty` with every element at its default value.
    pub fn new_array(&self, array_ty: TypeId, dims: &[usize]) -> Result<Value, RuntimeError> {
        let Some((elem, rank)) = self.db.types.unwrap_array(array_ty) else {
            return Err(RuntimeError::invalid_cast(
                "an array type",
                self.db.display_type(array_ty),
            ));
        };
        if dims.len() != usize::from(rank) {
            return Err(RuntimeError::ArgumentCount {
                expected: usize::from(rank),
                found: dims.len(),
            });
        }
        let len = dims.iter().product();
        let elems = vec![self.default_value(elem); len];
        let dims: Dims = dims.iter().copied().collect();
        Ok(Value::Array(ArrayRef::new(array_ty, dims, elems)))
    }

    pub fn box_value(&self, value: Value) -> Value {
        Value::Boxed(BoxRef::new(value))
    }

    // ========================================================================
    // Statics
    // ========================================================================

    /// Current value of a static field; unset statics read as their default.
    pub fn load_static(&self, key: StaticKey) -> Value {
        let mut statics = self.statics.lock();
        statics
            .entry(key)
            .or_insert_with(|| self.default_value(self.static_type(key)))
            .clone()
    }

    pub fn store_static(&self, key: StaticKey, value: Value) {
        self.statics.lock().insert(key, value);
    }

    fn static_type(&self, key: StaticKey) -> TypeId {
        let declared = self.db.field(key.field).ty;
        let subs = self.db.entities.substitutions_for(&self.db.types, key.declaring);
        self.db
            .types
            .try_substitute(declared, &subs)
            .unwrap_or(TypeId::INVALID)
    }

    // ========================================================================
    // Runtime types
    // ========================================================================

    /// The dynamic type of a non-null value. Boxed values report their contents.
    pub fn runtime_type_of(&self, value: &Value) -> Result<TypeId, RuntimeError> {
        Ok(match value {
            Value::Null | Value::Void => {
                return Err(RuntimeError::null_reference("GetType"));
            }
            Value::Bool(_) => TypeId::BOOL,
            Value::I32(_) => TypeId::I32,
            Value::U32(_) => TypeId::U32,
            Value::I64(_) => TypeId::I64,
            Value::F64(_) => TypeId::F64,
            Value::Str(_) => TypeId::STRING,
            Value::Type(_) => TypeId::METATYPE,
            Value::Struct(s) => s.ty,
            Value::Object(o) => o.type_id(),
            Value::Boxed(b) => return self.runtime_type_of(&b.get()),
            Value::Array(a) => a.type_id(),
        })
    }

    pub fn type_name(&self, ty: TypeId) -> String {
        self.db.display_type(ty)
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("natives", &self.natives)
            .field("statics", &self.statics.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callsite_sema::{FieldKind, MethodDefBuilder};

    fn db_with_point() -> (CompilationDb, TypeId, TypeId, MethodId) {
        let mut db = CompilationDb::new();
        let point = db.define_type("Point", TypeDefKind::Struct, &[]);
        db.define_field(point, "x", TypeId::I32, FieldKind::Instance);
        db.define_field(point, "label", TypeId::STRING, FieldKind::Instance);
        let bump = db.define_method(MethodDefBuilder::new(point, "Bump", TypeId::I32));
        let holder = db.define_type("Holder", TypeDefKind::Class, &["T"]);
        let t = db.type_param_of(holder, 0);
        db.define_field(holder, "value", t, FieldKind::Instance);
        let point_ty = db.self_type(point);
        let closed = db.closed_type(holder, &[point_ty]);
        (db, point_ty, closed, bump)
    }

    #[test]
    fn defaults_follow_type_kind() {
        let (db, point_ty, holder_ty, _) = db_with_point();
        let rt = Runtime::new(Arc::new(db), NativeRegistry::new());
        assert_eq!(rt.default_value(TypeId::I32), Value::I32(0));
        assert_eq!(rt.default_value(TypeId::STRING), Value::Null);
        assert_eq!(
            rt.default_value(point_ty),
            Value::Struct(StructValue {
                ty: point_ty,
                fields: vec![Value::I32(0), Value::Null],
            })
        );
        assert_eq!(rt.default_value(holder_ty), Value::Null);
    }

    #[test]
    fn generic_class_instances_get_substituted_field_defaults() {
        let (db, point_ty, holder_ty, _) = db_with_point();
        let rt = Runtime::new(Arc::new(db), NativeRegistry::new());
        let Value::Object(obj) = rt.new_instance(holder_ty) else {
            panic!("expected object");
        };
        let field = obj.field(0).unwrap();
        assert_eq!(field.as_struct().map(|s| s.ty), Some(point_ty));
    }

    #[test]
    fn invoke_runs_registered_body() {
        let (db, point_ty, _, bump) = db_with_point();
        let mut natives = NativeRegistry::new();
        natives.register(bump, |args| {
            let x = args.load_field(0)?.as_i32().unwrap_or_default();
            args.store_field(0, Value::I32(x + 1))?;
            Ok(Value::I32(x))
        });
        let rt = Runtime::new(Arc::new(db), natives);
        let mut receiver = rt.default_value(point_ty);
        assert_eq!(rt.invoke_native(bump, Some(&mut receiver), &mut []), Ok(Value::I32(0)));
        assert_eq!(rt.invoke_native(bump, Some(&mut receiver), &mut []), Ok(Value::I32(1)));
        assert!(matches!(
            rt.invoke_native(bump, None, &mut []),
            Err(RuntimeError::NullReference { .. })
        ));
    }

    #[test]
    fn missing_body_is_reported() {
        let (db, point_ty, _, bump) = db_with_point();
        let rt = Runtime::new(Arc::new(db), NativeRegistry::new());
        let mut receiver = rt.default_value(point_ty);
        assert!(matches!(
            rt.invoke_native(bump, Some(&mut receiver), &mut []),
            Err(RuntimeError::MissingBody { .. })
        ));
    }

    #[test]
    fn statics_start_at_default() {
        let mut db = CompilationDb::new();
        let host = db.define_type("Host", TypeDefKind::Class, &[]);
        let counter = db.define_field(host, "counter", TypeId::I32, FieldKind::Static);
        let host_ty = db.self_type(host);
        let rt = Runtime::new(Arc::new(db), NativeRegistry::new());
        let key = StaticKey {
            field: counter,
            declaring: host_ty,
        };
        assert_eq!(rt.load_static(key), Value::I32(0));
        rt.store_static(key, Value::I32(7));
        assert_eq!(rt.load_static(key), Value::I32(7));
    }

    #[test]
    fn arrays_of_any_rank() {
        let mut db = CompilationDb::new();
        let grid_ty = db.array_type(TypeId::I32, 2);
        let rt = Runtime::new(Arc::new(db), NativeRegistry::new());
        let Value::Array(grid) = rt.new_array(grid_ty, &[2, 2]).unwrap() else {
            panic!("expected array");
        };
        assert_eq!(grid.len(), 4);
        assert_eq!(rt.runtime_type_of(&Value::Array(grid)), Ok(grid_ty));
    }
}
