// src/fixtures.rs
//! A small universe of types with native bodies, used by the scenario runner
//! and the integration tests.
//!
//! ```text
//! struct Mutable          { int x; int X { get; set; } int this[int] { get; set; } int Foo() => x++; BumpThenFail() }
//! class  Wrapper<T>       { const int Zero = 0; T Field; readonly T ReadOnlyField; T Property { get; set; } }
//! class  List<T>          { T[] items; T this[int] { get; set; } }
//! class  Statics          { static Mutable Shared; }
//! static class Methods    { ByRef(ref int), Next(out int), Throw(), ByRefThenThrow(ref int) }
//! class  NonGenericClass  { Method0..Method5, overloads, generic and constrained methods }
//! ```

use std::sync::Arc;

use callsite_identity::{FieldId, MethodId, PropertyId, TypeDefId};
use callsite_runtime::{ArrayRef, CallArgs, NativeRegistry, Runtime, RuntimeError, Value};
use callsite_sema::{
    CompilationDb, ConstantValue, FieldKind, MethodDefBuilder, TypeConstraint, TypeDefKind,
    TypeId,
};

/// Handles into the fixture universe.
#[derive(Debug, Clone, Copy)]
pub struct FixtureIds {
    pub mutable: TypeDefId,
    pub mutable_ty: TypeId,
    pub mutable_x: FieldId,
    pub mutable_x_prop: PropertyId,
    pub mutable_item: PropertyId,
    pub foo: MethodId,
    /// Increments `x`, then fails
    pub bump_then_fail: MethodId,

    pub wrapper: TypeDefId,
    pub wrapper_zero: FieldId,
    pub wrapper_field: FieldId,
    pub wrapper_readonly: FieldId,
    pub wrapper_property: PropertyId,
    /// `Wrapper<Mutable>`
    pub wrapper_of_mutable: TypeId,
    /// `Wrapper<int>`
    pub wrapper_of_int: TypeId,

    pub list: TypeDefId,
    /// `List<Mutable>`
    pub list_of_mutable: TypeId,
    pub mutable_array: TypeId,
    pub mutable_array_2d: TypeId,
    pub int_array: TypeId,

    pub statics_ty: TypeId,
    pub shared: FieldId,

    pub methods_ty: TypeId,
    pub by_ref: MethodId,
    pub next: MethodId,
    pub throw: MethodId,
    pub by_ref_then_throw: MethodId,

    pub get_type: MethodId,

    pub non_generic: TypeDefId,
    pub non_generic_ty: TypeId,
    /// `Method0` through `Method5`, indexed by arity
    pub method_n: [MethodId; 6],
    pub instance_method: MethodId,
    pub generic_method: MethodId,
    pub generic_class: TypeDefId,
    pub generic_class_method: MethodId,
    pub unreadable: TypeDefId,

    pub some_methods_ty: TypeId,
    pub extension_methods_ty: TypeId,
}

/// The fixture database plus the native bodies for every method it declares.
pub struct Fixtures {
    pub db: CompilationDb,
    pub natives: NativeRegistry,
    pub ids: FixtureIds,
}

impl Fixtures {
    pub fn new() -> Self {
        let mut db = CompilationDb::new();
        let mut natives = NativeRegistry::new();

        // ====================================================================
        // Mutable
        // ====================================================================

        let mutable = db.define_type("Mutable", TypeDefKind::Struct, &[]);
        let mutable_ty = db.self_type(mutable);
        let mutable_x = db.define_field(mutable, "x", TypeId::I32, FieldKind::Instance);
        let mutable_x_prop = db.define_property(mutable, "X", TypeId::I32, true, true);
        let mutable_item = db.define_indexer(mutable, TypeId::I32, &[TypeId::I32]);
        let foo = db.define_method(MethodDefBuilder::new(mutable, "Foo", TypeId::I32));

        natives.register(foo, |args| {
            let x = read_i32_field(args, 0)?;
            args.store_field(0, Value::I32(x + 1))?;
            Ok(Value::I32(x))
        });
        let bump_then_fail =
            db.define_method(MethodDefBuilder::new(mutable, "BumpThenFail", TypeId::VOID));
        natives.register(bump_then_fail, |args| {
            let x = read_i32_field(args, 0)?;
            args.store_field(0, Value::I32(x + 1))?;
            let method = args.runtime().db().display_method(args.method());
            Err(RuntimeError::failed(method, "thrown by fixture"))
        });
        register_accessors(&db, &mut natives, mutable_x_prop, 0);
        register_accessors(&db, &mut natives, mutable_item, 0);

        // ====================================================================
        // Wrapper<T>
        // ====================================================================

        let wrapper = db.define_type("Wrapper", TypeDefKind::Class, &["T"]);
        let t = db.type_param_of(wrapper, 0);
        let wrapper_zero = db.define_field(
            wrapper,
            "Zero",
            TypeId::I32,
            FieldKind::Const(ConstantValue::I32(0)),
        );
        let wrapper_field = db.define_field(wrapper, "Field", t, FieldKind::Instance);
        let wrapper_readonly = db.define_field(wrapper, "ReadOnlyField", t, FieldKind::ReadOnly);
        let wrapper_property = db.define_property(wrapper, "Property", t, true, true);
        register_accessors(&db, &mut natives, wrapper_property, 0);
        let wrapper_of_mutable = db.closed_type(wrapper, &[mutable_ty]);
        let wrapper_of_int = db.closed_type(wrapper, &[TypeId::I32]);

        // ====================================================================
        // List<T>
        // ====================================================================

        let list = db.define_type("List", TypeDefKind::Class, &["T"]);
        let t = db.type_param_of(list, 0);
        let items_ty = db.array_type(t, 1);
        db.define_field(list, "items", items_ty, FieldKind::Instance);
        let list_item = db.define_indexer(list, t, &[TypeId::I32]);
        if let Some(getter) = db.property(list_item).getter {
            natives.register(getter, |args| {
                let index = args.arg_i32(0)?;
                element_of(&args.load_field(0)?, index)?.get()
            });
        }
        if let Some(setter) = db.property(list_item).setter {
            natives.register(setter, |args| {
                let index = args.arg_i32(0)?;
                let value = args.arg(1)?.clone();
                element_of(&args.load_field(0)?, index)?.set(value)?;
                Ok(Value::Void)
            });
        }
        let list_of_mutable = db.closed_type(list, &[mutable_ty]);
        let mutable_array = db.array_type(mutable_ty, 1);
        let mutable_array_2d = db.array_type(mutable_ty, 2);
        let int_array = db.array_type(TypeId::I32, 1);

        // ====================================================================
        // Statics, Methods, object
        // ====================================================================

        let statics = db.define_type("Statics", TypeDefKind::Class, &[]);
        let statics_ty = db.self_type(statics);
        let shared = db.define_field(statics, "Shared", mutable_ty, FieldKind::Static);

        let methods = db.define_type("Methods", TypeDefKind::Class, &[]);
        let methods_ty = db.self_type(methods);
        let by_ref = db.define_method(
            MethodDefBuilder::new(methods, "ByRef", TypeId::VOID)
                .is_static(true)
                .ref_param("x", TypeId::I32),
        );
        let next = db.define_method(
            MethodDefBuilder::new(methods, "Next", TypeId::VOID)
                .is_static(true)
                .out_param("x", TypeId::I32),
        );
        let throw = db.define_method(
            MethodDefBuilder::new(methods, "Throw", TypeId::I32).is_static(true),
        );
        let by_ref_then_throw = db.define_method(
            MethodDefBuilder::new(methods, "ByRefThenThrow", TypeId::VOID)
                .is_static(true)
                .ref_param("x", TypeId::I32),
        );
        natives.register(by_ref, |args| {
            let x = args.arg_i32(0)?;
            *args.arg_mut(0)? = Value::I32(x + 1);
            Ok(Value::Void)
        });
        natives.register(next, |args| {
            let x = args.arg_i32(0)?;
            *args.arg_mut(0)? = Value::I32(x + 1);
            Ok(Value::Void)
        });
        natives.register(throw, |args| {
            let method = args.runtime().db().display_method(args.method());
            Err(RuntimeError::failed(method, "thrown by fixture"))
        });
        natives.register(by_ref_then_throw, |args| {
            let x = args.arg_i32(0)?;
            *args.arg_mut(0)? = Value::I32(x + 1);
            let method = args.runtime().db().display_method(args.method());
            Err(RuntimeError::failed(method, "thrown by fixture"))
        });

        let object = db.object_type_def();
        let get_type =
            db.define_method(MethodDefBuilder::new(object, "GetType", TypeId::METATYPE));
        natives.register(get_type, |args| {
            let ty = args.runtime().runtime_type_of(args.receiver()?)?;
            Ok(Value::Type(ty))
        });

        // ====================================================================
        // Resolution fixtures
        // ====================================================================

        let non_generic = db.define_type("NonGenericClass", TypeDefKind::Class, &[]);
        let non_generic_ty = db.self_type(non_generic);
        let (tp, _) = db.fresh_type_param("T");
        let generic_method = db.define_method(
            MethodDefBuilder::new(non_generic, "GenericMethod", TypeId::VOID)
                .is_static(true)
                .type_param(tp),
        );
        let instance_method =
            db.define_method(MethodDefBuilder::new(non_generic, "InstanceMethod", TypeId::VOID));
        db.define_method(MethodDefBuilder::new(non_generic, "StaticMethod", TypeId::VOID).is_static(true));

        let mut method_n = [MethodId::new(0); 6];
        for (arity, slot) in method_n.iter_mut().enumerate() {
            let mut builder =
                MethodDefBuilder::new(non_generic, &format!("Method{arity}"), TypeId::VOID)
                    .is_static(true);
            for i in 1..=arity {
                builder = builder.param(&format!("i{i}"), TypeId::I32);
            }
            *slot = db.define_method(builder);
        }

        db.define_method(
            MethodDefBuilder::new(non_generic, "staticSameName", TypeId::VOID).param("i1", TypeId::U32),
        );
        db.define_method(
            MethodDefBuilder::new(non_generic, "instanceSameName", TypeId::VOID).param("i1", TypeId::I32),
        );
        db.define_method(
            MethodDefBuilder::new(non_generic, "StaticSameName", TypeId::VOID)
                .is_static(true)
                .param("i1", TypeId::U32),
        );
        db.define_method(
            MethodDefBuilder::new(non_generic, "staticSameName", TypeId::VOID)
                .is_static(true)
                .param("i1", TypeId::I32),
        );

        let (tp, t) = db.fresh_type_param("T");
        db.define_method(
            MethodDefBuilder::new(non_generic, "GenericInstanceMethod", TypeId::VOID)
                .type_param(tp)
                .param("t1", t),
        );
        let (tp, t) = db.fresh_type_param("T");
        db.define_method(
            MethodDefBuilder::new(non_generic, "GenericStaticMethod", TypeId::VOID)
                .is_static(true)
                .type_param(tp)
                .param("t1", t),
        );
        let (tp, t) = db.fresh_type_param("T");
        db.define_method(
            MethodDefBuilder::new(non_generic, "ConstrainedInstanceMethod", TypeId::VOID)
                .type_param(tp.with_constraint(TypeConstraint::ValueType))
                .param("t1", t),
        );
        let (tp, t) = db.fresh_type_param("T");
        db.define_method(
            MethodDefBuilder::new(non_generic, "ConstrainedStaticMethod", TypeId::VOID)
                .is_static(true)
                .type_param(tp.with_constraint(TypeConstraint::ValueType))
                .param("t1", t),
        );
        db.define_method(
            MethodDefBuilder::new(non_generic, "InstanceMethod1", TypeId::VOID).param("i1", TypeId::I32),
        );
        db.define_method(
            MethodDefBuilder::new(non_generic, "StaticMethod1", TypeId::VOID)
                .is_static(true)
                .param("i1", TypeId::I32),
        );

        let generic_class = db.define_type("GenericClass", TypeDefKind::Class, &["T"]);
        let generic_class_method = db.define_method(
            MethodDefBuilder::new(generic_class, "NonGenericMethod", TypeId::VOID).is_static(true),
        );

        let unreadable = db.define_type("Unreadable", TypeDefKind::Class, &["T"]);
        let t = db.type_param_of(unreadable, 0);
        db.define_static_property(unreadable, "WriteOnly", t, false, true);

        let some_methods = db.define_type("SomeMethods", TypeDefKind::Class, &[]);
        let some_methods_ty = db.self_type(some_methods);
        for (name, arity, is_static) in [
            ("S0", 0, true),
            ("S1", 1, true),
            ("S2", 2, true),
            ("I0", 0, false),
            ("I1", 1, false),
            ("I2", 2, false),
        ] {
            let mut builder = MethodDefBuilder::new(some_methods, name, TypeId::VOID).is_static(is_static);
            for param in ["x", "y"].into_iter().take(arity) {
                builder = builder.param(param, TypeId::I32);
            }
            db.define_method(builder);
        }

        let extension_methods = db.define_type("ExtensionMethods", TypeDefKind::Class, &[]);
        let extension_methods_ty = db.self_type(extension_methods);
        for (name, arity) in [("E0", 1), ("E1", 2), ("E2", 3)] {
            let mut builder = MethodDefBuilder::new(extension_methods, name, TypeId::VOID).extension();
            for param in ["x", "y", "z"].into_iter().take(arity) {
                builder = builder.param(param, TypeId::I32);
            }
            db.define_method(builder);
        }

        tracing::debug!(
            types = db.entities.type_count(),
            methods = db.entities.method_count(),
            natives = natives.len(),
            "fixtures defined"
        );

        Self {
            db,
            natives,
            ids: FixtureIds {
                mutable,
                mutable_ty,
                mutable_x,
                mutable_x_prop,
                mutable_item,
                foo,
                bump_then_fail,
                wrapper,
                wrapper_zero,
                wrapper_field,
                wrapper_readonly,
                wrapper_property,
                wrapper_of_mutable,
                wrapper_of_int,
                list,
                list_of_mutable,
                mutable_array,
                mutable_array_2d,
                int_array,
                statics_ty,
                shared,
                methods_ty,
                by_ref,
                next,
                throw,
                by_ref_then_throw,
                get_type,
                non_generic,
                non_generic_ty,
                method_n,
                instance_method,
                generic_method,
                generic_class,
                generic_class_method,
                unreadable,
                some_methods_ty,
                extension_methods_ty,
            },
        }
    }

    /// Freeze the database and pair it with the native bodies.
    pub fn into_runtime(self) -> Arc<Runtime> {
        Arc::new(Runtime::new(Arc::new(self.db), self.natives))
    }
}

impl Default for Fixtures {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Runtime values over the fixture types
// ============================================================================

/// A `Mutable` with its backing field set to `x`.
pub fn mutable_with(rt: &Runtime, ids: &FixtureIds, x: i32) -> Result<Value, RuntimeError> {
    let mut value = rt.default_value(ids.mutable_ty);
    match value.as_struct_mut().and_then(|s| s.fields.first_mut()) {
        Some(field) => *field = Value::I32(x),
        None => return Err(RuntimeError::invalid_cast("Mutable", "a struct without fields")),
    }
    Ok(value)
}

/// A `List<Mutable>` holding `len` default elements.
pub fn list_of_mutable(rt: &Runtime, ids: &FixtureIds, len: usize) -> Result<Value, RuntimeError> {
    let list = rt.new_instance(ids.list_of_mutable);
    let items = rt.new_array(ids.mutable_array, &[len])?;
    match &list {
        Value::Object(object) if object.set_field(0, items) => Ok(list),
        other => Err(RuntimeError::invalid_cast("List<Mutable>", other.kind_name())),
    }
}

// ============================================================================
// Native body helpers
// ============================================================================

fn read_i32_field(args: &CallArgs<'_>, slot: usize) -> Result<i32, RuntimeError> {
    let value = args.load_field(slot)?;
    value
        .as_i32()
        .ok_or_else(|| RuntimeError::invalid_cast("i32", value.kind_name()))
}

/// Register get/set bodies that read and write instance field `slot`. Index
/// arguments of indexers are accepted and ignored.
fn register_accessors(
    db: &CompilationDb,
    natives: &mut NativeRegistry,
    property: PropertyId,
    slot: usize,
) {
    let def = db.property(property);
    if let Some(getter) = def.getter {
        natives.register(getter, move |args| args.load_field(slot));
    }
    if let Some(setter) = def.setter {
        natives.register(setter, move |args| {
            let last = args.len().checked_sub(1).ok_or(RuntimeError::ArgumentCount {
                expected: 1,
                found: 0,
            })?;
            let value = args.arg(last)?.clone();
            args.store_field(slot, value)?;
            Ok(Value::Void)
        });
    }
}

struct Element {
    array: ArrayRef,
    offset: usize,
}

impl Element {
    fn get(&self) -> Result<Value, RuntimeError> {
        self.array.get(self.offset).ok_or(RuntimeError::IndexOutOfRange)
    }

    fn set(&self, value: Value) -> Result<(), RuntimeError> {
        if self.array.set(self.offset, value) {
            Ok(())
        } else {
            Err(RuntimeError::IndexOutOfRange)
        }
    }
}

fn element_of(items: &Value, index: i32) -> Result<Element, RuntimeError> {
    match items {
        Value::Array(array) => {
            let offset = array.offset(&[index]).ok_or(RuntimeError::IndexOutOfRange)?;
            Ok(Element {
                array: array.clone(),
                offset,
            })
        }
        Value::Null => Err(RuntimeError::null_reference("List.items")),
        other => Err(RuntimeError::invalid_cast("array", other.kind_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_method_with_a_body_is_a_fixture_method() {
        let fx = Fixtures::new();
        let ids = fx.ids;
        for method in [
            ids.foo,
            ids.bump_then_fail,
            ids.by_ref,
            ids.by_ref_then_throw,
            ids.next,
            ids.throw,
            ids.get_type,
        ] {
            assert!(fx.natives.contains(method));
        }
        assert!(!fx.natives.contains(ids.instance_method));
    }

    #[test]
    fn wrapper_fields_take_slots_in_declaration_order() {
        let fx = Fixtures::new();
        assert_eq!(fx.db.field(fx.ids.wrapper_field).slot, Some(0));
        assert_eq!(fx.db.field(fx.ids.wrapper_readonly).slot, Some(1));
        assert!(fx.db.field(fx.ids.wrapper_zero).is_literal());
    }

    #[test]
    fn list_helper_allocates_items() {
        let fx = Fixtures::new();
        let ids = fx.ids;
        let rt = fx.into_runtime();
        let list = list_of_mutable(&rt, &ids, 2).unwrap();
        let Value::Object(object) = list else {
            panic!("expected a heap object");
        };
        let Some(Value::Array(items)) = object.field(0) else {
            panic!("expected an items array");
        };
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn mutable_with_sets_backing_field() {
        let fx = Fixtures::new();
        let ids = fx.ids;
        let rt = fx.into_runtime();
        let m = mutable_with(&rt, &ids, 41).unwrap();
        assert_eq!(m.as_struct().map(|s| s.fields[0].clone()), Some(Value::I32(41)));
    }
}
