// src/crates/callsite-codegen/src/literal.rs
//
// Compile-time evaluation of constants.

use callsite_expr::Literal;
use callsite_runtime::{Runtime, Value};
use callsite_sema::{ConstantValue, TypeId};

pub fn constant_value(value: &ConstantValue) -> Value {
    match value {
        ConstantValue::Bool(b) => Value::Bool(*b),
        ConstantValue::I32(v) => Value::I32(*v),
        ConstantValue::U32(v) => Value::U32(*v),
        ConstantValue::I64(v) => Value::I64(*v),
        ConstantValue::F64(v) => Value::F64(*v),
        ConstantValue::Str(s) => Value::str(s),
    }
}

/// The value a literal of type `ty` stands for. `new T()` allocates here, so a
/// compiled callable reuses one instance across invocations.
pub fn literal_value(rt: &Runtime, literal: &Literal, ty: TypeId) -> Value {
    match literal {
        Literal::Value(value) => constant_value(value),
        Literal::Null => Value::Null,
        Literal::Default => rt.default_value(ty),
        Literal::New => rt.new_instance(ty),
    }
}
