// src/crates/callsite-expr/src/addressable.rs
//
// Addressability analysis: which storage, if any, backs an expression used as
// a value-type receiver or a by-reference argument.

use crate::ast::{Expr, ExprKind, ParamExpr};
use callsite_identity::FieldId;
use callsite_sema::{CompilationDb, ConstantValue, TypeId};

/// Where an expression's value lives.
///
/// Derived per compilation and never stored. `None` means the value is a
/// temporary copy: mutation through it is discarded and nothing is written back.
#[derive(Debug, Clone)]
pub enum AddressableLocation<'e> {
    Parameter(&'e ParamExpr),
    Field {
        owner: FieldOwner<'e>,
        field: FieldId,
        /// Instance slot of the field within its owner
        slot: usize,
        /// Read-only fields are backed by a per-invocation copy
        readonly: bool,
    },
    StaticField {
        field: FieldId,
        /// Closed declaring type; statics of generic types are per instantiation
        declaring: TypeId,
        /// Literal fields have no storage; they evaluate to this value
        constant: Option<&'e ConstantValue>,
    },
    ArrayElement {
        array: &'e Expr,
        indices: &'e [Expr],
    },
    Unboxed {
        boxed: &'e Expr,
        ty: TypeId,
    },
    /// Not addressable; the wrapped expression is evaluated into a temporary
    None(&'e Expr),
}

/// How a field's owner is reached.
#[derive(Debug, Clone)]
pub enum FieldOwner<'e> {
    /// Reference-typed owner: the field lives in the heap object the
    /// expression evaluates to
    Heap(&'e Expr),
    /// Value-typed owner: the field lives inside the owner's own storage, so
    /// writes persist exactly as far as the owner's location allows
    Inline(Box<AddressableLocation<'e>>),
}

impl AddressableLocation<'_> {
    /// Whether writes through this location are observable after the call.
    pub fn is_addressable(&self) -> bool {
        !matches!(self, AddressableLocation::None(_))
    }
}

/// Classify an expression. Total: unrecognized shapes are `None`.
pub fn classify<'e>(db: &'e CompilationDb, expr: &'e Expr) -> AddressableLocation<'e> {
    match &expr.kind {
        ExprKind::Parameter(param) => AddressableLocation::Parameter(param),
        ExprKind::Field {
            owner,
            field,
            declaring,
        } => {
            let def = db.field(*field);
            match (owner, def.slot) {
                (None, _) => AddressableLocation::StaticField {
                    field: *field,
                    declaring: *declaring,
                    constant: def.constant.as_ref(),
                },
                (Some(owner), Some(slot)) => {
                    let owner = if db.types.is_value_type(owner.ty) {
                        FieldOwner::Inline(Box::new(classify(db, owner)))
                    } else {
                        FieldOwner::Heap(owner)
                    };
                    AddressableLocation::Field {
                        owner,
                        field: *field,
                        slot,
                        readonly: def.is_readonly,
                    }
                }
                // static field reached through an owner; the factory rejects this
                (Some(_), None) => AddressableLocation::None(expr),
            }
        }
        ExprKind::ArrayIndex { array, indices, .. } => AddressableLocation::ArrayElement {
            array,
            indices,
        },
        ExprKind::Unbox(boxed) => AddressableLocation::Unboxed {
            boxed,
            ty: expr.ty,
        },
        // Getter results are copies, indexers included.
        ExprKind::Property { .. }
        | ExprKind::Constant(_)
        | ExprKind::Call(_)
        | ExprKind::Block(_) => AddressableLocation::None(expr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::ExprFactory;
    use callsite_sema::{FieldKind, TypeDefKind};

    struct Setup {
        db: CompilationDb,
        point_ty: TypeId,
        holder_ty: TypeId,
        x: FieldId,
        frozen: FieldId,
        inner: FieldId,
        shared: FieldId,
        limit: FieldId,
    }

    fn setup() -> Setup {
        let mut db = CompilationDb::new();
        let point = db.define_type("Point", TypeDefKind::Struct, &[]);
        let point_ty = db.self_type(point);
        let x = db.define_field(point, "x", TypeId::I32, FieldKind::Instance);
        let frozen = db.define_field(point, "frozen", TypeId::I32, FieldKind::ReadOnly);
        let holder = db.define_type("Holder", TypeDefKind::Class, &[]);
        let holder_ty = db.self_type(holder);
        let inner = db.define_field(holder, "inner", point_ty, FieldKind::Instance);
        let shared = db.define_field(holder, "shared", point_ty, FieldKind::Static);
        let limit = db.define_field(
            holder,
            "Limit",
            TypeId::I32,
            FieldKind::Const(ConstantValue::I32(7)),
        );
        Setup {
            db,
            point_ty,
            holder_ty,
            x,
            frozen,
            inner,
            shared,
            limit,
        }
    }

    #[test]
    fn parameters_are_addressable() {
        let mut s = setup();
        let mut f = ExprFactory::new(&mut s.db);
        let p = f.parameter(s.point_ty, Some("p"));
        assert!(matches!(
            classify(&s.db, &p),
            AddressableLocation::Parameter(param) if param.name.as_deref() == Some("p")
        ));
    }

    #[test]
    fn field_chains_follow_owner_storage() {
        let mut s = setup();
        let mut f = ExprFactory::new(&mut s.db);
        let holder = f.parameter(s.holder_ty, Some("h"));
        let inner = f.field(Some(holder), s.inner).unwrap();
        let x = f.field(Some(inner), s.x).unwrap();

        let loc = classify(&s.db, &x);
        let AddressableLocation::Field {
            owner: FieldOwner::Inline(owner),
            readonly: false,
            ..
        } = &loc
        else {
            panic!("expected inline field, got {loc:?}");
        };
        assert!(matches!(
            owner.as_ref(),
            AddressableLocation::Field {
                owner: FieldOwner::Heap(_),
                ..
            }
        ));
    }

    #[test]
    fn readonly_fields_are_flagged() {
        let mut s = setup();
        let mut f = ExprFactory::new(&mut s.db);
        let p = f.parameter(s.point_ty, None);
        let frozen = f.field(Some(p), s.frozen).unwrap();
        assert!(matches!(
            classify(&s.db, &frozen),
            AddressableLocation::Field { readonly: true, .. }
        ));
    }

    #[test]
    fn static_fields_have_fixed_storage() {
        let mut s = setup();
        let mut f = ExprFactory::new(&mut s.db);
        let shared = f.static_field(s.holder_ty, s.shared).unwrap();
        assert!(matches!(
            classify(&s.db, &shared),
            AddressableLocation::StaticField { constant: None, .. }
        ));
    }

    #[test]
    fn literal_statics_carry_their_constant() {
        let mut s = setup();
        let mut f = ExprFactory::new(&mut s.db);
        let limit = f.static_field(s.holder_ty, s.limit).unwrap();
        let loc = classify(&s.db, &limit);
        assert!(matches!(
            loc,
            AddressableLocation::StaticField {
                constant: Some(ConstantValue::I32(7)),
                ..
            }
        ));
    }

    #[test]
    fn constants_and_calls_are_temporaries() {
        let mut s = setup();
        let mut f = ExprFactory::new(&mut s.db);
        let c = f.constant(ConstantValue::I32(5));
        let loc = classify(&s.db, &c);
        assert!(!loc.is_addressable());
    }
}
