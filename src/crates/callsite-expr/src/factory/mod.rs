// src/crates/callsite-expr/src/factory/mod.rs
//
// ExprFactory: the only way to build expression nodes. Member accesses are
// typed through their closed owner, calls go through `CallNode::new`, and
// name-based calls through the resolver first.

use crate::ast::{Expr, ExprKind, IndexForm, Lambda, Literal, ParamExpr};
use crate::validate::CallNode;
use callsite_identity::{FieldId, MethodId, PropertyId, TypeDefId};
use callsite_sema::{
    CallError, CompilationDb, ConstantValue, InvalidReason, ResolveTarget, Slot, TypeId,
    resolve_method,
};

/// Receiver side of a name-based call: an instance expression or a type.
/// `None` payloads model a caller passing a null receiver or type.
#[derive(Debug, Clone)]
pub enum CallTarget {
    Instance(Option<Expr>),
    Type(Option<TypeId>),
}

/// Builds expressions against a mutable database (member access on generic
/// owners interns closed member descriptors on demand).
pub struct ExprFactory<'db> {
    db: &'db mut CompilationDb,
}

impl<'db> ExprFactory<'db> {
    pub fn new(db: &'db mut CompilationDb) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &CompilationDb {
        &*self.db
    }

    // ========================================================================
    // Leaves
    // ========================================================================

    pub fn parameter(&mut self, ty: TypeId, name: Option<&str>) -> Expr {
        let id = self.db.fresh_param_id();
        Expr::new(
            ExprKind::Parameter(ParamExpr {
                id,
                name: name.map(str::to_string),
            }),
            ty,
        )
    }

    pub fn constant(&self, value: ConstantValue) -> Expr {
        let ty = match &value {
            ConstantValue::Bool(_) => TypeId::BOOL,
            ConstantValue::I32(_) => TypeId::I32,
            ConstantValue::U32(_) => TypeId::U32,
            ConstantValue::I64(_) => TypeId::I64,
            ConstantValue::F64(_) => TypeId::F64,
            ConstantValue::Str(_) => TypeId::STRING,
        };
        Expr::new(ExprKind::Constant(Literal::Value(value)), ty)
    }

    pub fn i32(&self, value: i32) -> Expr {
        self.constant(ConstantValue::I32(value))
    }

    pub fn string(&self, value: &str) -> Expr {
        self.constant(ConstantValue::Str(value.to_string()))
    }

    pub fn null(&self, ty: TypeId) -> Expr {
        Expr::new(ExprKind::Constant(Literal::Null), ty)
    }

    pub fn default_value(&self, ty: TypeId) -> Expr {
        Expr::new(ExprKind::Constant(Literal::Default), ty)
    }

    /// A constant holding a default-constructed instance of `ty`.
    pub fn new_instance(&self, ty: TypeId) -> Expr {
        Expr::new(ExprKind::Constant(Literal::New), ty)
    }

    pub fn block(&self, exprs: Vec<Expr>) -> Expr {
        let ty = exprs.last().map_or(TypeId::VOID, |e| e.ty);
        Expr::new(ExprKind::Block(exprs), ty)
    }

    pub fn lambda(&self, body: Expr, params: Vec<Expr>) -> Lambda {
        Lambda::new(body, params)
    }

    // ========================================================================
    // Fields
    // ========================================================================

    /// Field access. A `None` owner selects a static field of a non-generic type.
    pub fn field(&mut self, owner: Option<Expr>, field: FieldId) -> Result<Expr, CallError> {
        let def = self.db.field(field);
        let name = def.name.clone();
        let is_static = def.is_static;
        let defining = def.defining_type;

        match owner {
            None if is_static => {
                let declaring = self.db.self_type(defining);
                self.static_field(declaring, field)
            }
            None => Err(CallError::invalid(
                Slot::Expression,
                InvalidReason::MissingOwner { member: name },
            )),
            Some(_) if is_static => Err(CallError::invalid(
                Slot::Expression,
                InvalidReason::StaticMemberWithOwner { member: name },
            )),
            Some(owner) => {
                if !owner.is_readable() {
                    return Err(CallError::invalid(Slot::Expression, InvalidReason::NotReadable));
                }
                let declaring = self.owner_instance_of(owner.ty, defining)?;
                let ty = self.db.field_type_in(field, declaring);
                Ok(Expr::new(
                    ExprKind::Field {
                        owner: Some(Box::new(owner)),
                        field,
                        declaring,
                    },
                    ty,
                ))
            }
        }
    }

    /// Static (or literal) field access through a closed declaring type.
    pub fn static_field(&mut self, declaring: TypeId, field: FieldId) -> Result<Expr, CallError> {
        let def = self.db.field(field);
        if !def.is_static {
            return Err(CallError::invalid(
                Slot::Expression,
                InvalidReason::MissingOwner {
                    member: def.name.clone(),
                },
            ));
        }
        let declaring = self.owner_instance_of(declaring, def.defining_type)?;
        let ty = self.db.field_type_in(field, declaring);
        Ok(Expr::new(
            ExprKind::Field {
                owner: None,
                field,
                declaring,
            },
            ty,
        ))
    }

    pub fn field_named(&mut self, owner: Expr, name: &str) -> Result<Expr, CallError> {
        let field = self.find_field(owner.ty, name)?;
        self.field(Some(owner), field)
    }

    pub fn static_field_named(&mut self, declaring: TypeId, name: &str) -> Result<Expr, CallError> {
        let field = self.find_field(declaring, name)?;
        self.static_field(declaring, field)
    }

    fn find_field(&self, ty: TypeId, name: &str) -> Result<FieldId, CallError> {
        self.db
            .field_by_name(ty, name)
            .ok_or_else(|| CallError::MemberNotFound {
                name: name.to_string(),
                type_name: self.db.display_type(ty),
            })
    }

    // ========================================================================
    // Properties and indexers
    // ========================================================================

    /// Property or indexer access; `args` are the index arguments.
    pub fn property(
        &mut self,
        owner: Option<Expr>,
        property: PropertyId,
        args: Vec<Expr>,
    ) -> Result<Expr, CallError> {
        let def = self.db.property(property);
        let name = def.name.clone();
        let is_static = def.is_static;
        match owner {
            None if is_static => {
                let declaring = def.defining_type;
                self.static_property(declaring, property, args)
            }
            None => Err(CallError::invalid(
                Slot::Expression,
                InvalidReason::MissingOwner { member: name },
            )),
            Some(_) if is_static => Err(CallError::invalid(
                Slot::Expression,
                InvalidReason::StaticMemberWithOwner { member: name },
            )),
            Some(owner) => {
                if !owner.is_readable() {
                    return Err(CallError::invalid(Slot::Expression, InvalidReason::NotReadable));
                }
                let owner_ty = owner.ty;
                self.property_through(Some(owner), owner_ty, property, args)
            }
        }
    }

    /// Static property access through a closed declaring type.
    pub fn static_property(
        &mut self,
        declaring: TypeId,
        property: PropertyId,
        args: Vec<Expr>,
    ) -> Result<Expr, CallError> {
        let def = self.db.property(property);
        if !def.is_static {
            return Err(CallError::invalid(
                Slot::Expression,
                InvalidReason::MissingOwner {
                    member: def.name.clone(),
                },
            ));
        }
        self.property_through(None, declaring, property, args)
    }

    pub fn property_named(&mut self, owner: Expr, name: &str) -> Result<Expr, CallError> {
        let property = self.find_property(owner.ty, name)?;
        self.property(Some(owner), property, Vec::new())
    }

    pub fn static_property_named(
        &mut self,
        declaring: TypeId,
        name: &str,
    ) -> Result<Expr, CallError> {
        let property = self.find_property(declaring, name)?;
        self.static_property(declaring, property, Vec::new())
    }

    /// Indexer access (`owner[args]`) through the `Item` property.
    pub fn indexer(&mut self, owner: Expr, args: Vec<Expr>) -> Result<Expr, CallError> {
        let property = self.find_property(owner.ty, "Item")?;
        self.property(Some(owner), property, args)
    }

    fn find_property(&self, ty: TypeId, name: &str) -> Result<PropertyId, CallError> {
        self.db
            .property_by_name(ty, name)
            .ok_or_else(|| CallError::MemberNotFound {
                name: name.to_string(),
                type_name: self.db.display_type(ty),
            })
    }

    fn property_through(
        &mut self,
        owner: Option<Expr>,
        owner_ty: TypeId,
        property: PropertyId,
        args: Vec<Expr>,
    ) -> Result<Expr, CallError> {
        let def = self.db.property(property).clone();
        let defining = self
            .db
            .entities
            .def_of(&self.db.types, def.defining_type)
            .ok_or_else(|| CallError::MemberNotFound {
                name: def.name.clone(),
                type_name: self.db.display_type(owner_ty),
            })?;
        let declaring = self.owner_instance_of(owner_ty, defining)?;

        if args.len() != def.index_params.len() {
            return Err(CallError::invalid(
                Slot::Arguments,
                InvalidReason::IndexCount {
                    expected: def.index_params.len(),
                    found: args.len(),
                },
            ));
        }
        let subs = self.db.entities.substitutions_for(&self.db.types, declaring);
        for (i, (arg, &param)) in args.iter().zip(&def.index_params).enumerate() {
            let param = self.db.types.substitute(param, &subs);
            if !arg.is_readable() {
                return Err(CallError::invalid(Slot::Arg(i), InvalidReason::NotReadable));
            }
            if !self.db.is_reference_assignable(param, arg.ty) {
                return Err(CallError::invalid(
                    Slot::Arg(i),
                    InvalidReason::TypeMismatch {
                        expected: self.db.display_type(param),
                        found: self.db.display_type(arg.ty),
                    },
                ));
            }
        }

        let getter = def.getter.map(|g| self.db.method_in(g, declaring));
        let ty = self.db.property_type_in(property, declaring);
        Ok(Expr::new(
            ExprKind::Property {
                owner: owner.map(Box::new),
                property,
                getter,
                args,
            },
            ty,
        ))
    }

    /// `ty` itself or the base of `ty` that instantiates `defining`.
    fn owner_instance_of(
        &self,
        ty: TypeId,
        defining: TypeDefId,
    ) -> Result<TypeId, CallError> {
        self.db.ancestor_of_def(ty, defining).ok_or_else(|| {
            let expected = self.db.self_type(defining);
            CallError::invalid(
                Slot::Expression,
                InvalidReason::TypeMismatch {
                    expected: self.db.display_type(expected),
                    found: self.db.display_type(ty),
                },
            )
        })
    }

    // ========================================================================
    // Arrays and unboxing
    // ========================================================================

    /// `array[i, j]` built through the array-index form.
    pub fn array_index(&mut self, array: Expr, indices: Vec<Expr>) -> Result<Expr, CallError> {
        self.element(array, indices, IndexForm::ArrayIndex)
    }

    /// `array[i, j]` built through the array-access form.
    pub fn array_access(&mut self, array: Expr, indices: Vec<Expr>) -> Result<Expr, CallError> {
        self.element(array, indices, IndexForm::ArrayAccess)
    }

    fn element(&self, array: Expr, indices: Vec<Expr>, form: IndexForm) -> Result<Expr, CallError> {
        let Some((elem, rank)) = self.db.types.unwrap_array(array.ty) else {
            return Err(CallError::invalid(
                Slot::Array,
                InvalidReason::UnexpectedOperand {
                    expected: "an array",
                    found: self.db.display_type(array.ty),
                },
            ));
        };
        if indices.len() != usize::from(rank) {
            return Err(CallError::invalid(
                Slot::Indexes,
                InvalidReason::IndexCount {
                    expected: usize::from(rank),
                    found: indices.len(),
                },
            ));
        }
        if let Some(bad) = indices.iter().find(|i| i.ty != TypeId::I32) {
            return Err(CallError::invalid(
                Slot::Indexes,
                InvalidReason::TypeMismatch {
                    expected: "i32".to_string(),
                    found: self.db.display_type(bad.ty),
                },
            ));
        }
        Ok(Expr::new(
            ExprKind::ArrayIndex {
                array: Box::new(array),
                indices,
                form,
            },
            elem,
        ))
    }

    /// Unbox an `object`-typed operand into the value type `ty`.
    pub fn unbox(&self, operand: Expr, ty: TypeId) -> Result<Expr, CallError> {
        if !self.db.types.is_reference_type(operand.ty) {
            return Err(CallError::invalid(
                Slot::Expression,
                InvalidReason::UnexpectedOperand {
                    expected: "a reference-typed operand",
                    found: self.db.display_type(operand.ty),
                },
            ));
        }
        if !self.db.types.is_value_type(ty) {
            return Err(CallError::invalid(
                Slot::Type,
                InvalidReason::UnexpectedOperand {
                    expected: "a value type",
                    found: self.db.display_type(ty),
                },
            ));
        }
        Ok(Expr::new(ExprKind::Unbox(Box::new(operand)), ty))
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// Build a call to an explicit method. `None` entries model null
    /// method / argument references and are reported against their slot.
    pub fn call(
        &mut self,
        receiver: Option<Expr>,
        method: Option<MethodId>,
        args: impl IntoIterator<Item = Option<Expr>>,
    ) -> Result<Expr, CallError> {
        let node = CallNode::new(self.db, receiver, method, args.into_iter().collect())?;
        let ty = node.return_type();
        Ok(Expr::new(ExprKind::Call(Box::new(node)), ty))
    }

    /// Static call with present arguments.
    pub fn call_static(
        &mut self,
        method: MethodId,
        args: impl IntoIterator<Item = Expr>,
    ) -> Result<Expr, CallError> {
        self.call(None, Some(method), args.into_iter().map(Some))
    }

    /// Instance call with present receiver and arguments.
    pub fn call_instance(
        &mut self,
        receiver: Expr,
        method: MethodId,
        args: impl IntoIterator<Item = Expr>,
    ) -> Result<Expr, CallError> {
        self.call(Some(receiver), Some(method), args.into_iter().map(Some))
    }

    /// Resolve `name` against the target, then build the call.
    #[tracing::instrument(level = "debug", skip_all, fields(name = ?name))]
    pub fn call_by_name(
        &mut self,
        target: CallTarget,
        name: Option<&str>,
        type_args: Option<&[Option<TypeId>]>,
        args: Vec<Option<Expr>>,
    ) -> Result<Expr, CallError> {
        let (target, receiver) = match target {
            CallTarget::Instance(None) => return Err(CallError::null(Slot::Instance)),
            CallTarget::Instance(Some(instance)) => {
                (ResolveTarget::instance(instance.ty), Some(instance))
            }
            CallTarget::Type(None) => return Err(CallError::null(Slot::Type)),
            CallTarget::Type(Some(ty)) => (ResolveTarget::static_on(ty), None),
        };
        let name = name.ok_or_else(|| CallError::null(Slot::MethodName))?;

        let arg_types: Vec<Option<TypeId>> =
            args.iter().map(|a| a.as_ref().map(|e| e.ty)).collect();
        let method = resolve_method(self.db, target, name, type_args, &arg_types)?;
        self.call(receiver, Some(method), args)
    }
}
