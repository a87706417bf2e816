// src/crates/callsite-expr/src/ast.rs
//
// Expression nodes consumed by call construction and compilation.
//
// Nodes are immutable once built by `ExprFactory`; every node carries its
// static type. Only the shapes that matter to method calls are modelled.

use crate::validate::CallNode;
use callsite_identity::{FieldId, MethodId, ParamId, PropertyId};
use callsite_sema::{ConstantValue, TypeId};

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    /// Static type of the expression
    pub ty: TypeId,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: TypeId) -> Self {
        Self { kind, ty }
    }

    /// Write-only properties cannot be read; everything else can.
    pub fn is_readable(&self) -> bool {
        match &self.kind {
            ExprKind::Property { getter, .. } => getter.is_some(),
            _ => true,
        }
    }

    pub fn as_parameter(&self) -> Option<&ParamExpr> {
        match &self.kind {
            ExprKind::Parameter(param) => Some(param),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&CallNode> {
        match &self.kind {
            ExprKind::Call(call) => Some(call),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamExpr {
    pub id: ParamId,
    pub name: Option<String>,
}

impl ParamExpr {
    /// Name used when rendering: the declared name or a synthetic `Param_N`.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Param_{}", self.id.index()),
        }
    }
}

/// Constant payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Value(ConstantValue),
    Null,
    /// Default value of the expression's type
    Default,
    /// A default-constructed instance, allocated once per compiled callable
    New,
}

/// Which factory form built an array element access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexForm {
    ArrayIndex,
    ArrayAccess,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Parameter(ParamExpr),
    Constant(Literal),
    /// Field read; `owner` is `None` for static and literal fields
    Field {
        owner: Option<Box<Expr>>,
        field: FieldId,
        /// Closed type that declares the field
        declaring: TypeId,
    },
    /// Property or indexer read through its getter
    Property {
        owner: Option<Box<Expr>>,
        property: PropertyId,
        /// Getter closed over the owner type; `None` for write-only properties
        getter: Option<MethodId>,
        args: Vec<Expr>,
    },
    ArrayIndex {
        array: Box<Expr>,
        indices: Vec<Expr>,
        form: IndexForm,
    },
    /// Unbox an `object` into the value type given by the node type
    Unbox(Box<Expr>),
    Call(Box<CallNode>),
    /// Evaluate in order, yield the last value
    Block(Vec<Expr>),
}

/// A compilable unit: parameters bound to frame slots, plus a body.
#[derive(Debug, Clone)]
pub struct Lambda {
    pub params: Vec<Expr>,
    pub body: Expr,
}

impl Lambda {
    pub fn new(body: Expr, params: Vec<Expr>) -> Self {
        Self { params, body }
    }

    pub fn return_type(&self) -> TypeId {
        self.body.ty
    }
}
