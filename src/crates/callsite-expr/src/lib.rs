//! Callsite expressions: node types, the factory that validates calls, the
//! addressability analyzer, and display rendering.

pub mod addressable;
pub mod ast;
pub mod display;
pub mod factory;
pub mod validate;

pub use addressable::{AddressableLocation, FieldOwner, classify};
pub use ast::{Expr, ExprKind, IndexForm, Lambda, Literal, ParamExpr};
pub use display::display;
pub use factory::{CallTarget, ExprFactory};
pub use validate::{ArgList, CallNode};
