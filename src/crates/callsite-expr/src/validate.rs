// src/crates/callsite-expr/src/validate.rs
//
// Call node validation: the structural and type-compatibility checks applied
// to an explicit (receiver, method, arguments) triple.

use smallvec::SmallVec;

use crate::ast::Expr;
use callsite_identity::MethodId;
use callsite_sema::{CallError, CompilationDb, InvalidReason, Slot, TypeId};

/// Argument expressions of a call.
pub type ArgList = SmallVec<[Expr; 4]>;

/// A validated method call. Immutable; only `CallNode::new` can build one.
#[derive(Debug, Clone)]
pub struct CallNode {
    receiver: Option<Expr>,
    method: MethodId,
    args: ArgList,
    return_type: TypeId,
}

impl CallNode {
    /// Validate a call in order: method, receiver, arity, then each argument.
    #[tracing::instrument(level = "trace", skip_all, fields(method = ?method))]
    pub fn new(
        db: &CompilationDb,
        receiver: Option<Expr>,
        method: Option<MethodId>,
        args: Vec<Option<Expr>>,
    ) -> Result<Self, CallError> {
        let method = method.ok_or_else(|| CallError::null(Slot::Method))?;
        let def = db.method(method);
        let method_name = db.display_method(method);
        if !db.is_closed(method) {
            return Err(CallError::invalid(
                Slot::Method,
                InvalidReason::OpenGenericMethod {
                    method: method_name,
                },
            ));
        }

        if def.is_static {
            if receiver.is_some() {
                return Err(CallError::invalid(
                    Slot::Instance,
                    InvalidReason::StaticWithInstance {
                        method: method_name,
                    },
                ));
            }
        } else {
            // Missing and mismatched receivers are both attributed to `method`.
            let Some(instance) = &receiver else {
                return Err(CallError::invalid(
                    Slot::Method,
                    InvalidReason::InstanceWithoutReceiver {
                        method: method_name,
                    },
                ));
            };
            if !instance.is_readable() {
                return Err(CallError::invalid(Slot::Instance, InvalidReason::NotReadable));
            }
            if !db.is_valid_instance_type(def.declaring_type, instance.ty) {
                return Err(CallError::invalid(
                    Slot::Method,
                    InvalidReason::ReceiverTypeMismatch {
                        method: method_name,
                        found: db.display_type(instance.ty),
                    },
                ));
            }
        }

        if args.len() != def.param_count() {
            return Err(CallError::invalid(
                Slot::Method,
                InvalidReason::ArgumentCount {
                    method: method_name,
                    expected: def.param_count(),
                    found: args.len(),
                },
            ));
        }

        let mut checked = ArgList::with_capacity(args.len());
        for (i, (arg, param)) in args.into_iter().zip(&def.params).enumerate() {
            let slot = Slot::Arg(i);
            let arg = arg.ok_or_else(|| CallError::null(slot))?;
            if !arg.is_readable() {
                return Err(CallError::invalid(slot, InvalidReason::NotReadable));
            }
            if !db.parameter_accepts(param.ty, arg.ty) {
                return Err(CallError::invalid(
                    slot,
                    InvalidReason::TypeMismatch {
                        expected: db.display_type(db.types.element_of_by_ref(param.ty)),
                        found: db.display_type(arg.ty),
                    },
                ));
            }
            checked.push(arg);
        }

        Ok(Self {
            receiver,
            method,
            args: checked,
            return_type: def.return_type,
        })
    }

    pub fn receiver(&self) -> Option<&Expr> {
        self.receiver.as_ref()
    }

    pub fn method(&self) -> MethodId {
        self.method
    }

    pub fn args(&self) -> &[Expr] {
        &self.args
    }

    pub fn return_type(&self) -> TypeId {
        self.return_type
    }
}
