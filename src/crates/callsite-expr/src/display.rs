// src/crates/callsite-expr/src/display.rs
//
// Source-like rendering of expressions.
//
// Static calls render without their declaring type (`Name(a, b)`), unlike
// static field and property accesses (`Type.Name`). Extension-shaped methods
// render their first argument as the receiver.

use crate::ast::{Expr, ExprKind, Literal};
use crate::validate::CallNode;
use callsite_sema::CompilationDb;

/// Render an expression.
pub fn display(db: &CompilationDb, expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(db, expr, &mut out);
    out
}

impl CallNode {
    pub fn display(&self, db: &CompilationDb) -> String {
        let mut out = String::new();
        write_call(db, self, &mut out);
        out
    }
}

fn write_expr(db: &CompilationDb, expr: &Expr, out: &mut String) {
    match &expr.kind {
        ExprKind::Parameter(param) => out.push_str(&param.display_name()),
        ExprKind::Constant(literal) => match literal {
            Literal::Value(value) => out.push_str(&value.to_string()),
            Literal::Null => out.push_str("null"),
            Literal::Default => {
                out.push_str("default(");
                out.push_str(&db.display_type(expr.ty));
                out.push(')');
            }
            Literal::New => {
                out.push_str("new ");
                out.push_str(&db.display_type(expr.ty));
                out.push_str("()");
            }
        },
        ExprKind::Field {
            owner,
            field,
            declaring,
        } => {
            match owner {
                Some(owner) => write_expr(db, owner, out),
                None => out.push_str(&db.display_type(*declaring)),
            }
            out.push('.');
            out.push_str(&db.field(*field).name);
        }
        ExprKind::Property {
            owner,
            property,
            args,
            ..
        } => {
            let def = db.property(*property);
            match owner {
                Some(owner) => write_expr(db, owner, out),
                None => out.push_str(&db.display_type(def.defining_type)),
            }
            if def.is_indexer() {
                write_list(db, args, '[', ']', out);
            } else {
                out.push('.');
                out.push_str(&def.name);
            }
        }
        ExprKind::ArrayIndex { array, indices, .. } => {
            write_expr(db, array, out);
            write_list(db, indices, '[', ']', out);
        }
        ExprKind::Unbox(operand) => {
            out.push_str("Unbox(");
            write_expr(db, operand, out);
            out.push(')');
        }
        ExprKind::Call(call) => write_call(db, call, out),
        ExprKind::Block(exprs) => {
            out.push_str("{ ");
            for (i, e) in exprs.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                write_expr(db, e, out);
            }
            out.push_str(" }");
        }
    }
}

fn write_call(db: &CompilationDb, call: &CallNode, out: &mut String) {
    let def = db.method(call.method());
    let args = call.args();
    let rest = match (call.receiver(), args.split_first()) {
        (Some(receiver), _) => {
            write_expr(db, receiver, out);
            out.push('.');
            args
        }
        (None, Some((first, rest))) if def.is_extension => {
            write_expr(db, first, out);
            out.push('.');
            rest
        }
        (None, _) => args,
    };
    out.push_str(&def.name);
    write_list(db, rest, '(', ')', out);
}

fn write_list(db: &CompilationDb, exprs: &[Expr], open: char, close: char, out: &mut String) {
    out.push(open);
    for (i, e) in exprs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_expr(db, e, out);
    }
    out.push(close);
}
