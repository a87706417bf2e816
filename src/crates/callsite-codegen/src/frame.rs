// src/crates/callsite-codegen/src/frame.rs
//
// Per-invocation storage and the compile-time bindings that index into it.

use rustc_hash::FxHashMap;

use crate::errors::{CompileError, CompileResult};
use callsite_expr::{AddressableLocation, Expr, ExprKind, FieldOwner, Lambda, ParamExpr};
use callsite_identity::{FieldId, ParamId};
use callsite_runtime::Value;
use callsite_sema::TypeId;

/// Storage owned by a single invocation: parameter slots plus temporaries.
#[derive(Debug)]
pub struct Frame {
    pub slots: Vec<Value>,
    /// Per-invocation copies of read-only fields; `None` until first touched
    pub temps: Vec<Option<Value>>,
}

impl Frame {
    pub fn new(args: &[Value], temp_count: usize) -> Self {
        Self {
            slots: args.to_vec(),
            temps: vec![None; temp_count],
        }
    }

    /// Seed a temporary unless this invocation already did.
    pub fn init_temp(&mut self, index: usize, value: Value) {
        if let Some(temp) = self.temps.get_mut(index)
            && temp.is_none()
        {
            *temp = Some(value);
        }
    }
}

/// Structural identity of a read-only field's storage. Two accesses with the
/// same key share one temporary within an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TempKey {
    Param(ParamId),
    Static(FieldId, TypeId),
    Field(Box<TempKey>, FieldId),
    /// Owner with no stable identity (a call result, a constant)
    Unique(usize),
}

/// Compile-time bindings of a lambda: parameter slots and temporaries.
#[derive(Debug, Default)]
pub struct Bindings {
    slots: FxHashMap<ParamId, usize>,
    temps: FxHashMap<TempKey, usize>,
    temp_count: usize,
    next_unique: usize,
}

impl Bindings {
    /// Bind each lambda parameter to the frame slot at its position.
    pub fn for_lambda(lambda: &Lambda) -> CompileResult<Self> {
        let mut bindings = Self::default();
        for (index, param) in lambda.params.iter().enumerate() {
            let param = param
                .as_parameter()
                .ok_or(CompileError::NotAParameter { index })?;
            bindings.slots.insert(param.id, index);
        }
        Ok(bindings)
    }

    pub fn slot_of(&self, param: &ParamExpr) -> CompileResult<usize> {
        self.slots
            .get(&param.id)
            .copied()
            .ok_or_else(|| CompileError::UnboundParameter {
                name: param.display_name(),
            })
    }

    pub fn temp_count(&self) -> usize {
        self.temp_count
    }

    /// The temporary backing a read-only field at `field` on `owner`.
    pub fn readonly_temp(&mut self, owner: &FieldOwner<'_>, field: FieldId) -> usize {
        let owner_key = match owner {
            FieldOwner::Heap(expr) => self.expr_key(expr),
            FieldOwner::Inline(loc) => self.location_key(loc),
        };
        let key = TempKey::Field(Box::new(owner_key), field);
        if let Some(&index) = self.temps.get(&key) {
            return index;
        }
        let index = self.fresh_temp();
        self.temps.insert(key, index);
        index
    }

    fn fresh_temp(&mut self) -> usize {
        let index = self.temp_count;
        self.temp_count += 1;
        index
    }

    fn expr_key(&mut self, expr: &Expr) -> TempKey {
        match &expr.kind {
            ExprKind::Parameter(param) => TempKey::Param(param.id),
            _ => TempKey::Unique(self.fresh_temp_key()),
        }
    }

    fn location_key(&mut self, loc: &AddressableLocation<'_>) -> TempKey {
        match loc {
            AddressableLocation::Parameter(param) => TempKey::Param(param.id),
            AddressableLocation::StaticField {
                field, declaring, ..
            } => TempKey::Static(*field, *declaring),
            AddressableLocation::Field { owner, field, .. } => {
                let owner = match owner {
                    FieldOwner::Heap(expr) => self.expr_key(expr),
                    FieldOwner::Inline(inner) => self.location_key(inner),
                };
                TempKey::Field(Box::new(owner), *field)
            }
            AddressableLocation::ArrayElement { .. }
            | AddressableLocation::Unboxed { .. }
            | AddressableLocation::None(_) => TempKey::Unique(self.fresh_temp_key()),
        }
    }

    fn fresh_temp_key(&mut self) -> usize {
        let key = self.next_unique;
        self.next_unique += 1;
        key
    }
}
