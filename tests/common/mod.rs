// tests/common/mod.rs
//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use callsite::fixtures::{FixtureIds, Fixtures};
use callsite::{ExecutionStrategy, ExprFactory, Lambda, Runtime, Value, compile};

/// Build a lambda against fresh fixtures, then freeze them into a runtime.
pub fn build<F>(build: F) -> (Lambda, FixtureIds, Arc<Runtime>)
where
    F: FnOnce(&mut ExprFactory<'_>, &FixtureIds) -> Lambda,
{
    let mut fx = Fixtures::new();
    let ids = fx.ids;
    let lambda = {
        let mut f = ExprFactory::new(&mut fx.db);
        build(&mut f, &ids)
    };
    (lambda, ids, fx.into_runtime())
}

/// Invoke `lambda` `times` times under `strategy` with the same input.
pub fn invoke_repeatedly(
    lambda: &Lambda,
    rt: &Arc<Runtime>,
    strategy: ExecutionStrategy,
    input: &[Value],
    times: usize,
) -> Vec<Value> {
    let callable = compile(lambda, rt, strategy).unwrap();
    (0..times)
        .map(|_| callable.invoke(input).unwrap())
        .collect()
}

pub fn ints(values: &[i32]) -> Vec<Value> {
    values.iter().copied().map(Value::I32).collect()
}
