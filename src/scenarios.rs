// src/scenarios.rs
//! Named write-back scenarios over the fixture universe.
//!
//! Each scenario builds one lambda, compiles it under a strategy, creates its
//! input once, and invokes the callable repeatedly with that same input. The
//! observed results show whether mutations made by the invoked method reached
//! the original storage.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::ScenarioError;
use crate::fixtures::{self, FixtureIds, Fixtures};
use callsite_codegen::{ExecutionStrategy, compile};
use callsite_expr::{ExprFactory, Lambda, display};
use callsite_runtime::{Runtime, RuntimeError, Value};
use callsite_sema::{CallError, TypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// `((Mutable)box).Foo()`
    Unbox,
    /// `array[0].Foo()` through the array-index form
    ArrayIndex,
    ArrayIndexRank2,
    /// `array[0].Foo()` through the array-access form
    ArrayAccess,
    ArrayAccessRank2,
    /// `list[0].Foo()` on `List<Mutable>`: indexer results are copies
    ListIndexer,
    /// `wrapper.Field.Foo()`
    Field,
    /// `wrapper.Property.Foo()`: property results are copies
    Property,
    /// `wrapper.ReadOnlyField.Foo()`: the field itself is never written
    ReadOnlyField,
    /// `Wrapper<Mutable>.Zero.GetType()`
    ConstField,
    /// `Statics.Shared.Foo()`
    StaticField,
    /// `{ ByRef(m.X); m.X }`
    ByRefProperty,
    /// `{ ByRef(m[0]); m[0] }`
    ByRefIndexer,
    /// `{ ByRef(w.Field); w.Field }` on a shared `Wrapper<int>`
    ByRefField,
    /// `{ ByRef(a[0]); a[0] }` on a shared `int[]`
    ByRefElement,
    /// `{ ByRef(x); x }` where `x` is the lambda parameter
    ByRefParameter,
    /// `{ Next(x); x }` with an `out` parameter
    OutArgument,
}

impl Scenario {
    pub const ALL: [Scenario; 17] = [
        Scenario::Unbox,
        Scenario::ArrayIndex,
        Scenario::ArrayIndexRank2,
        Scenario::ArrayAccess,
        Scenario::ArrayAccessRank2,
        Scenario::ListIndexer,
        Scenario::Field,
        Scenario::Property,
        Scenario::ReadOnlyField,
        Scenario::ConstField,
        Scenario::StaticField,
        Scenario::ByRefProperty,
        Scenario::ByRefIndexer,
        Scenario::ByRefField,
        Scenario::ByRefElement,
        Scenario::ByRefParameter,
        Scenario::OutArgument,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Unbox => "unbox",
            Scenario::ArrayIndex => "array-index",
            Scenario::ArrayIndexRank2 => "array-index-rank2",
            Scenario::ArrayAccess => "array-access",
            Scenario::ArrayAccessRank2 => "array-access-rank2",
            Scenario::ListIndexer => "list-indexer",
            Scenario::Field => "field",
            Scenario::Property => "property",
            Scenario::ReadOnlyField => "readonly-field",
            Scenario::ConstField => "const-field",
            Scenario::StaticField => "static-field",
            Scenario::ByRefProperty => "byref-property",
            Scenario::ByRefIndexer => "byref-indexer",
            Scenario::ByRefField => "byref-field",
            Scenario::ByRefElement => "byref-element",
            Scenario::ByRefParameter => "byref-parameter",
            Scenario::OutArgument => "out-argument",
        }
    }

    /// Results of the default number of invocations.
    pub fn expected(self) -> Vec<Value> {
        let ints = |xs: &[i32]| -> Vec<Value> { xs.iter().copied().map(Value::I32).collect() };
        match self {
            Scenario::Unbox => ints(&[0, 1, 2, 3]),
            Scenario::ArrayIndex
            | Scenario::ArrayIndexRank2
            | Scenario::ArrayAccess
            | Scenario::ArrayAccessRank2
            | Scenario::Field
            | Scenario::StaticField => ints(&[0, 1, 2]),
            Scenario::ListIndexer | Scenario::Property => ints(&[0, 0]),
            Scenario::ReadOnlyField => ints(&[0, 0, 0]),
            Scenario::ConstField => vec![Value::Type(TypeId::I32)],
            Scenario::ByRefProperty | Scenario::ByRefIndexer => ints(&[41, 41]),
            Scenario::ByRefField | Scenario::ByRefElement => ints(&[42, 43]),
            Scenario::ByRefParameter => ints(&[42, 42]),
            Scenario::OutArgument => ints(&[1, 1]),
        }
    }

    pub fn default_invocations(self) -> usize {
        self.expected().len()
    }

    /// Build the scenario's lambda against the fixture database.
    pub fn build(self, fx: &mut Fixtures) -> Result<Lambda, CallError> {
        let ids = fx.ids;
        let mut f = ExprFactory::new(&mut fx.db);
        let lambda = match self {
            Scenario::Unbox => {
                let p = f.parameter(TypeId::OBJECT, Some("o"));
                let unboxed = f.unbox(p.clone(), ids.mutable_ty)?;
                let call = f.call_instance(unboxed, ids.foo, Vec::new())?;
                f.lambda(call, vec![p])
            }
            Scenario::ArrayIndex
            | Scenario::ArrayIndexRank2
            | Scenario::ArrayAccess
            | Scenario::ArrayAccessRank2 => {
                let rank2 = matches!(self, Scenario::ArrayIndexRank2 | Scenario::ArrayAccessRank2);
                let array_ty = if rank2 {
                    ids.mutable_array_2d
                } else {
                    ids.mutable_array
                };
                let p = f.parameter(array_ty, Some("array"));
                let indices: Vec<_> = (0..if rank2 { 2 } else { 1 }).map(|_| f.i32(0)).collect();
                let element = if matches!(self, Scenario::ArrayIndex | Scenario::ArrayIndexRank2) {
                    f.array_index(p.clone(), indices)?
                } else {
                    f.array_access(p.clone(), indices)?
                };
                let call = f.call_instance(element, ids.foo, Vec::new())?;
                f.lambda(call, vec![p])
            }
            Scenario::ListIndexer => {
                let p = f.parameter(ids.list_of_mutable, Some("list"));
                let zero = f.i32(0);
                let item = f.indexer(p.clone(), vec![zero])?;
                let call = f.call_instance(item, ids.foo, Vec::new())?;
                f.lambda(call, vec![p])
            }
            Scenario::Field | Scenario::ReadOnlyField => {
                let field = if self == Scenario::Field {
                    ids.wrapper_field
                } else {
                    ids.wrapper_readonly
                };
                let p = f.parameter(ids.wrapper_of_mutable, Some("wrapper"));
                let member = f.field(Some(p.clone()), field)?;
                let call = f.call_instance(member, ids.foo, Vec::new())?;
                f.lambda(call, vec![p])
            }
            Scenario::Property => {
                let p = f.parameter(ids.wrapper_of_mutable, Some("wrapper"));
                let member = f.property(Some(p.clone()), ids.wrapper_property, Vec::new())?;
                let call = f.call_instance(member, ids.foo, Vec::new())?;
                f.lambda(call, vec![p])
            }
            Scenario::ConstField => {
                let zero = f.static_field(ids.wrapper_of_mutable, ids.wrapper_zero)?;
                let call = f.call_instance(zero, ids.get_type, Vec::new())?;
                f.lambda(call, Vec::new())
            }
            Scenario::StaticField => {
                let shared = f.static_field(ids.statics_ty, ids.shared)?;
                let call = f.call_instance(shared, ids.foo, Vec::new())?;
                f.lambda(call, Vec::new())
            }
            Scenario::ByRefProperty | Scenario::ByRefIndexer => {
                let p = f.parameter(ids.mutable_ty, Some("m"));
                let x = if self == Scenario::ByRefProperty {
                    f.property(Some(p.clone()), ids.mutable_x_prop, Vec::new())?
                } else {
                    let zero = f.i32(0);
                    f.property(Some(p.clone()), ids.mutable_item, vec![zero])?
                };
                let call = f.call_static(ids.by_ref, [x.clone()])?;
                let body = f.block(vec![call, x]);
                f.lambda(body, vec![p])
            }
            Scenario::ByRefField => {
                let p = f.parameter(ids.wrapper_of_int, Some("w"));
                let x = f.field(Some(p.clone()), ids.wrapper_field)?;
                let call = f.call_static(ids.by_ref, [x.clone()])?;
                let body = f.block(vec![call, x]);
                f.lambda(body, vec![p])
            }
            Scenario::ByRefElement => {
                let p = f.parameter(ids.int_array, Some("a"));
                let zero = f.i32(0);
                let x = f.array_index(p.clone(), vec![zero])?;
                let call = f.call_static(ids.by_ref, [x.clone()])?;
                let body = f.block(vec![call, x]);
                f.lambda(body, vec![p])
            }
            Scenario::ByRefParameter | Scenario::OutArgument => {
                let method = if self == Scenario::ByRefParameter {
                    ids.by_ref
                } else {
                    ids.next
                };
                let x = f.parameter(TypeId::I32, Some("x"));
                let call = f.call_static(method, [x.clone()])?;
                let body = f.block(vec![call, x.clone()]);
                f.lambda(body, vec![x])
            }
        };
        Ok(lambda)
    }

    /// The runtime input shared by every invocation.
    pub fn input(self, rt: &Runtime, ids: &FixtureIds) -> Result<Vec<Value>, RuntimeError> {
        Ok(match self {
            Scenario::Unbox => vec![rt.box_value(rt.default_value(ids.mutable_ty))],
            Scenario::ArrayIndex | Scenario::ArrayAccess => {
                vec![rt.new_array(ids.mutable_array, &[1])?]
            }
            Scenario::ArrayIndexRank2 | Scenario::ArrayAccessRank2 => {
                vec![rt.new_array(ids.mutable_array_2d, &[1, 1])?]
            }
            Scenario::ListIndexer => vec![fixtures::list_of_mutable(rt, ids, 1)?],
            Scenario::Field | Scenario::ReadOnlyField | Scenario::Property => {
                vec![rt.new_instance(ids.wrapper_of_mutable)]
            }
            Scenario::ConstField | Scenario::StaticField => Vec::new(),
            Scenario::ByRefProperty | Scenario::ByRefIndexer => {
                vec![fixtures::mutable_with(rt, ids, 41)?]
            }
            Scenario::ByRefField => {
                let wrapper = rt.new_instance(ids.wrapper_of_int);
                let Value::Object(object) = &wrapper else {
                    return Err(RuntimeError::invalid_cast("object", wrapper.kind_name()));
                };
                if !object.set_field(0, Value::I32(41)) {
                    return Err(RuntimeError::IndexOutOfRange);
                }
                vec![wrapper]
            }
            Scenario::ByRefElement => {
                let array = rt.new_array(ids.int_array, &[1])?;
                let Value::Array(elems) = &array else {
                    return Err(RuntimeError::invalid_cast("array", array.kind_name()));
                };
                if !elems.set(0, Value::I32(41)) {
                    return Err(RuntimeError::IndexOutOfRange);
                }
                vec![array]
            }
            Scenario::ByRefParameter | Scenario::OutArgument => vec![Value::I32(41)],
        })
    }

    pub fn run(
        self,
        strategy: ExecutionStrategy,
        invocations: usize,
    ) -> Result<Outcome, ScenarioError> {
        let mut fx = Fixtures::new();
        let lambda = self.build(&mut fx)?;
        let rendered = display(&fx.db, &lambda.body);
        let ids = fx.ids;
        let rt = fx.into_runtime();
        let callable = compile(&lambda, &rt, strategy)?;
        let input = self.input(&rt, &ids)?;

        let results = (0..invocations)
            .map(|_| callable.invoke(&input))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(scenario = self.name(), %strategy, ?results, "scenario ran");

        Ok(Outcome {
            scenario: self,
            strategy,
            expression: rendered,
            results,
            runtime: rt,
        })
    }

    /// Run with the default invocation count and compare against `expected`.
    pub fn check(self, strategy: ExecutionStrategy) -> Result<Outcome, ScenarioError> {
        let outcome = self.run(strategy, self.default_invocations())?;
        let expected = self.expected();
        if outcome.results != expected {
            return Err(ScenarioError::Mismatch {
                scenario: self.name(),
                strategy,
                expected: render_values(&outcome.runtime, &expected),
                found: render_values(&outcome.runtime, &outcome.results),
            });
        }
        Ok(outcome)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ScenarioError::UnknownScenario {
                name: s.to_string(),
            })
    }
}

/// Observed results of one scenario run.
pub struct Outcome {
    pub scenario: Scenario,
    pub strategy: ExecutionStrategy,
    /// Source-like rendering of the lambda body
    pub expression: String,
    pub results: Vec<Value>,
    runtime: Arc<Runtime>,
}

impl Outcome {
    pub fn rendered_results(&self) -> String {
        render_values(&self.runtime, &self.results)
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("scenario", &self.scenario)
            .field("strategy", &self.strategy)
            .field("expression", &self.expression)
            .field("results", &self.results)
            .finish()
    }
}

/// Render values the way the runner prints them; type objects show their name.
pub fn render_values(rt: &Runtime, values: &[Value]) -> String {
    let parts: Vec<String> = values
        .iter()
        .map(|value| match value {
            Value::Type(ty) => format!("typeof({})", rt.type_name(*ty)),
            other => format!("{other:?}"),
        })
        .collect();
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.name().parse::<Scenario>().ok(), Some(scenario));
        }
        assert!(matches!(
            "nope".parse::<Scenario>(),
            Err(ScenarioError::UnknownScenario { .. })
        ));
    }

    #[test]
    fn every_scenario_builds() {
        for scenario in Scenario::ALL {
            let mut fx = Fixtures::new();
            assert!(scenario.build(&mut fx).is_ok(), "{scenario}");
        }
    }

    #[test]
    fn by_ref_inputs_are_seeded() {
        let fx = Fixtures::new();
        let ids = fx.ids;
        let rt = fx.into_runtime();

        let input = Scenario::ByRefField.input(&rt, &ids).unwrap();
        let Value::Object(object) = &input[0] else {
            panic!("expected a heap object");
        };
        assert_eq!(object.field(0), Some(Value::I32(41)));

        let input = Scenario::ByRefElement.input(&rt, &ids).unwrap();
        let Value::Array(elems) = &input[0] else {
            panic!("expected an array");
        };
        assert_eq!(elems.get(0), Some(Value::I32(41)));
    }

    #[test]
    fn const_field_renders_type_name() {
        let outcome = Scenario::ConstField
            .run(ExecutionStrategy::Compiled, 1)
            .unwrap();
        assert_eq!(outcome.rendered_results(), "typeof(i32)");
    }
}
