// tests/write_back.rs
//! Receiver and by-ref write-back, run under both execution strategies.

mod common;

use std::sync::Arc;
use std::thread;

use callsite::fixtures::{self, Fixtures};
use callsite::scenarios::Scenario;
use callsite::{ExecutionStrategy, RuntimeError, TypeId, Value, compile};
use common::{build, ints, invoke_repeatedly};

#[test]
fn every_scenario_matches_its_expectation_under_both_strategies() {
    for strategy in ExecutionStrategy::ALL {
        for scenario in Scenario::ALL {
            if let Err(err) = scenario.check(strategy) {
                panic!("{scenario} ({strategy}): {err}");
            }
        }
    }
}

#[test]
fn unbox_mutates_the_boxed_value() {
    for strategy in ExecutionStrategy::ALL {
        let (lambda, ids, rt) = build(|f, ids| {
            let o = f.parameter(TypeId::OBJECT, Some("o"));
            let unboxed = f.unbox(o.clone(), ids.mutable_ty).unwrap();
            let call = f.call_instance(unboxed, ids.foo, Vec::new()).unwrap();
            f.lambda(call, vec![o])
        });
        let boxed = rt.box_value(rt.default_value(ids.mutable_ty));
        let results = invoke_repeatedly(&lambda, &rt, strategy, std::slice::from_ref(&boxed), 4);
        assert_eq!(results, ints(&[0, 1, 2, 3]), "{strategy}");

        let Value::Boxed(inner) = &boxed else {
            panic!("expected a box");
        };
        assert_eq!(
            inner.get().as_struct().map(|s| s.fields[0].clone()),
            Some(Value::I32(4))
        );
    }
}

#[test]
fn unbox_of_the_wrong_type_is_an_invalid_cast() {
    for strategy in ExecutionStrategy::ALL {
        let (lambda, _, rt) = build(|f, ids| {
            let o = f.parameter(TypeId::OBJECT, Some("o"));
            let unboxed = f.unbox(o.clone(), ids.mutable_ty).unwrap();
            let call = f.call_instance(unboxed, ids.foo, Vec::new()).unwrap();
            f.lambda(call, vec![o])
        });
        let callable = compile(&lambda, &rt, strategy).unwrap();
        let boxed_int = rt.box_value(Value::I32(3));
        assert!(matches!(
            callable.invoke(&[boxed_int]),
            Err(RuntimeError::InvalidCast { .. })
        ));
        assert!(matches!(
            callable.invoke(&[Value::Null]),
            Err(RuntimeError::NullReference { .. })
        ));
    }
}

#[test]
fn array_element_out_of_range_is_reported() {
    for strategy in ExecutionStrategy::ALL {
        let (lambda, ids, rt) = build(|f, ids| {
            let a = f.parameter(ids.mutable_array, Some("a"));
            let five = f.i32(5);
            let element = f.array_index(a.clone(), vec![five]).unwrap();
            let call = f.call_instance(element, ids.foo, Vec::new()).unwrap();
            f.lambda(call, vec![a])
        });
        let callable = compile(&lambda, &rt, strategy).unwrap();
        let array = rt.new_array(ids.mutable_array, &[1]).unwrap();
        assert_eq!(callable.invoke(&[array]), Err(RuntimeError::IndexOutOfRange));
    }
}

#[test]
fn struct_parameter_receiver_is_a_per_invocation_copy() {
    for strategy in ExecutionStrategy::ALL {
        let (lambda, ids, rt) = build(|f, ids| {
            let m = f.parameter(ids.mutable_ty, Some("m"));
            let first = f.call_instance(m.clone(), ids.foo, Vec::new()).unwrap();
            let second = f.call_instance(m.clone(), ids.foo, Vec::new()).unwrap();
            let body = f.block(vec![first, second]);
            f.lambda(body, vec![m])
        });
        let m = rt.default_value(ids.mutable_ty);
        // The parameter slot is live storage within one invocation only.
        let results = invoke_repeatedly(&lambda, &rt, strategy, std::slice::from_ref(&m), 2);
        assert_eq!(results, ints(&[1, 1]), "{strategy}");
    }
}

#[test]
fn readonly_field_backing_storage_is_never_written() {
    for strategy in ExecutionStrategy::ALL {
        let (lambda, ids, rt) = build(|f, ids| {
            let w = f.parameter(ids.wrapper_of_mutable, Some("w"));
            let member = f.field(Some(w.clone()), ids.wrapper_readonly).unwrap();
            let call = f.call_instance(member, ids.foo, Vec::new()).unwrap();
            f.lambda(call, vec![w])
        });
        let wrapper = rt.new_instance(ids.wrapper_of_mutable);
        let results = invoke_repeatedly(&lambda, &rt, strategy, std::slice::from_ref(&wrapper), 3);
        assert_eq!(results, ints(&[0, 0, 0]), "{strategy}");

        let Value::Object(object) = &wrapper else {
            panic!("expected a heap object");
        };
        let stored = object.field(1).and_then(|v| v.as_struct().map(|s| s.fields[0].clone()));
        assert_eq!(stored, Some(Value::I32(0)));
    }
}

#[test]
fn by_ref_through_property_and_indexer_leaves_the_struct_unchanged() {
    for scenario in [Scenario::ByRefProperty, Scenario::ByRefIndexer] {
        for strategy in ExecutionStrategy::ALL {
            let outcome = scenario.run(strategy, 1).unwrap();
            assert_eq!(outcome.results, ints(&[41]), "{scenario} ({strategy})");
        }
    }
}

#[test]
fn list_indexer_returns_copies() {
    for strategy in ExecutionStrategy::ALL {
        let (lambda, ids, rt) = build(|f, ids| {
            let list = f.parameter(ids.list_of_mutable, Some("list"));
            let zero = f.i32(0);
            let item = f.indexer(list.clone(), vec![zero]).unwrap();
            let call = f.call_instance(item, ids.foo, Vec::new()).unwrap();
            f.lambda(call, vec![list])
        });
        let list = fixtures::list_of_mutable(&rt, &ids, 1).unwrap();
        let results = invoke_repeatedly(&lambda, &rt, strategy, std::slice::from_ref(&list), 3);
        assert_eq!(results, ints(&[0, 0, 0]), "{strategy}");
    }
}

#[test]
fn method_failures_propagate_unchanged() {
    for strategy in ExecutionStrategy::ALL {
        let (lambda, _, rt) = build(|f, ids| {
            let call = f.call_static(ids.throw, Vec::new()).unwrap();
            f.lambda(call, Vec::new())
        });
        let callable = compile(&lambda, &rt, strategy).unwrap();
        assert_eq!(
            callable.invoke(&[]),
            Err(RuntimeError::failed("Methods.Throw", "thrown by fixture"))
        );
    }
}

#[test]
fn receiver_mutation_survives_a_failing_call() {
    for strategy in ExecutionStrategy::ALL {
        let (lambda, ids, rt) = build(|f, ids| {
            let w = f.parameter(ids.wrapper_of_mutable, Some("w"));
            let member = f.field(Some(w.clone()), ids.wrapper_field).unwrap();
            let call = f.call_instance(member, ids.bump_then_fail, Vec::new()).unwrap();
            f.lambda(call, vec![w])
        });
        let callable = compile(&lambda, &rt, strategy).unwrap();
        let wrapper = rt.new_instance(ids.wrapper_of_mutable);
        assert!(matches!(
            callable.invoke(std::slice::from_ref(&wrapper)),
            Err(RuntimeError::MethodFailed { .. })
        ));

        let Value::Object(object) = &wrapper else {
            panic!("expected a heap object");
        };
        let stored = object.field(0).and_then(|v| v.as_struct().map(|s| s.fields[0].clone()));
        assert_eq!(stored, Some(Value::I32(1)), "{strategy}");
    }
}

#[test]
fn by_ref_mutation_survives_a_failing_call() {
    for strategy in ExecutionStrategy::ALL {
        let (lambda, ids, rt) = build(|f, ids| {
            let a = f.parameter(ids.int_array, Some("a"));
            let zero = f.i32(0);
            let element = f.array_index(a.clone(), vec![zero]).unwrap();
            let call = f.call_static(ids.by_ref_then_throw, [element]).unwrap();
            f.lambda(call, vec![a])
        });
        let callable = compile(&lambda, &rt, strategy).unwrap();
        let array = rt.new_array(ids.int_array, &[1]).unwrap();
        let Value::Array(elems) = &array else {
            panic!("expected an array");
        };
        assert!(elems.set(0, Value::I32(41)));
        assert_eq!(
            callable.invoke(std::slice::from_ref(&array)),
            Err(RuntimeError::failed("Methods.ByRefThenThrow", "thrown by fixture"))
        );
        assert_eq!(elems.get(0), Some(Value::I32(42)), "{strategy}");
    }
}

#[test]
fn const_receiver_reports_its_runtime_type() {
    for strategy in ExecutionStrategy::ALL {
        let (lambda, _, rt) = build(|f, ids| {
            let zero = f.static_field(ids.wrapper_of_mutable, ids.wrapper_zero).unwrap();
            let call = f.call_instance(zero, ids.get_type, Vec::new()).unwrap();
            f.lambda(call, Vec::new())
        });
        let results = invoke_repeatedly(&lambda, &rt, strategy, &[], 1);
        assert_eq!(results, vec![Value::Type(TypeId::I32)], "{strategy}");
    }
}

#[test]
fn callable_is_shared_across_threads() {
    for strategy in ExecutionStrategy::ALL {
        let mut fx = Fixtures::new();
        let lambda = Scenario::Field.build(&mut fx).unwrap();
        let ids = fx.ids;
        let rt = fx.into_runtime();
        let callable = Arc::new(compile(&lambda, &rt, strategy).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let callable = Arc::clone(&callable);
                let rt = Arc::clone(&rt);
                thread::spawn(move || {
                    // Each thread owns its wrapper, so sequences are independent.
                    let wrapper = rt.new_instance(ids.wrapper_of_mutable);
                    (0..3)
                        .map(|_| callable.invoke(std::slice::from_ref(&wrapper)).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), ints(&[0, 1, 2]), "{strategy}");
        }
    }
}
