use pretty_assertions::assert_eq;
use serde_json::json;
use spiral_ir::{Arg, Expr, Type};

use super::*;
use crate::Environment;

fn ints(ns: &[i64]) -> Vec<Value> {
    ns.iter().copied().map(Value::int).collect()
}

#[test]
fn test_value_display() {
    assert_eq!(Value::int(42).to_string(), "42");
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(Value::string("hi").to_string(), "\"hi\"");
    assert_eq!(Value::string("hi").display_value(), "hi");
    assert_eq!(Value::list(Type::Int, ints(&[1, 2])).to_string(), "[1, 2]");
    assert_eq!(Value::Void.to_string(), "void");
}

#[test]
fn test_set_deduplicates_in_insertion_order() {
    let set = Value::set(Type::Int, ints(&[3, 1, 3, 2, 1]));
    let items = set.as_collection().unwrap();
    assert_eq!(&**items.items, &ints(&[3, 1, 2])[..]);
}

#[test]
fn test_set_nan_deduplicates() {
    let set = Value::set(Type::Float, vec![Value::Float(f64::NAN), Value::Float(f64::NAN)]);
    assert_eq!(set.as_collection().unwrap().len(), 1);
}

#[test]
fn test_set_equality_ignores_order() {
    let a = Value::set(Type::Int, ints(&[1, 2, 3]));
    let b = Value::set(Type::Int, ints(&[3, 2, 1]));
    assert!(a.equals(&b));
    let c = Value::list(Type::Int, ints(&[1, 2, 3]));
    let d = Value::list(Type::Int, ints(&[3, 2, 1]));
    assert!(!c.equals(&d));
}

#[test]
fn test_closure_equality_is_identity() {
    let env = Environment::new();
    let a = Value::closure(ClosureValue::lambda(vec!["x".into()], Arg::id("x"), env.clone()));
    let b = Value::closure(ClosureValue::lambda(vec!["x".into()], Arg::id("x"), env));
    assert!(a.equals(&a.clone()));
    assert!(!a.equals(&b));
}

#[test]
fn test_conforms_to() {
    assert!(Value::int(1).conforms_to(&Type::Int));
    assert!(!Value::int(1).conforms_to(&Type::Float));
    let list = Value::list(Type::Int, ints(&[1]));
    assert!(list.conforms_to(&Type::list(Type::Int)));
    assert!(!list.conforms_to(&Type::set(Type::Int)));
}

#[test]
fn test_serialize_tagged() {
    let list = Value::list(Type::Int, ints(&[1, 2]));
    assert_eq!(
        serde_json::to_value(&list).unwrap(),
        json!({
            "kind": "list",
            "of": { "kind": "int" },
            "value": [ { "kind": "int", "value": 1 }, { "kind": "int", "value": 2 } ]
        })
    );
    assert_eq!(
        serde_json::to_value(Value::Void).unwrap(),
        json!({ "kind": "void" })
    );
    let err = Value::error(ErrorValue::new("DivisionByZero"));
    assert_eq!(
        serde_json::to_value(&err).unwrap(),
        json!({ "kind": "error", "code": "DivisionByZero" })
    );
}

#[test]
fn test_serialize_closure_is_normalized() {
    let env = Environment::new();
    env.define("secret", Value::int(7), crate::Mutability::Immutable);
    let closure = Value::closure(ClosureValue::lambda(vec!["x".into()], Arg::id("body"), env));
    assert_eq!(
        serde_json::to_value(&closure).unwrap(),
        json!({ "kind": "closure", "params": ["x"], "body": "body", "env": "<env>" })
    );
}

#[test]
fn test_serialize_future_hides_task_id() {
    let fut = FutureValue::pending(99);
    let value = Value::future(fut.clone());
    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        json!({ "kind": "future", "status": "pending" })
    );
    assert!(fut.cell.resolve(Value::int(42)));
    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        json!({
            "kind": "future",
            "status": "resolved",
            "of": { "kind": "int" },
            "value": { "kind": "int", "value": 42 }
        })
    );
}

#[test]
fn test_deserialize_through_literal() {
    let value: Value = serde_json::from_value(json!({
        "kind": "set", "of": { "kind": "int" },
        "value": [ { "kind": "int", "value": 1 }, { "kind": "int", "value": 1 } ]
    }))
    .unwrap();
    assert_eq!(value.as_collection().unwrap().len(), 1);
    assert_eq!(value.type_name(), "set");
}

#[test]
fn test_future_cell_settles_once() {
    let cell = FutureCell::new();
    assert_eq!(cell.status(), FutureStatus::Pending);
    assert!(cell.try_get().is_none());
    assert!(cell.reject(ErrorValue::new("TypeMismatch")));
    assert!(!cell.resolve(Value::int(1)));
    assert_eq!(cell.status(), FutureStatus::Rejected);
    assert_eq!(cell.wait().unwrap_err().code, "TypeMismatch");
}

#[test]
fn test_future_cell_wakes_waiter() {
    let cell = FutureCell::new();
    std::thread::scope(|s| {
        let waiter = s.spawn(|| cell.wait());
        cell.resolve(Value::int(42));
        assert_eq!(waiter.join().unwrap().unwrap(), Value::int(42));
    });
}

#[test]
fn test_error_value_formatting() {
    let err = Value::error(ErrorValue::new("DivisionByZero").with_message("division by zero"));
    assert_eq!(err.to_string(), "<error DivisionByZero: division by zero>");
    assert_eq!(format!("{err:?}"), "Error(DivisionByZero: division by zero)");
}

#[test]
fn test_fix_closure_reports_inner_params() {
    let inner = Expr::Lambda {
        params: vec!["n".into()],
        body: Arg::id("n"),
    };
    let generator =
        ClosureValue::lambda(vec!["self".into()], Arg::inline(inner), Environment::new());
    let fix = Value::closure(ClosureValue::fix(generator));
    assert_eq!(fix.to_string(), "<fix(n)>");
    assert_eq!(
        serde_json::to_value(&fix).unwrap(),
        json!({ "kind": "closure", "params": ["n"], "fix": true, "body": "<inline>", "env": "<env>" })
    );
}

#[test]
fn test_fix_closure_over_node_body_has_no_params() {
    let generator = ClosureValue::lambda(vec!["self".into()], Arg::id("step"), Environment::new());
    let fix = Value::closure(ClosureValue::fix(generator));
    assert_eq!(fix.to_string(), "<fix()>");
    assert_eq!(serde_json::to_value(&fix).unwrap()["fix"], json!(true));
}
