use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use spiral_ir::{Arg, Document, Expr, Layer, Literal};
use spiral_value::{EvalResult, Value};

use super::*;
use crate::config::EvalConfig;
use crate::effects::EffectRegistry;

fn doc(value: serde_json::Value) -> Document {
    serde_json::from_value(value).unwrap()
}

fn run(document: &Document, layer: Layer) -> EvalResult {
    run_with(document, layer, &EvalConfig::default(), None)
}

fn run_with(
    document: &Document,
    layer: Layer,
    config: &EvalConfig,
    effects: Option<&EffectRegistry>,
) -> EvalResult {
    let domains = DomainRegistry::with_builtins();
    let nodes = document.node_table().unwrap();
    let defs: Defs = document.air_defs.iter().cloned().collect();
    let mut builder = InterpreterBuilder::new(&domains, config)
        .nodes(&nodes)
        .defs(&defs)
        .layer(layer);
    if let Some(effects) = effects {
        builder = builder.effects(effects);
    }
    let mut interp = builder.build();
    let root = interp.root().clone();
    interp.eval_arg(&document.result, &root)
}

fn int(n: i64) -> serde_json::Value {
    json!({ "kind": "lit", "value": { "kind": "int", "value": n } })
}

fn call(name: &str, args: serde_json::Value) -> serde_json::Value {
    json!({ "kind": "call", "name": name, "args": args })
}

#[test]
fn test_let_scoping_and_shadowing() {
    let document = doc(json!({
        "nodes": [
            { "id": "x", "expr": int(1) },
            { "id": "inner", "expr": { "kind": "let", "name": "v", "value": int(2),
                "body": call("add", json!([{ "kind": "var", "name": "v" }, "x"])) } },
            { "id": "outer", "expr": { "kind": "let", "name": "v", "value": int(40),
                "body": call("add", json!(["v", "inner"])) } }
        ],
        "result": "outer"
    }));
    assert_eq!(run(&document, Layer::Air).unwrap(), Value::int(43));
}

#[test]
fn test_short_circuit_skips_right_operand() {
    let document = doc(json!({
        "nodes": [
            { "id": "boom", "expr": call("div", json!([int(1), int(0)])) },
            { "id": "f", "expr": { "kind": "lit", "value": { "kind": "bool", "value": false } } },
            { "id": "r", "expr": call("and", json!(["f", "boom"])) }
        ],
        "result": "r"
    }));
    assert_eq!(run(&document, Layer::Air).unwrap(), Value::Bool(false));
}

#[test]
fn test_if_requires_bool() {
    let document = doc(json!({
        "nodes": [
            { "id": "r", "expr": { "kind": "if", "cond": int(1), "then": int(2), "else": int(3) } }
        ],
        "result": "r"
    }));
    assert_eq!(run(&document, Layer::Air).unwrap_err().code(), "TypeMismatch");
}

#[test]
fn test_error_literal_is_a_value_until_used() {
    let error = json!({ "kind": "lit", "value": { "kind": "error", "code": "Custom" } });
    let kept = doc(json!({ "nodes": [ { "id": "e", "expr": error } ], "result": "e" }));
    let value = run(&kept, Layer::Air).unwrap();
    assert_eq!(value.as_error().map(|e| e.code.as_str()), Some("Custom"));

    let used = doc(json!({
        "nodes": [ { "id": "e", "expr": error }, { "id": "r", "expr": call("add", json!(["e", int(1)])) } ],
        "result": "r"
    }));
    assert_eq!(run(&used, Layer::Air).unwrap_err().code(), "Custom");
}

#[test]
fn test_layer_violation_at_runtime() {
    let document = doc(json!({
        "nodes": [ { "id": "f", "expr": { "kind": "lambda", "params": [], "body": "f" } } ],
        "result": "f"
    }));
    let err = run(&document, Layer::Air).unwrap_err();
    assert_eq!(err.code(), "LayerViolation");
}

#[test]
fn test_closure_application_and_arity() {
    let document = doc(json!({
        "nodes": [
            { "id": "body", "expr": call("mul", json!(["x", int(2)])) },
            { "id": "double", "expr": { "kind": "lambda", "params": ["x"], "body": "body" } },
            { "id": "ok", "expr": { "kind": "apply", "fn": "double", "args": [int(21)] } },
            { "id": "bad", "expr": { "kind": "apply", "fn": "double", "args": [] } },
            { "id": "notfn", "expr": { "kind": "apply", "fn": int(3), "args": [] } }
        ],
        "result": "ok"
    }));
    assert_eq!(run(&document, Layer::Cir).unwrap(), Value::int(42));

    let mut bad = document.clone();
    bad.result = Arg::id("bad");
    assert_eq!(run(&bad, Layer::Cir).unwrap_err().code(), "ArityMismatch");

    let mut notfn = document;
    notfn.result = Arg::id("notfn");
    assert_eq!(run(&notfn, Layer::Cir).unwrap_err().code(), "NotCallable");
}

fn factorial_document(n: i64) -> Document {
    doc(json!({
        "nodes": [
            { "id": "n", "expr": { "kind": "var", "name": "n" } },
            { "id": "isZero", "expr": call("eq", json!(["n", int(0)])) },
            { "id": "rec", "expr": { "kind": "apply", "fn": "self",
                "args": [call("sub", json!(["n", int(1)]))] } },
            { "id": "step", "expr": call("mul", json!(["n", "rec"])) },
            { "id": "body", "expr": { "kind": "if", "cond": "isZero", "then": int(1), "else": "step" } },
            { "id": "inner", "expr": { "kind": "lambda", "params": ["n"], "body": "body" } },
            { "id": "gen", "expr": { "kind": "lambda", "params": ["self"], "body": "inner" } },
            { "id": "fact", "expr": { "kind": "fix", "fn": "gen" } },
            { "id": "r", "expr": { "kind": "apply", "fn": "fact", "args": [int(n)] } }
        ],
        "result": "r"
    }))
}

#[test]
fn test_fix_factorial() {
    assert_eq!(run(&factorial_document(5), Layer::Cir).unwrap(), Value::int(120));
    assert_eq!(run(&factorial_document(0), Layer::Cir).unwrap(), Value::int(1));
}

#[test]
fn test_recursion_limit_is_an_error() {
    let config = EvalConfig::new().with_max_call_depth(50);
    let err = run_with(&factorial_document(100), Layer::Cir, &config, None).unwrap_err();
    assert_eq!(err.code(), "RecursionLimitExceeded");
    assert!(err.backtrace.is_some_and(|bt| !bt.is_empty()));
}

#[test]
fn test_fix_rejects_non_unary_generator() {
    let document = doc(json!({
        "nodes": [
            { "id": "gen", "expr": { "kind": "lambda", "params": ["a", "b"], "body": "a" } },
            { "id": "r", "expr": { "kind": "fix", "fn": "gen" } }
        ],
        "result": "r"
    }));
    assert_eq!(run(&document, Layer::Cir).unwrap_err().code(), "ArityMismatch");
}

#[test]
fn test_definition_calls() {
    let document = doc(json!({
        "airDefs": [
            { "ns": "math", "name": "square", "params": ["x"],
              "body": call("mul", json!(["x", "x"])) },
            { "ns": "math", "name": "loop", "params": [],
              "body": { "kind": "airRef", "ns": "math", "name": "loop", "args": [] } }
        ],
        "nodes": [
            { "id": "ok", "expr": { "kind": "airRef", "ns": "math", "name": "square", "args": [int(7)] } },
            { "id": "rec", "expr": { "kind": "airRef", "ns": "math", "name": "loop", "args": [] } },
            { "id": "missing", "expr": { "kind": "airRef", "ns": "math", "name": "cube", "args": [int(1)] } }
        ],
        "result": "ok"
    }));
    assert_eq!(run(&document, Layer::Air).unwrap(), Value::int(49));

    let mut rec = document.clone();
    rec.result = Arg::id("rec");
    assert_eq!(run(&rec, Layer::Air).unwrap_err().code(), "RecursiveDefinition");

    let mut missing = document;
    missing.result = Arg::id("missing");
    assert_eq!(run(&missing, Layer::Air).unwrap_err().code(), "UnboundName");
}

#[test]
fn test_definition_body_sees_only_params() {
    let document = doc(json!({
        "airDefs": [ { "ns": "m", "name": "leak", "params": [], "body": "secret" } ],
        "nodes": [
            { "id": "r", "expr": { "kind": "let", "name": "secret", "value": int(1),
                "body": { "kind": "airRef", "ns": "m", "name": "leak", "args": [] } } }
        ],
        "result": "r"
    }));
    assert_eq!(run(&document, Layer::Air).unwrap_err().code(), "UnboundName");
}

#[test]
fn test_domain_call_through_namespace() {
    let document = doc(json!({
        "nodes": [
            { "id": "s", "expr": { "kind": "call", "ns": "set", "name": "of", "args": [int(1), int(2), int(1)] } },
            { "id": "r", "expr": { "kind": "call", "ns": "set", "name": "size", "args": ["s"] } },
            { "id": "bad", "expr": { "kind": "call", "ns": "bag", "name": "size", "args": ["s"] } }
        ],
        "result": "r"
    }));
    assert_eq!(run(&document, Layer::Air).unwrap(), Value::int(2));

    let mut bad = document;
    bad.result = Arg::id("bad");
    assert_eq!(run(&bad, Layer::Air).unwrap_err().code(), "DomainNotFound");
}

#[test]
fn test_while_counts_to_ten() {
    let document = doc(json!({
        "nodes": [
            { "id": "init", "expr": { "kind": "declare", "name": "i", "value": int(0) } },
            { "id": "cond", "expr": call("lt", json!(["i", int(10)])) },
            { "id": "inc", "expr": { "kind": "assign", "name": "i", "value": call("add", json!(["i", int(1)])) } },
            { "id": "loop", "expr": { "kind": "while", "cond": "cond", "body": "inc" } },
            { "id": "r", "expr": { "kind": "seq", "body": ["init", "loop", "i"] } }
        ],
        "result": "r"
    }));
    assert_eq!(run(&document, Layer::Eir).unwrap(), Value::int(10));
}

#[test]
fn test_assign_errors() {
    let undeclared = doc(json!({
        "nodes": [ { "id": "r", "expr": { "kind": "assign", "name": "ghost", "value": int(1) } } ],
        "result": "r"
    }));
    assert_eq!(run(&undeclared, Layer::Eir).unwrap_err().code(), "UnboundName");

    let nested = Expr::Seq {
        body: vec![
            Arg::inline(Expr::Declare {
                name: "x".into(),
                value: Arg::inline(Expr::Lit { value: Literal::Int { value: 1 } }),
            }),
            Arg::inline(Expr::Assign {
                name: "x".into(),
                value: Arg::inline(Expr::Lit { value: Literal::Int { value: 5 } }),
            }),
            Arg::id("x"),
        ],
    };
    let domains = DomainRegistry::with_builtins();
    let config = EvalConfig::default();
    let mut interp = InterpreterBuilder::new(&domains, &config)
        .layer(Layer::Eir)
        .build();
    let root = interp.root().clone();
    assert_eq!(interp.eval_expr(&nested, &root).unwrap(), Value::int(5));

    root.define("frozen", Value::int(1), Mutability::Immutable);
    let assign = Expr::Assign {
        name: "frozen".into(),
        value: Arg::inline(Expr::Lit { value: Literal::Int { value: 2 } }),
    };
    assert_eq!(
        interp.eval_expr(&assign, &root).unwrap_err().code(),
        "ImmutableBinding"
    );
}

#[test]
fn test_unknown_effect_evaluates_no_arguments() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut effects = EffectRegistry::empty();
    effects.register("tick", move |_: &[Value]| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Value::Void)
    });

    let document = doc(json!({
        "nodes": [
            { "id": "t", "expr": { "kind": "effect", "op": "tick", "args": [] } },
            { "id": "r", "expr": { "kind": "effect", "op": "launch", "args": ["t"] } }
        ],
        "result": "r"
    }));
    let config = EvalConfig::default();
    let err = run_with(&document, Layer::Eir, &config, Some(&effects)).unwrap_err();
    assert_eq!(err.code(), "UnknownEffect");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_effectful_node_runs_per_reference() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut effects = EffectRegistry::empty();
    effects.register("tick", move |_: &[Value]| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Value::int(1))
    });

    let document = doc(json!({
        "nodes": [
            { "id": "t", "expr": { "kind": "effect", "op": "tick", "args": [] } },
            { "id": "r", "expr": call("add", json!(["t", "t"])) }
        ],
        "result": "r"
    }));
    let config = EvalConfig::default();
    assert_eq!(
        run_with(&document, Layer::Eir, &config, Some(&effects)).unwrap(),
        Value::int(2)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
