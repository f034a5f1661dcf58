use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use spiral_ir::Type;
use spiral_value::{raised, Value};

use super::*;

#[test]
fn test_print_joins_display_forms() {
    let sink = buffer_handler();
    let registry = EffectRegistry::with_print(sink.clone());
    let print = registry.get(PRINT_EFFECT).unwrap();

    let list = Value::list(Type::Int, vec![Value::int(1), Value::int(2)]);
    let result = print(&[Value::string("sum"), Value::int(3), list]).unwrap();
    assert_eq!(result, Value::Void);
    print(&[]).unwrap();
    assert_eq!(sink.output(), "sum 3 [1, 2]\n\n");

    sink.clear();
    assert_eq!(sink.output(), "");
}

#[test]
fn test_silent_and_stdout_capture_nothing() {
    for sink in [silent_handler(), stdout_handler()] {
        let registry = EffectRegistry::with_print(sink.clone());
        registry.get(PRINT_EFFECT).unwrap()(&[Value::int(1)]).unwrap();
        assert_eq!(sink.output(), "");
    }
}

#[test]
fn test_unknown_effect() {
    let registry = EffectRegistry::empty();
    assert!(!registry.contains("print"));
    let err = registry.get("print").err().unwrap();
    assert_eq!(err.code(), "UnknownEffect");
}

#[test]
fn test_custom_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut registry = EffectRegistry::empty();
    registry.register("tick", move |_: &[Value]| {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        Ok(Value::int(i64::try_from(n).unwrap_or(i64::MAX)))
    });
    registry.register("fail", |_: &[Value]| Err(raised("Boom", None)));

    let tick = registry.get("tick").unwrap();
    assert_eq!(tick(&[]).unwrap(), Value::int(0));
    assert_eq!(tick(&[]).unwrap(), Value::int(1));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(registry.get("fail").unwrap()(&[]).unwrap_err().code(), "Boom");
}

#[test]
fn test_registry_is_shareable_across_threads() {
    let sink = buffer_handler();
    let registry = EffectRegistry::with_print(sink.clone());
    std::thread::scope(|s| {
        for i in 0..4 {
            let registry = &registry;
            s.spawn(move || {
                registry.get(PRINT_EFFECT).unwrap()(&[Value::int(i)]).unwrap();
            });
        }
    });
    assert_eq!(sink.output().lines().count(), 4);
}
