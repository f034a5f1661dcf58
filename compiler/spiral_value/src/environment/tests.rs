use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_define_and_lookup() {
    let env = Environment::new();
    env.define("x", Value::int(42), Mutability::Immutable);
    assert_eq!(env.lookup("x"), Some(Value::int(42)));
    assert_eq!(env.lookup("y"), None);
}

#[test]
fn test_child_shadows_parent() {
    let root = Environment::new();
    root.define("x", Value::int(1), Mutability::Immutable);
    let child = root.child();
    child.define("x", Value::int(2), Mutability::Immutable);
    assert_eq!(child.lookup("x"), Some(Value::int(2)));
    assert_eq!(root.lookup("x"), Some(Value::int(1)));
    assert_eq!(child.depth(), 2);
    assert!(!child.is_root());
}

#[test]
fn test_assign_reaches_enclosing_scope() {
    let root = Environment::new();
    root.define("counter", Value::int(0), Mutability::Mutable);
    let inner = root.child().child();
    assert_eq!(inner.assign("counter", Value::int(5)), Ok(()));
    assert_eq!(root.lookup("counter"), Some(Value::int(5)));
}

#[test]
fn test_assign_errors() {
    let env = Environment::new();
    env.define("fixed", Value::int(0), Mutability::Immutable);
    assert_eq!(
        env.assign("fixed", Value::int(1)),
        Err(AssignError::Immutable)
    );
    assert_eq!(
        env.assign("missing", Value::int(1)),
        Err(AssignError::Undefined)
    );
    assert_eq!(env.lookup("fixed"), Some(Value::int(0)));
}

#[test]
fn test_snapshot_is_isolated() {
    let root = Environment::new();
    root.define("a", Value::int(1), Mutability::Mutable);
    let child = root.child();
    child.define("b", Value::int(2), Mutability::Mutable);

    let copy = child.snapshot();
    assert!(copy.is_root());
    assert_eq!(copy.lookup("a"), Some(Value::int(1)));

    copy.assign("a", Value::int(10)).unwrap();
    child.assign("b", Value::int(20)).unwrap();
    assert_eq!(root.lookup("a"), Some(Value::int(1)));
    assert_eq!(copy.lookup("b"), Some(Value::int(2)));
}

#[test]
fn test_snapshot_keeps_nearest_binding() {
    let root = Environment::new();
    root.define("x", Value::int(1), Mutability::Immutable);
    let child = root.child();
    child.define("x", Value::int(2), Mutability::Immutable);
    assert_eq!(child.snapshot().lookup("x"), Some(Value::int(2)));
}

#[test]
fn test_frozen_rejects_assignment() {
    let regs = Environment::new();
    regs.define("c", Value::int(0), Mutability::Mutable);
    let frozen = regs.frozen();
    assert!(frozen.is_root());
    assert_eq!(frozen.assign("c", Value::int(1)), Err(AssignError::Immutable));
    assert_eq!(frozen.lookup("c"), Some(Value::int(0)));

    regs.assign("c", Value::int(5)).unwrap();
    assert_eq!(frozen.lookup("c"), Some(Value::int(0)));
}

#[test]
fn test_environment_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Environment>();
    assert_send_sync::<Value>();
}
