use super::*;

#[test]
fn test_heap_deref() {
    let h = Heap::new(42i64);
    assert_eq!(*h, 42);
}

#[test]
fn test_heap_clone_shares_allocation() {
    let h1 = Heap::new(vec![1, 2, 3]);
    let h2 = h1.clone();
    assert_eq!(*h1, *h2);
    assert!(Heap::ptr_eq(&h1, &h2));
}

#[test]
fn test_heap_eq_is_structural() {
    let h1 = Heap::new("spiral".to_string());
    let h2 = Heap::new("spiral".to_string());
    let h3 = Heap::new("helix".to_string());
    assert_eq!(h1, h2);
    assert!(!Heap::ptr_eq(&h1, &h2));
    assert_ne!(h1, h3);
}

#[test]
fn test_heap_display_forwards() {
    let h = Heap::new(crate::ErrorValue::new("DivisionByZero").with_message("division by zero"));
    assert_eq!(h.to_string(), (*h).to_string());
}
