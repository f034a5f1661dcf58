use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

fn decode(value: serde_json::Value) -> LirDocument {
    serde_json::from_value(value).unwrap()
}

fn straight_line() -> LirDocument {
    decode(json!({
        "version": "1.0.0",
        "entry": "bb0",
        "blocks": [
            {
                "id": "bb0",
                "instructions": [
                    { "kind": "assign", "target": "x", "value": { "kind": "lit", "value": { "kind": "int", "value": 3 } } },
                    { "kind": "assign", "target": "y", "value": { "kind": "lit", "value": { "kind": "int", "value": 4 } } },
                    { "kind": "op", "target": "z", "ns": "core", "name": "add", "args": ["x", "y"] }
                ],
                "terminator": { "kind": "return", "value": "z" }
            }
        ]
    }))
}

#[test]
fn test_decode_straight_line() {
    let doc = straight_line();
    assert_eq!(doc.blocks.len(), 1);
    assert_eq!(doc.blocks[0].instructions.len(), 3);
    assert_eq!(
        doc.blocks[0].terminator,
        Terminator::Return {
            value: Some("z".into())
        }
    );
    assert!(!doc.has_fork());
}

#[test]
fn test_cfg_indexes_blocks() {
    let doc = straight_line();
    let cfg = doc.cfg().unwrap();
    assert_eq!(cfg.entry().id, "bb0");
    assert!(cfg.block("bb0").is_some());
    assert!(cfg.block("bb1").is_none());
}

#[test]
fn test_has_fork_is_structural() {
    // A register literally named "fork" must not count.
    let doc = decode(json!({
        "entry": "a",
        "blocks": [
            { "id": "a", "instructions": [
                { "kind": "assign", "target": "fork", "value": { "kind": "lit", "value": { "kind": "int", "value": 1 } } }
            ], "terminator": { "kind": "return", "value": "fork" } }
        ]
    }));
    assert!(!doc.has_fork());

    let doc = decode(json!({
        "entry": "a",
        "blocks": [
            { "id": "a", "terminator": { "kind": "fork", "body": "b", "continuation": "c", "future": "f" } },
            { "id": "b", "terminator": { "kind": "return" } },
            { "id": "c", "terminator": { "kind": "join", "future": "f", "target": "r", "to": "d" } },
            { "id": "d", "terminator": { "kind": "return", "value": "r" } }
        ]
    }));
    assert!(doc.has_fork());
    assert_eq!(
        doc.blocks[0].terminator.successors(),
        vec!["b", "c"]
    );
}

#[test]
fn test_cfg_rejects_unknown_label() {
    let doc = decode(json!({
        "entry": "a",
        "blocks": [
            { "id": "a", "terminator": { "kind": "branch", "cond": "c", "then": "b", "else": "nowhere" } },
            { "id": "b", "terminator": { "kind": "return" } }
        ]
    }));
    assert_eq!(
        doc.cfg().unwrap_err(),
        IrError::UnknownLabel {
            from: "a".into(),
            to: "nowhere".into()
        }
    );
}

#[test]
fn test_cfg_rejects_missing_entry_and_duplicates() {
    let doc = decode(json!({
        "entry": "start",
        "blocks": [ { "id": "a", "terminator": { "kind": "return" } } ]
    }));
    assert_eq!(
        doc.cfg().unwrap_err(),
        IrError::MissingEntry("start".into())
    );

    let doc = decode(json!({
        "entry": "a",
        "blocks": [
            { "id": "a", "terminator": { "kind": "return" } },
            { "id": "a", "terminator": { "kind": "return" } }
        ]
    }));
    assert_eq!(doc.cfg().unwrap_err(), IrError::DuplicateBlock("a".into()));
}

#[test]
fn test_unreachable_block_is_allowed() {
    let doc = decode(json!({
        "entry": "a",
        "blocks": [
            { "id": "a", "terminator": { "kind": "return" } },
            { "id": "dead", "terminator": { "kind": "jump", "to": "a" } }
        ]
    }));
    assert_eq!(doc.cfg().unwrap().len(), 2);
}
