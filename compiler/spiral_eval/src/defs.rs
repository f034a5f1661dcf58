//! Definition and input tables supplied by the caller.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use spiral_ir::{def_key, AirDef};
use spiral_value::Value;

/// Values for `input` expressions, keyed by input name.
pub type Inputs = FxHashMap<String, Value>;

/// Definitions callable through `airRef`, keyed `ns:name`.
#[derive(Clone, Debug, Default)]
pub struct Defs {
    defs: FxHashMap<String, Arc<AirDef>>,
}

impl Defs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a definition.
    pub fn insert(&mut self, def: AirDef) {
        self.defs.insert(def.key(), Arc::new(def));
    }

    pub fn get(&self, ns: &str, name: &str) -> Option<&Arc<AirDef>> {
        self.defs.get(&def_key(ns, name))
    }

    /// A copy of these definitions with `overrides` layered on top.
    ///
    /// Document definitions win over caller definitions of the same key.
    #[must_use]
    pub fn layered(&self, overrides: &[AirDef]) -> Self {
        let mut defs = self.clone();
        for def in overrides {
            defs.insert(def.clone());
        }
        defs
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl FromIterator<AirDef> for Defs {
    fn from_iter<I: IntoIterator<Item = AirDef>>(iter: I) -> Self {
        let mut defs = Defs::new();
        for def in iter {
            defs.insert(def);
        }
        defs
    }
}

#[cfg(test)]
mod tests {
    use spiral_ir::Arg;

    use super::*;

    fn def(ns: &str, name: &str, body: &str) -> AirDef {
        AirDef {
            ns: ns.into(),
            name: name.into(),
            params: vec!["x".into()],
            body: Arg::id(body),
            result: None,
        }
    }

    #[test]
    fn test_layered_overrides_by_key() {
        let caller: Defs = [def("m", "f", "caller"), def("m", "g", "kept")]
            .into_iter()
            .collect();
        let layered = caller.layered(&[def("m", "f", "document")]);

        assert_eq!(layered.len(), 2);
        assert_eq!(
            layered.get("m", "f").map(|d| d.body.describe().to_owned()),
            Some("document".to_owned())
        );
        assert_eq!(
            caller.get("m", "f").map(|d| d.body.describe().to_owned()),
            Some("caller".to_owned())
        );
        assert!(layered.get("m", "g").is_some());
        assert!(layered.get("other", "g").is_none());
    }
}
