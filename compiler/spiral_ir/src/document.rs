//! Node-graph documents for the expression layers.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{Arg, Expr, IrError, Layer, Type};

/// A named node in the document graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub expr: Arc<Expr>,
}

/// A reusable, non-recursive definition invoked through `airRef`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AirDef {
    pub ns: String,
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    pub body: Arg,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Type>,
}

impl AirDef {
    /// Registry key, `ns:name`.
    pub fn key(&self) -> String {
        def_key(&self.ns, &self.name)
    }
}

/// Build the `ns:name` key used by definition registries.
pub fn def_key(ns: &str, name: &str) -> String {
    format!("{ns}:{name}")
}

/// An AIR, CIR or EIR document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<Layer>,
    #[serde(default)]
    pub air_defs: Vec<AirDef>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    pub result: Arg,
}

impl Document {
    /// Index the nodes by id.
    pub fn node_table(&self) -> Result<NodeTable, IrError> {
        let mut nodes = FxHashMap::default();
        nodes.reserve(self.nodes.len());
        for node in &self.nodes {
            if nodes.insert(node.id.clone(), Arc::clone(&node.expr)).is_some() {
                return Err(IrError::DuplicateNode(node.id.clone()));
            }
        }
        Ok(NodeTable { nodes })
    }

    /// Locate the first form anywhere in the document (nodes, definition
    /// bodies, the result) that is not legal in `layer`.
    ///
    /// Returns the owning location and the offending form.
    pub fn first_form_above(&self, layer: Layer) -> Option<(String, &'static str)> {
        let in_arg = |arg: &Arg| match arg {
            Arg::Inline(expr) => expr.first_form_above(layer),
            Arg::Id(_) => None,
        };
        self.nodes
            .iter()
            .find_map(|node| {
                node.expr
                    .first_form_above(layer)
                    .map(|form| (node.id.clone(), form))
            })
            .or_else(|| {
                self.air_defs
                    .iter()
                    .find_map(|def| in_arg(&def.body).map(|form| (def.key(), form)))
            })
            .or_else(|| in_arg(&self.result).map(|form| ("result".to_owned(), form)))
    }
}

/// Node lookup by id.
#[derive(Clone, Debug, Default)]
pub struct NodeTable {
    nodes: FxHashMap<String, Arc<Expr>>,
}

impl NodeTable {
    pub fn get(&self, id: &str) -> Option<&Arc<Expr>> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
