//! `InterpreterBuilder` for creating `Interpreter` instances.

use rustc_hash::FxHashMap;
use spiral_ir::{Layer, NodeTable};
use spiral_value::Environment;

use super::Interpreter;
use crate::call_stack::CallStack;
use crate::config::EvalConfig;
use crate::defs::{Defs, Inputs};
use crate::domains::DomainRegistry;
use crate::effects::EffectRegistry;

/// Builder for interpreters.
///
/// Only the domain registry and configuration are required. Everything
/// else defaults to absent: no nodes (bare ids are variables), no
/// definitions, no inputs, no effects, and the AIR layer.
pub struct InterpreterBuilder<'a> {
    domains: &'a DomainRegistry,
    config: &'a EvalConfig,
    nodes: Option<&'a NodeTable>,
    defs: Option<&'a Defs>,
    inputs: Option<&'a Inputs>,
    effects: Option<&'a EffectRegistry>,
    layer: Layer,
}

impl<'a> InterpreterBuilder<'a> {
    pub fn new(domains: &'a DomainRegistry, config: &'a EvalConfig) -> Self {
        Self {
            domains,
            config,
            nodes: None,
            defs: None,
            inputs: None,
            effects: None,
            layer: Layer::Air,
        }
    }

    #[must_use]
    pub fn nodes(mut self, nodes: &'a NodeTable) -> Self {
        self.nodes = Some(nodes);
        self
    }

    #[must_use]
    pub fn defs(mut self, defs: &'a Defs) -> Self {
        self.defs = Some(defs);
        self
    }

    #[must_use]
    pub fn inputs(mut self, inputs: &'a Inputs) -> Self {
        self.inputs = Some(inputs);
        self
    }

    #[must_use]
    pub fn effects(mut self, effects: &'a EffectRegistry) -> Self {
        self.effects = Some(effects);
        self
    }

    /// Layer whose forms and binding rules apply.
    #[must_use]
    pub fn layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    pub fn build(self) -> Interpreter<'a> {
        Interpreter {
            nodes: self.nodes,
            defs: self.defs,
            inputs: self.inputs,
            domains: self.domains,
            effects: self.effects,
            layer: self.layer,
            node_cache: self.config.node_cache(),
            call_stack: CallStack::new(self.config.max_call_depth()),
            active_defs: Vec::new(),
            cache: FxHashMap::default(),
            root: Environment::new(),
        }
    }
}
