//! Evaluator entry points.
//!
//! Each entry point comes in two forms: a `*_with_config` variant that
//! returns `Result`, with the structured error intact, and a plain variant
//! that folds any failure into an `error` value, so the caller always
//! receives exactly one [`Value`].

use spiral_ir::{Document, Layer, LirDocument};
use spiral_value::{layer_violation, EvalResult, Value};

use crate::config::EvalConfig;
use crate::defs::{Defs, Inputs};
use crate::domains::DomainRegistry;
use crate::effects::EffectRegistry;
use crate::interpreter::InterpreterBuilder;
use crate::lir::{concurrent, sync, LirContext};

/// Reject a document declaring a layer above `max`, or containing a form
/// that `layer` does not allow.
fn check_layer(doc: &Document, layer: Layer, max: Layer) -> Result<(), spiral_value::EvalError> {
    if let Some(declared) = doc.layer.filter(|declared| *declared > max) {
        return Err(layer_violation(max, declared.as_str(), "layer"));
    }
    match doc.first_form_above(layer) {
        Some((location, form)) => Err(layer_violation(layer, form, &location)),
        None => Ok(()),
    }
}

fn evaluate_document(
    doc: &Document,
    layer: Layer,
    domains: &DomainRegistry,
    defs: &Defs,
    inputs: &Inputs,
    effects: Option<&EffectRegistry>,
    config: &EvalConfig,
) -> EvalResult {
    let nodes = doc.node_table()?;
    let defs = defs.layered(&doc.air_defs);
    let builder = InterpreterBuilder::new(domains, config)
        .nodes(&nodes)
        .defs(&defs)
        .inputs(inputs)
        .layer(layer);
    let mut interp = match effects {
        Some(effects) => builder.effects(effects).build(),
        None => builder.build(),
    };
    let root = interp.root().clone();
    interp.eval_arg(&doc.result, &root)
}

/// Evaluate an AIR or CIR document.
///
/// A document declared `air` must not contain CIR forms. Any other
/// document is evaluated as CIR, and must not contain EIR forms.
#[tracing::instrument(level = "debug", skip_all, fields(layer = ?doc.layer))]
pub fn evaluate_air_cir_with_config(
    doc: &Document,
    domains: &DomainRegistry,
    defs: &Defs,
    inputs: &Inputs,
    config: &EvalConfig,
) -> EvalResult {
    let layer = match doc.layer {
        Some(Layer::Air) => Layer::Air,
        _ => Layer::Cir,
    };
    check_layer(doc, layer, Layer::Cir)?;
    evaluate_document(doc, layer, domains, defs, inputs, None, config)
}

pub fn evaluate_air_cir(
    doc: &Document,
    domains: &DomainRegistry,
    defs: &Defs,
    inputs: &Inputs,
) -> Value {
    evaluate_air_cir_with_config(doc, domains, defs, inputs, &EvalConfig::default())
        .unwrap_or_else(spiral_value::EvalError::into_value)
}

/// Evaluate an EIR document (AIR and CIR documents are accepted too).
#[tracing::instrument(level = "debug", skip_all)]
pub fn evaluate_eir_with_config(
    doc: &Document,
    domains: &DomainRegistry,
    defs: &Defs,
    inputs: &Inputs,
    effects: &EffectRegistry,
    config: &EvalConfig,
) -> EvalResult {
    check_layer(doc, Layer::Eir, Layer::Eir)?;
    evaluate_document(doc, Layer::Eir, domains, defs, inputs, Some(effects), config)
}

pub fn evaluate_eir(
    doc: &Document,
    domains: &DomainRegistry,
    defs: &Defs,
    inputs: &Inputs,
    effects: &EffectRegistry,
) -> Value {
    evaluate_eir_with_config(doc, domains, defs, inputs, effects, &EvalConfig::default())
        .unwrap_or_else(spiral_value::EvalError::into_value)
}

fn lir_context<'d>(
    domains: &'d DomainRegistry,
    effects: &'d EffectRegistry,
    inputs: &'d Inputs,
    defs: &'d Defs,
    config: &'d EvalConfig,
) -> LirContext<'d> {
    LirContext {
        domains,
        effects: Some(effects),
        defs,
        inputs,
        config,
    }
}

/// Evaluate a LIR document without fork/join support.
///
/// A document with any `fork` or `join` terminator fails with
/// `InvalidControlFlow`; route those with [`LirDocument::has_fork`].
#[tracing::instrument(level = "debug", skip_all, fields(entry = %doc.entry))]
pub fn evaluate_lir_with_config(
    doc: &LirDocument,
    domains: &DomainRegistry,
    effects: &EffectRegistry,
    inputs: &Inputs,
    defs: &Defs,
    config: &EvalConfig,
) -> EvalResult {
    let defs = defs.layered(&doc.air_defs);
    sync::run(doc, lir_context(domains, effects, inputs, &defs, config))
}

pub fn evaluate_lir(
    doc: &LirDocument,
    domains: &DomainRegistry,
    effects: &EffectRegistry,
    inputs: &Inputs,
    defs: &Defs,
) -> Value {
    evaluate_lir_with_config(doc, domains, effects, inputs, defs, &EvalConfig::default())
        .unwrap_or_else(spiral_value::EvalError::into_value)
}

/// Evaluate a LIR document with fork/join support.
///
/// Blocks the caller until the entry task returns and every forked task
/// has finished.
#[tracing::instrument(level = "debug", skip_all, fields(entry = %doc.entry))]
pub fn evaluate_lir_async_with_config(
    doc: &LirDocument,
    domains: &DomainRegistry,
    effects: &EffectRegistry,
    inputs: &Inputs,
    defs: &Defs,
    config: &EvalConfig,
) -> EvalResult {
    let defs = defs.layered(&doc.air_defs);
    concurrent::run(doc, lir_context(domains, effects, inputs, &defs, config))
}

pub fn evaluate_lir_async(
    doc: &LirDocument,
    domains: &DomainRegistry,
    effects: &EffectRegistry,
    inputs: &Inputs,
    defs: &Defs,
) -> Value {
    evaluate_lir_async_with_config(doc, domains, effects, inputs, defs, &EvalConfig::default())
        .unwrap_or_else(spiral_value::EvalError::into_value)
}
