#![deny(clippy::arithmetic_side_effects)]
//! SPIRAL Eval - evaluators for the SPIRAL IR layers.
//!
//! # Entry points
//!
//! - [`evaluate_air_cir`]: pure documents (AIR, CIR)
//! - [`evaluate_eir`]: documents with sequencing, mutation, loops and effects
//! - [`evaluate_lir`]: control-flow graphs
//! - [`evaluate_lir_async`]: control-flow graphs with fork/join
//!
//! Callers pick the LIR entry point with [`spiral_ir::LirDocument::has_fork`].
//!
//! # Architecture
//!
//! - `Interpreter`: tree-walking evaluator shared by every layer, including
//!   the expression operands of LIR instructions
//! - `evaluate_core`: enum dispatch for the `core` operators
//! - `DomainRegistry`: named providers for non-core operations
//! - `EffectRegistry`: host operations for EIR and LIR
//! - `CallStack`: depth ceiling and backtraces; stack growth via `stacker`

mod call_stack;
mod config;
mod defs;
pub mod domains;
pub mod effects;
mod entry;
pub mod interpreter;
mod lir;
mod operators;

use std::sync::Once;

pub use call_stack::{ensure_sufficient_stack, CallFrame, CallStack};
pub use config::{EvalConfig, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_TASKS};
pub use defs::{Defs, Inputs};
pub use domains::{Domain, DomainRegistry};
pub use effects::{
    buffer_handler, silent_handler, stdout_handler, EffectHandler, EffectRegistry,
    PrintHandlerImpl, SharedPrintHandler, PRINT_EFFECT,
};
pub use entry::{
    evaluate_air_cir, evaluate_air_cir_with_config, evaluate_eir, evaluate_eir_with_config,
    evaluate_lir, evaluate_lir_async, evaluate_lir_async_with_config, evaluate_lir_with_config,
};
pub use interpreter::{Interpreter, InterpreterBuilder};
pub use operators::evaluate_core;

pub use spiral_value::{EvalError, EvalErrorKind, EvalResult, Value};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set,
/// e.g. `RUST_LOG=spiral_eval=debug` for forks, joins and effects, or
/// `RUST_LOG=spiral_eval=trace` to follow block transitions.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(EnvFilter::from_default_env())
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .init();
        }
    });
}
