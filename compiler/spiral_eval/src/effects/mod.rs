//! Effect registry: host-supplied operations callable from EIR and LIR.
//!
//! Handlers receive already-evaluated arguments and return a value or an
//! error. The registry is built before evaluation and only read afterwards,
//! so it is shared by reference with every forked task.

mod print;

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use spiral_value::{unknown_effect, EvalError, EvalResult, Value};

pub use print::{
    buffer_handler, silent_handler, stdout_handler, PrintHandlerImpl, SharedPrintHandler,
};

/// A host operation.
pub type EffectHandler = Arc<dyn Fn(&[Value]) -> EvalResult + Send + Sync>;

/// Name of the effect installed by [`EffectRegistry::with_print`].
pub const PRINT_EFFECT: &str = "print";

#[derive(Clone, Default)]
pub struct EffectRegistry {
    handlers: FxHashMap<String, EffectHandler>,
}

impl EffectRegistry {
    /// A registry with no effects.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry with `print` writing to `sink`.
    pub fn with_print(sink: SharedPrintHandler) -> Self {
        let mut registry = Self::empty();
        registry.register_print(sink);
        registry
    }

    /// Add or replace the handler for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    /// Install `print`: arguments are shown in display form, separated by
    /// spaces, as one line. Returns `void`.
    pub fn register_print(&mut self, sink: SharedPrintHandler) {
        self.register(PRINT_EFFECT, move |args: &[Value]| {
            let line = args
                .iter()
                .map(Value::display_value)
                .collect::<Vec<_>>()
                .join(" ");
            sink.println(&line);
            Ok(Value::Void)
        });
    }

    pub fn get(&self, name: &str) -> Result<&EffectHandler, EvalError> {
        self.handlers.get(name).ok_or_else(|| unknown_effect(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }
}

impl fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("EffectRegistry")
            .field("effects", &names)
            .finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
