//! Runtime substrate shared by every SPIRAL evaluator.
//!
//! - [`Value`]: the closed set of runtime values, and their tagged encoding
//! - [`Environment`]: lexically scoped bindings captured by closures
//! - [`EvalError`]: structured evaluation errors with stable codes
//!
//! Everything here is `Send + Sync` so values, environments and future
//! cells can cross into forked LIR tasks.

mod environment;
mod errors;
mod heap;
mod value;

pub use environment::{AssignError, Environment, Mutability};
pub use errors::{
    arity_mismatch, division_by_zero, domain_not_found, immutable_binding, index_out_of_bounds,
    integer_overflow, invalid_control_flow, layer_violation, malformed_document, not_callable,
    raised, recursion_limit_exceeded, recursive_definition, task_spawn_failed, type_mismatch,
    unbound_name, unknown_effect, unknown_operator, BacktraceFrame, EvalBacktrace, EvalError,
    EvalErrorKind, EvalResult,
};
pub use heap::Heap;
pub use value::{
    ClosureKind, ClosureValue, CollectionValue, ErrorValue, FutureCell, FutureStatus, FutureValue,
    ScalarInt, Value,
};
