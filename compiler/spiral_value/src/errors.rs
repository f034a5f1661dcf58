//! Evaluation errors.
//!
//! `EvalErrorKind` is the typed category; each kind maps to one stable
//! code string (see [`EvalErrorKind::code`]) that survives into the
//! `error` value returned to callers. Factory functions (e.g.
//! [`division_by_zero`]) are the public way to build errors and populate
//! both `kind` and `message`.

use std::fmt;

use spiral_ir::{IrError, Layer};

use crate::{ErrorValue, Value};

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Arithmetic
    DivisionByZero,
    IntegerOverflow {
        operation: String,
    },

    // Type/Operator
    TypeMismatch {
        expected: String,
        got: String,
    },
    UnknownOperator {
        ns: String,
        name: String,
    },
    NotCallable {
        type_name: String,
    },

    // Access
    IndexOutOfBounds {
        index: i64,
        len: usize,
    },
    UnboundName {
        name: String,
    },
    ImmutableBinding {
        name: String,
    },

    // Calls
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    RecursionLimitExceeded {
        depth: usize,
    },
    RecursiveDefinition {
        name: String,
    },

    // Registries
    UnknownEffect {
        name: String,
    },
    DomainNotFound {
        name: String,
    },

    // Tasks
    TaskSpawnFailed {
        reason: String,
    },

    // Document structure
    InvalidControlFlow {
        message: String,
    },
    LayerViolation {
        layer: Layer,
        form: String,
        location: String,
    },
    MalformedDocument {
        message: String,
    },

    /// An error that started life as an `error` value: an error literal,
    /// a handler result, or a rejected future. Keeps the original code.
    Raised {
        code: String,
        message: Option<String>,
    },
}

impl EvalErrorKind {
    /// Stable code carried by the resulting `error` value.
    pub fn code(&self) -> &str {
        match self {
            Self::DivisionByZero => "DivisionByZero",
            Self::IntegerOverflow { .. } => "IntegerOverflow",
            Self::TypeMismatch { .. } => "TypeMismatch",
            Self::UnknownOperator { .. } => "UnknownOperator",
            Self::NotCallable { .. } => "NotCallable",
            Self::IndexOutOfBounds { .. } => "IndexOutOfBounds",
            Self::UnboundName { .. } => "UnboundName",
            Self::ImmutableBinding { .. } => "ImmutableBinding",
            Self::ArityMismatch { .. } => "ArityMismatch",
            Self::RecursionLimitExceeded { .. } => "RecursionLimitExceeded",
            Self::RecursiveDefinition { .. } => "RecursiveDefinition",
            Self::UnknownEffect { .. } => "UnknownEffect",
            Self::DomainNotFound { .. } => "DomainNotFound",
            Self::TaskSpawnFailed { .. } => "TaskSpawnFailed",
            Self::InvalidControlFlow { .. } => "InvalidControlFlow",
            Self::LayerViolation { .. } => "LayerViolation",
            Self::MalformedDocument { .. } => "MalformedDocument",
            Self::Raised { code, .. } => code,
        }
    }
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::IntegerOverflow { operation } => {
                write!(f, "integer overflow in {operation}")
            }

            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::UnknownOperator { ns, name } => write!(f, "unknown operator {ns}:{name}"),
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),

            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::UnboundName { name } => write!(f, "unbound name: {name}"),
            Self::ImmutableBinding { name } => {
                write!(f, "cannot assign to immutable binding: {name}")
            }

            Self::ArityMismatch {
                name,
                expected,
                got,
            } => {
                let arg_word = if *expected == 1 {
                    "argument"
                } else {
                    "arguments"
                };
                if name.is_empty() {
                    write!(f, "expected {expected} {arg_word}, got {got}")
                } else {
                    write!(f, "{name} expects {expected} {arg_word}, got {got}")
                }
            }
            Self::RecursionLimitExceeded { depth } => {
                write!(f, "maximum recursion depth exceeded (limit: {depth})")
            }
            Self::RecursiveDefinition { name } => {
                write!(f, "definition {name} re-enters itself")
            }

            Self::UnknownEffect { name } => write!(f, "unknown effect: {name}"),
            Self::DomainNotFound { name } => write!(f, "domain not found: {name}"),

            Self::TaskSpawnFailed { reason } => write!(f, "could not start task: {reason}"),

            Self::InvalidControlFlow { message } => write!(f, "invalid control flow: {message}"),
            Self::LayerViolation {
                layer,
                form,
                location,
            } => write!(f, "`{form}` is not allowed in {layer} (at {location})"),
            Self::MalformedDocument { message } => write!(f, "malformed document: {message}"),

            Self::Raised { code, message } => match message {
                Some(message) => write!(f, "{code}: {message}"),
                None => f.write_str(code),
            },
        }
    }
}

/// A single frame in an evaluation backtrace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    /// Node id, definition key, or `<closure>`.
    pub name: String,
}

/// Snapshot of the call stack at an error site.
#[derive(Clone, Debug, Default)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "stack backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            writeln!(f, "  {i}: {}", frame.name)?;
        }
        Ok(())
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()` for factory-made
    /// errors.
    pub message: String,
    /// Call stack at the error site, innermost frame last.
    ///
    /// Only the first (innermost) capture is kept.
    pub backtrace: Option<EvalBacktrace>,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            backtrace: None,
        }
    }

    /// Stable code of this error.
    pub fn code(&self) -> &str {
        self.kind.code()
    }

    /// Attach a backtrace unless one is already present.
    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        if self.backtrace.is_none() {
            self.backtrace = Some(backtrace);
        }
        self
    }

    /// The `error` value a caller observes for this failure.
    pub fn to_error_value(&self) -> ErrorValue {
        match &self.kind {
            EvalErrorKind::Raised { code, message } => ErrorValue {
                code: code.clone(),
                message: message.clone(),
            },
            kind => ErrorValue::new(kind.code()).with_message(self.message.clone()),
        }
    }

    /// Convert into an `error`-kind [`Value`].
    pub fn into_value(self) -> Value {
        Value::error(self.to_error_value())
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for EvalError {}

impl From<ErrorValue> for EvalError {
    fn from(error: ErrorValue) -> Self {
        raised(error.code, error.message)
    }
}

impl From<IrError> for EvalError {
    fn from(error: IrError) -> Self {
        match error {
            IrError::DuplicateNode(_) => malformed_document(&error.to_string()),
            IrError::DuplicateBlock(_)
            | IrError::MissingEntry(_)
            | IrError::UnknownLabel { .. } => invalid_control_flow(&error.to_string()),
        }
    }
}

// Arithmetic

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn integer_overflow(operation: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow {
        operation: operation.to_string(),
    })
}

// Type/Operator

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

#[cold]
pub fn unknown_operator(ns: &str, name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownOperator {
        ns: ns.to_string(),
        name: name.to_string(),
    })
}

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_string(),
    })
}

// Access

#[cold]
pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds { index, len })
}

#[cold]
pub fn unbound_name(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnboundName {
        name: name.to_string(),
    })
}

#[cold]
pub fn immutable_binding(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ImmutableBinding {
        name: name.to_string(),
    })
}

// Calls

#[cold]
pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

#[cold]
pub fn recursion_limit_exceeded(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RecursionLimitExceeded { depth })
}

#[cold]
pub fn recursive_definition(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RecursiveDefinition {
        name: name.to_string(),
    })
}

// Registries

#[cold]
pub fn unknown_effect(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownEffect {
        name: name.to_string(),
    })
}

#[cold]
pub fn domain_not_found(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DomainNotFound {
        name: name.to_string(),
    })
}

// Tasks

#[cold]
pub fn task_spawn_failed(reason: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TaskSpawnFailed {
        reason: reason.to_string(),
    })
}

// Document structure

#[cold]
pub fn invalid_control_flow(message: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidControlFlow {
        message: message.to_string(),
    })
}

#[cold]
pub fn layer_violation(layer: Layer, form: &str, location: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::LayerViolation {
        layer,
        form: form.to_string(),
        location: location.to_string(),
    })
}

#[cold]
pub fn malformed_document(message: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MalformedDocument {
        message: message.to_string(),
    })
}

/// Re-raise an `error` value as an evaluation failure.
#[cold]
pub fn raised(code: impl Into<String>, message: Option<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Raised {
        code: code.into(),
        message,
    })
}
