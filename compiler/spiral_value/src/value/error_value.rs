//! First-class error values.

use std::fmt;

/// An `error` value: a stable code plus an optional diagnostic message.
///
/// Codes are compared verbatim across implementations; messages are
/// informational only.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ErrorValue {
    pub code: String,
    pub message: Option<String>,
}

impl ErrorValue {
    pub fn new(code: impl Into<String>) -> Self {
        ErrorValue {
            code: code.into(),
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.code),
            None => f.write_str(&self.code),
        }
    }
}
