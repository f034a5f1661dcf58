//! Tagged type descriptors and literal leaves.
//!
//! Both share the `"kind"` tag so that document-embedded literals and
//! evaluator output use one encoding.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A type descriptor, e.g. `{"kind": "list", "of": {"kind": "int"}}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Type {
    Int,
    Float,
    Bool,
    String,
    Void,
    List {
        of: Box<Type>,
    },
    Set {
        of: Box<Type>,
    },
    Fn {
        params: Vec<Type>,
        returns: Box<Type>,
    },
    Future {
        of: Box<Type>,
    },
    Error,
}

impl Type {
    /// Shorthand for `list<of>`.
    pub fn list(of: Type) -> Self {
        Type::List { of: Box::new(of) }
    }

    /// Shorthand for `set<of>`.
    pub fn set(of: Type) -> Self {
        Type::Set { of: Box::new(of) }
    }

    /// The tag this type serializes under.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::Float => "float",
            Type::Bool => "bool",
            Type::String => "string",
            Type::Void => "void",
            Type::List { .. } => "list",
            Type::Set { .. } => "set",
            Type::Fn { .. } => "fn",
            Type::Future { .. } => "future",
            Type::Error => "error",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::List { of } => write!(f, "list<{of}>"),
            Type::Set { of } => write!(f, "set<{of}>"),
            Type::Future { of } => write!(f, "future<{of}>"),
            Type::Fn { params, returns } => {
                write!(f, "fn(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") -> {returns}")
            }
            other => f.write_str(other.kind_name()),
        }
    }
}

/// A literal leaf value as it appears inside a document.
///
/// Closures and futures only exist at runtime and have no literal form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Literal {
    Int {
        value: i64,
    },
    Float {
        value: f64,
    },
    Bool {
        value: bool,
    },
    String {
        value: String,
    },
    Void,
    List {
        of: Type,
        #[serde(default)]
        value: Vec<Literal>,
    },
    Set {
        of: Type,
        #[serde(default)]
        value: Vec<Literal>,
    },
    Error {
        code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl Literal {
    /// The type this literal denotes.
    pub fn ty(&self) -> Type {
        match self {
            Literal::Int { .. } => Type::Int,
            Literal::Float { .. } => Type::Float,
            Literal::Bool { .. } => Type::Bool,
            Literal::String { .. } => Type::String,
            Literal::Void => Type::Void,
            Literal::List { of, .. } => Type::list(of.clone()),
            Literal::Set { of, .. } => Type::set(of.clone()),
            Literal::Error { .. } => Type::Error,
        }
    }
}
