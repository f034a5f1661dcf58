//! Core operator catalogue.
//!
//! Operators in the `core` namespace (or with no namespace) are resolved to
//! a [`CoreOp`] once, then dispatched by enum match.

/// Built-in operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CoreOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,

    // Comparison
    Eq,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,

    // Logical
    And,
    Or,
    Not,

    // Lists
    Length,
    Nth,
    Concat,
}

impl CoreOp {
    /// Namespace that selects core operators when given explicitly.
    pub const NAMESPACE: &'static str = "core";

    pub fn from_name(name: &str) -> Option<Self> {
        let op = match name {
            "add" => Self::Add,
            "sub" => Self::Sub,
            "mul" => Self::Mul,
            "div" => Self::Div,
            "mod" => Self::Mod,
            "neg" => Self::Neg,
            "eq" => Self::Eq,
            "neq" => Self::Neq,
            "lt" => Self::Lt,
            "gt" => Self::Gt,
            "le" => Self::Le,
            "ge" => Self::Ge,
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            "length" => Self::Length,
            "nth" => Self::Nth,
            "concat" => Self::Concat,
            _ => return None,
        };
        Some(op)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Mod => "mod",
            Self::Neg => "neg",
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Lt => "lt",
            Self::Gt => "gt",
            Self::Le => "le",
            Self::Ge => "ge",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Length => "length",
            Self::Nth => "nth",
            Self::Concat => "concat",
        }
    }

    /// Number of operands the operator takes.
    pub const fn arity(self) -> usize {
        match self {
            Self::Neg | Self::Not | Self::Length => 1,
            _ => 2,
        }
    }

    /// `and`/`or` evaluate their right operand only when needed.
    pub const fn is_short_circuit(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// Whether `ns` selects the core namespace.
    pub fn is_core_namespace(ns: Option<&str>) -> bool {
        ns.map_or(true, |ns| ns == Self::NAMESPACE)
    }
}
