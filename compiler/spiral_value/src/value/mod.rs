//! Runtime values for the SPIRAL evaluators.
//!
//! # Heap Enforcement
//!
//! Boxed payloads live behind [`Heap<T>`], whose constructor is private to
//! this crate. Code outside the crate builds values with the factory methods
//! (`Value::string`, `Value::list`, `Value::set`, `Value::closure`, ...), so
//! invariants such as set de-duplication cannot be bypassed.
//!
//! # Thread Safety
//!
//! All heap payloads are `Arc`-backed and immutable, except the future
//! cell, which is a mutex-protected single-transition slot. Values can be
//! cloned into forked tasks in O(1).

mod composite;
mod error_value;
mod future;
mod scalar_int;
mod serialize;

use std::fmt;

use spiral_ir::{Literal, Type};

pub use composite::{ClosureKind, ClosureValue, CollectionValue};
pub use error_value::ErrorValue;
pub use future::{FutureCell, FutureStatus, FutureValue};
pub use scalar_int::ScalarInt;

use crate::Heap;

/// Runtime value. Every value carries exactly one kind tag.
#[derive(Clone)]
pub enum Value {
    Int(ScalarInt),
    Float(f64),
    Bool(bool),
    Str(Heap<String>),
    Void,
    List(CollectionValue),
    Set(CollectionValue),
    Closure(Heap<ClosureValue>),
    Future(FutureValue),
    Error(Heap<ErrorValue>),
}

// Factory Methods

impl Value {
    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Int(ScalarInt::new(n))
    }

    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    /// A list with declared element type `of`.
    #[inline]
    pub fn list(of: Type, items: Vec<Value>) -> Self {
        Value::List(CollectionValue::new(of, items))
    }

    /// A set with declared element type `of`.
    ///
    /// Duplicates are dropped; the first occurrence keeps its position.
    pub fn set(of: Type, items: Vec<Value>) -> Self {
        let mut unique: Vec<Value> = Vec::with_capacity(items.len());
        for item in items {
            if !unique.iter().any(|u| u.same_element(&item)) {
                unique.push(item);
            }
        }
        Value::Set(CollectionValue::new(of, unique))
    }

    #[inline]
    pub fn closure(closure: ClosureValue) -> Self {
        Value::Closure(Heap::new(closure))
    }

    #[inline]
    pub fn future(future: FutureValue) -> Self {
        Value::Future(future)
    }

    #[inline]
    pub fn error(error: ErrorValue) -> Self {
        Value::Error(Heap::new(error))
    }
}

// Value Methods

impl Value {
    pub fn as_int(&self) -> Option<ScalarInt> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Items of a list or set.
    pub fn as_collection(&self) -> Option<&CollectionValue> {
        match self {
            Value::List(c) | Value::Set(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorValue> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// The kind tag, as it appears in the serialized form.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Void => "void",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Closure(_) => "closure",
            Value::Future(_) => "future",
            Value::Error(_) => "error",
        }
    }

    /// Static type, when the value determines one.
    ///
    /// Closures carry no parameter types, and a pending future has no
    /// result yet, so both return `None`.
    pub fn type_of(&self) -> Option<Type> {
        match self {
            Value::Int(_) => Some(Type::Int),
            Value::Float(_) => Some(Type::Float),
            Value::Bool(_) => Some(Type::Bool),
            Value::Str(_) => Some(Type::String),
            Value::Void => Some(Type::Void),
            Value::List(c) => Some(Type::list((*c.of).clone())),
            Value::Set(c) => Some(Type::set((*c.of).clone())),
            Value::Error(_) => Some(Type::Error),
            Value::Closure(_) => None,
            Value::Future(f) => match f.cell.try_get()? {
                Ok(v) => v.type_of().map(|of| Type::Future { of: Box::new(of) }),
                Err(_) => Some(Type::Future {
                    of: Box::new(Type::Error),
                }),
            },
        }
    }

    /// Whether this value may occupy a slot declared as `ty`.
    pub fn conforms_to(&self, ty: &Type) -> bool {
        match (self, ty) {
            (Value::Int(_), Type::Int)
            | (Value::Float(_), Type::Float)
            | (Value::Bool(_), Type::Bool)
            | (Value::Str(_), Type::String)
            | (Value::Void, Type::Void)
            | (Value::Closure(_), Type::Fn { .. })
            | (Value::Future(_), Type::Future { .. })
            | (Value::Error(_), Type::Error) => true,
            (Value::List(c), Type::List { of }) | (Value::Set(c), Type::Set { of }) => {
                *c.of == **of
            }
            _ => false,
        }
    }

    /// Structural equality.
    ///
    /// Floats use IEEE `==`, sets ignore order, closures and futures are
    /// equal only to themselves, errors compare by code.
    #[allow(clippy::float_cmp, reason = "IEEE equality is the defined semantics")]
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Void, Value::Void) => true,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::Set(a), Value::Set(b)) => {
                a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| x.equals(y)))
            }
            (Value::Closure(a), Value::Closure(b)) => Heap::ptr_eq(a, b),
            (Value::Future(a), Value::Future(b)) => Heap::ptr_eq(&a.cell, &b.cell),
            (Value::Error(a), Value::Error(b)) => a.code == b.code,
            _ => false,
        }
    }

    /// Equality used for set membership: like [`Value::equals`] but floats
    /// compare by bit pattern order, so `NaN` matches itself.
    pub fn same_element(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b).is_eq(),
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.same_element(y))
            }
            (Value::Set(a), Value::Set(b)) => {
                a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| x.same_element(y)))
            }
            _ => self.equals(other),
        }
    }

    /// Display for user output: strings without quotes.
    pub fn display_value(&self) -> String {
        match self {
            Value::Str(s) => s.to_string(),
            other => other.to_string(),
        }
    }
}

// Trait Implementations

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(n) => write!(f, "Float({n})"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Str(s) => write!(f, "Str({:?})", &**s),
            Value::Void => write!(f, "Void"),
            Value::List(c) => write!(f, "List<{}>({:?})", *c.of, &**c.items),
            Value::Set(c) => write!(f, "Set<{}>({:?})", *c.of, &**c.items),
            Value::Closure(c) => write!(f, "Closure({:?})", &**c),
            Value::Future(fut) => write!(f, "Future(#{}, {:?})", fut.task, fut.status()),
            Value::Error(e) => write!(f, "Error({e})"),
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "\"{}\"", &**s),
            Value::Void => write!(f, "void"),
            Value::List(c) => {
                write!(f, "[")?;
                write_items(f, &c.items)?;
                write!(f, "]")
            }
            Value::Set(c) => {
                write!(f, "{{")?;
                write_items(f, &c.items)?;
                write!(f, "}}")
            }
            Value::Closure(c) if c.is_fix() => write!(f, "<fix({})>", c.params.join(", ")),
            Value::Closure(c) => write!(f, "<closure({})>", c.params.join(", ")),
            Value::Future(fut) => write!(f, "<future {}>", fut.status().as_str()),
            Value::Error(e) => write!(f, "<error {e}>"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl From<&Literal> for Value {
    fn from(lit: &Literal) -> Self {
        match lit {
            Literal::Int { value } => Value::int(*value),
            Literal::Float { value } => Value::Float(*value),
            Literal::Bool { value } => Value::Bool(*value),
            Literal::String { value } => Value::string(value.as_str()),
            Literal::Void => Value::Void,
            Literal::List { of, value } => {
                Value::list(of.clone(), value.iter().map(Value::from).collect())
            }
            Literal::Set { of, value } => {
                Value::set(of.clone(), value.iter().map(Value::from).collect())
            }
            Literal::Error { code, message } => Value::error(ErrorValue {
                code: code.clone(),
                message: message.clone(),
            }),
        }
    }
}

impl From<ErrorValue> for Value {
    fn from(error: ErrorValue) -> Self {
        Value::error(error)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::int(n)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
