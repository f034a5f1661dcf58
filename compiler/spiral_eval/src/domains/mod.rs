//! Domain registry: named providers of structural operations.
//!
//! A `call` with a namespace other than `core` is routed here: the
//! namespace selects a [`Domain`], the call name selects one of its
//! operations. The built-in `list` and `set` domains cover collection
//! semantics; hosts may register more.

mod list;
mod set;

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use spiral_ir::Type;
use spiral_value::{
    arity_mismatch, domain_not_found, integer_overflow, type_mismatch, unknown_operator,
    EvalError, EvalResult, Value,
};

pub use list::ListDomain;
pub use set::SetDomain;

/// A provider of operations for one category of values.
///
/// Implementors supply construction and iteration; the common operations
/// (`of`, `fromList`, `eq`, `toList`, `contains`, `size`) are dispatched by
/// the provided [`Domain::call`]. Operations specific to a domain go in
/// [`Domain::call_extra`].
pub trait Domain: Send + Sync {
    /// Namespace under which the domain is registered.
    fn name(&self) -> &str;

    /// Build a value of this domain from items.
    fn construct(&self, of: Type, items: Vec<Value>) -> Value;

    /// Items of a value of this domain, in iteration order.
    fn iterate<'v>(&self, value: &'v Value) -> Result<&'v [Value], EvalError>;

    fn equals(&self, a: &Value, b: &Value) -> bool {
        a.equals(b)
    }

    fn contains(&self, value: &Value, item: &Value) -> Result<bool, EvalError> {
        Ok(self.iterate(value)?.iter().any(|v| v.equals(item)))
    }

    /// Domain-specific operations. `None` means the domain has no such
    /// operation.
    fn call_extra(&self, op: &str, args: &[Value]) -> Option<EvalResult> {
        let _ = (op, args);
        None
    }

    /// Dispatch operation `op` with evaluated operands.
    fn call(&self, op: &str, args: &[Value]) -> EvalResult {
        match op {
            "of" => {
                let of = args
                    .first()
                    .and_then(Value::type_of)
                    .unwrap_or(Type::Void);
                Ok(self.construct(of, args.to_vec()))
            }
            "fromList" => {
                let [source] = operands::<1>(self.name(), op, args)?;
                let Value::List(list) = source else {
                    return Err(type_mismatch("list", source.type_name()));
                };
                Ok(self.construct((*list.of).clone(), list.items.to_vec()))
            }
            "toList" => {
                let [source] = operands::<1>(self.name(), op, args)?;
                let of = element_type(source);
                Ok(Value::list(of, self.iterate(source)?.to_vec()))
            }
            "eq" => {
                let [a, b] = operands::<2>(self.name(), op, args)?;
                self.iterate(a)?;
                self.iterate(b)?;
                Ok(Value::Bool(self.equals(a, b)))
            }
            "contains" => {
                let [value, item] = operands::<2>(self.name(), op, args)?;
                Ok(Value::Bool(self.contains(value, item)?))
            }
            "size" => {
                let [value] = operands::<1>(self.name(), op, args)?;
                let len = self.iterate(value)?.len();
                i64::try_from(len)
                    .map(Value::int)
                    .map_err(|_| integer_overflow("size"))
            }
            _ => self
                .call_extra(op, args)
                .unwrap_or_else(|| Err(unknown_operator(self.name(), op))),
        }
    }
}

/// Exactly `N` operands, or `ArityMismatch` naming `domain:op`.
pub(crate) fn operands<'a, const N: usize>(
    domain: &str,
    op: &str,
    args: &'a [Value],
) -> Result<&'a [Value; N], EvalError> {
    args.try_into()
        .map_err(|_| arity_mismatch(&format!("{domain}:{op}"), N, args.len()))
}

/// Declared element type of a list or set, `void` otherwise.
pub(crate) fn element_type(value: &Value) -> Type {
    value
        .as_collection()
        .map_or(Type::Void, |c| (*c.of).clone())
}

/// Registry of domains, keyed by name.
///
/// Read-only once evaluation starts; shared by reference with every task.
#[derive(Clone, Default)]
pub struct DomainRegistry {
    domains: FxHashMap<String, Arc<dyn Domain>>,
}

impl DomainRegistry {
    /// A registry with no domains.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding the `list` and `set` domains.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(ListDomain);
        registry.register(SetDomain);
        registry
    }

    /// Add a domain, replacing any domain of the same name.
    pub fn register(&mut self, domain: impl Domain + 'static) {
        self.domains
            .insert(domain.name().to_owned(), Arc::new(domain));
    }

    pub fn get(&self, name: &str) -> Result<&dyn Domain, EvalError> {
        self.domains
            .get(name)
            .map(|d| &**d)
            .ok_or_else(|| domain_not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.domains.contains_key(name)
    }
}

impl fmt::Debug for DomainRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.domains.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("DomainRegistry")
            .field("domains", &names)
            .finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
