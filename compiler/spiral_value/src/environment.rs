//! Lexically scoped variable bindings.
//!
//! An [`Environment`] is a reference-counted chain of scopes: a local frame
//! plus a parent pointer. Child scopes extend their parent and shadow it on
//! lookup. Closures hold an `Environment` handle, so a scope lives as long
//! as the longest-lived closure that captured it.
//!
//! Scopes only ever point at their ancestors. Adding a binding that must be
//! visible to closures created *after* it is done by extending the chain
//! with a fresh child scope, never by writing a closure into the scope it
//! captured.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Value;

/// Whether a binding can be reassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    /// EIR/LIR locals.
    Mutable,
    /// AIR/CIR bindings, parameters in pure layers, inputs.
    Immutable,
}

impl Mutability {
    #[inline]
    pub fn is_mutable(self) -> bool {
        matches!(self, Mutability::Mutable)
    }
}

/// Why [`Environment::assign`] failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignError {
    /// The nearest binding with that name is immutable.
    Immutable,
    /// No scope in the chain binds the name.
    Undefined,
}

#[derive(Clone, Debug)]
struct Binding {
    value: Value,
    mutability: Mutability,
}

struct Scope {
    bindings: RwLock<FxHashMap<String, Binding>>,
    parent: Option<Environment>,
}

/// Handle to one scope in a binding chain. Cloning shares the scope.
#[derive(Clone)]
pub struct Environment(Arc<Scope>);

impl Environment {
    /// A root scope with no bindings.
    pub fn new() -> Self {
        Environment(Arc::new(Scope {
            bindings: RwLock::new(FxHashMap::default()),
            parent: None,
        }))
    }

    /// A new empty scope whose parent is `self`.
    #[must_use]
    pub fn child(&self) -> Self {
        Environment(Arc::new(Scope {
            bindings: RwLock::new(FxHashMap::default()),
            parent: Some(self.clone()),
        }))
    }

    /// Bind `name` in this scope, replacing any binding of the same name
    /// in this scope only.
    pub fn define(&self, name: impl Into<String>, value: Value, mutability: Mutability) {
        self.0
            .bindings
            .write()
            .insert(name.into(), Binding { value, mutability });
    }

    /// Nearest binding of `name`, walking outward.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut scope = &*self.0;
        loop {
            if let Some(binding) = scope.bindings.read().get(name) {
                return Some(binding.value.clone());
            }
            match &scope.parent {
                Some(parent) => scope = &parent.0,
                None => return None,
            }
        }
    }

    /// Rebind the nearest existing binding of `name` in place.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), AssignError> {
        let mut scope = &*self.0;
        loop {
            if let Some(binding) = scope.bindings.write().get_mut(name) {
                if !binding.mutability.is_mutable() {
                    return Err(AssignError::Immutable);
                }
                binding.value = value;
                return Ok(());
            }
            match &scope.parent {
                Some(parent) => scope = &parent.0,
                None => return Err(AssignError::Undefined),
            }
        }
    }

    /// Whether this scope has no parent.
    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    /// Number of scopes in the chain, including this one.
    pub fn depth(&self) -> usize {
        let mut depth = 1usize;
        let mut scope = &*self.0;
        while let Some(parent) = &scope.parent {
            depth = depth.saturating_add(1);
            scope = &parent.0;
        }
        depth
    }

    /// Flatten every visible binding into a new, unshared root scope.
    ///
    /// Later writes to either environment are invisible to the other.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        let mut flat: FxHashMap<String, Binding> = FxHashMap::default();
        let mut scope = &*self.0;
        loop {
            for (name, binding) in scope.bindings.read().iter() {
                flat.entry(name.clone())
                    .or_insert_with(|| binding.clone());
            }
            match &scope.parent {
                Some(parent) => scope = &parent.0,
                None => break,
            }
        }
        Environment(Arc::new(Scope {
            bindings: RwLock::new(flat),
            parent: None,
        }))
    }

    /// Like [`snapshot`](Self::snapshot), but every binding is immutable.
    ///
    /// Nothing can write to the result, so handles to it may be shared
    /// between tasks without sharing mutable state.
    #[must_use]
    pub fn frozen(&self) -> Self {
        let snapshot = self.snapshot();
        for binding in snapshot.0.bindings.write().values_mut() {
            binding.mutability = Mutability::Immutable;
        }
        snapshot
    }

    /// Whether both handles refer to the same scope.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("depth", &self.depth())
            .field("locals", &self.0.bindings.read().len())
            .finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
