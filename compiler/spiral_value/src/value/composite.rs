//! Composite value payloads: collections and closures.

use std::fmt;
use std::sync::Arc;

use spiral_ir::{Arg, Expr, Type};

use super::Value;
use crate::{Environment, Heap};

/// Ordered items plus their declared element type.
///
/// Shared by `list` and `set`. For sets, the items are already
/// de-duplicated and kept in first-insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionValue {
    pub of: Heap<Type>,
    pub items: Heap<Vec<Value>>,
}

impl CollectionValue {
    pub(crate) fn new(of: Type, items: Vec<Value>) -> Self {
        CollectionValue {
            of: Heap::new(of),
            items: Heap::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }
}

/// How a closure's body is entered.
#[derive(Clone)]
pub enum ClosureKind {
    /// Ordinary lambda: bind params, evaluate body.
    Lambda,
    /// Fixpoint of a one-parameter generator.
    ///
    /// Calling it unrolls one step: the generator is applied to this same
    /// closure, and the result is applied to the call's arguments.
    Fix { generator: Heap<ClosureValue> },
}

/// A closure: parameters, a body reference, and the environment that was
/// active when it was created.
#[derive(Clone)]
pub struct ClosureValue {
    pub params: Arc<[String]>,
    pub body: Arg,
    pub env: Environment,
    pub kind: ClosureKind,
}

impl ClosureValue {
    pub fn lambda(params: Vec<String>, body: Arg, env: Environment) -> Self {
        ClosureValue {
            params: params.into(),
            body,
            env,
            kind: ClosureKind::Lambda,
        }
    }

    /// The self-referential closure produced by `fix(generator)`.
    ///
    /// It reports the generator's body and environment. Its parameters are
    /// those of the lambda the generator returns when that lambda is written
    /// inline in the generator's body, and empty otherwise; the arity is only
    /// checked once the generator has been applied.
    pub fn fix(generator: ClosureValue) -> Self {
        let params: Arc<[String]> = match &generator.body {
            Arg::Inline(expr) => match &**expr {
                Expr::Lambda { params, .. } => Arc::from(params.as_slice()),
                _ => Arc::from(Vec::new()),
            },
            Arg::Id(_) => Arc::from(Vec::new()),
        };
        ClosureValue {
            params,
            body: generator.body.clone(),
            env: generator.env.clone(),
            kind: ClosureKind::Fix {
                generator: Heap::new(generator),
            },
        }
    }

    pub fn is_fix(&self) -> bool {
        matches!(self.kind, ClosureKind::Fix { .. })
    }
}

impl fmt::Debug for ClosureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureValue")
            .field("params", &self.params)
            .field("body", &self.body.describe())
            .field("fix", &self.is_fix())
            .finish_non_exhaustive()
    }
}
