//! Tree-walking evaluator for the expression layers.
//!
//! One `Interpreter` runs one task: it owns the call stack, the node cache
//! and the set of definitions currently executing, and borrows everything
//! else (document nodes, registries, inputs) from the caller.
//!
//! # Layers
//!
//! The same evaluator serves AIR, CIR and EIR documents and the expression
//! operands inside LIR instructions. The configured [`Layer`] decides:
//!
//! - which forms may run (a form above the layer is a `LayerViolation`)
//! - whether bindings are mutable (`Layer::allows_mutation`)
//! - whether node results can be memoized (pure layers only)
//! - whether closures share their scope or capture a read-only copy of it
//!
//! # Operand resolution
//!
//! A bare-string operand names a node when the document has one with that
//! id, and a variable in the current scope otherwise. Nodes are evaluated
//! in the scope of the reference site, which is how lambda bodies written as
//! node graphs see their parameters.

mod apply;
mod builder;
mod statements;

pub use builder::InterpreterBuilder;

use rustc_hash::FxHashMap;
use spiral_ir::{Arg, CoreOp, Expr, Layer, NodeTable};
use spiral_value::{
    arity_mismatch, layer_violation, type_mismatch, unbound_name, unknown_operator,
    ClosureValue, Environment, EvalError, EvalResult, Mutability, Value,
};

use crate::call_stack::{ensure_sufficient_stack, CallFrame, CallStack};
use crate::defs::{Defs, Inputs};
use crate::domains::DomainRegistry;
use crate::effects::EffectRegistry;
use crate::operators::evaluate_core;

/// Raise `value` if it is an `error` value.
#[inline]
pub(crate) fn raise_if_error(value: &Value) -> Result<(), EvalError> {
    match value.as_error() {
        Some(error) => Err(error.clone().into()),
        None => Ok(()),
    }
}

/// Raise the first `error` value among `values`.
pub(crate) fn raise_first_error(values: &[Value]) -> Result<(), EvalError> {
    values.iter().try_for_each(raise_if_error)
}

/// Evaluator state for one task.
pub struct Interpreter<'a> {
    nodes: Option<&'a NodeTable>,
    defs: Option<&'a Defs>,
    inputs: Option<&'a Inputs>,
    domains: &'a DomainRegistry,
    effects: Option<&'a EffectRegistry>,
    layer: Layer,
    node_cache: bool,
    call_stack: CallStack,
    /// Keys of definitions whose bodies are executing.
    active_defs: Vec<String>,
    cache: FxHashMap<String, Value>,
    root: Environment,
}

impl<'a> Interpreter<'a> {
    /// Scope that top-level expressions are evaluated in.
    pub fn root(&self) -> &Environment {
        &self.root
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn domains(&self) -> &'a DomainRegistry {
        self.domains
    }

    pub fn effects(&self) -> Option<&'a EffectRegistry> {
        self.effects
    }

    /// Current call depth.
    pub fn depth(&self) -> usize {
        self.call_stack.depth()
    }

    /// Mutability of bindings this layer introduces.
    fn binding_mutability(&self) -> Mutability {
        if self.layer.allows_mutation() {
            Mutability::Mutable
        } else {
            Mutability::Immutable
        }
    }

    /// Run `f` inside a new call frame named `name`.
    ///
    /// Errors leaving the frame get the innermost backtrace attached.
    pub(crate) fn with_frame<T>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Self) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        self.call_stack.push(CallFrame::new(name))?;
        let result = ensure_sufficient_stack(|| f(self));
        let result = result.map_err(|e| self.call_stack.attach_backtrace(e));
        self.call_stack.pop();
        result
    }

    /// Evaluate an operand in `env`.
    pub fn eval_arg(&mut self, arg: &Arg, env: &Environment) -> EvalResult {
        match arg {
            Arg::Inline(expr) => self.eval_expr(expr, env),
            Arg::Id(id) => match self.nodes.and_then(|nodes| nodes.get(id)) {
                Some(expr) => self.eval_node(id, expr, env),
                None => env.lookup(id).ok_or_else(|| unbound_name(id)),
            },
        }
    }

    /// Evaluate operands left to right.
    pub fn eval_args(&mut self, args: &[Arg], env: &Environment) -> Result<Vec<Value>, EvalError> {
        args.iter().map(|arg| self.eval_arg(arg, env)).collect()
    }

    fn eval_node(&mut self, id: &str, expr: &Expr, env: &Environment) -> EvalResult {
        let cacheable = self.node_cache
            && !self.layer.allows_mutation()
            && Environment::ptr_eq(env, &self.root);
        if cacheable {
            if let Some(value) = self.cache.get(id) {
                return Ok(value.clone());
            }
        }
        let value = self.with_frame(id, |interp| interp.eval_expr(expr, env))?;
        if cacheable {
            self.cache.insert(id.to_owned(), value.clone());
        }
        Ok(value)
    }

    /// Evaluate one expression in `env`.
    pub fn eval_expr(&mut self, expr: &Expr, env: &Environment) -> EvalResult {
        if expr.min_layer() > self.layer {
            let location = self
                .call_stack
                .top()
                .map_or("<expr>", |frame| frame.name.as_str());
            return Err(layer_violation(self.layer, expr.form(), location));
        }

        match expr {
            Expr::Lit { value } => Ok(Value::from(value)),
            Expr::Ref { id } => match self.nodes.and_then(|nodes| nodes.get(id)) {
                Some(node) => self.eval_node(id, node, env),
                None => Err(unbound_name(id)),
            },
            Expr::Var { name } => env.lookup(name).ok_or_else(|| unbound_name(name)),
            Expr::Input { name } => self
                .inputs
                .and_then(|inputs| inputs.get(name))
                .cloned()
                .ok_or_else(|| unbound_name(name)),
            Expr::Call { ns, name, args } => self.eval_call(ns.as_deref(), name, args, env),
            Expr::If {
                cond,
                then,
                otherwise,
            } => {
                let cond = self.eval_arg(cond, env)?;
                raise_if_error(&cond)?;
                match cond {
                    Value::Bool(true) => self.eval_arg(then, env),
                    Value::Bool(false) => self.eval_arg(otherwise, env),
                    other => Err(type_mismatch("bool", other.type_name())),
                }
            }
            Expr::Let { name, value, body } => {
                let value = self.eval_arg(value, env)?;
                let scope = env.child();
                scope.define(name.as_str(), value, self.binding_mutability());
                self.eval_arg(body, &scope)
            }
            Expr::AirRef { ns, name, args } => self.call_def(ns, name, args, env),
            Expr::List { of, items } => {
                let values = self.eval_args(items, env)?;
                for value in &values {
                    if !value.conforms_to(of) {
                        raise_if_error(value)?;
                        return Err(type_mismatch(&of.to_string(), value.type_name()));
                    }
                }
                Ok(Value::list(of.clone(), values))
            }

            Expr::Lambda { params, body } => {
                let captured = if self.layer.captures_by_copy() {
                    env.frozen()
                } else {
                    env.clone()
                };
                Ok(Value::closure(ClosureValue::lambda(
                    params.clone(),
                    body.clone(),
                    captured,
                )))
            }
            Expr::Apply { callee, args } => {
                let callee = self.eval_arg(callee, env)?;
                let args = self.eval_args(args, env)?;
                self.apply(&callee, args)
            }
            Expr::Fix { generator } => {
                let generator = self.eval_arg(generator, env)?;
                self.fix(&generator)
            }

            Expr::Seq { body } => self.eval_seq(body, env),
            Expr::Declare { name, value } => {
                let value = self.eval_arg(value, env)?;
                env.define(name.as_str(), value, Mutability::Mutable);
                Ok(Value::Void)
            }
            Expr::Assign { name, value } => self.eval_assign(name, value, env),
            Expr::While { cond, body } => self.eval_while(cond, body, env),
            Expr::Effect { op, args } => self.eval_effect(op, args, env),
        }
    }

    /// `call`: a core operator, or an operation of the domain named by `ns`.
    fn eval_call(
        &mut self,
        ns: Option<&str>,
        name: &str,
        args: &[Arg],
        env: &Environment,
    ) -> EvalResult {
        match ns {
            Some(ns) if !CoreOp::is_core_namespace(Some(ns)) => {
                let domains = self.domains;
                let domain = domains.get(ns)?;
                let values = self.eval_args(args, env)?;
                raise_first_error(&values)?;
                domain.call(name, &values)
            }
            _ => {
                let op = CoreOp::from_name(name)
                    .ok_or_else(|| unknown_operator(CoreOp::NAMESPACE, name))?;
                if op.is_short_circuit() {
                    return self.eval_short_circuit(op, args, env);
                }
                let values = self.eval_args(args, env)?;
                evaluate_core(op, &values)
            }
        }
    }

    /// `and`/`or`: the right operand runs only when the left one does not
    /// decide the result.
    fn eval_short_circuit(&mut self, op: CoreOp, args: &[Arg], env: &Environment) -> EvalResult {
        let [lhs, rhs] = args else {
            return Err(arity_mismatch(op.as_str(), 2, args.len()));
        };
        let left = self.eval_arg(lhs, env)?;
        raise_if_error(&left)?;
        match (op, &left) {
            (CoreOp::And, Value::Bool(false)) | (CoreOp::Or, Value::Bool(true)) => Ok(left),
            (_, Value::Bool(_)) => {
                let right = self.eval_arg(rhs, env)?;
                evaluate_core(op, &[left, right])
            }
            (_, other) => Err(type_mismatch("bool", other.type_name())),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
