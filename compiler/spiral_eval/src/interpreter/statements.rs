//! Statement forms: sequencing, mutation, loops and effects.

use spiral_ir::{Arg, Expr};
use spiral_value::{
    immutable_binding, type_mismatch, unbound_name, unknown_effect, AssignError, Environment,
    EvalResult, Mutability, Value,
};

use super::{raise_first_error, raise_if_error, Interpreter};

/// Name and initializer of a `declare` form.
fn declare_parts(expr: &Expr) -> Option<(&str, &Arg)> {
    match expr {
        Expr::Declare { name, value } => Some((name.as_str(), value)),
        _ => None,
    }
}

impl Interpreter<'_> {
    /// `seq`: statements in order; the last one's value is the result.
    ///
    /// A `declare` extends the chain with a fresh scope, so closures created
    /// earlier in the sequence never see it and no scope ever holds a
    /// closure that captured that same scope.
    pub(super) fn eval_seq(&mut self, body: &[Arg], env: &Environment) -> EvalResult {
        let mut scope = env.child();
        let mut last = Value::Void;
        for stmt in body {
            let declaration = match stmt {
                Arg::Inline(expr) => declare_parts(expr),
                Arg::Id(id) => self
                    .nodes
                    .and_then(|nodes| nodes.get(id))
                    .and_then(|expr| declare_parts(expr)),
            };
            last = match declaration {
                Some((name, value)) => {
                    let value = self.eval_arg(value, &scope)?;
                    scope = scope.child();
                    scope.define(name, value, Mutability::Mutable);
                    Value::Void
                }
                None => self.eval_arg(stmt, &scope)?,
            };
        }
        Ok(last)
    }

    /// `assign`: rebind the nearest existing binding.
    pub(super) fn eval_assign(&mut self, name: &str, value: &Arg, env: &Environment) -> EvalResult {
        let value = self.eval_arg(value, env)?;
        env.assign(name, value).map_err(|err| match err {
            AssignError::Undefined => unbound_name(name),
            AssignError::Immutable => immutable_binding(name),
        })?;
        Ok(Value::Void)
    }

    /// `while`: the condition is re-evaluated before every iteration.
    pub(super) fn eval_while(&mut self, cond: &Arg, body: &Arg, env: &Environment) -> EvalResult {
        loop {
            let test = self.eval_arg(cond, env)?;
            raise_if_error(&test)?;
            match test {
                Value::Bool(true) => {
                    self.eval_arg(body, env)?;
                }
                Value::Bool(false) => return Ok(Value::Void),
                other => return Err(type_mismatch("bool", other.type_name())),
            }
        }
    }

    /// `effect`: the handler is resolved before any argument runs, so an
    /// unknown effect leaves no partial mutation behind.
    pub(super) fn eval_effect(&mut self, op: &str, args: &[Arg], env: &Environment) -> EvalResult {
        let effects = self.effects.ok_or_else(|| unknown_effect(op))?;
        let handler = effects.get(op)?;
        let values = self.eval_args(args, env)?;
        raise_first_error(&values)?;
        tracing::debug!(effect = op, args = values.len(), "invoke effect");
        handler(&values)
    }
}
