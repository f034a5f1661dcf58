//! Closure application, fixpoints and definition calls.

use spiral_ir::{def_key, Arg};
use spiral_value::{
    arity_mismatch, not_callable, recursive_definition, type_mismatch, unbound_name, ClosureKind,
    ClosureValue, Environment, EvalResult, Value,
};

use super::{raise_if_error, Interpreter};

/// Frame name for closure applications.
const CLOSURE_FRAME: &str = "<closure>";

impl Interpreter<'_> {
    /// Apply a callable value to evaluated arguments.
    ///
    /// A fixpoint closure unrolls one step per call: its generator is applied
    /// to the fixpoint itself, and the function that comes back receives the
    /// arguments. Host recursion is bounded by the call-depth ceiling.
    pub fn apply(&mut self, callee: &Value, args: Vec<Value>) -> EvalResult {
        let closure = match callee {
            Value::Closure(closure) => closure,
            Value::Error(error) => return Err((**error).clone().into()),
            other => return Err(not_callable(other.type_name())),
        };

        match &closure.kind {
            ClosureKind::Lambda => {
                if closure.params.len() != args.len() {
                    return Err(arity_mismatch(
                        CLOSURE_FRAME,
                        closure.params.len(),
                        args.len(),
                    ));
                }
                let scope = closure.env.child();
                let mutability = self.binding_mutability();
                for (param, value) in closure.params.iter().zip(args) {
                    scope.define(param.as_str(), value, mutability);
                }
                self.with_frame(CLOSURE_FRAME, |interp| {
                    interp.eval_arg(&closure.body, &scope)
                })
            }
            ClosureKind::Fix { generator } => {
                let generator = Value::Closure(generator.clone());
                let unrolled = self.apply(&generator, vec![callee.clone()])?;
                self.apply(&unrolled, args)
            }
        }
    }

    /// `fix(g)`: `g` applied to the fixpoint closure of `g`.
    pub(super) fn fix(&mut self, generator: &Value) -> EvalResult {
        raise_if_error(generator)?;
        let Value::Closure(closure) = generator else {
            return Err(not_callable(generator.type_name()));
        };
        if closure.is_fix() || closure.params.len() != 1 {
            return Err(arity_mismatch("fix", 1, closure.params.len()));
        }
        let recursive = Value::closure(ClosureValue::fix((**closure).clone()));
        self.apply(generator, vec![recursive])
    }

    /// `airRef`: call a definition by `ns:name`.
    ///
    /// The body sees only its parameters. A definition may not re-enter
    /// itself, directly or through other definitions.
    pub(super) fn call_def(
        &mut self,
        ns: &str,
        name: &str,
        args: &[Arg],
        env: &Environment,
    ) -> EvalResult {
        let key = def_key(ns, name);
        let def = self
            .defs
            .and_then(|defs| defs.get(ns, name))
            .ok_or_else(|| unbound_name(&key))?;
        if self.active_defs.contains(&key) {
            return Err(recursive_definition(&key));
        }
        if def.params.len() != args.len() {
            return Err(arity_mismatch(&key, def.params.len(), args.len()));
        }

        let values = self.eval_args(args, env)?;
        let scope = self.root.child();
        let mutability = self.binding_mutability();
        for (param, value) in def.params.iter().zip(values) {
            scope.define(param.as_str(), value, mutability);
        }

        tracing::trace!(def = %key, "enter definition");
        self.active_defs.push(key.clone());
        let result = self.with_frame(&key, |interp| interp.eval_arg(&def.body, &scope));
        self.active_defs.pop();
        let value = result?;

        match &def.result {
            Some(ty) if !value.is_error() && !value.conforms_to(ty) => {
                Err(type_mismatch(&ty.to_string(), value.type_name()))
            }
            _ => Ok(value),
        }
    }
}
