//! Core operator implementations.
//!
//! Operands arrive already evaluated. The operator set is closed, so
//! dispatch is a match on [`CoreOp`] and then on operand kinds.

use std::cmp::Ordering;

use spiral_ir::{CoreOp, Type};
use spiral_value::{
    arity_mismatch, division_by_zero, index_out_of_bounds, integer_overflow, type_mismatch,
    CollectionValue, EvalError, EvalResult, ScalarInt, Value,
};

/// Checked integer operation where the only failure is overflow.
#[inline]
fn checked_arith(result: Option<ScalarInt>, op_name: &'static str) -> EvalResult {
    result.map(Value::Int).ok_or_else(|| integer_overflow(op_name))
}

/// Checked division or remainder with a zero guard.
#[inline]
fn checked_div<F>(is_zero: bool, op: F, op_name: &'static str) -> EvalResult
where
    F: FnOnce() -> Option<ScalarInt>,
{
    if is_zero {
        Err(division_by_zero())
    } else {
        op().map(Value::Int).ok_or_else(|| integer_overflow(op_name))
    }
}

fn len_value(len: usize) -> EvalResult {
    i64::try_from(len)
        .map(Value::int)
        .map_err(|_| integer_overflow("length"))
}

/// Evaluate `op` over evaluated operands.
///
/// An `error` operand is raised as the result, so error values propagate
/// through operators unchanged.
pub fn evaluate_core(op: CoreOp, args: &[Value]) -> EvalResult {
    if args.len() != op.arity() {
        return Err(arity_mismatch(op.as_str(), op.arity(), args.len()));
    }
    if let Some(error) = args.iter().find_map(Value::as_error) {
        return Err(error.clone().into());
    }

    match args {
        [operand] => evaluate_unary(op, operand),
        [left, right] => evaluate_binary(op, left, right),
        _ => Err(arity_mismatch(op.as_str(), op.arity(), args.len())),
    }
}

fn evaluate_unary(op: CoreOp, operand: &Value) -> EvalResult {
    match (op, operand) {
        (CoreOp::Neg, Value::Int(n)) => checked_arith(n.checked_neg(), "negation"),
        (CoreOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (CoreOp::Neg, other) => Err(type_mismatch("int or float", other.type_name())),

        (CoreOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (CoreOp::Not, other) => Err(type_mismatch("bool", other.type_name())),

        (CoreOp::Length, Value::List(c) | Value::Set(c)) => len_value(c.len()),
        (CoreOp::Length, Value::Str(s)) => len_value(s.chars().count()),
        (CoreOp::Length, other) => Err(type_mismatch("list", other.type_name())),

        _ => Err(arity_mismatch(op.as_str(), op.arity(), 1)),
    }
}

fn evaluate_binary(op: CoreOp, left: &Value, right: &Value) -> EvalResult {
    match op {
        CoreOp::Add | CoreOp::Sub | CoreOp::Mul | CoreOp::Div | CoreOp::Mod => {
            evaluate_arith(op, left, right)
        }
        CoreOp::Eq | CoreOp::Neq => {
            let equal = evaluate_eq(left, right)?;
            Ok(Value::Bool(if op == CoreOp::Eq { equal } else { !equal }))
        }
        CoreOp::Lt | CoreOp::Gt | CoreOp::Le | CoreOp::Ge => {
            let ordering = evaluate_cmp(left, right)?;
            Ok(Value::Bool(matches!(
                (op, ordering),
                (CoreOp::Lt, Some(Ordering::Less))
                    | (CoreOp::Gt, Some(Ordering::Greater))
                    | (CoreOp::Le, Some(Ordering::Less | Ordering::Equal))
                    | (CoreOp::Ge, Some(Ordering::Greater | Ordering::Equal))
            )))
        }
        CoreOp::And | CoreOp::Or => match (left, right) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(if op == CoreOp::And {
                *a && *b
            } else {
                *a || *b
            })),
            (Value::Bool(_), other) | (other, _) => {
                Err(type_mismatch("bool", other.type_name()))
            }
        },
        CoreOp::Nth => evaluate_nth(left, right),
        CoreOp::Concat => evaluate_concat(left, right),
        CoreOp::Neg | CoreOp::Not | CoreOp::Length => {
            Err(arity_mismatch(op.as_str(), op.arity(), 2))
        }
    }
}

fn evaluate_arith(op: CoreOp, left: &Value, right: &Value) -> EvalResult {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => eval_int_arith(op, *a, *b),
        (Value::Float(a), Value::Float(b)) => eval_float_arith(op, *a, *b),
        (Value::Int(_) | Value::Float(_), _) => {
            Err(type_mismatch(left.type_name(), right.type_name()))
        }
        _ => Err(type_mismatch("int or float", left.type_name())),
    }
}

/// Integer arithmetic. Every operation is checked; `ScalarInt` has no
/// unchecked operator impls.
fn eval_int_arith(op: CoreOp, a: ScalarInt, b: ScalarInt) -> EvalResult {
    match op {
        CoreOp::Add => checked_arith(a.checked_add(b), "addition"),
        CoreOp::Sub => checked_arith(a.checked_sub(b), "subtraction"),
        CoreOp::Mul => checked_arith(a.checked_mul(b), "multiplication"),
        CoreOp::Div => checked_div(b.is_zero(), || a.checked_div(b), "division"),
        CoreOp::Mod => checked_div(b.is_zero(), || a.checked_rem(b), "remainder"),
        _ => Err(type_mismatch("arithmetic operator", op.as_str())),
    }
}

/// Float arithmetic. A zero divisor fails the same way it does for ints.
fn eval_float_arith(op: CoreOp, a: f64, b: f64) -> EvalResult {
    match op {
        CoreOp::Add => Ok(Value::Float(a + b)),
        CoreOp::Sub => Ok(Value::Float(a - b)),
        CoreOp::Mul => Ok(Value::Float(a * b)),
        CoreOp::Div | CoreOp::Mod if b == 0.0 => Err(division_by_zero()),
        CoreOp::Div => Ok(Value::Float(a / b)),
        CoreOp::Mod => Ok(Value::Float(a % b)),
        _ => Err(type_mismatch("arithmetic operator", op.as_str())),
    }
}

/// `eq`/`neq`: both operands must have the same kind, and closures and
/// futures have no structural equality.
fn evaluate_eq(left: &Value, right: &Value) -> Result<bool, EvalError> {
    if left.type_name() != right.type_name() {
        return Err(type_mismatch(left.type_name(), right.type_name()));
    }
    if let Value::Closure(_) | Value::Future(_) = left {
        return Err(type_mismatch("comparable value", left.type_name()));
    }
    Ok(left.equals(right))
}

/// Ordering on ints, floats and strings. `None` when a float operand is NaN.
fn evaluate_cmp(left: &Value, right: &Value) -> Result<Option<Ordering>, EvalError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(Some(a.cmp(b))),
        (Value::Float(a), Value::Float(b)) => Ok(a.partial_cmp(b)),
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.as_str().cmp(b.as_str()))),
        _ if left.type_name() != right.type_name() => {
            Err(type_mismatch(left.type_name(), right.type_name()))
        }
        _ => Err(type_mismatch("int, float or string", left.type_name())),
    }
}

fn evaluate_nth(list: &Value, index: &Value) -> EvalResult {
    let Value::List(c) = list else {
        return Err(type_mismatch("list", list.type_name()));
    };
    let Value::Int(i) = index else {
        return Err(type_mismatch("int", index.type_name()));
    };
    i.to_index()
        .and_then(|idx| c.items.get(idx))
        .cloned()
        .ok_or_else(|| index_out_of_bounds(i.raw(), c.len()))
}

fn list_type(c: &CollectionValue) -> String {
    Type::list((*c.of).clone()).to_string()
}

fn evaluate_concat(left: &Value, right: &Value) -> EvalResult {
    match (left, right) {
        (Value::List(a), Value::List(b)) => {
            if a.of != b.of {
                return Err(type_mismatch(&list_type(a), &list_type(b)));
            }
            let mut items = Vec::with_capacity(a.len().saturating_add(b.len()));
            items.extend(a.iter().cloned());
            items.extend(b.iter().cloned());
            Ok(Value::list((*a.of).clone(), items))
        }
        (Value::Str(a), Value::Str(b)) => Ok(Value::string(format!("{}{}", a.as_str(), b.as_str()))),
        (Value::List(_) | Value::Str(_), _) => {
            Err(type_mismatch(left.type_name(), right.type_name()))
        }
        _ => Err(type_mismatch("list", left.type_name())),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
