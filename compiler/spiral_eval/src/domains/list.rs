use spiral_ir::Type;
use spiral_value::{type_mismatch, EvalError, EvalResult, Value};

use super::{operands, Domain};

/// Ordered, duplicate-preserving sequences.
pub struct ListDomain;

impl ListDomain {
    fn append(args: &[Value]) -> EvalResult {
        let [list, item] = operands::<2>("list", "append", args)?;
        let Value::List(c) = list else {
            return Err(type_mismatch("list", list.type_name()));
        };
        if !item.conforms_to(&c.of) {
            return Err(type_mismatch(&c.of.to_string(), item.type_name()));
        }
        let mut items = c.items.to_vec();
        items.push(item.clone());
        Ok(Value::list((*c.of).clone(), items))
    }

    fn reverse(args: &[Value]) -> EvalResult {
        let [list] = operands::<1>("list", "reverse", args)?;
        let Value::List(c) = list else {
            return Err(type_mismatch("list", list.type_name()));
        };
        let items = c.iter().rev().cloned().collect();
        Ok(Value::list((*c.of).clone(), items))
    }
}

impl Domain for ListDomain {
    fn name(&self) -> &str {
        "list"
    }

    fn construct(&self, of: Type, items: Vec<Value>) -> Value {
        Value::list(of, items)
    }

    fn iterate<'v>(&self, value: &'v Value) -> Result<&'v [Value], EvalError> {
        match value {
            Value::List(c) => Ok(c.items.as_slice()),
            other => Err(type_mismatch("list", other.type_name())),
        }
    }

    fn call_extra(&self, op: &str, args: &[Value]) -> Option<EvalResult> {
        match op {
            "append" => Some(Self::append(args)),
            "reverse" => Some(Self::reverse(args)),
            _ => None,
        }
    }
}
