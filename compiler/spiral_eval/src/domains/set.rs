use spiral_ir::Type;
use spiral_value::{type_mismatch, CollectionValue, EvalError, EvalResult, Value};

use super::{operands, Domain};

/// De-duplicated collections. Iteration follows first insertion.
pub struct SetDomain;

fn as_set(value: &Value) -> Result<&CollectionValue, EvalError> {
    match value {
        Value::Set(c) => Ok(c),
        other => Err(type_mismatch("set", other.type_name())),
    }
}

/// Two sets with the same element type.
fn set_pair<'a>(
    op: &str,
    args: &'a [Value],
) -> Result<(&'a CollectionValue, &'a CollectionValue), EvalError> {
    let [a, b] = operands::<2>("set", op, args)?;
    let (a, b) = (as_set(a)?, as_set(b)?);
    if a.of != b.of {
        return Err(type_mismatch(
            &Type::set((*a.of).clone()).to_string(),
            &Type::set((*b.of).clone()).to_string(),
        ));
    }
    Ok((a, b))
}

fn member(set: &CollectionValue, item: &Value) -> bool {
    set.iter().any(|v| v.same_element(item))
}

impl SetDomain {
    fn insert(args: &[Value]) -> EvalResult {
        let [set, item] = operands::<2>("set", "insert", args)?;
        let c = as_set(set)?;
        if !item.conforms_to(&c.of) {
            return Err(type_mismatch(&c.of.to_string(), item.type_name()));
        }
        let mut items = c.items.to_vec();
        items.push(item.clone());
        Ok(Value::set((*c.of).clone(), items))
    }

    fn union(args: &[Value]) -> EvalResult {
        let (a, b) = set_pair("union", args)?;
        let items = a.iter().chain(b.iter()).cloned().collect();
        Ok(Value::set((*a.of).clone(), items))
    }

    fn intersect(args: &[Value]) -> EvalResult {
        let (a, b) = set_pair("intersect", args)?;
        let items = a.iter().filter(|v| member(b, v)).cloned().collect();
        Ok(Value::set((*a.of).clone(), items))
    }

    fn difference(args: &[Value]) -> EvalResult {
        let (a, b) = set_pair("difference", args)?;
        let items = a.iter().filter(|v| !member(b, v)).cloned().collect();
        Ok(Value::set((*a.of).clone(), items))
    }
}

impl Domain for SetDomain {
    fn name(&self) -> &str {
        "set"
    }

    fn construct(&self, of: Type, items: Vec<Value>) -> Value {
        Value::set(of, items)
    }

    fn iterate<'v>(&self, value: &'v Value) -> Result<&'v [Value], EvalError> {
        Ok(as_set(value)?.items.as_slice())
    }

    fn contains(&self, value: &Value, item: &Value) -> Result<bool, EvalError> {
        Ok(member(as_set(value)?, item))
    }

    fn call_extra(&self, op: &str, args: &[Value]) -> Option<EvalResult> {
        match op {
            "insert" => Some(Self::insert(args)),
            "union" => Some(Self::union(args)),
            "intersect" => Some(Self::intersect(args)),
            "difference" => Some(Self::difference(args)),
            _ => None,
        }
    }
}
