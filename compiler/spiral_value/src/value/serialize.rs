//! Tagged encoding of values.
//!
//! Output is already normalized for cross-implementation comparison:
//! closures never expose their environment and futures never expose their
//! task id.

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use spiral_ir::Literal;

use super::{CollectionValue, FutureStatus, Value};

struct Items<'a>(&'a CollectionValue);

impl Serialize for Items<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("kind", self.type_name())?;
        match self {
            Value::Int(n) => map.serialize_entry("value", &n.raw())?,
            Value::Float(f) => map.serialize_entry("value", f)?,
            Value::Bool(b) => map.serialize_entry("value", b)?,
            Value::Str(s) => map.serialize_entry("value", &**s)?,
            Value::Void => {}
            Value::List(c) | Value::Set(c) => {
                map.serialize_entry("of", &*c.of)?;
                map.serialize_entry("value", &Items(c))?;
            }
            Value::Closure(c) => {
                map.serialize_entry("params", &*c.params)?;
                if c.is_fix() {
                    map.serialize_entry("fix", &true)?;
                }
                map.serialize_entry("body", c.body.describe())?;
                map.serialize_entry("env", "<env>")?;
            }
            Value::Future(fut) => {
                let outcome = fut.cell.try_get();
                let status = match &outcome {
                    None => FutureStatus::Pending,
                    Some(Ok(_)) => FutureStatus::Resolved,
                    Some(Err(_)) => FutureStatus::Rejected,
                };
                map.serialize_entry("status", status.as_str())?;
                match outcome {
                    Some(Ok(v)) => {
                        if let Some(of) = v.type_of() {
                            map.serialize_entry("of", &of)?;
                        }
                        map.serialize_entry("value", &v)?;
                    }
                    Some(Err(e)) => {
                        map.serialize_entry("value", &Value::error(e))?;
                    }
                    None => {}
                }
            }
            Value::Error(e) => {
                map.serialize_entry("code", &e.code)?;
                if let Some(message) = &e.message {
                    map.serialize_entry("message", message)?;
                }
            }
        }
        map.end()
    }
}

/// Values decode through [`Literal`]: closures and futures have no
/// literal form.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Literal::deserialize(deserializer).map(|lit| Value::from(&lit))
    }
}
