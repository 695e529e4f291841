// src/codec/record.rs
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AgendaError, Result};

/// A small value with a fixed, ordered set of named fields.
pub trait Record: Serialize + DeserializeOwned {
    /// Record type name used in error messages.
    const KIND: &'static str;
    /// Every field that must be present when decoding.
    const FIELDS: &'static [&'static str];

    fn from_value(value: &Value) -> Result<Self> {
        decode_value(value)
    }

    fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Check the field list, then decode only the declared fields.
///
/// Unknown keys are ignored; a missing key or a value of the wrong type is
/// a schema mismatch for the record.
fn decode_value<R: Record>(value: &Value) -> Result<R> {
    let object = value.as_object().ok_or_else(|| {
        AgendaError::schema(R::KIND, format!("expected an object, got {}", value))
    })?;

    let mut fields = Map::new();
    for field in R::FIELDS {
        let field_value = object.get(*field).ok_or_else(|| {
            AgendaError::schema(R::KIND, format!("missing required field '{}'", field))
        })?;
        fields.insert((*field).to_string(), field_value.clone());
    }

    serde_json::from_value(Value::Object(fields))
        .map_err(|e| AgendaError::schema(R::KIND, e.to_string()))
}
