//! Response shape normalization.
//!
//! Servers in the fleet disagree on envelopes. Lists arrive as a bare array,
//! `{ "data": [...] }`, `{ "items": [...] }` or `{ "<collection>": [...] }`;
//! single rows arrive bare or as `{ "data": row }`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;

/// A decoded list plus the server's total when it sent one.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: u64,
}

pub fn normalize_list<T: DeserializeOwned>(body: Value, collection: &str) -> Result<Listing<T>, ClientError> {
    let (rows, total) = match body {
        Value::Array(rows) => (rows, None),
        Value::Object(mut object) => {
            let total = object.get("total").and_then(Value::as_u64);
            let rows = ["data", "items", collection]
                .iter()
                .find_map(|key| match object.remove(*key) {
                    Some(Value::Array(rows)) => Some(rows),
                    _ => None,
                })
                .ok_or_else(|| {
                    ClientError::Decode(format!("no list found in {} response", collection))
                })?;
            (rows, total)
        }
        other => {
            return Err(ClientError::Decode(format!(
                "expected a list of {}, got {}",
                collection,
                kind(&other)
            )))
        }
    };

    let total = total.unwrap_or(rows.len() as u64);
    let items = rows
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| ClientError::Decode(e.to_string()))?;
    Ok(Listing { items, total })
}

pub fn normalize_one<T: DeserializeOwned>(body: Value) -> Result<T, ClientError> {
    let row = match body {
        Value::Object(mut object) if object.get("data").is_some_and(Value::is_object) => {
            object.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(row).map_err(|e| ClientError::Decode(e.to_string()))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
