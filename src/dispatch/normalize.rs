//! Backend payload → [`FunctionCallResult`] according to a route's [`ResponseShape`].

use serde_json::{Map, Value};

use super::routes::{FieldMap, ResponseShape};
use crate::failure::FailureKind;
use crate::types::FunctionCallResult;

/// Normalize a 2xx payload. `Err` describes a payload the shape cannot accept.
pub(crate) fn apply(shape: &ResponseShape, payload: Value) -> Result<FunctionCallResult, String> {
    match shape {
        // Objects pass through untouched; anything else gets a discriminator.
        ResponseShape::Verbatim => Ok(match payload {
            obj @ Value::Object(_) => FunctionCallResult::Passthrough(obj),
            Value::Null => FunctionCallResult::Success { data: Map::new() },
            other => FunctionCallResult::success_with("data", other),
        }),

        ResponseShape::Record {
            key,
            fields,
            not_found,
        } => {
            let row = match payload {
                Value::Null => None,
                Value::Array(rows) => rows.into_iter().next(),
                obj @ Value::Object(_) => Some(obj),
                other => return Err(format!("expected rows, got {}", type_name(&other))),
            };
            Ok(match row {
                Some(row) => FunctionCallResult::success_with(key.as_str(), project(&row, fields)),
                None => FunctionCallResult::failure(FailureKind::NotFound, not_found.as_str()),
            })
        }

        ResponseShape::Rows { key, fields } => {
            let rows = match payload {
                Value::Null => Vec::new(),
                Value::Array(rows) => rows,
                other => return Err(format!("expected a row list, got {}", type_name(&other))),
            };
            let projected = rows.iter().map(|row| project(row, fields)).collect();
            Ok(FunctionCallResult::success_with(
                key.as_str(),
                Value::Array(projected),
            ))
        }
    }
}

fn project(row: &Value, fields: &[FieldMap]) -> Value {
    let mut out = Map::with_capacity(fields.len());
    for field in fields {
        match field {
            FieldMap::Column { name, column } => {
                out.insert(
                    name.clone(),
                    row.get(column.as_str()).cloned().unwrap_or(Value::Null),
                );
            }
            FieldMap::Constant { name, value } => {
                out.insert(name.clone(), value.clone());
            }
        }
    }
    Value::Object(out)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
