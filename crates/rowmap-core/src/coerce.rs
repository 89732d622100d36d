//! Strict scalar coercion of raw column values.

use rowmap_types::Value;

use crate::error::MapError;
use crate::metadata::ScalarType;

/// Cast a raw column value to its declared scalar type.
///
/// Null passes through unchanged, and temporal targets are taken as the
/// row source supplied them. Everything else is a strict cast: a value
/// that is not representable in the target type is an error, never a
/// silent truncation.
pub fn coerce(value: Value, target: ScalarType, column: &str) -> Result<Value, MapError> {
    if value.is_null() {
        return Ok(value);
    }

    match target {
        ScalarType::Temporal => Ok(value),
        ScalarType::Bool => coerce_bool(value, column),
        ScalarType::Int => coerce_int(value, column),
        ScalarType::Float => coerce_float(value, column),
        ScalarType::Text => Ok(Value::Text(value.to_text())),
    }
}

fn coerce_bool(value: Value, column: &str) -> Result<Value, MapError> {
    match &value {
        Value::Bool(_) => Ok(value),
        Value::Int(i) => Ok(Value::Bool(*i != 0)),
        Value::Float(f) => Ok(Value::Bool(*f != 0.0)),
        Value::Text(s) => match s.to_ascii_lowercase().as_str() {
            "" | "0" | "false" => Ok(Value::Bool(false)),
            "1" | "true" => Ok(Value::Bool(true)),
            _ => Err(coercion_error(column, ScalarType::Bool, &value)),
        },
        _ => Err(coercion_error(column, ScalarType::Bool, &value)),
    }
}

fn coerce_int(value: Value, column: &str) -> Result<Value, MapError> {
    match &value {
        Value::Int(_) => Ok(value),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Float(f) => {
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                Ok(Value::Int(*f as i64))
            } else {
                Err(coercion_error(column, ScalarType::Int, &value))
            }
        }
        Value::Text(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| coercion_error(column, ScalarType::Int, &value)),
        _ => Err(coercion_error(column, ScalarType::Int, &value)),
    }
}

fn coerce_float(value: Value, column: &str) -> Result<Value, MapError> {
    match &value {
        Value::Float(_) => Ok(value),
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| coercion_error(column, ScalarType::Float, &value)),
        _ => Err(coercion_error(column, ScalarType::Float, &value)),
    }
}

fn coercion_error(column: &str, target: ScalarType, value: &Value) -> MapError {
    MapError::Coercion {
        column: column.to_string(),
        target: target.name(),
        value: value.describe(),
    }
}
