//! Never-failing typed access to a parsed JSON mapping

use serde_json::{Map, Value};

use crate::domain::errors::ProbeError;
use crate::utils::time::format_duration_hms;
use crate::utils::{format_datasize, SizeBase};

/// A JSON object produced by the prober, owned by the record that wraps it
///
/// Every derived accessor swallows missing keys, wrong types and malformed
/// values and reports them as `None`; none of them can fail.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedJson {
    map: Map<String, Value>,
}

impl ParsedJson {
    /// Take ownership of a JSON value, which must be an object
    pub fn new(name: &'static str, value: Value) -> Result<Self, ProbeError> {
        match value {
            Value::Object(map) => Ok(Self { map }),
            other => Err(ProbeError::not_a_mapping(name, &other)),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// Raw string value of `key`, if it is a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.map.get(key).and_then(Value::as_str)
    }

    /// Convert the value under `key`, yielding `None` on any failure
    pub fn lookup<T, F>(&self, key: &str, convert: F) -> Option<T>
    where
        F: FnOnce(&Value) -> Option<T>,
    {
        self.map.get(key).and_then(convert)
    }

    /// Convert the value under `key`, yielding `default` on any failure
    pub fn lookup_or<T, F>(&self, key: &str, convert: F, default: T) -> T
    where
        F: FnOnce(&Value) -> Option<T>,
    {
        self.lookup(key, convert).unwrap_or(default)
    }

    pub fn get_as_float(&self, key: &str) -> Option<f64> {
        self.lookup(key, value_as_f64)
    }

    pub fn get_as_int(&self, key: &str) -> Option<i64> {
        self.lookup(key, value_as_i64)
    }

    /// Human-readable data size of the numeric value under `key`
    pub fn get_datasize_as_human(&self, key: &str, suffix: &str, base: SizeBase) -> Option<String> {
        self.get_as_float(key)
            .map(|bytes| format_datasize(bytes, suffix, base))
    }

    /// The `duration` field as `HH:MM:SS.ss`
    pub fn get_duration_as_human(&self) -> Option<String> {
        self.get_as_float("duration")
            .filter(|secs| secs.is_finite())
            .map(format_duration_hms)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.map.keys()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.map
    }
}

/// Lenient float conversion: numbers, numeric strings and booleans
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Lenient integer conversion; floats are truncated toward zero
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().and_then(|u| i64::try_from(u).ok()))
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
            }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// String conversion for text fields
pub fn value_as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}
