//! Helpers for walking a `serde_yaml::Value` tree with keyed errors.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::ConfigError;

pub(crate) fn parse(text: &str) -> Result<Value, ConfigError> {
    Ok(serde_yaml::from_str(text)?)
}

pub(crate) fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub(crate) fn as_map<'a>(v: &'a Value, context: &str) -> Result<&'a Mapping, ConfigError> {
    v.as_mapping()
        .ok_or_else(|| ConfigError::invalid(context, context, "expected a mapping"))
}

pub(crate) fn get<'a>(
    map: &'a Mapping,
    key: &'static str,
    context: &str,
) -> Result<&'a Value, ConfigError> {
    map.get(key).ok_or_else(|| ConfigError::MissingKey {
        key,
        context: context.to_string(),
    })
}

/// A scalar rendered as text; numbers and booleans are accepted.
pub(crate) fn scalar(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn get_str(map: &Mapping, key: &'static str, context: &str) -> Result<String, ConfigError> {
    let v = get(map, key, context)?;
    scalar(v).ok_or_else(|| ConfigError::invalid(key, context, "expected a scalar"))
}

pub(crate) fn opt_str(map: &Mapping, key: &'static str, context: &str) -> Result<Option<String>, ConfigError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => scalar(v)
            .map(Some)
            .ok_or_else(|| ConfigError::invalid(key, context, "expected a scalar")),
    }
}

pub(crate) fn get_seq<'a>(
    map: &'a Mapping,
    key: &'static str,
    context: &str,
) -> Result<&'a [Value], ConfigError> {
    get(map, key, context)?
        .as_sequence()
        .map(Vec::as_slice)
        .ok_or_else(|| ConfigError::invalid(key, context, "expected a list"))
}

/// Text form of a mapping key.
pub(crate) fn key_text(k: &Value, context: &str) -> Result<String, ConfigError> {
    scalar(k).ok_or_else(|| ConfigError::invalid("<key>", context, "keys must be scalars"))
}
