//! Format conversion and delegated JSON/YAML/TOML codecs
//!
//! Everything here is glue: parsing and serialization of JSON, YAML and TOML
//! are delegated to `serde_json`, `serde_yaml` and `toml`, bridged through the
//! canonical [`Value`]. Only XML goes through the in-crate core.

use std::fmt;

use crate::error::{Error, ErrorKind, Result};
use crate::value::{Array, Object, Value};
use crate::xml;

/// A supported text format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
    Yaml,
    Xml,
}

impl Format {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
            Self::Yaml => "yaml",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Guess a format from a file path's extension
pub fn detect_format_from_path(path: &str) -> Option<Format> {
    let ext = std::path::Path::new(path)
        .extension()
        .and_then(|s| s.to_str())?
        .to_ascii_lowercase();
    match ext.as_str() {
        "json" => Some(Format::Json),
        "toml" => Some(Format::Toml),
        "yaml" | "yml" => Some(Format::Yaml),
        "xml" => Some(Format::Xml),
        _ => None,
    }
}

/// Convert text between two supported formats
pub fn convert(input: &str, from: Format, to: Format) -> Result<String> {
    if from == to {
        return Ok(input.to_string());
    }
    let value = parse(input, from)?;
    serialize(&value, to)
}

/// Parse text in the given format into a canonical value
pub fn parse(input: &str, format: Format) -> Result<Value> {
    match format {
        Format::Json => {
            let parsed: serde_json::Value = serde_json::from_str(input)
                .map_err(|e| Error::spanless(ErrorKind::Syntax, format!("json: {e}")))?;
            Ok(json_to_value(&parsed))
        }
        Format::Yaml => {
            let parsed: serde_yaml::Value = serde_yaml::from_str(input)
                .map_err(|e| Error::spanless(ErrorKind::Syntax, format!("yaml: {e}")))?;
            yaml_to_value(&parsed)
        }
        Format::Toml => {
            let parsed: toml::Value = toml::from_str(input)
                .map_err(|e| Error::spanless(ErrorKind::Syntax, format!("toml: {e}")))?;
            Ok(toml_to_value(&parsed))
        }
        Format::Xml => xml::xml_to_value(input),
    }
}

/// Serialize a canonical value into the given format
pub fn serialize(value: &Value, format: Format) -> Result<String> {
    match format {
        Format::Json => Ok(to_json_string(value)),
        Format::Yaml => serde_yaml::to_string(&value_to_yaml(value))
            .map_err(|e| Error::spanless(ErrorKind::Syntax, format!("yaml: {e}"))),
        Format::Toml => {
            if !value.is_object() {
                return Err(Error::spanless(
                    ErrorKind::Unsupported,
                    "toml document root must be a table",
                ));
            }
            toml::to_string_pretty(&value_to_toml(value)?)
                .map_err(|e| Error::spanless(ErrorKind::Syntax, format!("toml: {e}")))
        }
        Format::Xml => Ok(xml::value_to_xml(value, xml::DEFAULT_ROOT)),
    }
}

/// True when the input parses in the given format. Never fails.
pub fn validate(input: &str, format: Format) -> bool {
    match format {
        Format::Xml => xml::is_valid_xml(input),
        _ => parse(input, format).is_ok(),
    }
}

/// Pretty-print text in its own format
pub fn format_text(input: &str, format: Format) -> Result<String> {
    match format {
        Format::Json => {
            let parsed: serde_json::Value = serde_json::from_str(input)
                .map_err(|e| Error::spanless(ErrorKind::Syntax, format!("json: {e}")))?;
            serde_json::to_string_pretty(&parsed)
                .map_err(|e| Error::spanless(ErrorKind::Syntax, format!("json: {e}")))
        }
        Format::Yaml => {
            let value = parse(input, Format::Yaml)?;
            serialize(&value, Format::Yaml)
        }
        Format::Toml => {
            let value = parse(input, Format::Toml)?;
            serialize(&value, Format::Toml)
        }
        Format::Xml => xml::format_xml(input),
    }
}

/// Minify text in its own format. Only JSON and XML have a compact form.
pub fn minify(input: &str, format: Format) -> Result<String> {
    match format {
        Format::Json => {
            let parsed: serde_json::Value = serde_json::from_str(input)
                .map_err(|e| Error::spanless(ErrorKind::Syntax, format!("json: {e}")))?;
            serde_json::to_string(&parsed)
                .map_err(|e| Error::spanless(ErrorKind::Syntax, format!("json: {e}")))
        }
        Format::Xml => Ok(xml::minify_xml(input)),
        other => Err(Error::spanless(
            ErrorKind::Unsupported,
            format!("{other} has no minified form"),
        )),
    }
}

/// Compact JSON rendering of a canonical value
pub(crate) fn to_json_string(value: &Value) -> String {
    serde_json::to_string(&value_to_json(value)).unwrap_or_default()
}

fn json_to_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => {
            Value::Array(items.iter().map(json_to_value).collect::<Array>())
        }
        serde_json::Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_value(v)))
                .collect::<Object>(),
        ),
    }
}

/// Whole numbers that fit i64 serialize without a fractional part
#[allow(clippy::as_conversions)]
fn integral(n: f64) -> Option<i64> {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => match integral(*n) {
            Some(i) => serde_json::Value::Number(serde_json::Number::from(i)),
            None => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
        },
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(value_to_json).collect())
        }
        Value::Object(obj) => serde_json::Value::Object(
            obj.iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect(),
        ),
    }
}

fn yaml_to_value(value: &serde_yaml::Value) -> Result<Value> {
    match value {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => Ok(Value::Number(n.as_f64().unwrap_or(f64::NAN))),
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(items) => Ok(Value::Array(
            items
                .iter()
                .map(yaml_to_value)
                .collect::<Result<Array>>()?,
        )),
        serde_yaml::Value::Mapping(map) => {
            let mut obj = Object::with_capacity(map.len());
            for (key, val) in map {
                obj.insert(yaml_key_to_string(key)?, yaml_to_value(val)?);
            }
            Ok(Value::Object(obj))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_value(&tagged.value),
    }
}

fn yaml_key_to_string(key: &serde_yaml::Value) -> Result<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        _ => Err(Error::spanless(
            ErrorKind::Unsupported,
            "yaml mapping key must be a scalar",
        )),
    }
}

fn value_to_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Number(n) => match integral(*n) {
            Some(i) => serde_yaml::Value::Number(serde_yaml::Number::from(i)),
            None => serde_yaml::Value::Number(serde_yaml::Number::from(*n)),
        },
        Value::String(s) => serde_yaml::Value::String(s.clone()),
        Value::Array(items) => {
            serde_yaml::Value::Sequence(items.iter().map(value_to_yaml).collect())
        }
        Value::Object(obj) => serde_yaml::Value::Mapping(
            obj.iter()
                .map(|(k, v)| (serde_yaml::Value::String(k.clone()), value_to_yaml(v)))
                .collect(),
        ),
    }
}

#[allow(clippy::as_conversions)]
fn toml_to_value(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::Number(*i as f64),
        toml::Value::Float(f) => Value::Number(*f),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => {
            Value::Array(items.iter().map(toml_to_value).collect::<Array>())
        }
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), toml_to_value(v)))
                .collect::<Object>(),
        ),
    }
}

fn value_to_toml(value: &Value) -> Result<toml::Value> {
    match value {
        Value::Null => Err(Error::spanless(
            ErrorKind::Unsupported,
            "toml cannot represent null",
        )),
        Value::Bool(b) => Ok(toml::Value::Boolean(*b)),
        Value::Number(n) => Ok(match integral(*n) {
            Some(i) => toml::Value::Integer(i),
            None => toml::Value::Float(*n),
        }),
        Value::String(s) => Ok(toml::Value::String(s.clone())),
        Value::Array(items) => Ok(toml::Value::Array(
            items
                .iter()
                .map(value_to_toml)
                .collect::<Result<Vec<_>>>()?,
        )),
        Value::Object(obj) => {
            let mut table = toml::map::Map::new();
            for (key, val) in obj {
                table.insert(key.clone(), value_to_toml(val)?);
            }
            Ok(toml::Value::Table(table))
        }
    }
}
