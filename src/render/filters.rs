//! Custom Tera filters used by theme blocks.
//!
//! - `trans(params=, domain=)`: translate a message
//! - `attributes(params=, domain=)`: render an attribute map as ` key="value"` pairs
//! - `add_class(class=)`: append a CSS class to an attribute map
//! - `with_attr(name=, value=)`: set one entry of an attribute map
//! - `humanize`: `firstName` / `first_name` to `First name`

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use heck::ToSnakeCase;
use tera::{Result, Tera, Value};

use super::escape::escape_html;
use crate::translation::{translate_or_fallback, Parameters, Translator, DEFAULT_DOMAIN};

/// Attributes whose values are user-facing text.
const TRANSLATED_ATTRIBUTES: [&str; 2] = ["placeholder", "title"];

pub(crate) fn register(tera: &mut Tera, translator: Arc<dyn Translator>) {
    tera.register_filter(
        "trans",
        TransFilter {
            translator: Arc::clone(&translator),
        },
    );
    tera.register_filter("attributes", AttributesFilter { translator });
    tera.register_filter("add_class", add_class);
    tera.register_filter("with_attr", with_attr);
    tera.register_filter("humanize", humanize);
}

/// Translation domain requested by a filter call.
#[derive(Debug, Clone, PartialEq)]
enum Domain<'a> {
    /// `false`: emit the message untouched.
    Disabled,
    Named(&'a str),
}

fn domain_arg(args: &HashMap<String, Value>) -> Domain<'_> {
    match args.get("domain") {
        Some(Value::Bool(false)) => Domain::Disabled,
        Some(Value::String(domain)) if !domain.is_empty() => Domain::Named(domain),
        _ => Domain::Named(DEFAULT_DOMAIN),
    }
}

fn params_arg(args: &HashMap<String, Value>) -> Parameters {
    match args.get("params") {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(key, value)| text(value).map(|v| (key.clone(), v)))
            .collect(),
        _ => Parameters::new(),
    }
}

/// String form of a scalar; `None` for null, arrays and objects.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn translate(
    translator: &dyn Translator,
    message: &str,
    args: &HashMap<String, Value>,
) -> String {
    match domain_arg(args) {
        Domain::Disabled => message.to_string(),
        Domain::Named(domain) => {
            translate_or_fallback(translator, message, &params_arg(args), Some(domain))
        }
    }
}

#[derive(Debug)]
struct TransFilter {
    translator: Arc<dyn Translator>,
}

impl tera::Filter for TransFilter {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
        let Some(message) = text(value) else {
            return Ok(Value::String(String::new()));
        };
        if message.is_empty() {
            return Ok(Value::String(message));
        }
        Ok(Value::String(translate(
            self.translator.as_ref(),
            &message,
            args,
        )))
    }
}

#[derive(Debug)]
struct AttributesFilter {
    translator: Arc<dyn Translator>,
}

impl tera::Filter for AttributesFilter {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
        let attrs = match value {
            Value::Object(attrs) => attrs,
            Value::Null => return Ok(Value::String(String::new())),
            _ => return Err(tera::Error::msg("attributes filter expects a map")),
        };

        let mut out = String::new();
        for (name, value) in attrs {
            let rendered = match value {
                Value::Null | Value::Bool(false) => continue,
                Value::Bool(true) => name.clone(),
                Value::String(s) if TRANSLATED_ATTRIBUTES.contains(&name.as_str()) => {
                    translate(self.translator.as_ref(), s, args)
                }
                other => text(other).unwrap_or_else(|| other.to_string()),
            };
            let _ = write!(out, " {}=\"{}\"", escape_html(name), escape_html(&rendered));
        }
        Ok(Value::String(out))
    }
}

fn attr_map(value: &Value, filter: &str) -> Result<serde_json::Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map.clone()),
        Value::Null => Ok(serde_json::Map::new()),
        _ => Err(tera::Error::msg(format!("{filter} filter expects a map"))),
    }
}

pub(crate) fn add_class(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let mut attrs = attr_map(value, "add_class")?;
    let class = args
        .get("class")
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg("add_class filter expects a `class` argument"))?;
    let existing = attrs.get("class").and_then(text).unwrap_or_default();
    let merged = format!("{existing} {class}").trim().to_string();
    attrs.insert("class".to_string(), Value::String(merged));
    Ok(Value::Object(attrs))
}

pub(crate) fn with_attr(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let mut attrs = attr_map(value, "with_attr")?;
    let name = args
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg("with_attr filter expects a `name` argument"))?;
    let value = args.get("value").cloned().unwrap_or(Value::Null);
    attrs.insert(name.to_string(), value);
    Ok(Value::Object(attrs))
}

pub(crate) fn humanize(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("humanize filter expects a string"))?;
    let words = s.to_snake_case().replace('_', " ");
    let mut chars = words.chars();
    let humanized = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    Ok(Value::String(humanized))
}
