use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// Uniform accessor for the absent-or-singular-or-plural XML child pattern:
/// absent input yields an empty sequence, an array yields its items, and
/// any other value yields a singleton.
pub fn as_sequence(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single) => vec![single],
    }
}

/// Strips tab, carriage-return, and newline characters left behind by CDATA
/// sections. Other whitespace is untouched.
pub fn sanitize(value: &str) -> String {
    control_char_regex().replace_all(value, "").into_owned()
}

fn control_char_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"[\t\r\n]").expect("control char regex"))
}

/// Text content of a loosely typed node: a plain string, a stringified
/// scalar, or the `"_"` member of an element that also carries attributes.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Object(map) => map
            .get("_")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

pub fn member_text(owner: &Value, key: &str) -> Option<String> {
    owner.get(key).and_then(|value| scalar_text(value))
}

/// Sanitized `name` member, falling back to `description` when the name is
/// absent or sanitizes to nothing.
pub fn described_name(owner: &Value) -> String {
    let name = member_text(owner, "name").map(|text| sanitize(&text));
    match name {
        Some(name) if !name.is_empty() => name,
        _ => member_text(owner, "description")
            .map(|text| sanitize(&text))
            .unwrap_or_default(),
    }
}

/// Raw value of the parameter named `name` inside the owner's `parameter`
/// children. When several parameters share the name, the last one wins. A
/// matching parameter without a readable variable yields an empty string.
pub fn param_value(owner: &Value, name: &str) -> Option<String> {
    let mut found = None;
    for param in as_sequence(owner.get("parameter")) {
        if member_text(param, "name").as_deref() != Some(name) {
            continue;
        }
        let value = param
            .get("variable")
            .and_then(|variable| scalar_text(variable))
            .unwrap_or_default();
        found = Some(value);
    }
    found
}

pub fn sanitized_param(owner: &Value, name: &str) -> String {
    param_value(owner, name)
        .map(|value| sanitize(&value))
        .unwrap_or_default()
}
