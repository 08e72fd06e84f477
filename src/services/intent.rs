//! Intent parameter normalization.
//!
//! Dialogflow hands over `queryResult.parameters` as loosely-typed JSON. The
//! city may sit under `city` or `geo-city`; the date may be a plain string, an
//! array, an object carrying one of several date fields, or any of those
//! encoded a second time as a JSON string.

use serde_json::{Map, Value};

/// Date fields looked up, in order, on an object-shaped date parameter.
const DATE_OBJECT_FIELDS: [&str; 3] = ["date_time", "startDateTime", "date"];

/// City and date as resolved from an intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentParameters {
    pub city: Option<String>,
    /// Normalized date string; `None` means "current weather".
    pub date: Option<String>,
}

impl IntentParameters {
    pub fn from_parameters(params: &Map<String, Value>) -> Self {
        let city =
            normalize_city(params.get("city")).or_else(|| normalize_city(params.get("geo-city")));
        let date = normalize_date(params.get("date-time"))
            .or_else(|| normalize_date(params.get("datetime")));
        Self { city, date }
    }
}

/// The shapes a raw date parameter can take.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDate {
    Text(String),
    List(Vec<Value>),
    Object(Map<String, Value>),
}

impl RawDate {
    /// Classify a JSON value. Null, numbers and booleans carry no date.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RawDate::Text(s.clone())),
            Value::Array(items) => Some(RawDate::List(items.clone())),
            Value::Object(map) => Some(RawDate::Object(map.clone())),
            _ => None,
        }
    }

    /// Resolve to a date string, or `None` if nothing usable is present.
    pub fn resolve(self) -> Option<String> {
        match self {
            RawDate::List(items) => {
                // Only the first element counts, and it is not unwrapped again
                // if it is itself an array.
                match items.into_iter().next()? {
                    Value::String(s) => resolve_text(s),
                    Value::Object(map) => date_from_object(&map),
                    _ => None,
                }
            }
            RawDate::Text(s) => resolve_text(s),
            RawDate::Object(map) => date_from_object(&map),
        }
    }
}

/// Normalize a raw date parameter. Never fails: malformed input degrades to
/// `None` or to the literal string.
pub fn normalize_date(raw: Option<&Value>) -> Option<String> {
    RawDate::from_value(raw?)?.resolve()
}

fn resolve_text(original: String) -> Option<String> {
    let trimmed = original.trim();
    if !looks_like_json(trimmed) {
        return non_empty(original);
    }

    // A quoted string decodes to a bare JSON string, which is not an object
    // and so yields nothing. Literal dates that happen to be wrapped in
    // quotes are therefore dropped.
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => date_from_object(&map),
        Ok(_) => None,
        Err(_) => non_empty(original),
    }
}

fn looks_like_json(s: &str) -> bool {
    let object = s.starts_with('{') && s.ends_with('}');
    let quoted = s.len() >= 2 && s.starts_with('"') && s.ends_with('"');
    object || quoted
}

fn date_from_object(map: &Map<String, Value>) -> Option<String> {
    DATE_OBJECT_FIELDS.iter().find_map(|field| {
        map.get(*field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Extract a city name from a `city`/`geo-city` value.
///
/// Accepts a string or an array whose first non-blank string is used.
pub fn normalize_city(raw: Option<&Value>) -> Option<String> {
    match raw? {
        Value::String(s) => {
            let city = s.trim();
            (!city.is_empty()).then(|| city.to_string())
        }
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    }
}
