use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A primitive value attached to a tracked event.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Null,
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::Int(i64::from(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

pub type Properties = BTreeMap<String, PropertyValue>;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrackedEvent {
    pub name: String,
    #[serde(default)]
    pub properties: Properties,
}

impl TrackedEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Properties::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// One undelivered event as kept in local storage between page loads.
///
/// The field names are shared with pages that predate this crate, so a
/// missing `attempts` counts as a first attempt.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FallbackEntry {
    pub event: String,
    #[serde(default)]
    pub data: Properties,
    pub timestamp: String,
    #[serde(default)]
    pub attempts: u32,
}

impl FallbackEntry {
    pub fn from_event(event: &TrackedEvent, now_ms: f64) -> Self {
        Self {
            event: event.name.clone(),
            data: event.properties.clone(),
            timestamp: format_timestamp(now_ms),
            attempts: 0,
        }
    }

    /// Decode one stored entry. Arrays and objects inside `data`, which older
    /// pages stored as-is, are kept as their JSON text.
    pub fn from_json(mut value: Value) -> Result<Self, serde_json::Error> {
        if let Value::Object(entry) = &mut value {
            if entry.get("data").is_some_and(Value::is_null) {
                entry.remove("data");
            }
            if let Some(Value::Object(data)) = entry.get_mut("data") {
                for nested in data.values_mut() {
                    if nested.is_array() || nested.is_object() {
                        *nested = Value::String(nested.to_string());
                    }
                }
            }
        }
        serde_json::from_value(value)
    }

    pub fn to_event(&self) -> TrackedEvent {
        TrackedEvent {
            name: self.event.clone(),
            properties: self.data.clone(),
        }
    }
}

/// Milliseconds since the epoch to an RFC 3339 string, as `Date.toISOString` writes it.
pub fn format_timestamp(now_ms: f64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(now_ms as i64) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => String::from("1970-01-01T00:00:00.000Z"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_serialize_as_plain_values() {
        let event = TrackedEvent::new("clicou_comprar")
            .with("posicao", "principal")
            .with("step", 2u32)
            .with("mobile", true);
        let json = serde_json::to_value(&event.properties).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"mobile": true, "posicao": "principal", "step": 2})
        );
    }

    #[test]
    fn test_legacy_entry_without_attempts_loads() {
        let raw = r#"[{"event":"inicio_quiz","data":{"device_type":"mobile"},"timestamp":"2025-06-01T10:00:00.000Z"}]"#;
        let entries: Vec<FallbackEntry> = serde_json::from_str(raw).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].attempts, 0);
        assert_eq!(
            entries[0].to_event(),
            TrackedEvent::new("inicio_quiz").with("device_type", "mobile")
        );
    }

    #[test]
    fn test_null_and_nested_data_survive_decoding() {
        let raw = serde_json::json!({
            "event": "respondio_pregunta",
            "data": {"x": null, "tags": ["a", "b"], "meta": {"k": 1}},
            "timestamp": "2025-06-01T10:00:00.000Z"
        });
        let entry = FallbackEntry::from_json(raw).unwrap();
        assert_eq!(entry.data.get("x"), Some(&PropertyValue::Null));
        assert_eq!(entry.data.get("tags"), Some(&PropertyValue::from(r#"["a","b"]"#)));
        assert_eq!(entry.data.get("meta"), Some(&PropertyValue::from(r#"{"k":1}"#)));

        let json = serde_json::to_value(&entry.data).unwrap();
        assert_eq!(json["x"], serde_json::Value::Null);

        let bare = serde_json::json!({"event": "a", "data": null, "timestamp": "t"});
        assert!(FallbackEntry::from_json(bare).unwrap().data.is_empty());
    }

    #[test]
    fn test_timestamp_matches_iso_string_format() {
        assert_eq!(format_timestamp(0.0), "1970-01-01T00:00:00.000Z");
        assert_eq!(format_timestamp(1_500.0), "1970-01-01T00:00:01.500Z");
    }
}
