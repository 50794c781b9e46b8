//! Tolerant decoding of job payloads.
//!
//! Core serialises scalar fields inconsistently: ids arrive as numbers or
//! strings, ports and timeouts as numbers or numeric strings, flags as
//! booleans or `"true"`/`"1"`. Every field is read as a raw JSON value here and
//! normalised before the strongly typed [`Monitoring`] is built.

use serde::Deserialize;
use serde_json::Value;

use super::types::{HttpMethod, MonitorType, Monitoring};
use crate::error::DecodeError;

/// Job payload exactly as it appears on the wire
#[derive(Debug, Default, Deserialize)]
pub struct RawMonitoring {
    #[serde(default)]
    id: Value,
    #[serde(default, rename = "type")]
    monitor_type: Value,
    #[serde(default)]
    target: Value,
    #[serde(default)]
    timeout: Value,
    #[serde(default)]
    http_method: Value,
    #[serde(default)]
    http_headers: Value,
    #[serde(default)]
    http_body: Value,
    #[serde(default)]
    auth_username: Value,
    #[serde(default)]
    auth_password: Value,
    #[serde(default)]
    keyword: Value,
    #[serde(default)]
    port: Value,
    #[serde(default)]
    maintenance_active: Value,
}

impl TryFrom<RawMonitoring> for Monitoring {
    type Error = DecodeError;

    fn try_from(raw: RawMonitoring) -> Result<Self, Self::Error> {
        Ok(Monitoring {
            id: coerce_id(&raw.id)?,
            monitor_type: MonitorType::from(coerce_string("type", &raw.monitor_type)?.as_str()),
            target: coerce_string("target", &raw.target)?,
            timeout: coerce_int("timeout", &raw.timeout)?,
            http_method: HttpMethod::parse_or_default(&coerce_string(
                "http_method",
                &raw.http_method,
            )?),
            http_headers: non_null(raw.http_headers),
            http_body: non_null(raw.http_body),
            auth_username: coerce_string("auth_username", &raw.auth_username)?,
            auth_password: coerce_string("auth_password", &raw.auth_password)?,
            keyword: coerce_string("keyword", &raw.keyword)?,
            port: coerce_int("port", &raw.port)?,
            maintenance_active: coerce_bool("maintenance_active", &raw.maintenance_active)?,
        })
    }
}

fn non_null(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        other => Some(other),
    }
}

/// Ids may be numbers or strings. String ids are kept exactly as sent.
pub(crate) fn coerce_id(value: &Value) -> Result<String, DecodeError> {
    match value {
        Value::String(s) if s.trim().is_empty() => Err(DecodeError::new("id", "blank")),
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Err(DecodeError::new("id", "missing")),
        other => Err(DecodeError::new("id", format!("expected number or string, got {other}"))),
    }
}

pub(crate) fn coerce_string(field: &'static str, value: &Value) -> Result<String, DecodeError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Array(_) | Value::Object(_) => {
            Err(DecodeError::new(field, "expected a scalar value"))
        }
    }
}

pub(crate) fn coerce_int(field: &'static str, value: &Value) -> Result<i64, DecodeError> {
    match value {
        Value::Null => Ok(0),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                _ => Err(DecodeError::new(field, format!("{n} is not an integer"))),
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(0);
            }
            trimmed
                .parse::<i64>()
                .map_err(|e| DecodeError::new(field, format!("{trimmed:?}: {e}")))
        }
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            Err(DecodeError::new(field, "expected an integer"))
        }
    }
}

pub(crate) fn coerce_bool(field: &'static str, value: &Value) -> Result<bool, DecodeError> {
    match value {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => match s.trim() {
            "" => Ok(false),
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            other => Err(DecodeError::new(field, format!("{other:?} is not a boolean"))),
        },
        Value::Array(_) | Value::Object(_) => Err(DecodeError::new(field, "expected a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> Result<Monitoring, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_numeric_and_string_ids_decode_identically() {
        let numeric = decode(json!({"id": 42, "type": "http", "target": "https://example.com"}))
            .unwrap();
        let string = decode(json!({"id": "42", "type": "http", "target": "https://example.com"}))
            .unwrap();

        assert_eq!(numeric.id, "42");
        assert_eq!(numeric, string);
    }

    #[test]
    fn test_string_id_is_kept_verbatim() {
        let job = decode(json!({"id": " 42", "type": "http", "target": "https://example.com"}))
            .unwrap();
        assert_eq!(job.id, " 42");

        assert!(decode(json!({"id": "  ", "type": "http", "target": "x"})).is_err());
    }

    #[test]
    fn test_string_scalars_are_coerced() {
        let job = decode(json!({
            "id": "7",
            "type": "port",
            "target": "example.com",
            "timeout": "10",
            "port": "443",
            "maintenance_active": "true"
        }))
        .unwrap();

        assert_eq!(job.timeout, 10);
        assert_eq!(job.port, 443);
        assert!(job.maintenance_active);
        assert_eq!(job.monitor_type, MonitorType::Port);
    }

    #[test]
    fn test_empty_strings_become_zero_values() {
        let job = decode(json!({
            "id": 1,
            "type": "ping",
            "target": "example.com",
            "timeout": "",
            "port": "",
            "maintenance_active": ""
        }))
        .unwrap();

        assert_eq!(job.timeout, 0);
        assert_eq!(job.port, 0);
        assert!(!job.maintenance_active);
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let job = decode(json!({"id": 3, "type": "http", "target": "https://example.com"})).unwrap();

        assert_eq!(job.http_method, HttpMethod::Get);
        assert_eq!(job.http_headers, None);
        assert_eq!(job.http_body, None);
        assert!(job.keyword.is_empty());
        assert_eq!(job.basic_auth(), None);
    }

    #[test]
    fn test_structurally_invalid_values_are_rejected() {
        assert!(decode(json!({"id": {"nested": true}, "type": "http", "target": "x"})).is_err());
        assert!(decode(json!({"id": 1, "type": "http", "target": "x", "port": [80]})).is_err());
        assert!(decode(json!({"id": 1, "type": "http", "target": "x", "timeout": "ten"})).is_err());
        assert!(
            decode(json!({"id": 1, "type": "http", "target": "x", "maintenance_active": "maybe"}))
                .is_err()
        );
    }

    #[test]
    fn test_free_form_fields_are_kept_raw() {
        let job = decode(json!({
            "id": 9,
            "type": "http",
            "target": "https://example.com",
            "http_method": "POST",
            "http_headers": "{\"X-Test\":\"value\"}",
            "http_body": {"key": "value"}
        }))
        .unwrap();

        assert_eq!(job.http_method, HttpMethod::Post);
        assert_eq!(job.http_headers, Some(json!("{\"X-Test\":\"value\"}")));
        assert_eq!(job.http_body, Some(json!({"key": "value"})));
    }

    #[test]
    fn test_coerce_int_accepts_integral_floats() {
        assert_eq!(coerce_int("port", &json!(8080.0)), Ok(8080));
        assert!(coerce_int("port", &json!(1.5)).is_err());
    }
}
