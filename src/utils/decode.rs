use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Url;
use serde_json::{Map, Value};
use thiserror::Error;

pub type JsonObject = Map<String, Value>;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// `YYYY-MM-DDTHH:MM:SSZ`; chrono alone also accepts unpadded fields.
const TIMESTAMP_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl JsonType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Bool,
            Value::Number(n) if n.is_f64() => JsonType::Float,
            Value::Number(_) => JsonType::Integer,
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonType::Null => "null",
            JsonType::Bool => "bool",
            JsonType::Integer => "integer",
            JsonType::Float => "float",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("missing required key '{0}'")]
    MissingKey(String),
    #[error("unexpected type for '{key}': expected {expected}, found {actual}")]
    TypeMismatch {
        key: String,
        expected: JsonType,
        actual: JsonType,
    },
    #[error("cannot parse URL for '{key}': {value}")]
    InvalidUrl { key: String, value: String },
    #[error("cannot parse timestamp for '{key}': {value}")]
    InvalidTimestamp { key: String, value: String },
    #[error("expected a JSON object, found {actual}")]
    NotAnObject { actual: JsonType },
}

/// A value that can be borrowed or copied out of a JSON value without
/// any lossy conversion.
pub trait FromJson<'a>: Sized {
    const EXPECTED: JsonType;

    fn from_json(value: &'a Value) -> Option<Self>;
}

impl<'a> FromJson<'a> for &'a str {
    const EXPECTED: JsonType = JsonType::String;

    fn from_json(value: &'a Value) -> Option<Self> {
        value.as_str()
    }
}

impl FromJson<'_> for String {
    const EXPECTED: JsonType = JsonType::String;

    fn from_json(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromJson<'_> for bool {
    const EXPECTED: JsonType = JsonType::Bool;

    fn from_json(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromJson<'_> for i64 {
    const EXPECTED: JsonType = JsonType::Integer;

    fn from_json(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

// Integers widen into floats, never the other way round.
impl FromJson<'_> for f64 {
    const EXPECTED: JsonType = JsonType::Float;

    fn from_json(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl<'a> FromJson<'a> for &'a JsonObject {
    const EXPECTED: JsonType = JsonType::Object;

    fn from_json(value: &'a Value) -> Option<Self> {
        value.as_object()
    }
}

impl<'a> FromJson<'a> for &'a [Value] {
    const EXPECTED: JsonType = JsonType::Array;

    fn from_json(value: &'a Value) -> Option<Self> {
        value.as_array().map(Vec::as_slice)
    }
}

fn coerce<'a, T: FromJson<'a>>(key: &str, value: &'a Value) -> Result<T, DecodeError> {
    T::from_json(value).ok_or_else(|| DecodeError::TypeMismatch {
        key: key.to_string(),
        expected: T::EXPECTED,
        actual: JsonType::of(value),
    })
}

pub fn require_field<'a, T: FromJson<'a>>(obj: &'a JsonObject, key: &str) -> Result<T, DecodeError> {
    let value = obj
        .get(key)
        .ok_or_else(|| DecodeError::MissingKey(key.to_string()))?;

    coerce(key, value)
}

/// Absent keys and explicit `null` both read as `None`.
pub fn optional_field<'a, T: FromJson<'a>>(
    obj: &'a JsonObject,
    key: &str,
) -> Result<Option<T>, DecodeError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => coerce(key, value).map(Some),
    }
}

/// Reads an array whose every element must be a JSON object.
pub fn require_objects<'a>(obj: &'a JsonObject, key: &str) -> Result<Vec<&'a JsonObject>, DecodeError> {
    let values: &[Value] = require_field(obj, key)?;

    values.iter().map(|value| coerce(key, value)).collect()
}

fn parse_url(key: &str, raw: &str) -> Result<Url, DecodeError> {
    Url::parse(raw).map_err(|_| DecodeError::InvalidUrl {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

pub fn require_url(obj: &JsonObject, key: &str) -> Result<Url, DecodeError> {
    let raw: &str = require_field(obj, key)?;
    parse_url(key, raw)
}

pub fn optional_url(obj: &JsonObject, key: &str) -> Result<Option<Url>, DecodeError> {
    optional_field::<&str>(obj, key)?
        .map(|raw| parse_url(key, raw))
        .transpose()
}

fn parse_timestamp(key: &str, raw: &str) -> Result<DateTime<Utc>, DecodeError> {
    let invalid = || DecodeError::InvalidTimestamp {
        key: key.to_string(),
        value: raw.to_string(),
    };

    if raw.len() != TIMESTAMP_LEN {
        return Err(invalid());
    }

    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| invalid())
}

pub fn require_timestamp(obj: &JsonObject, key: &str) -> Result<DateTime<Utc>, DecodeError> {
    let raw: &str = require_field(obj, key)?;
    parse_timestamp(key, raw)
}

pub fn optional_timestamp(obj: &JsonObject, key: &str) -> Result<Option<DateTime<Utc>>, DecodeError> {
    optional_field::<&str>(obj, key)?
        .map(|raw| parse_timestamp(key, raw))
        .transpose()
}

/// Types that can be built from a borrowed JSON object, all-or-nothing.
pub trait JsonDecodable: Sized {
    fn decode(json: &JsonObject) -> Result<Self, DecodeError>;

    fn decode_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Object(obj) => Self::decode(obj),
            other => Err(DecodeError::NotAnObject {
                actual: JsonType::of(other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(obj) => obj,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_require_field_reports_missing_key() {
        let obj = object(json!({"name": "gitsearch"}));

        let err = require_field::<i64>(&obj, "id").unwrap_err();
        assert_eq!(err, DecodeError::MissingKey("id".to_string()));
    }

    #[test]
    fn test_require_field_reports_both_types() {
        let obj = object(json!({"id": "42"}));

        let err = require_field::<i64>(&obj, "id").unwrap_err();
        assert_eq!(
            err,
            DecodeError::TypeMismatch {
                key: "id".to_string(),
                expected: JsonType::Integer,
                actual: JsonType::String,
            }
        );
        assert_eq!(
            err.to_string(),
            "unexpected type for 'id': expected integer, found string"
        );
    }

    #[test]
    fn test_float_is_not_an_integer() {
        let obj = object(json!({"size": 1.5, "score": 3}));

        assert!(matches!(
            require_field::<i64>(&obj, "size"),
            Err(DecodeError::TypeMismatch {
                actual: JsonType::Float,
                ..
            })
        ));
        assert_eq!(require_field::<f64>(&obj, "score").unwrap(), 3.0);
    }

    #[test]
    fn test_optional_field_treats_null_as_absent() {
        let obj = object(json!({"language": null, "homepage": "https://example.com"}));

        assert_eq!(optional_field::<String>(&obj, "language").unwrap(), None);
        assert_eq!(optional_field::<String>(&obj, "missing").unwrap(), None);
        assert_eq!(
            optional_field::<String>(&obj, "homepage").unwrap().as_deref(),
            Some("https://example.com")
        );
    }

    #[test]
    fn test_optional_field_still_checks_type() {
        let obj = object(json!({"language": 7}));

        assert!(matches!(
            optional_field::<String>(&obj, "language"),
            Err(DecodeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_url_parsing() {
        let obj = object(json!({"url": "https://api.github.com/repos/a/b", "bad": "not a url"}));

        let url = require_url(&obj, "url").unwrap();
        assert_eq!(url.host_str(), Some("api.github.com"));

        assert_eq!(
            require_url(&obj, "bad").unwrap_err(),
            DecodeError::InvalidUrl {
                key: "bad".to_string(),
                value: "not a url".to_string(),
            }
        );
        assert_eq!(optional_url(&obj, "absent").unwrap(), None);
    }

    #[test]
    fn test_timestamp_parsing() {
        let obj = object(json!({
            "created_at": "2016-02-18T09:30:05Z",
            "offset": "2016-02-18T09:30:05+09:00",
            "pushed_at": null
        }));

        let created = require_timestamp(&obj, "created_at").unwrap();
        assert_eq!(created.year(), 2016);
        assert_eq!(created.month(), 2);
        assert_eq!(created.hour(), 9);
        assert_eq!(created.second(), 5);

        assert_eq!(
            require_timestamp(&obj, "offset").unwrap_err(),
            DecodeError::InvalidTimestamp {
                key: "offset".to_string(),
                value: "2016-02-18T09:30:05+09:00".to_string(),
            }
        );
        assert_eq!(optional_timestamp(&obj, "pushed_at").unwrap(), None);
    }

    #[test]
    fn test_negative_integers_are_accepted() {
        let obj = object(json!({"id": -5}));

        assert_eq!(require_field::<i64>(&obj, "id").unwrap(), -5);
    }

    #[test]
    fn test_unpadded_timestamp_is_rejected() {
        let obj = object(json!({"created_at": "2016-2-8T9:3:5Z"}));

        assert_eq!(
            require_timestamp(&obj, "created_at").unwrap_err(),
            DecodeError::InvalidTimestamp {
                key: "created_at".to_string(),
                value: "2016-2-8T9:3:5Z".to_string(),
            }
        );
    }

    #[test]
    fn test_require_objects_rejects_scalars() {
        let obj = object(json!({"items": [{"a": 1}, 2]}));

        assert_eq!(
            require_objects(&obj, "items").unwrap_err(),
            DecodeError::TypeMismatch {
                key: "items".to_string(),
                expected: JsonType::Object,
                actual: JsonType::Integer,
            }
        );
    }
}
