//! Turns a [`RawResponse`] into a [`Response`] or an [`Error`].
//!
//! The two transports disagree on one detail and both behaviors are kept:
//! `status_first` falls back to the transport reason phrase when an error
//! body's `error` field is missing or falsy (`null`, `false`, `0`, `""`,
//! `[]`, `{}`), `body_first` only leaves the message empty when it is missing.

use serde_json::{Map, Value};

use crate::error::{Error, ErrorKind};
use crate::http::RawResponse;
use crate::response::{Meta, Response};

/// Normalization used by the minimal transport: check the status, then decode.
pub fn status_first(raw: RawResponse) -> Result<Response, Error> {
    if raw.status >= 400 {
        let decoded = decode(raw.status, &raw.body)?;
        let fields = ErrorFields::from(decoded);
        let message = match fields.dict.get("error") {
            Some(error) if is_truthy(error) => fields.error.unwrap_or_default(),
            _ => raw.reason.unwrap_or_default(),
        };
        tracing::debug!(status = raw.status, %message, "error response");
        return Err(Error::new(ErrorKind::Status, message)
            .with_status(raw.status)
            .with_code(fields.code)
            .with_response_dict(fields.dict));
    }

    let decoded = decode(raw.status, &raw.body)?;
    Ok(Response::new(decoded, Meta::new(raw.headers)))
}

/// Normalization used by the session transport: decode, then check the status.
pub fn body_first(raw: RawResponse) -> Result<Response, Error> {
    let decoded = decode(raw.status, &raw.body)?;

    if raw.status >= 400 {
        let fields = ErrorFields::from(decoded);
        let message = fields.error.unwrap_or_default();
        tracing::debug!(status = raw.status, %message, "error response");
        return Err(Error::new(ErrorKind::Status, message)
            .with_status(raw.status)
            .with_code(fields.code)
            .with_response_dict(fields.dict));
    }

    Ok(Response::new(decoded, Meta::new(raw.headers)))
}

fn decode(status: u16, body: &str) -> Result<Value, Error> {
    serde_json::from_str(body).map_err(|_| Error::unparsable(status, body))
}

/// `error` and `code` pulled out of a decoded error body.
struct ErrorFields {
    error: Option<String>,
    code: Option<String>,
    dict: Map<String, Value>,
}

impl From<Value> for ErrorFields {
    fn from(value: Value) -> Self {
        let dict = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            error: dict.get("error").and_then(field_text),
            code: dict.get("code").and_then(field_text),
            dict,
        }
    }
}

/// JSON values that count as "not set" for the reason fallback.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
