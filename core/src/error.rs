//! The single error type returned by every fallible operation.
//!
//! # Design
//! Failures are told apart by fields, not by type: a server answer of 400 or
//! above carries `http_status_code`, plus `code` and `response_dict` when the
//! body decoded. `kind` records the origin so callers can branch without
//! parsing the message. The message is always suitable for direct display.

use serde_json::{Map, Value};

/// Prefix of the message produced when a body is not valid JSON.
pub const UNPARSABLE_PREFIX: &str = "Unable to parse response: ";

/// Where an [`Error`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server answered with a status of 400 or above.
    Status,
    /// The response body was not valid JSON.
    Decode,
    /// No HTTP answer was obtained (connection, DNS, TLS, bad header).
    Transport,
    /// A `Response` accessor did not match the shape of the wrapped value.
    ShapeMismatch,
    /// The request could not be built (unknown method, unencodable body).
    InvalidRequest,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub http_status_code: Option<u16>,
    /// Application-level error token from the body's `code` field.
    pub code: Option<String>,
    /// The decoded error body; empty when it did not decode to an object.
    pub response_dict: Map<String, Value>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            http_status_code: None,
            code: None,
            response_dict: Map::new(),
        }
    }

    /// Decode failure for `raw`, received with `status`.
    pub fn unparsable(status: u16, raw: &str) -> Self {
        Self::new(ErrorKind::Decode, format!("{UNPARSABLE_PREFIX}{raw}")).with_status(status)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status_code = Some(status);
        self
    }

    pub fn with_code(mut self, code: Option<String>) -> Self {
        self.code = code;
        self
    }

    pub fn with_response_dict(mut self, response_dict: Map<String, Value>) -> Self {
        self.response_dict = response_dict;
        self
    }
}

#[cfg(feature = "session")]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let err = Error::new(ErrorKind::Transport, e.to_string());
        match e.status() {
            Some(status) => err.with_status(status.as_u16()),
            None => err,
        }
    }
}
