//! Request and raw-response types shared by every transport.
//!
//! # Design
//! `Request` describes one HTTP call as plain data. Nothing is validated at
//! construction: a malformed URI or header name only surfaces when a
//! transport tries to send it. `RawResponse` is what a transport captured off
//! the wire before normalization, which lets the `normalize` functions run
//! without a network.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ErrorKind};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            other => Err(Error::new(
                ErrorKind::InvalidRequest,
                format!("unsupported HTTP method: {other}"),
            )),
        }
    }
}

/// One HTTP call described as plain data.
///
/// Header names compare case-insensitively. Transports may add or override
/// headers through [`Request::set_header`] before sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub uri: String,
    pub method: Method,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            method,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replace any header with the same name, or append a new one.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.uri)
    }
}

/// An HTTP response as captured by a transport, before normalization.
///
/// `reason` is the transport-level reason phrase, when the transport has one.
/// Repeated headers are joined with `", "`.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status: u16,
    pub reason: Option<String>,
    pub headers: HashMap<String, String>,
    pub body: String,
}
