//! Entry point for callers of the API.
//!
//! # Design
//! `Client` holds a base URL, a few default headers and the transport it was
//! given. It knows nothing about individual resources: callers pass a method,
//! a path, an optional body and headers, and get back a normalized
//! [`Response`] or [`Error`]. Request building is split from sending so the
//! exact request can be inspected without touching the network.

use serde::Serialize;

use crate::error::{Error, ErrorKind};
use crate::http::{Method, Request};
use crate::response::Response;
use crate::transport::{self, Transport, TransportConfig, TransportKind};

pub struct Client {
    base_url: String,
    default_headers: Vec<(String, String)>,
    transport: Box<dyn Transport>,
}

impl Client {
    pub fn new(base_url: &str, transport: Box<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_headers: Vec::new(),
            transport,
        }
    }

    /// Client over the preferred transport for this build.
    pub fn from_config(base_url: &str, config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self::new(base_url, transport::handler(config)?))
    }

    /// Header sent with every request unless the call overrides it.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.default_headers
            .retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.default_headers.push((name, value.into()));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport_kind(&self) -> TransportKind {
        self.transport.kind()
    }

    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        headers: &[(String, String)],
    ) -> Request {
        let mut request = Request::new(method, self.url(path));
        for (name, value) in self.default_headers.iter().chain(headers) {
            request.set_header(name.as_str(), value.as_str());
        }
        if body.is_some() && request.header("content-type").is_none() {
            request.set_header("content-type", "application/json");
        }
        request.body = body;
        request
    }

    pub fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        headers: &[(String, String)],
    ) -> Result<Response, Error> {
        self.execute(self.build_request(method, path, body, headers))
    }

    /// Serialize `body` as JSON and send it.
    pub fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &T,
        headers: &[(String, String)],
    ) -> Result<Response, Error> {
        let body = serde_json::to_string(body)
            .map_err(|e| Error::new(ErrorKind::InvalidRequest, format!("cannot encode body: {e}")))?;
        self.send(method, path, Some(body), headers)
    }

    pub fn execute(&self, request: Request) -> Result<Response, Error> {
        self.transport.request(request)
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
