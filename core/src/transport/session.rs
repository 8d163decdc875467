//! Transport built on a reused `reqwest` blocking client.

use reqwest::blocking::Client;

use super::{collect_headers, transport_failure, Transport, TransportConfig, TransportKind};
use crate::error::Error;
use crate::http::{Method, RawResponse, Request};
use crate::normalize;
use crate::response::Response;

/// Session-based transport.
///
/// One client is opened per transport and reused by every call, so
/// connections are kept alive unless [`TransportConfig::keep_alive`] is off.
/// Certificate verification is disabled. The outcome is normalized with
/// [`normalize::body_first`].
#[derive(Debug, Clone)]
pub struct SessionTransport {
    client: Client,
    keep_alive: bool,
}

impl SessionTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, Error> {
        let mut builder = Client::builder().danger_accept_invalid_certs(true);
        if !config.keep_alive {
            builder = builder.pool_max_idle_per_host(0);
        }
        Ok(Self {
            client: builder.build()?,
            keep_alive: config.keep_alive,
        })
    }
}

impl Transport for SessionTransport {
    fn request(&self, mut request: Request) -> Result<Response, Error> {
        if !self.keep_alive {
            request.set_header("Connection", "close");
        }
        tracing::debug!(%request, "sending request");

        let mut builder = self
            .client
            .request(reqwest_method(request.method), request.uri.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body.take() {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .map_err(|e| transport_failure(&request, e))?;
        let status = response.status();
        let headers = collect_headers(response.headers());
        let body = response
            .text()
            .map_err(|e| transport_failure(&request, e))?;

        normalize::body_first(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            headers,
            body,
        })
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Session
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}
