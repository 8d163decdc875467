//! Transport built on a plain `ureq` agent.

use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, RequestBuilder};

use super::{collect_headers, transport_failure, Transport, TransportConfig, TransportKind};
use crate::error::Error;
use crate::http::{Method, RawResponse, Request};
use crate::normalize;
use crate::response::Response;

/// Minimal-dependency transport.
///
/// Certificate verification is disabled so self-signed internal endpoints
/// work. Status codes are returned as data rather than `ureq` errors; the
/// outcome is normalized with [`normalize::status_first`].
#[derive(Clone)]
pub struct MinimalTransport {
    agent: Agent,
}

impl MinimalTransport {
    pub fn new(config: &TransportConfig) -> Self {
        if !config.keep_alive {
            tracing::debug!("minimal transport ignores keep_alive = false");
        }
        let tls = ureq::tls::TlsConfig::builder()
            .disable_verification(true)
            .build();
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .tls_config(tls)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for MinimalTransport {
    fn request(&self, request: Request) -> Result<Response, Error> {
        tracing::debug!(%request, "sending request");

        let uri = request.uri.as_str();
        let sent = match request.method {
            Method::Get => send_without_body(self.agent.get(uri), &request),
            Method::Delete => send_without_body(self.agent.delete(uri), &request),
            Method::Post => send_with_body(self.agent.post(uri), &request),
            Method::Put => send_with_body(self.agent.put(uri), &request),
            Method::Patch => send_with_body(self.agent.patch(uri), &request),
        };
        let mut response = sent.map_err(|e| transport_failure(&request, e))?;

        let status = response.status();
        let headers = collect_headers(response.headers());
        // ureq caps bodies at 10 MiB unless told otherwise.
        let bytes = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| transport_failure(&request, e))?;

        normalize::status_first(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Minimal
    }
}

fn attach_headers<B>(mut builder: RequestBuilder<B>, request: &Request) -> RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// GET and DELETE; a body, if any, is sent anyway.
fn send_without_body(
    builder: RequestBuilder<WithoutBody>,
    request: &Request,
) -> Result<http::Response<ureq::Body>, ureq::Error> {
    let builder = attach_headers(builder, request);
    match &request.body {
        Some(body) => builder.force_send_body().send(body.as_bytes()),
        None => builder.call(),
    }
}

fn send_with_body(
    builder: RequestBuilder<WithBody>,
    request: &Request,
) -> Result<http::Response<ureq::Body>, ureq::Error> {
    let builder = attach_headers(builder, request);
    match &request.body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}
