//! Pluggable HTTP transports.
//!
//! # Design
//! Both transports expose the same `request(Request) -> Result<Response,
//! Error>` contract, so callers never need to know which one is active.
//! Which one is preferred is decided at compile time by the `session` cargo
//! feature; callers may also pick one explicitly with [`handler_for`] and
//! inject it into a [`Client`](crate::Client).

mod minimal;
#[cfg(feature = "session")]
mod session;

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Error, ErrorKind};
use crate::http::Request;
use crate::response::Response;

pub use minimal::MinimalTransport;
#[cfg(feature = "session")]
pub use session::SessionTransport;

/// Executes a [`Request`] and normalizes the outcome.
pub trait Transport: Send + Sync {
    fn request(&self, request: Request) -> Result<Response, Error>;

    fn kind(&self) -> TransportKind;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// `ureq` agent, no session state of its own.
    Minimal,
    /// `reqwest` blocking client reused across calls.
    Session,
}

impl TransportKind {
    /// The richest transport compiled into this build.
    pub fn preferred() -> Self {
        if cfg!(feature = "session") {
            TransportKind::Session
        } else {
            TransportKind::Minimal
        }
    }
}

/// Options accepted by the transport factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TransportConfig {
    /// Reuse connections across calls. When false every request carries
    /// `Connection: close`. Only the session transport honors it.
    #[serde(default = "default_keep_alive", alias = "http_keep_alive")]
    pub keep_alive: bool,
}

fn default_keep_alive() -> bool {
    true
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            keep_alive: default_keep_alive(),
        }
    }
}

impl TransportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }
}

/// Build the preferred transport.
pub fn handler(config: &TransportConfig) -> Result<Box<dyn Transport>, Error> {
    handler_for(TransportKind::preferred(), config)
}

/// Build a specific transport.
pub fn handler_for(kind: TransportKind, config: &TransportConfig) -> Result<Box<dyn Transport>, Error> {
    tracing::debug!(?kind, keep_alive = config.keep_alive, "creating transport");
    match kind {
        TransportKind::Minimal => Ok(Box::new(MinimalTransport::new(config))),
        #[cfg(feature = "session")]
        TransportKind::Session => Ok(Box::new(SessionTransport::new(config)?)),
        #[cfg(not(feature = "session"))]
        TransportKind::Session => Err(Error::new(
            ErrorKind::Transport,
            "session transport is not compiled in (enable the `session` feature)",
        )),
    }
}

/// Flatten a header map, joining repeated values with `", "`.
///
/// Values that are not valid UTF-8 are skipped.
pub(crate) fn collect_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
    let mut out: HashMap<String, String> = HashMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        out.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    out
}

/// Transport failure for a request that never got an HTTP answer.
pub(crate) fn transport_failure(request: &Request, cause: impl std::fmt::Display) -> Error {
    Error::new(ErrorKind::Transport, format!("{request} failed: {cause}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{HeaderValue, SET_COOKIE};

    #[test]
    fn config_defaults_to_keep_alive() {
        assert!(TransportConfig::default().keep_alive);
        let config: TransportConfig = serde_json::from_str("{}").unwrap();
        assert!(config.keep_alive);
    }

    #[test]
    fn config_accepts_http_keep_alive_alias() {
        let config: TransportConfig = serde_json::from_str(r#"{"http_keep_alive": false}"#).unwrap();
        assert!(!config.keep_alive);
    }

    #[test]
    fn preferred_follows_features() {
        #[cfg(feature = "session")]
        assert_eq!(TransportKind::preferred(), TransportKind::Session);
        #[cfg(not(feature = "session"))]
        assert_eq!(TransportKind::preferred(), TransportKind::Minimal);
    }

    #[test]
    fn factory_builds_preferred_kind() {
        let transport = handler(&TransportConfig::new()).unwrap();
        assert_eq!(transport.kind(), TransportKind::preferred());

        let minimal = handler_for(TransportKind::Minimal, &TransportConfig::new()).unwrap();
        assert_eq!(minimal.kind(), TransportKind::Minimal);
    }

    #[test]
    fn repeated_headers_are_joined() {
        let mut map = http::HeaderMap::new();
        map.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        map.append(SET_COOKIE, HeaderValue::from_static("b=2"));
        map.insert("x-total-count", HeaderValue::from_static("3"));

        let headers = collect_headers(&map);
        assert_eq!(headers["set-cookie"], "a=1, b=2");
        assert_eq!(headers["x-total-count"], "3");
    }
}
