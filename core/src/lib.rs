//! Client core for the SIS RESTful API.
//!
//! # Overview
//! Builds HTTP requests, sends them through a pluggable [`Transport`], and
//! normalizes the outcome: a JSON success body becomes a [`Response`] with
//! header-derived [`Meta`], every failure becomes one [`Error`] shape.
//!
//! # Design
//! - Two transports honor the same contract: [`MinimalTransport`] (`ureq`)
//!   and, with the default `session` feature, [`SessionTransport`]
//!   (`reqwest` blocking client reused across calls).
//! - The transport is chosen explicitly: [`handler`] returns the preferred one
//!   for this build, [`handler_for`] a specific one, and [`Client`] takes it
//!   by injection. There is no process-wide state.
//! - Normalization is a pair of pure functions over [`RawResponse`] in
//!   [`normalize`], so it is tested without a network.
//! - No retries, no timeouts beyond library defaults, blocking calls only.

pub mod client;
pub mod error;
pub mod http;
pub mod normalize;
pub mod response;
pub mod transport;

pub use client::Client;
pub use error::{Error, ErrorKind};
pub use crate::http::{Method, RawResponse, Request};
pub use response::{Body, Meta, Response, TOTAL_COUNT_HEADER};
#[cfg(feature = "session")]
pub use transport::SessionTransport;
pub use transport::{handler, handler_for, MinimalTransport, Transport, TransportConfig, TransportKind};
