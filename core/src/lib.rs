//! Synchronous client for the Admitad affiliate API.
//!
//! # Overview
//! Callers build a `Client` from credentials and a `ClientConfig`, then call
//! endpoint methods that validate their arguments, assemble a request and
//! return the decoded JSON answer.
//!
//! # Design
//! - `sanitize` checks and coerces caller input before any I/O.
//! - `RequestBuilder` stages method, URL and payload for one call and resets
//!   them on every method switch.
//! - `http` keeps requests and responses as plain data; a `Transport` does
//!   the network round-trip (`UreqTransport` by default), and
//!   `transport::parse_response` maps every outcome to one `ApiError`
//!   taxonomy.
//! - Resource responses stay `serde_json::Value`; integration tests against
//!   the mock server catch schema drift.

pub mod auth;
pub mod builder;
pub mod client;
pub mod config;
pub mod constants;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod multipart;
pub mod payload;
pub mod sanitize;
pub mod template;
pub mod transport;
pub mod types;

pub use auth::{oauth_client_authorization, oauth_refresh_access_token, Credentials};
pub use builder::RequestBuilder;
pub use client::Client;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use payload::{Filtering, Ordering, Pagination, Payload};
pub use sanitize::ValidationError;
pub use transport::{Transport, UreqTransport};
pub use types::TokenResponse;
