//! One synchronous HTTP call and the translation of its outcome.
//!
//! # Design
//! `prepare_request` turns method, URL, headers, payload and files into an
//! encoded `HttpRequest`. A `Transport` performs the round-trip and reports
//! only transport-level failures; everything about status codes and JSON is
//! decided afterwards in `parse_response`, so every transport gets the same
//! error taxonomy:
//!
//! - no response obtained: `ApiError::Connection`
//! - status >= 400: `ApiError::Http` with the decoded (or raw) body
//! - success body that is not JSON: `ApiError::Json`

use serde_json::Value;
use tracing::{debug, trace};

use crate::config::ClientConfig;
use crate::error::{ApiError, BoxError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::multipart::{encode_multipart, FilePart};
use crate::payload::{encode_form, form_pairs, prepare_data, Payload};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Executes an encoded request.
///
/// Implementations return `Err` only when no response was obtained; error
/// statuses are ordinary responses.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, BoxError>;
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let tls = ureq::tls::TlsConfig::builder()
            .disable_verification(!config.verify_tls)
            .build();
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout()))
            .tls_config(tls)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, BoxError> {
        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = match &request.body {
            Some(body) => self.agent.run(builder.body(body.clone())?)?,
            None => self.agent.run(builder.body(())?)?,
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Encodes a request: query string for GET/DELETE, form body for POST/PUT,
/// multipart when files are attached.
pub fn prepare_request(
    method: HttpMethod,
    url: &str,
    headers: &[(String, String)],
    data: Option<&Payload>,
    files: &[FilePart],
) -> HttpRequest {
    let pairs = data
        .filter(|data| !data.is_empty())
        .map(|data| form_pairs(&prepare_data(data)))
        .unwrap_or_default();
    let mut headers = headers.to_vec();

    if method.sends_query() {
        return HttpRequest {
            method,
            url: with_query(url, &pairs),
            headers,
            body: None,
        };
    }

    let body = if !files.is_empty() {
        let multipart = encode_multipart(&pairs, files);
        set_header(&mut headers, "Content-Type", multipart.content_type);
        Some(multipart.body)
    } else if !pairs.is_empty() {
        set_header(&mut headers, "Content-Type", FORM_CONTENT_TYPE.to_string());
        Some(encode_form(&pairs).into_bytes())
    } else {
        None
    };

    HttpRequest {
        method,
        url: url.to_string(),
        headers,
        body,
    }
}

/// Runs `request` through `transport` and decodes the JSON answer.
pub fn perform_request(
    transport: &dyn Transport,
    request: &HttpRequest,
    debug: bool,
) -> Result<Value, ApiError> {
    if debug {
        debug!(method = %request.method, url = %request.url, "request url");
    }

    let response = transport.execute(request).map_err(ApiError::Connection)?;
    trace!(status = response.status, url = %request.url, "received response");

    parse_response(&request.url, &response)
}

/// Maps a response to decoded JSON or the matching `ApiError`.
pub fn parse_response(url: &str, response: &HttpResponse) -> Result<Value, ApiError> {
    if response.status >= 400 {
        return Err(ApiError::Http {
            status: response.status,
            message: describe_status(response.status, url),
            content: decode_lenient(&response.body),
        });
    }
    serde_json::from_slice(&response.body).map_err(ApiError::Json)
}

fn describe_status(status: u16, url: &str) -> String {
    let kind = if status < 500 { "Client" } else { "Server" };
    let reason = ureq::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown");
    format!("{status} {kind} Error: {reason} for url: {url}")
}

/// JSON when possible, otherwise the raw text.
fn decode_lenient(body: &[u8]) -> Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

fn with_query(url: &str, pairs: &[(String, String)]) -> String {
    if pairs.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{}", encode_form(pairs))
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value));
}
