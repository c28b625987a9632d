//! Fluent, stateful request builder shared by every endpoint.
//!
//! # Design
//! An endpoint call is a short chain: pick a method, stage payload through
//! the pagination/filtering/ordering policies, then `request_url`. The
//! builder lives as long as the client and keeps its headers between calls;
//! selecting a method wipes the staged payload and files so nothing leaks
//! from one call into the next.
//!
//! One builder serves one logical call at a time. Issue concurrent calls
//! from separate clients.

use std::fmt;

use serde_json::Value;

use crate::auth::build_headers;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::multipart::FilePart;
use crate::payload::{Filtering, Ordering, Pagination, Payload};
use crate::template;
use crate::transport::{perform_request, prepare_request, Transport};

pub struct RequestBuilder {
    transport: Box<dyn Transport>,
    base_url: String,
    headers: Vec<(String, String)>,
    method: HttpMethod,
    url: Option<String>,
    data: Option<Payload>,
    files: Vec<FilePart>,
    debug: bool,
}

impl RequestBuilder {
    pub fn new(transport: Box<dyn Transport>, access_token: &str, config: &ClientConfig) -> Self {
        Self {
            transport,
            base_url: config.base_url.clone(),
            headers: build_headers(access_token, config.user_agent.as_deref()),
            method: HttpMethod::Get,
            url: None,
            data: None,
            files: Vec::new(),
            debug: config.debug,
        }
    }

    /// Accepts GET, POST, PUT and DELETE (any case).
    pub fn set_method(&mut self, method: &str) -> Result<&mut Self, ApiError> {
        let method = method.parse()?;
        Ok(self.switch_method(method))
    }

    pub fn get(&mut self) -> &mut Self {
        self.switch_method(HttpMethod::Get)
    }

    pub fn post(&mut self) -> &mut Self {
        self.switch_method(HttpMethod::Post)
    }

    pub fn put(&mut self) -> &mut Self {
        self.switch_method(HttpMethod::Put)
    }

    pub fn delete(&mut self) -> &mut Self {
        self.switch_method(HttpMethod::Delete)
    }

    fn switch_method(&mut self, method: HttpMethod) -> &mut Self {
        self.method = method;
        self.files.clear();
        self.clean_data()
    }

    pub fn set_debug(&mut self, debug: bool) -> &mut Self {
        self.debug = debug;
        self
    }

    /// Fills `{name}` placeholders in `template` and resolves it against the
    /// base URL.
    pub fn set_url(&mut self, template: &str, params: &[(&str, String)]) -> Result<&mut Self, ApiError> {
        let path = template::render(template, params)?;
        self.url = Some(template::resolve(&self.base_url, &path));
        Ok(self)
    }

    pub fn set_data(&mut self, data: Payload) -> &mut Self {
        self.data = Some(data);
        self
    }

    pub fn clean_data(&mut self) -> &mut Self {
        self.data = None;
        self
    }

    pub fn update_data(&mut self, values: Payload) -> &mut Self {
        self.data.get_or_insert_with(Payload::new).extend(values);
        self
    }

    /// Query parameters for GET endpoints; same as `update_data`.
    pub fn set_params(&mut self, params: Payload) -> &mut Self {
        self.update_data(params)
    }

    pub fn set_files(&mut self, files: Vec<FilePart>) -> &mut Self {
        self.files = files;
        self
    }

    pub fn set_pagination(&mut self, pagination: Pagination) -> &mut Self {
        self.update_data(pagination.to_payload())
    }

    pub fn set_filtering(&mut self, filtering: &Filtering) -> &mut Self {
        self.update_data(filtering.to_payload())
    }

    pub fn set_ordering(&mut self, ordering: &Ordering) -> &mut Self {
        self.update_data(ordering.to_payload())
    }

    /// Sends the staged request and returns the decoded JSON.
    pub fn request(&mut self) -> Result<Value, ApiError> {
        self.request_with(Ok)
    }

    /// `set_url` followed by `request`.
    pub fn request_url(&mut self, template: &str, params: &[(&str, String)]) -> Result<Value, ApiError> {
        self.set_url(template, params)?.request()
    }

    /// Sends the staged request and passes the decoded JSON to `handler`.
    pub fn request_with<R, F>(&mut self, handler: F) -> Result<R, ApiError>
    where
        F: FnOnce(Value) -> Result<R, ApiError>,
    {
        let url = self.url.as_deref().ok_or_else(|| {
            ApiError::Configuration(
                "absent url: call set_url or pass a url template to request_url".to_string(),
            )
        })?;
        let request = prepare_request(self.method, url, &self.headers, self.data.as_ref(), &self.files);
        let response = perform_request(self.transport.as_ref(), &request, self.debug)?;
        handler(response)
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn data(&self) -> Option<&Payload> {
        self.data.as_ref()
    }

    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("base_url", &self.base_url)
            .field("method", &self.method)
            .field("url", &self.url)
            .field("data", &self.data)
            .field("files", &self.files.len())
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}
