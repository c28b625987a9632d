//! OAuth2 grants against the token endpoint.
//!
//! Both grants are a single form POST. A success answer without an
//! `access_token` is reported as `ApiError::Api` with the raw content.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::payload::Payload;
use crate::transport::{perform_request, prepare_request, Transport};
use crate::types::TokenResponse;

/// How a client authenticates. No token is cached between clients.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    AccessToken(String),
    ClientCredentials {
        client_id: String,
        client_secret: String,
        scopes: String,
    },
}

impl Credentials {
    pub fn access_token(token: impl Into<String>) -> Self {
        Credentials::AccessToken(token.into())
    }

    pub fn client_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scopes: impl Into<String>,
    ) -> Self {
        Credentials::ClientCredentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scopes: scopes.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::AccessToken(_) => f.debug_tuple("AccessToken").field(&"***").finish(),
            Credentials::ClientCredentials {
                client_id, scopes, ..
            } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"***")
                .field("scopes", scopes)
                .finish(),
        }
    }
}

/// `base64("id:secret")` for the Basic authorization header.
pub fn encode_credentials(client_id: &str, client_secret: &str) -> String {
    STANDARD.encode(format!("{client_id}:{client_secret}"))
}

/// Headers sent with every API call.
pub fn build_headers(access_token: &str, user_agent: Option<&str>) -> Vec<(String, String)> {
    let mut headers = vec![
        ("Authorization".to_string(), format!("Bearer {access_token}")),
        ("Connection".to_string(), "Keep-Alive".to_string()),
    ];
    if let Some(user_agent) = user_agent.filter(|agent| !agent.is_empty()) {
        headers.push(("User-Agent".to_string(), user_agent.to_string()));
    }
    headers
}

/// Client-credentials grant.
pub fn oauth_client_authorization(
    transport: &dyn Transport,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    scopes: &str,
) -> Result<TokenResponse, ApiError> {
    let mut data = Payload::new();
    data.insert("grant_type".to_string(), Value::from("client_credentials"));
    data.insert("client_id".to_string(), Value::from(client_id));
    data.insert("scope".to_string(), Value::from(scopes));

    let headers = vec![(
        "Authorization".to_string(),
        format!("Basic {}", encode_credentials(client_id, client_secret)),
    )];
    request_token(transport, token_url, &headers, &data)
}

/// Refresh-token grant.
pub fn oauth_refresh_access_token(
    transport: &dyn Transport,
    token_url: &str,
    refresh_token: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<TokenResponse, ApiError> {
    let mut data = Payload::new();
    data.insert("grant_type".to_string(), Value::from("refresh_token"));
    data.insert("client_id".to_string(), Value::from(client_id));
    data.insert("client_secret".to_string(), Value::from(client_secret));
    data.insert("refresh_token".to_string(), Value::from(refresh_token));

    request_token(transport, token_url, &[], &data)
}

fn request_token(
    transport: &dyn Transport,
    token_url: &str,
    headers: &[(String, String)],
    data: &Payload,
) -> Result<TokenResponse, ApiError> {
    let request = prepare_request(HttpMethod::Post, token_url, headers, Some(data), &[]);
    let content = perform_request(transport, &request, false)?;
    serde_json::from_value(content.clone()).map_err(|_| ApiError::Api(content))
}
