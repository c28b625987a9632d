//! Typed responses.
//!
//! Resource endpoints return raw decoded JSON; only the OAuth token exchange
//! has a fixed shape worth a struct.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Answer of the token endpoint for every grant type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    /// Any additional fields the server sends (`username`, `id`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
