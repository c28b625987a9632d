//! Fixed values of the Admitad API.

pub const DATE_FORMAT: &str = "%d.%m.%Y";
pub const LONG_DATE_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

pub const SUPPORTED_LANGUAGES: &[&str] = &["ru", "en", "de", "pl", "es", "tr"];
pub const DEFAULT_LANGUAGE: &str = "ru";

/// Seconds before a request is abandoned.
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 60;

pub const DEFAULT_PAGINATION_LIMIT: i64 = 20;
pub const DEFAULT_PAGINATION_OFFSET: i64 = 0;
pub const MAX_PAGINATION_LIMIT: i64 = 500;
pub const MAX_SUB_ID_LENGTH: usize = 250;

pub const BASE_URL: &str = "https://api.admitad.com/";
pub const AUTHORIZE_PATH: &str = "authorize/";
pub const TOKEN_PATH: &str = "token/";
