//! In-memory stand-in for the subset of the Admitad API the client covers.
//!
//! API routes require `Authorization: Bearer {ACCESS_TOKEN}`; the token is
//! issued by `POST /token/` for the fixed client credentials below. Request
//! bodies are form-encoded, answers are JSON.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, RawQuery, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const CLIENT_ID: &str = "mock-client";
pub const CLIENT_SECRET: &str = "mock-secret";
pub const ACCESS_TOKEN: &str = "mock-access-token";
pub const REFRESH_TOKEN: &str = "mock-refresh-token";

/// Campaign with seeded promo offers.
pub const CAMPAIGN_ID: u64 = 12;
/// Coupon that is issued immediately.
pub const INSTANT_COUPON_ID: u64 = 100;
/// Coupon that needs advertiser approval.
pub const MODERATED_COUPON_ID: u64 = 101;
pub const ASSIGNED_PROMO_CODE: &str = "TESTCODE123";

const DEFAULT_LIMIT: usize = 20;

#[derive(Clone, Debug, Serialize)]
pub struct Website {
    pub id: u64,
    pub name: String,
    pub kind: String,
    pub status: String,
    /// Status of the website's campaign connections.
    pub campaign_status: String,
    pub site_url: String,
    pub language: Option<String>,
    pub categories: Vec<u64>,
    pub regions: Vec<String>,
}

impl Website {
    fn v2(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "kind": self.kind,
            "status": self.status,
            "campaign_status": self.campaign_status,
            "url": self.site_url,
            "category": self.categories,
            "region": self.regions,
        })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CouponRequest {
    pub request_id: u64,
    pub promo_offer_id: u64,
    pub website_id: u64,
    pub status: String,
    pub approved_at: Option<String>,
    pub declined_at: Option<String>,
    pub created_at: String,
    pub assigned_promo_code: Option<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    websites: BTreeMap<u64, Website>,
    coupon_requests: BTreeMap<u64, CouponRequest>,
    next_website_id: u64,
    next_request_id: u64,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));

    let api = Router::new()
        .route("/websites/", get(list_websites))
        .route("/websites/{website_id}/", get(get_website))
        .route("/website/create/", post(create_website))
        .route("/website/update/{website_id}/", post(update_website))
        .route("/website/verify/{website_id}/", post(verify_website))
        .route("/website/delete/{website_id}/", post(delete_website))
        .route("/websites/v2/", get(list_websites_v2))
        .route("/websites/v2/{website_id}/", get(get_website_v2))
        .route("/websites/v2/create/", post(create_website_v2))
        .route("/websites/v2/update/{website_id}/", post(update_website_v2))
        .route("/websites/v2/verify/{website_id}/", post(verify_website))
        .route("/websites/v2/delete/{website_id}/", post(delete_website))
        .route("/promo_offers/{campaign_id}/", get(list_promo_offers))
        .route(
            "/tracking_promo_code/request-tracking-coupon/",
            post(request_tracking_coupon),
        )
        .route("/tracking_promo_codes/request-status/", get(request_status))
        .route_layer(middleware::from_fn(require_bearer));

    Router::new()
        .route("/token/", post(issue_token))
        .merge(api)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

async fn require_bearer(request: Request, next: Next) -> Response {
    debug!(method = %request.method(), uri = %request.uri(), "api request");
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        == Some(ACCESS_TOKEN);
    if !authorized {
        return error(StatusCode::UNAUTHORIZED, json!({"error": "invalid_token"}));
    }
    next.run(request).await
}

/// Decoded `application/x-www-form-urlencoded` pairs, in wire order.
struct Form(Vec<(String, String)>);

impl Form {
    fn parse(raw: &str) -> Self {
        Form(url::form_urlencoded::parse(raw.as_bytes()).into_owned().collect())
    }

    fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    fn all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    fn id(&self, key: &str) -> Option<u64> {
        self.first(key).and_then(|value| value.parse().ok())
    }

    fn required(&self, key: &str) -> Result<String, Response> {
        match self.first(key) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(error(
                StatusCode::BAD_REQUEST,
                json!({ key: ["This field is required."] }),
            )),
        }
    }

    fn ids(&self, key: &str) -> Vec<u64> {
        self.all(key)
            .into_iter()
            .filter_map(|value| value.parse().ok())
            .collect()
    }

    fn strings(&self, key: &str) -> Vec<String> {
        self.all(key).into_iter().map(str::to_string).collect()
    }
}

fn page<T: Clone + Serialize>(query: &Form, items: &[T]) -> Value {
    let limit = query
        .first("limit")
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_LIMIT);
    let offset = query
        .first("offset")
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);
    let results: Vec<T> = items.iter().skip(offset).take(limit).cloned().collect();
    json!({
        "results": results,
        "_meta": {"limit": limit, "offset": offset, "count": items.len()},
    })
}

fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, json!({"detail": "Not found"}))
}

async fn issue_token(headers: HeaderMap, body: String) -> Response {
    let form = Form::parse(&body);
    match form.first("grant_type") {
        Some("client_credentials") => {
            let expected = format!(
                "Basic {}",
                STANDARD.encode(format!("{CLIENT_ID}:{CLIENT_SECRET}"))
            );
            let basic = headers
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok());
            if basic != Some(expected.as_str()) || form.first("client_id") != Some(CLIENT_ID) {
                return error(StatusCode::UNAUTHORIZED, json!({"error": "invalid_client"}));
            }
            let scope = form.first("scope").unwrap_or_default();
            debug!(scope, "issuing client credentials token");
            Json(token_response(scope)).into_response()
        }
        Some("refresh_token") => {
            if form.first("client_id") != Some(CLIENT_ID)
                || form.first("client_secret") != Some(CLIENT_SECRET)
            {
                return error(StatusCode::UNAUTHORIZED, json!({"error": "invalid_client"}));
            }
            if form.first("refresh_token") != Some(REFRESH_TOKEN) {
                return error(StatusCode::BAD_REQUEST, json!({"error": "invalid_grant"}));
            }
            Json(token_response("")).into_response()
        }
        _ => error(
            StatusCode::BAD_REQUEST,
            json!({"error": "unsupported_grant_type"}),
        ),
    }
}

fn token_response(scope: &str) -> Value {
    json!({
        "access_token": ACCESS_TOKEN,
        "token_type": "bearer",
        "expires_in": 604800,
        "refresh_token": REFRESH_TOKEN,
        "scope": scope,
        "username": "webmaster",
    })
}

fn filter_websites(store: &Store, query: &Form) -> Vec<Website> {
    store
        .websites
        .values()
        .filter(|website| match query.first("status") {
            Some(status) => website.status == status,
            None => true,
        })
        .filter(|website| match query.first("campaign_status") {
            Some(status) => website.campaign_status == status,
            None => true,
        })
        .cloned()
        .collect()
}

async fn list_websites(State(db): State<Db>, RawQuery(query): RawQuery) -> Json<Value> {
    let query = Form::parse(query.as_deref().unwrap_or_default());
    let store = db.read().await;
    Json(page(&query, &filter_websites(&store, &query)))
}

async fn get_website(State(db): State<Db>, Path(website_id): Path<u64>) -> Response {
    let store = db.read().await;
    match store.websites.get(&website_id) {
        Some(website) => Json(website).into_response(),
        None => not_found(),
    }
}

async fn insert_website(db: &Db, website: impl FnOnce(u64) -> Website) -> Website {
    let mut store = db.write().await;
    store.next_website_id += 1;
    let website = website(store.next_website_id);
    store.websites.insert(website.id, website.clone());
    website
}

async fn create_website(State(db): State<Db>, body: String) -> Response {
    let form = Form::parse(&body);
    let (name, kind, site_url) = match (
        form.required("name"),
        form.required("kind"),
        form.required("site_url"),
    ) {
        (Ok(name), Ok(kind), Ok(site_url)) => (name, kind, site_url),
        (Err(response), _, _) | (_, Err(response), _) | (_, _, Err(response)) => return response,
    };

    let website = insert_website(&db, |id| Website {
        id,
        name,
        kind,
        status: "new".to_string(),
        campaign_status: "pending".to_string(),
        site_url,
        language: form.first("language").map(str::to_string),
        categories: form.ids("categories"),
        regions: form.strings("regions"),
    })
    .await;
    Json(website).into_response()
}

async fn update_website(
    State(db): State<Db>,
    Path(website_id): Path<u64>,
    body: String,
) -> Response {
    let form = Form::parse(&body);
    let mut store = db.write().await;
    let Some(website) = store.websites.get_mut(&website_id) else {
        return not_found();
    };
    if let Some(name) = form.first("name") {
        website.name = name.to_string();
    }
    if let Some(kind) = form.first("kind") {
        website.kind = kind.to_string();
    }
    if let Some(site_url) = form.first("site_url") {
        website.site_url = site_url.to_string();
    }
    if let Some(language) = form.first("language") {
        website.language = Some(language.to_string());
    }
    if form.first("categories").is_some() {
        website.categories = form.ids("categories");
    }
    if form.first("regions").is_some() {
        website.regions = form.strings("regions");
    }
    Json(website.clone()).into_response()
}

async fn verify_website(State(db): State<Db>, Path(website_id): Path<u64>) -> Response {
    let mut store = db.write().await;
    let Some(website) = store.websites.get_mut(&website_id) else {
        return not_found();
    };
    website.status = "active".to_string();
    website.campaign_status = "active".to_string();
    Json(json!({"success": "Accepted", "message": "Website verified"})).into_response()
}

async fn delete_website(State(db): State<Db>, Path(website_id): Path<u64>) -> Response {
    let mut store = db.write().await;
    match store.websites.remove(&website_id) {
        Some(_) => Json(json!({"success": "Deleted"})).into_response(),
        None => not_found(),
    }
}

async fn list_websites_v2(State(db): State<Db>, RawQuery(query): RawQuery) -> Json<Value> {
    let query = Form::parse(query.as_deref().unwrap_or_default());
    let store = db.read().await;
    let websites: Vec<Value> = store.websites.values().map(Website::v2).collect();
    Json(page(&query, &websites))
}

async fn get_website_v2(State(db): State<Db>, Path(website_id): Path<u64>) -> Response {
    let store = db.read().await;
    match store.websites.get(&website_id) {
        Some(website) => Json(website.v2()).into_response(),
        None => not_found(),
    }
}

async fn create_website_v2(State(db): State<Db>, body: String) -> Response {
    let form = Form::parse(&body);
    let (name, kind, site_url) = match (
        form.required("name"),
        form.required("kind"),
        form.required("url"),
    ) {
        (Ok(name), Ok(kind), Ok(site_url)) => (name, kind, site_url),
        (Err(response), _, _) | (_, Err(response), _) | (_, _, Err(response)) => return response,
    };

    let website = insert_website(&db, |id| Website {
        id,
        name,
        kind,
        status: "new".to_string(),
        campaign_status: "pending".to_string(),
        site_url,
        language: None,
        categories: form.ids("category"),
        regions: form.strings("region"),
    })
    .await;
    Json(website.v2()).into_response()
}

async fn update_website_v2(
    State(db): State<Db>,
    Path(website_id): Path<u64>,
    body: String,
) -> Response {
    let form = Form::parse(&body);
    let mut store = db.write().await;
    let Some(website) = store.websites.get_mut(&website_id) else {
        return not_found();
    };
    if let Some(name) = form.first("name") {
        website.name = name.to_string();
    }
    if let Some(site_url) = form.first("url") {
        website.site_url = site_url.to_string();
    }
    Json(website.v2()).into_response()
}

fn promo_offers(campaign_id: u64) -> Vec<Value> {
    if campaign_id != CAMPAIGN_ID {
        return Vec::new();
    }
    vec![
        json!({
            "id": INSTANT_COUPON_ID,
            "name": "10% off everything",
            "campaign": {"id": CAMPAIGN_ID},
            "is_personal": true,
            "status": "active",
        }),
        json!({
            "id": MODERATED_COUPON_ID,
            "name": "Free shipping",
            "campaign": {"id": CAMPAIGN_ID},
            "is_personal": true,
            "status": "active",
        }),
    ]
}

async fn list_promo_offers(Path(campaign_id): Path<u64>, RawQuery(query): RawQuery) -> Json<Value> {
    let query = Form::parse(query.as_deref().unwrap_or_default());
    Json(page(&query, &promo_offers(campaign_id)))
}

async fn request_tracking_coupon(State(db): State<Db>, body: String) -> Response {
    let form = Form::parse(&body);
    let (Some(coupon_id), Some(_), Some(website_id)) = (
        form.id("coupon_id"),
        form.id("advcampaign_id"),
        form.id("website_id"),
    ) else {
        return error(StatusCode::BAD_REQUEST, json!({"error_code": "invalid_params"}));
    };

    match coupon_id {
        INSTANT_COUPON_ID => Json(json!({
            "assigned_promo_code": ASSIGNED_PROMO_CODE,
            "tracking_link": format!("https://ad.admitad.com/g/{website_id}/?i=5"),
            "request_id": null,
        }))
        .into_response(),
        MODERATED_COUPON_ID => {
            let mut store = db.write().await;
            store.next_request_id += 1;
            let request = CouponRequest {
                request_id: store.next_request_id,
                promo_offer_id: coupon_id,
                website_id,
                status: "pending".to_string(),
                approved_at: None,
                declined_at: None,
                created_at: "2024-01-15T10:00:00".to_string(),
                assigned_promo_code: None,
            };
            store
                .coupon_requests
                .insert(request.request_id, request.clone());
            Json(json!({
                "assigned_promo_code": null,
                "tracking_link": null,
                "request_id": request.request_id,
            }))
            .into_response()
        }
        _ => error(StatusCode::BAD_REQUEST, json!({"error_code": "no_coupon"})),
    }
}

async fn request_status(State(db): State<Db>, RawQuery(query): RawQuery) -> Response {
    let query = Form::parse(query.as_deref().unwrap_or_default());
    let Some(request_id) = query.id("request_id") else {
        return error(StatusCode::BAD_REQUEST, json!({"error_code": "invalid_params"}));
    };
    let store = db.read().await;
    match store.coupon_requests.get(&request_id) {
        Some(request) => Json(request).into_response(),
        None => error(StatusCode::NOT_FOUND, json!({"error_code": "request_not_found"})),
    }
}
