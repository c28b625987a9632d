//! Promo offers (coupons) and tracking promo code requests.

use serde_json::Value;

use crate::builder::RequestBuilder;
use crate::error::ApiError;
use crate::payload::{Pagination, Payload};
use crate::sanitize::sanitize_id;

/// Promo offers of one advertising campaign.
pub struct PromoOffersForCampaign<'a> {
    transport: &'a mut RequestBuilder,
}

impl<'a> PromoOffersForCampaign<'a> {
    pub const SCOPE: &'static str = "public_data";

    pub const URL: &'static str = "promo_offers/{campaign_id}/";

    pub fn new(transport: &'a mut RequestBuilder) -> Self {
        Self { transport }
    }

    pub fn get(&mut self, campaign_id: impl Into<Value>, query: &Payload) -> Result<Value, ApiError> {
        let campaign_id = sanitize_id(campaign_id, "campaign_id")?;
        self.transport
            .get()
            .set_pagination(Pagination::from_payload(query))
            .request_url(Self::URL, &[("campaign_id", campaign_id.to_string())])
    }
}

/// Requests a personal tracking promo code for a website.
///
/// `create` answers with `assigned_promo_code` and `tracking_link` when the
/// code is issued right away, or with a `request_id` to poll through `get`
/// while the advertiser reviews the request.
pub struct PromoOfferRequestTrackingCode<'a> {
    transport: &'a mut RequestBuilder,
}

impl<'a> PromoOfferRequestTrackingCode<'a> {
    pub const SCOPE: &'static str = "request_tracking_coupon";

    pub const CREATE_URL: &'static str = "tracking_promo_code/request-tracking-coupon/";
    pub const GET_STATUS_URL: &'static str = "tracking_promo_codes/request-status/";

    pub fn new(transport: &'a mut RequestBuilder) -> Self {
        Self { transport }
    }

    pub fn create(
        &mut self,
        coupon_id: impl Into<Value>,
        advcampaign_id: impl Into<Value>,
        website_id: impl Into<Value>,
    ) -> Result<Value, ApiError> {
        let mut data = Payload::new();
        data.insert(
            "coupon_id".to_string(),
            Value::from(sanitize_id(coupon_id, "coupon_id")?),
        );
        data.insert(
            "advcampaign_id".to_string(),
            Value::from(sanitize_id(advcampaign_id, "advcampaign_id")?),
        );
        data.insert(
            "website_id".to_string(),
            Value::from(sanitize_id(website_id, "website_id")?),
        );

        self.transport
            .post()
            .set_data(data)
            .request_url(Self::CREATE_URL, &[])
    }

    pub fn get(&mut self, request_id: impl Into<Value>) -> Result<Value, ApiError> {
        let mut params = Payload::new();
        params.insert(
            "request_id".to_string(),
            Value::from(sanitize_id(request_id, "request_id")?),
        );

        self.transport
            .get()
            .set_params(params)
            .request_url(Self::GET_STATUS_URL, &[])
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::ClientConfig;
    use crate::http::HttpMethod;
    use crate::sanitize::ValidationError;
    use crate::transport::testing::FakeTransport;

    fn builder() -> (RequestBuilder, FakeTransport) {
        let transport = FakeTransport::default();
        let builder = RequestBuilder::new(
            Box::new(transport.clone()),
            "token",
            &ClientConfig::new("https://api.admitad.com/"),
        );
        (builder, transport)
    }

    #[test]
    fn campaign_offers_are_paginated() {
        let (mut builder, transport) = builder();
        transport.respond(200, r#"{"results": [{"id": 1}], "_meta": {"count": 1}}"#);

        let mut query = Payload::new();
        query.insert("limit".to_string(), json!(50));
        let offers = PromoOffersForCampaign::new(&mut builder).get(12, &query).unwrap();

        assert_eq!(offers["_meta"]["count"], json!(1));
        assert_eq!(
            transport.last_request().url,
            "https://api.admitad.com/promo_offers/12/?limit=50&offset=0"
        );
    }

    #[test]
    fn tracking_code_request_posts_sanitized_ids() {
        let (mut builder, transport) = builder();
        transport.respond(
            200,
            r#"{"assigned_promo_code": "TESTCODE123", "tracking_link": "https://ad.admitad.com/g/1", "request_id": null}"#,
        );

        let answer = PromoOfferRequestTrackingCode::new(&mut builder)
            .create(100, "200", 300)
            .unwrap();
        assert_eq!(answer["assigned_promo_code"], json!("TESTCODE123"));

        let request = transport.last_request();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(
            request.url,
            "https://api.admitad.com/tracking_promo_code/request-tracking-coupon/"
        );
        let body = String::from_utf8(request.body.unwrap()).unwrap();
        assert!(body.contains("coupon_id=100"));
        assert!(body.contains("advcampaign_id=200"));
        assert!(body.contains("website_id=300"));
    }

    #[test]
    fn unknown_coupon_surfaces_the_server_error_code() {
        let (mut builder, transport) = builder();
        transport.respond(400, r#"{"error_code": "no_coupon"}"#);

        let err = PromoOfferRequestTrackingCode::new(&mut builder)
            .create(999, 200, 300)
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.content(), Some(&json!({"error_code": "no_coupon"})));
    }

    #[test]
    fn invalid_ids_fail_before_any_request() {
        let (mut builder, transport) = builder();

        let err = PromoOfferRequestTrackingCode::new(&mut builder)
            .create(100, "abc", 300)
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::InvalidId { ref field, .. }) if field == "advcampaign_id"
        ));

        let err = PromoOffersForCampaign::new(&mut builder)
            .get(-3, &Payload::new())
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(transport.requests.borrow().is_empty());
    }

    #[test]
    fn request_status_is_queried_by_id() {
        let (mut builder, transport) = builder();
        transport.respond(200, r#"{"request_id": 8, "status": "pending", "assigned_promo_code": null}"#);

        let status = PromoOfferRequestTrackingCode::new(&mut builder).get(8).unwrap();
        assert_eq!(status["status"], json!("pending"));

        let request = transport.last_request();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(
            request.url,
            "https://api.admitad.com/tracking_promo_codes/request-status/?request_id=8"
        );
        assert!(request.body.is_none());
    }
}
