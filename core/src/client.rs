//! Entry point tying credentials, configuration and a transport together.
//!
//! # Design
//! `Client` owns one `RequestBuilder`. Endpoint accessors hand out a short
//! mutable borrow of it, so a client runs one call at a time and the borrow
//! checker enforces that. With client credentials the token is obtained once,
//! when the client is built, through the same transport later used for API
//! calls.

use tracing::debug;

use crate::auth::{oauth_client_authorization, Credentials};
use crate::builder::RequestBuilder;
use crate::config::ClientConfig;
use crate::endpoints::{
    PromoOfferRequestTrackingCode, PromoOffersForCampaign, Websites, WebsitesManage,
    WebsitesManageV2,
};
use crate::error::ApiError;
use crate::transport::{Transport, UreqTransport};

/// Authenticated Admitad API client.
#[derive(Debug)]
pub struct Client {
    transport: RequestBuilder,
}

impl Client {
    /// Builds a client over the blocking `ureq` transport.
    pub fn connect(credentials: &Credentials, config: ClientConfig) -> Result<Self, ApiError> {
        let transport = UreqTransport::new(&config);
        Self::with_transport(credentials, &config, Box::new(transport))
    }

    pub fn with_transport(
        credentials: &Credentials,
        config: &ClientConfig,
        transport: Box<dyn Transport>,
    ) -> Result<Self, ApiError> {
        let access_token = match credentials {
            Credentials::AccessToken(token) => token.clone(),
            Credentials::ClientCredentials {
                client_id,
                client_secret,
                scopes,
            } => {
                let token = oauth_client_authorization(
                    transport.as_ref(),
                    &config.token_url(),
                    client_id,
                    client_secret,
                    scopes,
                )?;
                debug!(client_id = %client_id, scopes = %scopes, "obtained access token");
                token.access_token
            }
        };

        Ok(Self {
            transport: RequestBuilder::new(transport, &access_token, config),
        })
    }

    /// The underlying builder, for endpoints without a typed wrapper.
    pub fn transport(&mut self) -> &mut RequestBuilder {
        &mut self.transport
    }

    pub fn websites(&mut self) -> Websites<'_> {
        Websites::new(&mut self.transport)
    }

    pub fn websites_manage(&mut self) -> WebsitesManage<'_> {
        WebsitesManage::new(&mut self.transport)
    }

    pub fn websites_manage_v2(&mut self) -> WebsitesManageV2<'_> {
        WebsitesManageV2::new(&mut self.transport)
    }

    pub fn promo_offers_for_campaign(&mut self) -> PromoOffersForCampaign<'_> {
        PromoOffersForCampaign::new(&mut self.transport)
    }

    pub fn promo_offer_request_tracking_code(&mut self) -> PromoOfferRequestTrackingCode<'_> {
        PromoOfferRequestTrackingCode::new(&mut self.transport)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http::HttpMethod;
    use crate::payload::Payload;
    use crate::transport::testing::FakeTransport;

    fn config() -> ClientConfig {
        ClientConfig::new("http://127.0.0.1:9").with_user_agent("client-tests")
    }

    #[test]
    fn access_token_client_makes_no_token_call() {
        let transport = FakeTransport::default();
        transport.respond(200, r#"{"results": []}"#);

        let mut client = Client::with_transport(
            &Credentials::access_token("abc"),
            &config(),
            Box::new(transport.clone()),
        )
        .unwrap();
        client.websites().get(&Payload::new()).unwrap();

        let requests = transport.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].header("authorization"), Some("Bearer abc"));
        assert_eq!(requests[0].header("user-agent"), Some("client-tests"));
    }

    #[test]
    fn client_credentials_exchange_token_first() {
        let transport = FakeTransport::default();
        transport
            .respond(200, r#"{"access_token": "issued", "expires_in": 604800}"#)
            .respond(200, r#"{"id": 4}"#);

        let mut client = Client::with_transport(
            &Credentials::client_credentials("id", "secret", "websites"),
            &config(),
            Box::new(transport.clone()),
        )
        .unwrap();
        let website = client.websites().get_one(4).unwrap();
        assert_eq!(website, json!({"id": 4}));

        let requests = transport.requests.borrow();
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].url, "http://127.0.0.1:9/token/");
        assert_eq!(requests[1].url, "http://127.0.0.1:9/websites/4/");
        assert_eq!(requests[1].header("authorization"), Some("Bearer issued"));
    }

    #[test]
    fn rejected_credentials_fail_construction() {
        let transport = FakeTransport::default();
        transport.respond(401, r#"{"error": "invalid_client"}"#);

        let err = Client::with_transport(
            &Credentials::client_credentials("id", "wrong", "websites"),
            &config(),
            Box::new(transport),
        )
        .unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn raw_builder_reaches_unwrapped_endpoints() {
        let transport = FakeTransport::default();
        transport.respond(200, r#"{"results": []}"#);

        let mut client = Client::with_transport(
            &Credentials::access_token("abc"),
            &config(),
            Box::new(transport.clone()),
        )
        .unwrap();
        client
            .transport()
            .get()
            .request_url("me/", &[])
            .unwrap();

        assert_eq!(transport.last_request().url, "http://127.0.0.1:9/me/");
    }
}
