//! Publisher websites (ad spaces).

use serde_json::Value;

use crate::builder::RequestBuilder;
use crate::error::ApiError;
use crate::payload::{one_of, Filtering, Pagination, Payload};
use crate::sanitize::{sanitize_fields, sanitize_id, FieldRule};

pub const STATUS_NEW: &str = "new";
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_SUSPENDED: &str = "suspended";
pub const STATUS_DECLINED: &str = "declined";

pub const CAMPAIGN_STATUS_PENDING: &str = "pending";
pub const CAMPAIGN_STATUS_ACTIVE: &str = "active";
pub const CAMPAIGN_STATUS_DECLINED: &str = "declined";
pub const CAMPAIGN_STATUS_DISABLED: &str = "disabled";

pub const STATUS_LIST: &[&str] = &[
    STATUS_NEW,
    STATUS_PENDING,
    STATUS_ACTIVE,
    STATUS_SUSPENDED,
    STATUS_DECLINED,
];

pub const CAMPAIGN_STATUS_LIST: &[&str] = &[
    CAMPAIGN_STATUS_PENDING,
    CAMPAIGN_STATUS_ACTIVE,
    CAMPAIGN_STATUS_DECLINED,
    CAMPAIGN_STATUS_DISABLED,
];

fn website_id(id: impl Into<Value>) -> Result<[(&'static str, String); 1], ApiError> {
    Ok([("website_id", sanitize_id(id, "website_id")?.to_string())])
}

/// Read access to the publisher's websites.
pub struct Websites<'a> {
    transport: &'a mut RequestBuilder,
}

impl<'a> Websites<'a> {
    pub const SCOPE: &'static str = "websites";

    pub const URL: &'static str = "websites/";
    pub const SINGLE_URL: &'static str = "websites/{website_id}/";

    pub fn new(transport: &'a mut RequestBuilder) -> Self {
        Self { transport }
    }

    /// Lists websites. Reads `limit`, `offset`, `status` and
    /// `campaign_status` from `query`; anything else is ignored.
    pub fn get(&mut self, query: &Payload) -> Result<Value, ApiError> {
        let filtering = Filtering::new(query.clone())
            .allow("status", one_of(STATUS_LIST))
            .allow("campaign_status", one_of(CAMPAIGN_STATUS_LIST));

        self.transport
            .get()
            .set_pagination(Pagination::from_payload(query))
            .set_filtering(&filtering)
            .request_url(Self::URL, &[])
    }

    pub fn get_one(&mut self, id: impl Into<Value>) -> Result<Value, ApiError> {
        let params = website_id(id)?;
        self.transport.get().request_url(Self::SINGLE_URL, &params)
    }
}

/// Create, update, verify and delete websites.
pub struct WebsitesManage<'a> {
    transport: &'a mut RequestBuilder,
}

impl<'a> WebsitesManage<'a> {
    pub const SCOPE: &'static str = "manage_websites";

    pub const CREATE_URL: &'static str = "website/create/";
    pub const UPDATE_URL: &'static str = "website/update/{website_id}/";
    pub const VERIFY_URL: &'static str = "website/verify/{website_id}/";
    pub const DELETE_URL: &'static str = "website/delete/{website_id}/";

    pub const CREATE_FIELDS: &'static [(&'static str, FieldRule)] = &[
        ("name", FieldRule::string(200)),
        ("kind", FieldRule::string(20)),
        ("language", FieldRule::string(2)),
        ("adservice", FieldRule::integer().blank()),
        ("site_url", FieldRule::string(255)),
        ("description", FieldRule::string(20000).min_length(100)),
        ("categories", FieldRule::integer_array()),
        ("regions", FieldRule::string_array(Some(2))),
        ("mailing_targeting", FieldRule::bool_integer().blank()),
    ];

    pub const UPDATE_FIELDS: &'static [(&'static str, FieldRule)] = &[
        ("name", FieldRule::string(200).blank()),
        ("kind", FieldRule::string(20).blank()),
        ("language", FieldRule::string(2).blank()),
        ("adservice", FieldRule::integer().blank()),
        ("site_url", FieldRule::string(255).blank()),
        ("description", FieldRule::string(20000).min_length(100).blank()),
        ("categories", FieldRule::integer_array().blank()),
        ("regions", FieldRule::string_array(Some(2)).blank()),
        ("mailing_targeting", FieldRule::bool_integer().blank()),
    ];

    pub fn new(transport: &'a mut RequestBuilder) -> Self {
        Self { transport }
    }

    pub fn create(&mut self, fields: &Payload) -> Result<Value, ApiError> {
        let data = sanitize_fields(Self::CREATE_FIELDS, fields)?;
        self.transport
            .post()
            .set_data(data)
            .request_url(Self::CREATE_URL, &[])
    }

    pub fn update(&mut self, id: impl Into<Value>, fields: &Payload) -> Result<Value, ApiError> {
        let data = sanitize_fields(Self::UPDATE_FIELDS, fields)?;
        let params = website_id(id)?;
        self.transport
            .post()
            .set_data(data)
            .request_url(Self::UPDATE_URL, &params)
    }

    pub fn verify(&mut self, id: impl Into<Value>) -> Result<Value, ApiError> {
        let params = website_id(id)?;
        self.transport.post().request_url(Self::VERIFY_URL, &params)
    }

    pub fn delete(&mut self, id: impl Into<Value>) -> Result<Value, ApiError> {
        let params = website_id(id)?;
        self.transport.post().request_url(Self::DELETE_URL, &params)
    }
}

/// Website management through the `websites/v2/` routes.
pub struct WebsitesManageV2<'a> {
    transport: &'a mut RequestBuilder,
}

impl<'a> WebsitesManageV2<'a> {
    pub const SCOPE: &'static str = "manage_websites";

    pub const CREATE_URL: &'static str = "websites/v2/create/";
    pub const UPDATE_URL: &'static str = "websites/v2/update/{website_id}/";
    pub const VERIFY_URL: &'static str = "websites/v2/verify/{website_id}/";
    pub const DELETE_URL: &'static str = "websites/v2/delete/{website_id}/";
    pub const GET_URL: &'static str = "websites/v2/";
    pub const GET_ONE_URL: &'static str = "websites/v2/{website_id}/";

    pub const CREATE_FIELDS: &'static [(&'static str, FieldRule)] = &[
        ("name", FieldRule::string(200)),
        ("kind", FieldRule::string(20)),
        ("url", FieldRule::string(255)),
        ("category", FieldRule::integer_array()),
        ("region", FieldRule::string_array(None)),
    ];

    pub const UPDATE_FIELDS: &'static [(&'static str, FieldRule)] = &[
        ("name", FieldRule::string(200).blank()),
        ("url", FieldRule::string(255).blank()),
    ];

    pub fn new(transport: &'a mut RequestBuilder) -> Self {
        Self { transport }
    }

    pub fn create(&mut self, fields: &Payload) -> Result<Value, ApiError> {
        let data = sanitize_fields(Self::CREATE_FIELDS, fields)?;
        self.transport
            .post()
            .set_data(data)
            .request_url(Self::CREATE_URL, &[])
    }

    pub fn update(&mut self, id: impl Into<Value>, fields: &Payload) -> Result<Value, ApiError> {
        let data = sanitize_fields(Self::UPDATE_FIELDS, fields)?;
        let params = website_id(id)?;
        self.transport
            .post()
            .set_data(data)
            .request_url(Self::UPDATE_URL, &params)
    }

    pub fn verify(&mut self, id: impl Into<Value>) -> Result<Value, ApiError> {
        let params = website_id(id)?;
        self.transport.post().request_url(Self::VERIFY_URL, &params)
    }

    pub fn delete(&mut self, id: impl Into<Value>) -> Result<Value, ApiError> {
        let params = website_id(id)?;
        self.transport.post().request_url(Self::DELETE_URL, &params)
    }

    /// Paginated list; only `limit` and `offset` are read from `query`.
    pub fn get(&mut self, query: &Payload) -> Result<Value, ApiError> {
        self.transport
            .get()
            .set_pagination(Pagination::from_payload(query))
            .request_url(Self::GET_URL, &[])
    }

    pub fn get_one(&mut self, id: impl Into<Value>) -> Result<Value, ApiError> {
        let params = website_id(id)?;
        self.transport.get().request_url(Self::GET_ONE_URL, &params)
    }
}
