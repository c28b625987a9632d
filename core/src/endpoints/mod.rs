//! Resource endpoints.
//!
//! Each endpoint borrows the client's `RequestBuilder` for the duration of
//! one call, validates its arguments with the field tables it declares, and
//! returns the decoded JSON answer unchanged.

pub mod promo_offers;
pub mod websites;

pub use promo_offers::{PromoOfferRequestTrackingCode, PromoOffersForCampaign};
pub use websites::{Websites, WebsitesManage, WebsitesManageV2};
