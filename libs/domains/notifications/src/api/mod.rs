//! Boundary to the platform's domain API.
//!
//! Handlers only see the `DomainApi` trait; `HttpApiClient` is the
//! production implementation over the JSON:API endpoints.

mod http;
mod jsonapi;

pub use http::HttpApiClient;

use crate::models::{Account, Group, Member, Transfer, User};
use async_trait::async_trait;
use event_stream::Event;
use reqwest::Url;
use thiserror::Error;

/// Errors raised by domain API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The event source is not a usable base URL.
    #[error("Invalid event source '{0}'")]
    InvalidSource(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body is not the expected document.
    #[error("Invalid response from {url}: {details}")]
    Decode { url: String, details: String },
}

/// Per-event tenant scope for API calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// Accounting API base URL of the tenant, taken from the event source
    pub source: Url,
    /// Tenant (group) code
    pub code: String,
}

impl RequestContext {
    pub fn new(source: &str, code: impl Into<String>) -> Result<Self, ApiError> {
        let source =
            Url::parse(source).map_err(|_| ApiError::InvalidSource(source.to_string()))?;
        if source.cannot_be_a_base() {
            return Err(ApiError::InvalidSource(source.to_string()));
        }

        Ok(Self {
            source,
            code: code.into(),
        })
    }

    /// Scope API calls to the tenant that emitted `event`.
    pub fn from_event(event: &Event) -> Result<Self, ApiError> {
        Self::new(&event.source, event.code.clone())
    }

    /// Source URL without a trailing slash, ready to append paths.
    pub fn source_base(&self) -> &str {
        self.source.as_str().trim_end_matches('/')
    }
}

/// Tenant-scoped fetches the notification handlers need.
#[async_trait]
pub trait DomainApi: Send + Sync {
    /// Fetch a transfer from the tenant's accounting service.
    async fn get_transfer(&self, ctx: &RequestContext, id: &str) -> Result<Transfer, ApiError>;

    /// Fetch the members owning the given accounts. Result order is unspecified.
    async fn get_account_members(
        &self,
        ctx: &RequestContext,
        account_ids: &[String],
    ) -> Result<Vec<Member>, ApiError>;

    async fn get_member(&self, ctx: &RequestContext, id: &str) -> Result<Member, ApiError>;

    /// Fetch the tenant's group with its admins and their settings.
    async fn get_group(&self, ctx: &RequestContext) -> Result<Group, ApiError>;

    /// Fetch the users linked to a member, with their settings.
    async fn get_member_users(
        &self,
        ctx: &RequestContext,
        member_id: &str,
    ) -> Result<Vec<User>, ApiError>;

    /// Fetch an account through its absolute href.
    async fn get_account_by_url(
        &self,
        ctx: &RequestContext,
        href: &str,
    ) -> Result<Account, ApiError>;
}
