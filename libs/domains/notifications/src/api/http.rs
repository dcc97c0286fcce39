//! reqwest implementation of `DomainApi`.

use super::jsonapi::{self, Document};
use super::{ApiError, DomainApi, RequestContext};
use crate::models::{Account, Group, Member, Transfer, User};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderValue};
use tracing::debug;

const JSON_API: &str = "application/vnd.api+json";

/// Domain API client over the platform's JSON:API services.
///
/// Accounting calls go to the event's source URL, social calls to the
/// configured social API.
#[derive(Clone)]
pub struct HttpApiClient {
    client: Client,
    social_url: String,
    token: Option<String>,
}

impl HttpApiClient {
    pub fn new(social_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            social_url: social_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn social(&self, path: &str) -> String {
        format!("{}{}", self.social_url, path)
    }

    async fn fetch(&self, url: &str, query: &[(&str, &str)]) -> Result<Document, ApiError> {
        debug!(url = %url, "Fetching resource");

        let mut request = self
            .client
            .get(url)
            .query(query)
            .header(ACCEPT, HeaderValue::from_static(JSON_API));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            details: e.to_string(),
        })
    }

    async fn fetch_one(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<(jsonapi::Resource, Vec<jsonapi::Resource>), ApiError> {
        let mut document = self.fetch(url, query).await?;
        let included = std::mem::take(&mut document.included);
        let resource = document.one().ok_or_else(|| ApiError::Decode {
            url: url.to_string(),
            details: "expected a single resource".to_string(),
        })?;
        Ok((resource, included))
    }
}

#[async_trait]
impl DomainApi for HttpApiClient {
    async fn get_transfer(&self, ctx: &RequestContext, id: &str) -> Result<Transfer, ApiError> {
        let url = format!("{}/{}/transfers/{}", ctx.source_base(), ctx.code, id);
        let (resource, _) = self.fetch_one(&url, &[]).await?;
        Ok(jsonapi::transfer_from(&resource))
    }

    async fn get_account_members(
        &self,
        ctx: &RequestContext,
        account_ids: &[String],
    ) -> Result<Vec<Member>, ApiError> {
        let url = self.social(&format!("/{}/members", ctx.code));
        let accounts = account_ids.join(",");
        let mut document = self
            .fetch(
                &url,
                &[("filter[account]", accounts.as_str()), ("include", "account")],
            )
            .await?;

        let included = std::mem::take(&mut document.included);
        Ok(document
            .many()
            .iter()
            .map(|r| jsonapi::member_from(r, &included))
            .collect())
    }

    async fn get_member(&self, ctx: &RequestContext, id: &str) -> Result<Member, ApiError> {
        let url = self.social(&format!("/{}/members/{}", ctx.code, id));
        let (resource, included) = self.fetch_one(&url, &[("include", "account")]).await?;
        Ok(jsonapi::member_from(&resource, &included))
    }

    async fn get_group(&self, ctx: &RequestContext) -> Result<Group, ApiError> {
        let url = self.social(&format!("/{}", ctx.code));
        let (resource, included) = self
            .fetch_one(&url, &[("include", "admins,admins.settings")])
            .await?;
        Ok(jsonapi::group_from(&resource, &included))
    }

    async fn get_member_users(
        &self,
        _ctx: &RequestContext,
        member_id: &str,
    ) -> Result<Vec<User>, ApiError> {
        let url = self.social("/users");
        let mut document = self
            .fetch(&url, &[("filter[members]", member_id), ("include", "settings")])
            .await?;

        let included = std::mem::take(&mut document.included);
        Ok(document
            .many()
            .iter()
            .map(|r| jsonapi::user_from(r, &included))
            .collect())
    }

    async fn get_account_by_url(
        &self,
        _ctx: &RequestContext,
        href: &str,
    ) -> Result<Account, ApiError> {
        let (resource, _) = self.fetch_one(href, &[]).await?;
        Ok(jsonapi::account_from(&resource))
    }
}
