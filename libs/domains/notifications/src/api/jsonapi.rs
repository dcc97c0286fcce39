//! Minimal JSON:API document model and the mapping to domain models.

use crate::models::{Account, AccountRef, Group, Member, Transfer, User, UserSettings};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub(crate) struct Document {
    pub data: PrimaryData,
    #[serde(default)]
    pub included: Vec<Resource>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum PrimaryData {
    Many(Vec<Resource>),
    One(Box<Resource>),
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Resource {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Value,
    #[serde(default)]
    pub relationships: HashMap<String, Relationship>,
    #[serde(default)]
    pub links: Option<Links>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Links {
    #[serde(rename = "self")]
    pub self_link: Option<String>,
    pub related: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Relationship {
    #[serde(default)]
    pub data: Option<Linkage>,
    #[serde(default)]
    pub links: Option<Links>,
    #[serde(default)]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Linkage {
    Many(Vec<Identifier>),
    One(Identifier),
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Identifier {
    pub id: String,
}

impl Document {
    /// The primary resource of a single-resource document.
    ///
    /// A collection is not a valid answer to a single-resource fetch.
    pub fn one(self) -> Option<Resource> {
        match self.data {
            PrimaryData::One(resource) => Some(*resource),
            PrimaryData::Many(_) => None,
        }
    }

    pub fn many(self) -> Vec<Resource> {
        match self.data {
            PrimaryData::One(resource) => vec![*resource],
            PrimaryData::Many(resources) => resources,
        }
    }
}

impl Resource {
    fn str_attr(&self, key: &str) -> String {
        self.attributes
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn f64_attr(&self, key: &str) -> f64 {
        self.attributes
            .get(key)
            .and_then(Value::as_f64)
            .unwrap_or_default()
    }

    fn time_attr(&self, key: &str) -> Option<DateTime<Utc>> {
        self.attributes
            .get(key)
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|t| t.with_timezone(&Utc))
    }

    fn related_ids(&self, name: &str) -> Vec<&str> {
        match self.relationships.get(name).and_then(|r| r.data.as_ref()) {
            Some(Linkage::One(identifier)) => vec![identifier.id.as_str()],
            Some(Linkage::Many(identifiers)) => {
                identifiers.iter().map(|i| i.id.as_str()).collect()
            }
            None => Vec::new(),
        }
    }

    fn related_id(&self, name: &str) -> String {
        self.related_ids(name)
            .first()
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    /// Absolute URL of a related resource living in another service.
    fn related_href(&self, name: &str) -> Option<String> {
        let relationship = self.relationships.get(name)?;

        relationship
            .meta
            .as_ref()
            .and_then(|meta| meta.get("href"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| relationship.links.as_ref()?.related.clone())
    }

    fn self_link(&self) -> Option<String> {
        self.links.as_ref()?.self_link.clone()
    }
}

fn find<'a>(included: &'a [Resource], kind: &str, id: &str) -> Option<&'a Resource> {
    included.iter().find(|r| r.kind == kind && r.id == id)
}

pub(crate) fn member_from(resource: &Resource, included: &[Resource]) -> Member {
    let account_id = resource.related_id("account");
    let href = resource
        .related_href("account")
        .or_else(|| find(included, "accounts", &account_id).and_then(Resource::self_link))
        .unwrap_or_default();

    Member {
        id: resource.id.clone(),
        name: resource.str_attr("name"),
        account: AccountRef {
            id: account_id,
            href,
        },
    }
}

pub(crate) fn account_from(resource: &Resource) -> Account {
    Account {
        id: resource.id.clone(),
        code: resource.str_attr("code"),
        balance: resource.f64_attr("balance"),
    }
}

pub(crate) fn transfer_from(resource: &Resource) -> Transfer {
    // `meta` is either a plain description or an object holding one
    let description = match resource.attributes.get("meta") {
        Some(Value::String(text)) => text.clone(),
        Some(meta) => meta
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        None => String::new(),
    };

    Transfer {
        id: resource.id.clone(),
        amount: resource.f64_attr("amount"),
        state: resource.str_attr("state"),
        description,
        payer_account_id: resource.related_id("payer"),
        payee_account_id: resource.related_id("payee"),
        created: resource.time_attr("created"),
        updated: resource.time_attr("updated"),
    }
}

pub(crate) fn user_from(resource: &Resource, included: &[Resource]) -> User {
    let settings = find(included, "user-settings", &resource.related_id("settings"))
        .and_then(|s| serde_json::from_value::<UserSettings>(s.attributes.clone()).ok())
        .unwrap_or_default();

    User {
        id: resource.id.clone(),
        email: resource.str_attr("email"),
        settings,
    }
}

pub(crate) fn group_from(resource: &Resource, included: &[Resource]) -> Group {
    let admins = resource
        .related_ids("admins")
        .into_iter()
        .filter_map(|id| find(included, "users", id))
        .map(|admin| user_from(admin, included))
        .collect();

    Group {
        id: resource.id.clone(),
        code: resource.str_attr("code"),
        name: resource.str_attr("name"),
        admins,
    }
}
