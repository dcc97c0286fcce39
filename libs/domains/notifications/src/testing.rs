//! Test doubles shared by the unit tests of this crate.

use crate::api::{ApiError, DomainApi, RequestContext};
use crate::models::{
    Account, AccountRef, EmailSettings, Group, Member, Transfer, User, UserSettings,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub fn member(id: &str, name: &str, account: &str) -> Member {
    Member {
        id: id.to_string(),
        name: name.to_string(),
        account: AccountRef {
            id: account.to_string(),
            href: format!("https://acc.example.org/GRP1/accounts/{}", account),
        },
    }
}

/// A user with the given language whose account emails are on or off.
pub fn user(id: &str, email: &str, language: &str, account_emails: bool) -> User {
    User {
        id: id.to_string(),
        email: email.to_string(),
        settings: UserSettings {
            language: Some(language.to_string()),
            komunitin: Some(true),
            emails: EmailSettings {
                my_account: Some(account_emails),
            },
        },
    }
}

fn not_found(url: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        url: url.to_string(),
    }
}

/// In-memory `DomainApi` that records every call it receives.
pub struct FakeApi {
    transfer: Transfer,
    members: Vec<Member>,
    users: HashMap<String, Vec<User>>,
    group: Group,
    accounts: HashMap<String, Account>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            transfer: Transfer {
                id: "t-1".to_string(),
                amount: 10.0,
                state: "committed".to_string(),
                description: "Bread".to_string(),
                payer_account_id: "acc-1".to_string(),
                payee_account_id: "acc-2".to_string(),
                created: None,
                updated: None,
            },
            members: Vec::new(),
            users: HashMap::new(),
            group: Group {
                id: "g-1".to_string(),
                code: "GRP1".to_string(),
                name: "Green Exchange".to_string(),
                admins: Vec::new(),
            },
            accounts: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_users(mut self, member_id: &str, users: Vec<User>) -> Self {
        self.users.insert(member_id.to_string(), users);
        self
    }

    pub fn with_admins(mut self, admins: Vec<User>) -> Self {
        self.group.admins = admins;
        self
    }

    pub fn with_account(mut self, href: &str, account: Account) -> Self {
        self.accounts.insert(href.to_string(), account);
        self
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    /// Every call as `operation:argument`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Member ids passed to `get_member_users`, in call order.
    pub fn member_user_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| call.strip_prefix("get_member_users:").map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl DomainApi for FakeApi {
    async fn get_transfer(&self, _ctx: &RequestContext, id: &str) -> Result<Transfer, ApiError> {
        self.record(format!("get_transfer:{}", id));
        if id == self.transfer.id {
            Ok(self.transfer.clone())
        } else {
            Err(not_found(id))
        }
    }

    async fn get_account_members(
        &self,
        _ctx: &RequestContext,
        account_ids: &[String],
    ) -> Result<Vec<Member>, ApiError> {
        self.record(format!("get_account_members:{}", account_ids.join(",")));
        Ok(self
            .members
            .iter()
            .filter(|m| account_ids.contains(&m.account.id))
            .cloned()
            .collect())
    }

    async fn get_member(&self, _ctx: &RequestContext, id: &str) -> Result<Member, ApiError> {
        self.record(format!("get_member:{}", id));
        self.members
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn get_group(&self, ctx: &RequestContext) -> Result<Group, ApiError> {
        self.record(format!("get_group:{}", ctx.code));
        Ok(self.group.clone())
    }

    async fn get_member_users(
        &self,
        _ctx: &RequestContext,
        member_id: &str,
    ) -> Result<Vec<User>, ApiError> {
        self.record(format!("get_member_users:{}", member_id));
        Ok(self.users.get(member_id).cloned().unwrap_or_default())
    }

    async fn get_account_by_url(
        &self,
        _ctx: &RequestContext,
        href: &str,
    ) -> Result<Account, ApiError> {
        self.record(format!("get_account_by_url:{}", href));
        self.accounts.get(href).cloned().ok_or_else(|| not_found(href))
    }
}
