//! Fetching and correlating the resources each notification needs.

use crate::api::{DomainApi, RequestContext};
use crate::error::{NotificationError, NotificationResult};
use crate::models::{Account, Group, Member, Transfer, User};
use event_stream::Event;
use std::sync::Arc;
use tracing::debug;

/// Which transfer sides need their user lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserFetch {
    Both,
    PayerOnly,
    PayeeOnly,
}

impl UserFetch {
    pub fn payer(self) -> bool {
        matches!(self, Self::Both | Self::PayerOnly)
    }

    pub fn payee(self) -> bool {
        matches!(self, Self::Both | Self::PayeeOnly)
    }
}

/// A transfer with its members assigned to their roles.
///
/// User lists of sides that were not requested are empty.
#[derive(Debug, Clone)]
pub struct TransferResources {
    pub transfer: Transfer,
    pub payer: Member,
    pub payee: Member,
    pub payer_users: Vec<User>,
    pub payee_users: Vec<User>,
}

/// Thin layer over `DomainApi` that knows how resources relate.
///
/// Every call fetches fresh data; nothing is cached between events.
#[derive(Clone)]
pub struct ResourceResolver {
    api: Arc<dyn DomainApi>,
}

impl ResourceResolver {
    pub fn new(api: Arc<dyn DomainApi>) -> Self {
        Self { api }
    }

    /// Resolve the transfer named by a transfer event.
    ///
    /// Payer and payee are fetched in one batch and matched by account id,
    /// since the batch comes back in no particular order.
    pub async fn resolve_transfer(
        &self,
        ctx: &RequestContext,
        event: &Event,
        which: UserFetch,
    ) -> NotificationResult<TransferResources> {
        let payer_account = event.data("payer");
        let payee_account = event.data("payee");

        let transfer = self.api.get_transfer(ctx, event.data("transfer")).await?;

        let members = self
            .api
            .get_account_members(ctx, &[payer_account.to_string(), payee_account.to_string()])
            .await?;
        let (payer, payee) = assign_roles(members, payer_account, payee_account)?;

        let payer_users = if which.payer() {
            self.api.get_member_users(ctx, &payer.id).await?
        } else {
            Vec::new()
        };
        let payee_users = if which.payee() {
            self.api.get_member_users(ctx, &payee.id).await?
        } else {
            Vec::new()
        };

        debug!(
            transfer = %transfer.id,
            payer = %payer.id,
            payee = %payee.id,
            payer_users = payer_users.len(),
            payee_users = payee_users.len(),
            "Resolved transfer resources"
        );

        Ok(TransferResources {
            transfer,
            payer,
            payee,
            payer_users,
            payee_users,
        })
    }

    pub async fn member(&self, ctx: &RequestContext, id: &str) -> NotificationResult<Member> {
        Ok(self.api.get_member(ctx, id).await?)
    }

    pub async fn group(&self, ctx: &RequestContext) -> NotificationResult<Group> {
        Ok(self.api.get_group(ctx).await?)
    }

    pub async fn member_users(
        &self,
        ctx: &RequestContext,
        member_id: &str,
    ) -> NotificationResult<Vec<User>> {
        Ok(self.api.get_member_users(ctx, member_id).await?)
    }

    /// Fetch the account of `member` through its href, so the call reaches
    /// whichever accounting service hosts it.
    pub async fn member_account(
        &self,
        ctx: &RequestContext,
        member: &Member,
    ) -> NotificationResult<Account> {
        Ok(self.api.get_account_by_url(ctx, &member.account.href).await?)
    }
}

/// Pick the payer and payee out of an unordered member batch.
pub fn assign_roles(
    members: Vec<Member>,
    payer_account: &str,
    payee_account: &str,
) -> NotificationResult<(Member, Member)> {
    let mut payer = None;
    let mut payee = None;

    for member in members {
        if member.account.id == payer_account {
            payer = Some(member);
        } else if member.account.id == payee_account {
            payee = Some(member);
        }
    }

    let payer = payer.ok_or_else(|| NotificationError::MemberNotFound {
        role: "payer",
        account: payer_account.to_string(),
    })?;
    let payee = payee.ok_or_else(|| NotificationError::MemberNotFound {
        role: "payee",
        account: payee_account.to_string(),
    })?;

    Ok((payer, payee))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountRef;
    use crate::testing::{FakeApi, member, user};
    use event_stream::EventKind;

    fn account_member(id: &str, account: &str) -> Member {
        Member {
            id: id.to_string(),
            name: id.to_string(),
            account: AccountRef {
                id: account.to_string(),
                href: String::new(),
            },
        }
    }

    fn transfer_event() -> Event {
        Event::new("1-0", EventKind::TransferCommitted, "https://acc.example.org", "GRP1")
            .with_data("payer", "acc-1")
            .with_data("payee", "acc-2")
            .with_data("transfer", "t-1")
    }

    #[test]
    fn test_assign_roles_in_either_order() {
        let forward = vec![account_member("m-1", "acc-1"), account_member("m-2", "acc-2")];
        let (payer, payee) = assign_roles(forward, "acc-1", "acc-2").unwrap();
        assert_eq!((payer.id.as_str(), payee.id.as_str()), ("m-1", "m-2"));

        let reversed = vec![account_member("m-2", "acc-2"), account_member("m-1", "acc-1")];
        let (payer, payee) = assign_roles(reversed, "acc-1", "acc-2").unwrap();
        assert_eq!((payer.id.as_str(), payee.id.as_str()), ("m-1", "m-2"));
    }

    #[test]
    fn test_assign_roles_names_missing_side() {
        let err = assign_roles(vec![account_member("m-2", "acc-2")], "acc-1", "acc-2").unwrap_err();
        assert!(matches!(
            err,
            NotificationError::MemberNotFound { role: "payer", ref account } if account == "acc-1"
        ));

        let err = assign_roles(vec![account_member("m-1", "acc-1")], "acc-1", "acc-2").unwrap_err();
        assert_eq!(err.to_string(), "payee member for account acc-2 not found");

        let err = assign_roles(Vec::new(), "acc-1", "acc-2").unwrap_err();
        assert!(matches!(err, NotificationError::MemberNotFound { role: "payer", .. }));
    }

    #[tokio::test]
    async fn test_selective_user_fetch() {
        for (which, expected) in [
            (UserFetch::Both, vec!["m-1", "m-2"]),
            (UserFetch::PayerOnly, vec!["m-1"]),
            (UserFetch::PayeeOnly, vec!["m-2"]),
        ] {
            let api = Arc::new(
                FakeApi::new()
                    .with_member(member("m-2", "Bob", "acc-2"))
                    .with_member(member("m-1", "Ann", "acc-1"))
                    .with_users("m-1", vec![user("u-1", "ann@example.org", "en", true)])
                    .with_users("m-2", vec![user("u-2", "bob@example.org", "en", true)]),
            );
            let resolver = ResourceResolver::new(api.clone());
            let ctx = RequestContext::from_event(&transfer_event()).unwrap();

            let resources = resolver
                .resolve_transfer(&ctx, &transfer_event(), which)
                .await
                .unwrap();

            assert_eq!(resources.payer.id, "m-1");
            assert_eq!(resources.payee.id, "m-2");
            assert_eq!(api.member_user_calls(), expected);
            assert_eq!(resources.payer_users.is_empty(), !which.payer());
            assert_eq!(resources.payee_users.is_empty(), !which.payee());
        }
    }

    #[tokio::test]
    async fn test_unmatched_member_stops_before_user_fetch() {
        let api = Arc::new(FakeApi::new().with_member(member("m-1", "Ann", "acc-1")));
        let resolver = ResourceResolver::new(api.clone());
        let ctx = RequestContext::from_event(&transfer_event()).unwrap();

        let err = resolver
            .resolve_transfer(&ctx, &transfer_event(), UserFetch::Both)
            .await
            .unwrap_err();

        assert!(matches!(err, NotificationError::MemberNotFound { role: "payee", .. }));
        assert!(api.member_user_calls().is_empty());
    }
}
