//! One handler per notified event kind.
//!
//! Handlers resolve what they need, build one message per recipient and send
//! it. A failed recipient does not stop the others; the handler reports the
//! last error it saw and earlier ones are dropped.

use crate::address::parse_email_address;
use crate::api::{DomainApi, RequestContext};
use crate::config::MailerConfig;
use crate::error::NotificationResult;
use crate::i18n::I18n;
use crate::metrics::MailerMetrics;
use crate::models::{Message, Recipient, User};
use crate::providers::EmailProvider;
use crate::resolver::{ResourceResolver, TransferResources, UserFetch};
use crate::templates::{
    TemplateEngine, TransferEmailType, build_group_activated_template_data,
    build_group_requested_template_data, build_member_joined_template_data,
    build_member_requested_template_data, build_transfer_template_data,
};
use event_stream::Event;
use std::sync::Arc;
use tracing::{debug, info};

/// Addresses and links shared by every email.
#[derive(Debug, Clone, PartialEq)]
pub struct MailSettings {
    pub app_url: String,
    /// Sender of every email
    pub from: Recipient,
    /// Platform administrator, recipient of group requests
    pub admin: Recipient,
}

impl MailSettings {
    pub fn from_config(config: &MailerConfig) -> Self {
        Self {
            app_url: config.app_url.clone(),
            from: parse_email_address(&config.app_email),
            admin: parse_email_address(&config.admin_email),
        }
    }
}

/// Keep the latest failure of a multi-recipient send.
fn keep_last(result: &mut NotificationResult<()>, outcome: NotificationResult<()>) {
    if outcome.is_err() {
        *result = outcome;
    }
}

/// Turns events into emails through an injected transport.
pub struct Notifier {
    resolver: ResourceResolver,
    templates: TemplateEngine,
    i18n: I18n,
    provider: Arc<dyn EmailProvider>,
    settings: MailSettings,
    metrics: MailerMetrics,
}

impl Notifier {
    pub fn new(
        api: Arc<dyn DomainApi>,
        provider: Arc<dyn EmailProvider>,
        settings: MailSettings,
        metrics: MailerMetrics,
    ) -> NotificationResult<Self> {
        Ok(Self {
            resolver: ResourceResolver::new(api),
            templates: TemplateEngine::new()?,
            i18n: I18n::new()?,
            provider,
            settings,
            metrics,
        })
    }

    /// Payer users get "payment sent", payee users "payment received".
    pub async fn transfer_committed(
        &self,
        ctx: &RequestContext,
        event: &Event,
    ) -> NotificationResult<()> {
        let resources = self
            .resolver
            .resolve_transfer(ctx, event, UserFetch::Both)
            .await?;

        let mut result = Ok(());
        for user in eligible(&resources.payer_users) {
            let outcome = self
                .send_transfer_email(ctx, user, &resources, TransferEmailType::PaymentSent)
                .await;
            keep_last(&mut result, outcome);
        }
        for user in eligible(&resources.payee_users) {
            let outcome = self
                .send_transfer_email(ctx, user, &resources, TransferEmailType::PaymentReceived)
                .await;
            keep_last(&mut result, outcome);
        }
        result
    }

    /// Only the payee side is told; the payer rejected it.
    pub async fn transfer_rejected(
        &self,
        ctx: &RequestContext,
        event: &Event,
    ) -> NotificationResult<()> {
        let resources = self
            .resolver
            .resolve_transfer(ctx, event, UserFetch::PayeeOnly)
            .await?;

        let mut result = Ok(());
        for user in eligible(&resources.payee_users) {
            let outcome = self
                .send_transfer_email(ctx, user, &resources, TransferEmailType::PaymentRejected)
                .await;
            keep_last(&mut result, outcome);
        }
        result
    }

    /// Only the payer side has to act on a pending transfer.
    pub async fn transfer_pending(
        &self,
        ctx: &RequestContext,
        event: &Event,
    ) -> NotificationResult<()> {
        let resources = self
            .resolver
            .resolve_transfer(ctx, event, UserFetch::PayerOnly)
            .await?;

        let mut result = Ok(());
        for user in eligible(&resources.payer_users) {
            let outcome = self
                .send_transfer_email(ctx, user, &resources, TransferEmailType::PaymentPending)
                .await;
            keep_last(&mut result, outcome);
        }
        result
    }

    pub async fn member_requested(
        &self,
        ctx: &RequestContext,
        event: &Event,
    ) -> NotificationResult<()> {
        let member = self.resolver.member(ctx, event.data("member")).await?;
        let group = self.resolver.group(ctx).await?;

        let mut result = Ok(());
        for admin in &group.admins {
            let outcome: NotificationResult<()> = async {
                let t = self.i18n.translator(admin.settings.language_tag())?;
                let data = build_member_requested_template_data(
                    &t,
                    &self.settings.app_url,
                    &member,
                    &group,
                );
                let message = self.templates.render(&data)?;
                self.send(message, "", &admin.email).await
            }
            .await;
            keep_last(&mut result, outcome);
        }
        result
    }

    pub async fn member_joined(
        &self,
        ctx: &RequestContext,
        event: &Event,
    ) -> NotificationResult<()> {
        let member = self.resolver.member(ctx, event.data("member")).await?;
        let account = self.resolver.member_account(ctx, &member).await?;
        let group = self.resolver.group(ctx).await?;
        let users = self.resolver.member_users(ctx, &member.id).await?;

        let mut result = Ok(());
        for user in eligible(&users) {
            let outcome: NotificationResult<()> = async {
                let t = self.i18n.translator(user.settings.language_tag())?;
                let data = build_member_joined_template_data(
                    &t,
                    &self.settings.app_url,
                    &member,
                    &account,
                    &group,
                );
                let message = self.templates.render(&data)?;
                self.send(message, "", &user.email).await
            }
            .await;
            keep_last(&mut result, outcome);
        }
        result
    }

    pub async fn group_activated(
        &self,
        ctx: &RequestContext,
        _event: &Event,
    ) -> NotificationResult<()> {
        let group = self.resolver.group(ctx).await?;

        let mut result = Ok(());
        for admin in &group.admins {
            let outcome: NotificationResult<()> = async {
                let t = self.i18n.translator(admin.settings.language_tag())?;
                let data = build_group_activated_template_data(&t, &self.settings.app_url, &group);
                let message = self.templates.render(&data)?;
                self.send(message, "", &admin.email).await
            }
            .await;
            keep_last(&mut result, outcome);
        }
        result
    }

    /// System notice to the platform administrator, always in English.
    pub async fn group_requested(
        &self,
        ctx: &RequestContext,
        _event: &Event,
    ) -> NotificationResult<()> {
        let group = self.resolver.group(ctx).await?;

        let t = self.i18n.translator("en")?;
        let data = build_group_requested_template_data(&t, &self.settings.app_url, &group);
        let message = self.templates.render(&data)?;

        let admin = &self.settings.admin;
        self.send(message, &admin.name, &admin.email).await
    }

    async fn send_transfer_email(
        &self,
        ctx: &RequestContext,
        user: &User,
        resources: &TransferResources,
        email_type: TransferEmailType,
    ) -> NotificationResult<()> {
        let t = self.i18n.translator(user.settings.language_tag())?;
        let data = build_transfer_template_data(
            &t,
            &self.settings.app_url,
            &ctx.code,
            &resources.payer,
            &resources.payee,
            &resources.transfer,
            email_type,
        );
        let message = self.templates.render(&data)?;

        self.send(message, &data.name, &user.email).await
    }

    async fn send(&self, mut message: Message, name: &str, email: &str) -> NotificationResult<()> {
        message.from = self.settings.from.clone();
        message.add_recipient(name, email);

        debug!(to = %email, provider = self.provider.name(), "Sending notification");
        match self.provider.send(&message).await {
            Ok(()) => {
                info!(to = %email, subject = %message.subject, "Email sent");
                self.metrics.email_sent(self.provider.name());
                Ok(())
            }
            Err(e) => {
                self.metrics.email_failed(self.provider.name());
                Err(e)
            }
        }
    }
}

fn eligible(users: &[User]) -> impl Iterator<Item = &User> {
    users.iter().filter(|user| user.wants_account_emails())
}
