//! Template data for each notification email and the builders that assemble it.

use super::EmailTemplate;
use crate::i18n::Translator;
use crate::models::{Account, Group, Member, Transfer};
use serde::Serialize;
use serde_json::json;

/// Which side of a transfer an email is addressed to, and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEmailType {
    /// Payer of a committed transfer
    PaymentSent,
    /// Payee of a committed transfer
    PaymentReceived,
    /// Payee of a rejected transfer
    PaymentRejected,
    /// Payer of a transfer awaiting acceptance
    PaymentPending,
}

impl TransferEmailType {
    /// Whether the email goes to the payer side.
    pub fn is_payer_side(self) -> bool {
        matches!(self, Self::PaymentSent | Self::PaymentPending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallToAction {
    pub text: String,
    pub url: String,
}

/// Data of the generic message email: greeting, paragraphs and an optional button.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextTemplateData {
    pub language: String,
    pub app_name: String,
    pub app_url: String,
    pub group_name: String,
    pub subject: String,
    pub greeting: String,
    pub paragraphs: Vec<String>,
    pub cta: Option<CallToAction>,
    /// Footer line explaining why the email was received
    pub reason: String,
}

impl TextTemplateData {
    fn new(t: &Translator<'_>, app_url: &str, group_name: &str) -> Self {
        Self {
            language: t.language().to_string(),
            app_name: t.t("app_name"),
            app_url: app_url.trim_end_matches('/').to_string(),
            group_name: group_name.to_string(),
            subject: String::new(),
            greeting: String::new(),
            paragraphs: Vec::new(),
            cta: None,
            reason: String::new(),
        }
    }

    fn link(&self, path: &str) -> String {
        format!("{}{}", self.app_url, path)
    }
}

impl EmailTemplate for TextTemplateData {
    const HTML: &'static str = "message_html";
    const TEXT: &'static str = "message_text";

    fn subject(&self) -> &str {
        &self.subject
    }
}

/// Localized labels of the transfer card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferLabels {
    pub payer: String,
    pub payee: String,
    pub amount: String,
    pub description: String,
    pub date: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferCard {
    pub amount: String,
    pub description: String,
    pub payer: String,
    pub payee: String,
    pub state: String,
    pub date: String,
    /// Whether the amount is credited to the recipient
    pub positive: bool,
    pub labels: TransferLabels,
}

/// Data of a transfer email: the generic message plus the transfer card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferTemplateData {
    /// Member name of the side the email is addressed to
    pub name: String,
    #[serde(flatten)]
    pub message: TextTemplateData,
    pub transfer: TransferCard,
}

impl EmailTemplate for TransferTemplateData {
    const HTML: &'static str = "transfer_html";
    const TEXT: &'static str = "transfer_text";

    fn subject(&self) -> &str {
        &self.message.subject
    }
}

/// Amounts without a fractional part are shown as integers.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{:.0}", amount)
    } else {
        format!("{:.2}", amount)
    }
}

pub fn build_transfer_template_data(
    t: &Translator<'_>,
    app_url: &str,
    code: &str,
    payer: &Member,
    payee: &Member,
    transfer: &Transfer,
    email_type: TransferEmailType,
) -> TransferTemplateData {
    let amount = format_amount(transfer.amount);
    let (recipient, counterpart) = if email_type.is_payer_side() {
        (payer, payee)
    } else {
        (payee, payer)
    };
    let args = json!({ "amount": amount, "name": counterpart.name });

    let mut message = TextTemplateData::new(t, app_url, code);
    message.greeting = t.t_with("hello_name", &json!({ "name": recipient.name }));
    message.reason = t.t_with("reason_account", &json!({ "appName": message.app_name }));

    let cta_key = match email_type {
        TransferEmailType::PaymentSent => {
            message.subject = t.t_with("transfer_sent_subject", &args);
            message.paragraphs = vec![t.t_with("transfer_sent_text", &args)];
            "transfer_view_cta"
        }
        TransferEmailType::PaymentReceived => {
            message.subject = t.t_with("transfer_received_subject", &args);
            message.paragraphs = vec![t.t_with("transfer_received_text", &args)];
            "transfer_view_cta"
        }
        TransferEmailType::PaymentRejected => {
            message.subject = t.t("transfer_rejected_subject");
            message.paragraphs = vec![
                t.t_with("transfer_rejected_text", &args),
                t.t("transfer_rejected_subtext"),
            ];
            "transfer_view_cta"
        }
        TransferEmailType::PaymentPending => {
            message.subject = t.t("transfer_pending_subject");
            message.paragraphs = vec![
                t.t_with("transfer_pending_text", &args),
                t.t("transfer_pending_subtext"),
            ];
            "transfer_respond_cta"
        }
    };
    message.cta = Some(CallToAction {
        text: t.t(cta_key),
        url: message.link(&format!("/groups/{}/transactions/{}", code, transfer.id)),
    });

    let card = TransferCard {
        amount,
        description: transfer.description.clone(),
        payer: payer.name.clone(),
        payee: payee.name.clone(),
        state: t.t(&format!("transfer_state_{}", transfer.state)),
        date: transfer
            .date()
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        positive: !email_type.is_payer_side(),
        labels: TransferLabels {
            payer: t.t("transfer_payer"),
            payee: t.t("transfer_payee"),
            amount: t.t("transfer_amount"),
            description: t.t("transfer_description"),
            date: t.t("transfer_date"),
            state: t.t("transfer_state"),
        },
    };

    TransferTemplateData {
        name: recipient.name.clone(),
        message,
        transfer: card,
    }
}

/// Email to a group admin about a member asking to join.
pub fn build_member_requested_template_data(
    t: &Translator<'_>,
    app_url: &str,
    member: &Member,
    group: &Group,
) -> TextTemplateData {
    let mut data = TextTemplateData::new(t, app_url, &group.name);
    let args = json!({ "name": member.name, "groupName": group.name, "appName": data.app_name });

    data.subject = t.t_with("member_requested_subject", &args);
    data.greeting = t.t("hello_admin");
    data.paragraphs = vec![
        t.t_with("member_requested_text", &args),
        t.t("member_requested_subtext"),
    ];
    data.cta = Some(CallToAction {
        text: t.t("member_requested_cta"),
        url: data.link(&format!("/groups/{}/admin", group.code)),
    });
    data.reason = t.t_with("reason_admin", &args);
    data
}

/// Welcome email to the users of a member whose account was activated.
pub fn build_member_joined_template_data(
    t: &Translator<'_>,
    app_url: &str,
    member: &Member,
    account: &Account,
    group: &Group,
) -> TextTemplateData {
    let mut data = TextTemplateData::new(t, app_url, &group.name);
    let args = json!({
        "name": member.name,
        "groupName": group.name,
        "code": account.code,
        "appName": data.app_name,
    });

    data.subject = t.t_with("member_joined_subject", &args);
    data.greeting = t.t_with("hello_name", &args);
    data.paragraphs = vec![
        t.t_with("member_joined_text", &args),
        t.t_with("member_joined_subtext", &args),
    ];
    data.cta = Some(CallToAction {
        text: t.t("member_joined_cta"),
        url: data.link(&format!("/groups/{}/members/{}", group.code, account.code)),
    });
    data.reason = t.t_with("reason_member", &args);
    data
}

/// Email to the admins of a group that has just been activated.
pub fn build_group_activated_template_data(
    t: &Translator<'_>,
    app_url: &str,
    group: &Group,
) -> TextTemplateData {
    let mut data = TextTemplateData::new(t, app_url, &group.name);
    let args = json!({ "groupName": group.name, "appName": data.app_name });

    data.subject = t.t_with("group_activated_subject", &args);
    data.greeting = t.t("hello_admin");
    data.paragraphs = vec![
        t.t_with("group_activated_text", &args),
        t.t_with("group_activated_subtext", &args),
    ];
    data.cta = Some(CallToAction {
        text: t.t("group_activated_cta"),
        url: data.link(&format!("/groups/{}/admin", group.code)),
    });
    data.reason = t.t_with("reason_admin", &args);
    data
}

/// Email to the platform administrator about a new group request.
pub fn build_group_requested_template_data(
    t: &Translator<'_>,
    app_url: &str,
    group: &Group,
) -> TextTemplateData {
    let mut data = TextTemplateData::new(t, app_url, &group.name);
    let args = json!({ "groupName": group.name, "code": group.code, "appName": data.app_name });

    data.subject = t.t_with("group_requested_subject", &args);
    data.greeting = t.t("hello_admin");
    data.paragraphs = vec![
        t.t_with("group_requested_text", &args),
        t.t("group_requested_subtext"),
    ];
    data.cta = Some(CallToAction {
        text: t.t("group_requested_cta"),
        url: data.link(&format!("/groups/{}", group.code)),
    });
    data.reason = t.t_with("reason_platform_admin", &args);
    data
}
