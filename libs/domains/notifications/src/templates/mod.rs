//! Email template rendering engine.
//!
//! Handlebars templates are registered once; any `EmailTemplate` data is
//! rendered into a `Message` with subject, plain text and HTML bodies.

mod data;

pub use data::{
    CallToAction, TextTemplateData, TransferCard, TransferEmailType, TransferLabels,
    TransferTemplateData, build_group_activated_template_data,
    build_group_requested_template_data, build_member_joined_template_data,
    build_member_requested_template_data, build_transfer_template_data, format_amount,
};

use crate::error::{NotificationError, NotificationResult};
use crate::models::Message;
use handlebars::Handlebars;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Template data that knows which registered templates render it.
pub trait EmailTemplate: Serialize {
    /// Name of the HTML template
    const HTML: &'static str;
    /// Name of the plain text template
    const TEXT: &'static str;

    fn subject(&self) -> &str;
}

/// Template engine for rendering email templates.
#[derive(Clone)]
pub struct TemplateEngine {
    handlebars: Arc<Handlebars<'static>>,
}

impl TemplateEngine {
    /// Create a new template engine with all templates registered.
    pub fn new() -> NotificationResult<Self> {
        let mut handlebars = Handlebars::new();

        for (name, source) in [
            ("message_html", MESSAGE_HTML_TEMPLATE),
            ("message_text", MESSAGE_TEXT_TEMPLATE),
            ("transfer_html", TRANSFER_HTML_TEMPLATE),
            ("transfer_text", TRANSFER_TEXT_TEMPLATE),
        ] {
            handlebars
                .register_template_string(name, source)
                .map_err(|e| {
                    NotificationError::TemplateError(format!("Failed to register {}: {}", name, e))
                })?;
        }

        Ok(Self {
            handlebars: Arc::new(handlebars),
        })
    }

    /// Render `data` into a message without sender or recipients.
    pub fn render<T: EmailTemplate>(&self, data: &T) -> NotificationResult<Message> {
        debug!(template = T::HTML, subject = %data.subject(), "Rendering email");

        let html = self.handlebars.render(T::HTML, data)?;
        let text = self.handlebars.render(T::TEXT, data)?;

        Ok(Message::new(data.subject(), text, html))
    }
}

// ============================================================================
// Email Templates
// ============================================================================

const MESSAGE_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="{{language}}">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{{subject}}</title>
</head>
<body style="margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background-color: #f4f4f5;">
  <table role="presentation" width="100%" cellspacing="0" cellpadding="0" style="max-width: 600px; margin: 0 auto; padding: 40px 20px;">
    <tr>
      <td style="padding-bottom: 16px; text-align: center; color: #52525b; font-size: 14px; font-weight: 600;">
        {{group_name}}
      </td>
    </tr>
    <tr>
      <td style="background-color: #ffffff; border-radius: 8px; padding: 40px; box-shadow: 0 2px 4px rgba(0,0,0,0.1);">
        <p style="color: #18181b; font-size: 16px; font-weight: 600; margin: 0 0 16px 0;">{{greeting}}</p>
        {{#each paragraphs}}
        <p style="color: #52525b; font-size: 16px; line-height: 24px; margin: 0 0 16px 0;">{{this}}</p>
        {{/each}}
        {{#if cta}}
        <table width="100%" cellspacing="0" cellpadding="0" style="margin-top: 24px;">
          <tr>
            <td style="text-align: center;">
              <a href="{{cta.url}}" style="display: inline-block; background-color: #2f7989; color: #ffffff; font-size: 16px; font-weight: 500; padding: 12px 32px; text-decoration: none; border-radius: 6px;">
                {{cta.text}}
              </a>
            </td>
          </tr>
        </table>
        {{/if}}
      </td>
    </tr>
    <tr>
      <td style="padding: 24px 0; text-align: center;">
        <p style="color: #71717a; font-size: 12px; margin: 0 0 8px 0;">{{reason}}</p>
        <p style="color: #a1a1aa; font-size: 11px; margin: 0;"><a href="{{app_url}}" style="color: #2f7989; text-decoration: none;">{{app_name}}</a></p>
      </td>
    </tr>
  </table>
</body>
</html>"#;

const MESSAGE_TEXT_TEMPLATE: &str = r#"{{{greeting}}}

{{#each paragraphs}}
{{{this}}}

{{/each}}
{{#if cta}}
{{{cta.text}}}: {{{cta.url}}}

{{/if}}
---
{{{reason}}}
{{{app_name}}} {{{app_url}}}"#;

const TRANSFER_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="{{language}}">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{{subject}}</title>
</head>
<body style="margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background-color: #f4f4f5;">
  <table role="presentation" width="100%" cellspacing="0" cellpadding="0" style="max-width: 600px; margin: 0 auto; padding: 40px 20px;">
    <tr>
      <td style="background-color: #ffffff; border-radius: 8px; padding: 40px; box-shadow: 0 2px 4px rgba(0,0,0,0.1);">
        <p style="color: #18181b; font-size: 16px; font-weight: 600; margin: 0 0 16px 0;">{{greeting}}</p>
        {{#each paragraphs}}
        <p style="color: #52525b; font-size: 16px; line-height: 24px; margin: 0 0 16px 0;">{{this}}</p>
        {{/each}}
        <table width="100%" cellspacing="0" cellpadding="0" style="margin: 24px 0; background-color: #f4f4f5; border-radius: 6px; padding: 16px;">
          <tr>
            <td colspan="2" style="text-align: center; padding-bottom: 12px;">
              {{#if transfer.positive}}
              <span style="color: #72A310; font-size: 28px; font-weight: 600;">{{transfer.amount}}</span>
              {{else}}
              <span style="color: #2f7989; font-size: 28px; font-weight: 600;">{{transfer.amount}}</span>
              {{/if}}
            </td>
          </tr>
          <tr>
            <td style="color: #71717a; font-size: 13px; padding: 4px 0;">{{transfer.labels.payer}}</td>
            <td style="color: #18181b; font-size: 14px; padding: 4px 0; text-align: right;">{{transfer.payer}}</td>
          </tr>
          <tr>
            <td style="color: #71717a; font-size: 13px; padding: 4px 0;">{{transfer.labels.payee}}</td>
            <td style="color: #18181b; font-size: 14px; padding: 4px 0; text-align: right;">{{transfer.payee}}</td>
          </tr>
          {{#if transfer.description}}
          <tr>
            <td style="color: #71717a; font-size: 13px; padding: 4px 0;">{{transfer.labels.description}}</td>
            <td style="color: #18181b; font-size: 14px; padding: 4px 0; text-align: right;">{{transfer.description}}</td>
          </tr>
          {{/if}}
          <tr>
            <td style="color: #71717a; font-size: 13px; padding: 4px 0;">{{transfer.labels.state}}</td>
            <td style="color: #18181b; font-size: 14px; padding: 4px 0; text-align: right;">{{transfer.state}}</td>
          </tr>
          {{#if transfer.date}}
          <tr>
            <td style="color: #71717a; font-size: 13px; padding: 4px 0;">{{transfer.labels.date}}</td>
            <td style="color: #18181b; font-size: 14px; padding: 4px 0; text-align: right;">{{transfer.date}}</td>
          </tr>
          {{/if}}
        </table>
        {{#if cta}}
        <table width="100%" cellspacing="0" cellpadding="0">
          <tr>
            <td style="text-align: center;">
              <a href="{{cta.url}}" style="display: inline-block; background-color: #2f7989; color: #ffffff; font-size: 16px; font-weight: 500; padding: 12px 32px; text-decoration: none; border-radius: 6px;">
                {{cta.text}}
              </a>
            </td>
          </tr>
        </table>
        {{/if}}
      </td>
    </tr>
    <tr>
      <td style="padding: 24px 0; text-align: center;">
        <p style="color: #71717a; font-size: 12px; margin: 0 0 8px 0;">{{reason}}</p>
        <p style="color: #a1a1aa; font-size: 11px; margin: 0;"><a href="{{app_url}}" style="color: #2f7989; text-decoration: none;">{{app_name}}</a></p>
      </td>
    </tr>
  </table>
</body>
</html>"#;

const TRANSFER_TEXT_TEMPLATE: &str = r#"{{{greeting}}}

{{#each paragraphs}}
{{{this}}}

{{/each}}
{{{transfer.labels.amount}}}: {{{transfer.amount}}}
{{{transfer.labels.payer}}}: {{{transfer.payer}}}
{{{transfer.labels.payee}}}: {{{transfer.payee}}}
{{#if transfer.description}}
{{{transfer.labels.description}}}: {{{transfer.description}}}
{{/if}}
{{{transfer.labels.state}}}: {{{transfer.state}}}
{{#if transfer.date}}
{{{transfer.labels.date}}}: {{{transfer.date}}}
{{/if}}

{{#if cta}}
{{{cta.text}}}: {{{cta.url}}}

{{/if}}
---
{{{reason}}}
{{{app_name}}} {{{app_url}}}"#;
