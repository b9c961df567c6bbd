//! Microsoft Graph mail backend
//!
//! Sends through `POST {base}/users/{sender}/sendMail` with a bearer token
//! from the configured [`TokenProvider`]. Graph answers `202 Accepted` on
//! success; any other status is reported as [`EmailError::Rejected`].

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use super::{Attachment, Email, EmailError, EmailSender};
use crate::config::MailSettings;
use crate::oauth2::TokenProvider;

/// Graph `sendMail` backend
#[derive(Clone)]
pub struct GraphMailBackend {
    http: reqwest::Client,
    base_url: String,
    sender: String,
    save_to_sent_items: bool,
    tokens: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for GraphMailBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphMailBackend")
            .field("base_url", &self.base_url)
            .field("sender", &self.sender)
            .field("save_to_sent_items", &self.save_to_sent_items)
            .finish_non_exhaustive()
    }
}

impl GraphMailBackend {
    /// Send as `sender` through the Graph API at `base_url`
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        sender: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sender: sender.into(),
            save_to_sent_items: true,
            tokens,
        }
    }

    /// Build from mail settings
    #[must_use]
    pub fn from_settings(settings: &MailSettings, tokens: Arc<dyn TokenProvider>) -> Self {
        Self::new(&settings.graph_base_url, &settings.sender, tokens)
            .save_to_sent_items(settings.save_to_sent_items)
    }

    /// Whether Graph keeps a copy in the sender's Sent Items
    #[must_use]
    pub const fn save_to_sent_items(mut self, save: bool) -> Self {
        self.save_to_sent_items = save;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/users/{}/sendMail", self.base_url, self.sender)
    }
}

#[async_trait]
impl EmailSender for GraphMailBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        email.validate()?;

        let token = self.tokens.access_token().await?;
        let payload = SendMailRequest::from_email(&email, self.save_to_sent_items);

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(token.secret())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "Mail API rejected message");
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            to = ?email.to,
            cc = ?email.cc,
            subject = ?email.subject,
            attachment = ?email.attachment.as_ref().map(|a| a.name.as_str()),
            "Report email sent"
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMailRequest<'a> {
    message: Message<'a>,
    save_to_sent_items: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Message<'a> {
    subject: &'a str,
    body: Body<'a>,
    to_recipients: Vec<Recipient<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cc_recipients: Vec<Recipient<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<FileAttachment<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Body<'a> {
    content_type: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Recipient<'a> {
    email_address: EmailAddress<'a>,
}

#[derive(Debug, Serialize)]
struct EmailAddress<'a> {
    address: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileAttachment<'a> {
    #[serde(rename = "@odata.type")]
    odata_type: &'static str,
    name: &'a str,
    content_type: &'a str,
    content_bytes: &'a str,
}

impl<'a> SendMailRequest<'a> {
    fn from_email(email: &'a Email, save_to_sent_items: bool) -> Self {
        let recipient = |address: &'a String| Recipient {
            email_address: EmailAddress { address },
        };

        Self {
            message: Message {
                subject: email.subject.as_deref().unwrap_or_default(),
                body: Body {
                    content_type: "HTML",
                    content: email.html.as_deref().unwrap_or_default(),
                },
                to_recipients: email.to.iter().map(recipient).collect(),
                cc_recipients: email.cc.iter().map(recipient).collect(),
                attachments: email.attachment.iter().map(FileAttachment::from).collect(),
            },
            save_to_sent_items,
        }
    }
}

impl<'a> From<&'a Attachment> for FileAttachment<'a> {
    fn from(attachment: &'a Attachment) -> Self {
        Self {
            odata_type: "#microsoft.graph.fileAttachment",
            name: &attachment.name,
            content_type: &attachment.content_type,
            content_bytes: &attachment.content_base64,
        }
    }
}
