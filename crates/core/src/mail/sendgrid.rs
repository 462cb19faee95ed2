use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::traits::{MailProvider, Mailbox, OutgoingEmail};

const BASE_URL: &str = "https://api.sendgrid.com/v3";

/// SendGrid v3 Mail Send API provider.
///
/// - **Auth**: bearer API key
/// - **Endpoint**: `POST /mail/send`, answers `202 Accepted` on success
/// - Plain-text and HTML parts are sent together; SendGrid requires the
///   plain-text part first.
pub struct SendGridProvider {
    client: Client,
    api_key: String,
    from: Mailbox,
    base_url: String,
}

impl SendGridProvider {
    pub fn new(api_key: String, from: Mailbox) -> Self {
        Self::with_base_url(api_key, from, BASE_URL)
    }

    /// Point the provider at another API root (sandboxes, local mocks).
    pub fn with_base_url(api_key: String, from: Mailbox, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key,
            from,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_address(&self) -> &Mailbox {
        &self.from
    }
}

// ── SendGrid API request/response types ─────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct SendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

impl<'a> From<&'a Mailbox> for Address<'a> {
    fn from(mailbox: &'a Mailbox) -> Self {
        Self {
            email: &mailbox.email,
            name: mailbox.name.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    mime: &'a str,
    value: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl<'a> SendRequest<'a> {
    pub(crate) fn build(from: &'a Mailbox, email: &'a OutgoingEmail) -> Self {
        Self {
            personalizations: vec![Personalization {
                to: vec![Address::from(&email.to)],
            }],
            from: Address::from(from),
            subject: &email.subject,
            content: vec![
                Content {
                    mime: "text/plain",
                    value: &email.text_body,
                },
                Content {
                    mime: "text/html",
                    value: &email.html_body,
                },
            ],
        }
    }
}

#[async_trait]
impl MailProvider for SendGridProvider {
    fn name(&self) -> &str {
        "SendGrid"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), CoreError> {
        let url = format!("{}/mail/send", self.base_url);
        let body = SendRequest::build(&self.from, email);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            log::debug!("SendGrid accepted '{}' ({status})", email.subject);
            return Ok(());
        }

        let text = resp.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorResponse>(&text)
            .ok()
            .map(|r| {
                r.errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP {status}"));

        Err(CoreError::Mail {
            provider: "SendGrid".into(),
            message: detail,
        })
    }
}
