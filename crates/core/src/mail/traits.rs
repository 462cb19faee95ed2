use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// A named email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Mailbox {
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            email: email.into(),
            name,
        }
    }
}

/// A fully rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingEmail {
    pub to: Mailbox,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Trait abstraction for transactional email delivery.
///
/// The relay only depends on this trait; swapping SendGrid for another
/// vendor means one new implementation and nothing else.
#[async_trait]
pub trait MailProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Deliver one message. Errors carry a message safe to show to clients.
    async fn send(&self, email: &OutgoingEmail) -> Result<(), CoreError>;
}
