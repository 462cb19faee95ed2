use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::CoreError;
use crate::services::investor_service::is_plausible_email;

use super::traits::{Mailbox, OutgoingEmail};

/// Brand shown in subjects and signatures.
pub const BRAND: &str = "Investor Portal";

/// The transactional emails the relay can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmailKind {
    Welcome,
    PasswordResetCode,
    SignInConfirmation,
    ConsultationConfirmation,
    MeetingLink,
    PasswordChangeConfirmation,
}

impl EmailKind {
    pub const ALL: [EmailKind; 6] = [
        EmailKind::Welcome,
        EmailKind::PasswordResetCode,
        EmailKind::SignInConfirmation,
        EmailKind::ConsultationConfirmation,
        EmailKind::MeetingLink,
        EmailKind::PasswordChangeConfirmation,
    ];

    /// Path segment of the relay endpoint, under `/api/`.
    pub fn route(&self) -> &'static str {
        match self {
            EmailKind::Welcome => "send-welcome-email",
            EmailKind::PasswordResetCode => "send-password-reset-code",
            EmailKind::SignInConfirmation => "send-signin-confirmation",
            EmailKind::ConsultationConfirmation => "send-consultation-confirmation",
            EmailKind::MeetingLink => "send-google-meet-link",
            EmailKind::PasswordChangeConfirmation => "send-password-change-confirmation",
        }
    }

    /// JSON fields that must be present and non-blank.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            EmailKind::Welcome => &["email", "name", "username"],
            EmailKind::PasswordResetCode => &["email", "code"],
            EmailKind::SignInConfirmation => &["email", "name"],
            EmailKind::ConsultationConfirmation => &["email", "name", "date", "time"],
            EmailKind::MeetingLink => &["email", "name", "meetLink", "date", "time"],
            EmailKind::PasswordChangeConfirmation => &["email", "name"],
        }
    }

    pub fn from_route(route: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.route() == route)
    }
}

impl std::fmt::Display for EmailKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EmailKind::Welcome => "Welcome",
            EmailKind::PasswordResetCode => "Password reset code",
            EmailKind::SignInConfirmation => "Sign-in confirmation",
            EmailKind::ConsultationConfirmation => "Consultation confirmation",
            EmailKind::MeetingLink => "Meeting link",
            EmailKind::PasswordChangeConfirmation => "Password change confirmation",
        };
        f.write_str(label)
    }
}

/// A relay request: the kind of email plus the JSON fields the client sent.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailRequest {
    pub kind: EmailKind,
    pub fields: Map<String, Value>,
}

impl EmailRequest {
    pub fn new(kind: EmailKind, fields: Map<String, Value>) -> Self {
        Self { kind, fields }
    }

    /// Required fields that are absent, null, blank, or not a string/number.
    pub fn missing_fields(&self) -> Vec<String> {
        self.kind
            .required_fields()
            .iter()
            .filter(|key| self.text(key).is_none())
            .map(|key| (*key).to_string())
            .collect()
    }

    /// Validate and render the message.
    pub fn render(&self) -> Result<OutgoingEmail, CoreError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(CoreError::MissingFields(missing));
        }

        let to_email = self.text("email").unwrap_or_default();
        if !is_plausible_email(&to_email) {
            return Err(CoreError::ValidationError(format!(
                "'{to_email}' is not a valid email address"
            )));
        }

        let name = self.text("name");
        let greeting = format!("Hello {},", name.as_deref().unwrap_or("there"));
        let (subject, lines) = self.body_lines();

        let text_body = format!(
            "{greeting}\n\n{}\n\n— The {BRAND} team\n",
            lines.join("\n\n")
        );
        let html_paragraphs: String = lines
            .iter()
            .map(|line| format!("<p>{}</p>", escape_html(line)))
            .collect();
        let html_body = format!(
            "<p>{}</p>{html_paragraphs}<p>&mdash; The {} team</p>",
            escape_html(&greeting),
            escape_html(BRAND)
        );

        Ok(OutgoingEmail {
            to: Mailbox::new(to_email, name),
            subject,
            text_body,
            html_body,
        })
    }

    /// Subject and body paragraphs for this kind. Required fields have
    /// already been checked.
    fn body_lines(&self) -> (String, Vec<String>) {
        let field = |key: &str| self.text(key).unwrap_or_default();

        match self.kind {
            EmailKind::Welcome => {
                let mut lines = vec![
                    format!("Your {BRAND} account has been created."),
                    format!("Username: {}", field("username")),
                ];
                if let Some(password) = self.text("password") {
                    lines.push(format!("Temporary password: {password}"));
                    lines.push("Please change your password after your first sign-in.".into());
                }
                (format!("Welcome to {BRAND}"), lines)
            }
            EmailKind::PasswordResetCode => (
                format!("Your {BRAND} password reset code"),
                vec![
                    format!("Your password reset code is: {}", field("code")),
                    "If you did not request a reset, you can ignore this email.".into(),
                ],
            ),
            EmailKind::SignInConfirmation => {
                let when = self
                    .text("time")
                    .map(|t| format!(" at {t}"))
                    .unwrap_or_default();
                (
                    format!("New sign-in to {BRAND}"),
                    vec![
                        format!("We noticed a new sign-in to your account{when}."),
                        "If this wasn't you, reset your password immediately.".into(),
                    ],
                )
            }
            EmailKind::ConsultationConfirmation => (
                "Your consultation is confirmed".to_string(),
                vec![format!(
                    "Your consultation is booked for {} at {}.",
                    field("date"),
                    field("time")
                )],
            ),
            EmailKind::MeetingLink => (
                "Your consultation meeting link".to_string(),
                vec![
                    format!(
                        "Your consultation on {} at {} will take place online.",
                        field("date"),
                        field("time")
                    ),
                    format!("Join here: {}", field("meetLink")),
                ],
            ),
            EmailKind::PasswordChangeConfirmation => (
                format!("Your {BRAND} password was changed"),
                vec![
                    "Your password was changed successfully.".into(),
                    "If you did not make this change, contact us right away.".into(),
                ],
            ),
        }
    }

    /// A field as trimmed text. Numbers are rendered; blanks count as absent.
    fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
