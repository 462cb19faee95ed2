// ═══════════════════════════════════════════════════════════════════
// Mail Tests — email kinds, field validation, rendering, providers
// ═══════════════════════════════════════════════════════════════════

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use investor_tracker_core::errors::CoreError;
use investor_tracker_core::mail::templates::{escape_html, EmailKind, EmailRequest, BRAND};
use investor_tracker_core::mail::traits::{MailProvider, Mailbox, OutgoingEmail};

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn request(kind: EmailKind, value: Value) -> EmailRequest {
    EmailRequest::new(kind, fields(value))
}

/// Records every message instead of delivering it.
#[derive(Default)]
struct RecordingProvider {
    sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl MailProvider for RecordingProvider {
    fn name(&self) -> &str {
        "Recording"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), CoreError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════
// EmailKind
// ═══════════════════════════════════════════════════════════════════

mod kinds {
    use super::*;

    #[test]
    fn routes_resolve_back() {
        for kind in EmailKind::ALL {
            assert_eq!(EmailKind::from_route(kind.route()), Some(kind));
        }
        assert_eq!(EmailKind::from_route("send-spam"), None);
    }

    #[test]
    fn known_routes() {
        assert_eq!(EmailKind::MeetingLink.route(), "send-google-meet-link");
        assert_eq!(EmailKind::SignInConfirmation.route(), "send-signin-confirmation");
        assert_eq!(EmailKind::Welcome.route(), "send-welcome-email");
    }

    #[test]
    fn every_kind_requires_email() {
        for kind in EmailKind::ALL {
            assert!(kind.required_fields().contains(&"email"), "{kind}");
        }
    }

    #[test]
    fn display_labels() {
        assert_eq!(EmailKind::PasswordResetCode.to_string(), "Password reset code");
        assert_eq!(EmailKind::MeetingLink.to_string(), "Meeting link");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Validation
// ═══════════════════════════════════════════════════════════════════

mod validation {
    use super::*;

    #[test]
    fn reports_every_missing_field_in_order() {
        let req = request(EmailKind::MeetingLink, json!({"email": "ana@example.com", "name": "Ana"}));
        assert_eq!(req.missing_fields(), vec!["meetLink", "date", "time"]);

        let err = req.render().unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: meetLink, date, time");
    }

    #[test]
    fn blank_null_and_non_scalar_values_count_as_missing() {
        let req = request(
            EmailKind::ConsultationConfirmation,
            json!({"email": "ana@example.com", "name": "   ", "date": null, "time": ["10:00"]}),
        );
        assert_eq!(req.missing_fields(), vec!["name", "date", "time"]);
    }

    #[test]
    fn numbers_are_accepted_as_text() {
        let req = request(EmailKind::PasswordResetCode, json!({"email": "ana@example.com", "code": 482913}));
        assert!(req.missing_fields().is_empty());
        let email = req.render().unwrap();
        assert!(email.text_body.contains("482913"));
    }

    #[test]
    fn invalid_recipient_rejected() {
        let req = request(EmailKind::PasswordChangeConfirmation, json!({"email": "nobody", "name": "Ana"}));
        assert!(matches!(req.render(), Err(CoreError::ValidationError(_))));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════════════

mod rendering {
    use super::*;

    #[test]
    fn welcome_with_temporary_password() {
        let email = request(
            EmailKind::Welcome,
            json!({"email": "ana@example.com", "name": "Ana", "username": "ana", "password": "Temp-1234"}),
        )
        .render()
        .unwrap();

        assert_eq!(email.to, Mailbox::new("ana@example.com", Some("Ana".into())));
        assert_eq!(email.subject, format!("Welcome to {BRAND}"));
        assert!(email.text_body.starts_with("Hello Ana,"));
        assert!(email.text_body.contains("Username: ana"));
        assert!(email.text_body.contains("Temporary password: Temp-1234"));
    }

    #[test]
    fn welcome_without_password() {
        let email = request(EmailKind::Welcome, json!({"email": "ana@example.com", "name": "Ana", "username": "ana"}))
            .render()
            .unwrap();
        assert!(!email.text_body.contains("Temporary password"));
    }

    #[test]
    fn reset_code_greets_generically() {
        let email = request(EmailKind::PasswordResetCode, json!({"email": "ana@example.com", "code": "ABC123"}))
            .render()
            .unwrap();
        assert!(email.text_body.starts_with("Hello there,"));
        assert_eq!(email.to.name, None);
    }

    #[test]
    fn meeting_link_includes_details() {
        let email = request(
            EmailKind::MeetingLink,
            json!({
                "email": "ana@example.com",
                "name": "Ana",
                "meetLink": "https://meet.google.com/abc-defg-hij",
                "date": "2024-05-02",
                "time": "14:30"
            }),
        )
        .render()
        .unwrap();
        assert!(email.text_body.contains("https://meet.google.com/abc-defg-hij"));
        assert!(email.text_body.contains("2024-05-02 at 14:30"));
        assert!(email.html_body.contains("<p>Join here: https://meet.google.com/abc-defg-hij</p>"));
    }

    #[test]
    fn html_body_is_escaped() {
        let email = request(
            EmailKind::SignInConfirmation,
            json!({"email": "ana@example.com", "name": "<script>alert(1)</script>"}),
        )
        .render()
        .unwrap();
        assert!(!email.html_body.contains("<script>"));
        assert!(email.html_body.contains("&lt;script&gt;"));
    }

    #[test]
    fn escape_html_covers_quotes() {
        assert_eq!(escape_html(r#"a & "b" <'c'>"#), "a &amp; &quot;b&quot; &lt;&#39;c&#39;&gt;");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Providers
// ═══════════════════════════════════════════════════════════════════

mod providers {
    use super::*;

    #[tokio::test]
    async fn rendered_email_reaches_provider() {
        let provider = RecordingProvider::default();
        let email = request(EmailKind::PasswordChangeConfirmation, json!({"email": "bo@example.com", "name": "Bo"}))
            .render()
            .unwrap();

        let dyn_provider: &dyn MailProvider = &provider;
        dyn_provider.send(&email).await.unwrap();

        let sent = provider.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to.email, "bo@example.com");
        assert_eq!(sent[0].subject, format!("Your {BRAND} password was changed"));
    }
}
