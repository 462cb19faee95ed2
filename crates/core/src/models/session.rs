use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entry::Subject;

/// What a signed-in user is allowed to act as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Investor(Uuid),
}

/// An authenticated identity, handed explicitly to every operation that
/// needs one.
///
/// Only [`AuthService::login`](crate::services::auth_service::AuthService::login)
/// creates sessions; the fields are read-only outside the crate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    username: String,
    role: Role,
    started_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
            started_at: Utc::now(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this session may read data recorded for `subject`.
    /// Admins see everything; investors see only their own account.
    pub fn can_view(&self, subject: &Subject) -> bool {
        match (self.role, subject) {
            (Role::Admin, _) => true,
            (Role::Investor(own), Subject::Investor(id)) => own == *id,
            (Role::Investor(_), Subject::Portfolio) => false,
        }
    }
}
