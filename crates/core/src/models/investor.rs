use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An investor account managed by the admin.
///
/// Passwords are never stored in clear: `password_hash` holds an Argon2 PHC
/// string, or is empty for investors imported without credentials (who
/// cannot sign in until a password is set).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investor {
    pub id: Uuid,

    /// Display name
    pub name: String,

    pub email: String,

    /// Login name, unique across investors (case-insensitive)
    pub username: String,

    #[serde(default)]
    pub password_hash: String,

    /// Balance the investor's running series starts from
    #[serde(default)]
    pub starting_balance: f64,

    /// Date the investor joined the fund
    pub joined: NaiveDate,
}

impl Investor {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        username: impl Into<String>,
        starting_balance: f64,
        joined: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            username: username.into(),
            password_hash: String::new(),
            starting_balance,
            joined,
        }
    }

    pub fn has_password(&self) -> bool {
        !self.password_hash.is_empty()
    }
}

/// Editable profile fields of an investor (everything except id and credentials).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorProfile {
    pub name: String,
    pub email: String,
    pub username: String,
    pub starting_balance: f64,
    pub joined: NaiveDate,
}
