use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::errors::CoreError;
use crate::models::entry::Subject;
use crate::models::ledger::Ledger;
use crate::models::session::{Role, Session};
use crate::services::investor_service::InvestorService;

/// Shortest password accepted when setting or changing a password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// The single administrator account.
///
/// Supplied by whoever constructs the tracker (configuration, secrets
/// store), never compiled in.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    /// Argon2 PHC string
    pub password_hash: String,
}

impl AdminCredentials {
    /// Build credentials from an already hashed password.
    pub fn from_hash(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Hash a plaintext password and build credentials from it.
    pub fn from_plaintext(username: impl Into<String>, password: &str) -> Result<Self, CoreError> {
        Ok(Self {
            username: username.into(),
            password_hash: hash_password(password)?,
        })
    }
}

/// Authenticates admins and investors and turns them into explicit
/// [`Session`] values. Holds no per-user state.
pub struct AuthService {
    admin: AdminCredentials,
    investor_service: InvestorService,
}

impl AuthService {
    pub fn new(admin: AdminCredentials) -> Self {
        Self {
            admin,
            investor_service: InvestorService::new(),
        }
    }

    /// Check a username/password pair against the admin account first, then
    /// against investor records. Unknown users and wrong passwords produce
    /// the same error.
    pub fn login(&self, ledger: &Ledger, username: &str, password: &str) -> Result<Session, CoreError> {
        let username = username.trim();

        if username.eq_ignore_ascii_case(&self.admin.username) {
            if verify_password(password, &self.admin.password_hash) {
                log::info!("Admin {username} signed in");
                return Ok(Session::new(self.admin.username.clone(), Role::Admin));
            }
            log::warn!("Failed admin sign-in attempt");
            return Err(CoreError::InvalidCredentials);
        }

        match self.investor_service.find_by_username(ledger, username) {
            Some(investor) if investor.has_password() && verify_password(password, &investor.password_hash) => {
                log::info!("Investor {} signed in", investor.username);
                Ok(Session::new(investor.username.clone(), Role::Investor(investor.id)))
            }
            _ => {
                log::warn!("Failed investor sign-in attempt for {username}");
                Err(CoreError::InvalidCredentials)
            }
        }
    }

    /// Investors may not take the admin's login name: sign-in checks the
    /// admin account first, so such an investor could never log in.
    pub fn ensure_not_admin_username(&self, username: &str) -> Result<(), CoreError> {
        if username.trim().eq_ignore_ascii_case(&self.admin.username) {
            return Err(CoreError::ValidationError(format!(
                "Username '{}' is reserved for the administrator",
                username.trim()
            )));
        }
        Ok(())
    }

    /// Fail unless the session belongs to the admin.
    pub fn require_admin(&self, session: &Session) -> Result<(), CoreError> {
        if session.is_admin() {
            Ok(())
        } else {
            Err(CoreError::Unauthorized(format!(
                "{} is not an administrator",
                session.username()
            )))
        }
    }

    /// Fail unless the session may read data recorded for `subject`.
    pub fn require_view(&self, session: &Session, subject: &Subject) -> Result<(), CoreError> {
        if session.can_view(subject) {
            Ok(())
        } else {
            Err(CoreError::Unauthorized(format!(
                "{} may not view {subject}",
                session.username()
            )))
        }
    }

    /// Set an investor's password. Admins may set anyone's; an investor may
    /// only change their own and must present the current password.
    pub fn set_investor_password(
        &self,
        ledger: &mut Ledger,
        session: &Session,
        investor_id: uuid::Uuid,
        current_password: Option<&str>,
        new_password: &str,
    ) -> Result<(), CoreError> {
        match session.role() {
            Role::Admin => {}
            Role::Investor(own) if own == investor_id => {
                let investor = self
                    .investor_service
                    .find(ledger, investor_id)
                    .ok_or_else(|| CoreError::InvestorNotFound(investor_id.to_string()))?;
                let current = current_password.unwrap_or_default();
                if !verify_password(current, &investor.password_hash) {
                    return Err(CoreError::InvalidCredentials);
                }
            }
            Role::Investor(_) => {
                return Err(CoreError::Unauthorized(format!(
                    "{} may not change another investor's password",
                    session.username()
                )));
            }
        }

        validate_new_password(new_password)?;
        let hash = hash_password(new_password)?;
        let investor = InvestorService::find_mut(ledger, investor_id)?;
        investor.password_hash = hash;
        log::info!("Password updated for investor {}", investor.username);
        Ok(())
    }
}

/// Reject passwords that are too short or only whitespace.
pub fn validate_new_password(password: &str) -> Result<(), CoreError> {
    if password.trim().is_empty() || password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::ValidationError(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password into an Argon2id PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, CoreError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| CoreError::Encryption(format!("Failed to generate password salt: {e}")))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| CoreError::Encryption(format!("Failed to encode password salt: {e}")))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::Encryption(format!("Password hashing failed: {e}")))
}

/// Check a password against a PHC string. Malformed or empty hashes never match.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
