//! Admin authorization gate.
//!
//! # Responsibility
//! - Decide whether the current caller may run admin operations.
//! - Verify submitted admin credentials and maintain the session flag.
//!
//! # Invariants
//! - Authorized iff the session carries `logged_in = true`.
//! - Passwords are only ever compared through their salted hash.
//! - Logout clears the flag unconditionally.

mod password;
mod session;

pub use password::{hash_password, verify_password, HashParams, PasswordError};
pub use session::{MemorySession, SessionStore, LOGGED_IN_KEY};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Username of the admin identity when none is configured.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Configured admin identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminCredentials {
    pub username: String,
    /// Argon2 PHC string produced by [`hash_password`]. Empty means no login
    /// can succeed.
    pub password_hash: String,
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password_hash: String::new(),
        }
    }
}

/// Proof that the gate admitted the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authorized {
    _private: (),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    Unauthorized,
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "admin login required"),
        }
    }
}

impl Error for AuthError {}

/// Result of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Authorized,
    InvalidUsername,
    InvalidPassword,
}

/// Admits the caller when the session carries the logged-in flag.
pub fn require_admin<S: SessionStore + ?Sized>(session: &S) -> Result<Authorized, AuthError> {
    if session.get(LOGGED_IN_KEY) == Some(true) {
        Ok(Authorized { _private: () })
    } else {
        Err(AuthError::Unauthorized)
    }
}

/// Checks submitted credentials and sets the session flag on success.
///
/// A stored hash that cannot be parsed never authorizes and is reported as
/// `InvalidPassword`.
pub fn login<S: SessionStore + ?Sized>(
    session: &mut S,
    username: &str,
    password: &str,
    credentials: &AdminCredentials,
) -> LoginOutcome {
    if username != credentials.username {
        info!("event=admin_login module=auth status=rejected reason=invalid_username");
        return LoginOutcome::InvalidUsername;
    }

    match verify_password(password, &credentials.password_hash) {
        Ok(true) => {
            session.set(LOGGED_IN_KEY, true);
            info!("event=admin_login module=auth status=ok");
            LoginOutcome::Authorized
        }
        Ok(false) => {
            info!("event=admin_login module=auth status=rejected reason=invalid_password");
            LoginOutcome::InvalidPassword
        }
        Err(err) => {
            warn!(
                "event=admin_login module=auth status=error reason=stored_hash error={}",
                err
            );
            LoginOutcome::InvalidPassword
        }
    }
}

/// Clears the logged-in flag. Safe when the flag is already absent.
pub fn logout<S: SessionStore + ?Sized>(session: &mut S) {
    session.remove(LOGGED_IN_KEY);
    info!("event=admin_logout module=auth status=ok");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> AdminCredentials {
        let params = HashParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        AdminCredentials {
            username: "admin".to_string(),
            password_hash: hash_password("default", &params).unwrap(),
        }
    }

    #[test]
    fn empty_session_is_unauthorized() {
        let session = MemorySession::new();
        assert_eq!(require_admin(&session), Err(AuthError::Unauthorized));
    }

    #[test]
    fn false_flag_is_unauthorized() {
        let mut session = MemorySession::new();
        session.set(LOGGED_IN_KEY, false);
        assert_eq!(require_admin(&session), Err(AuthError::Unauthorized));
    }

    #[test]
    fn login_distinguishes_username_and_password_failures() {
        let creds = credentials();
        let mut session = MemorySession::new();

        assert_eq!(
            login(&mut session, "root", "default", &creds),
            LoginOutcome::InvalidUsername
        );
        assert_eq!(
            login(&mut session, "admin", "defaultx", &creds),
            LoginOutcome::InvalidPassword
        );
        assert!(require_admin(&session).is_err());

        assert_eq!(
            login(&mut session, "admin", "default", &creds),
            LoginOutcome::Authorized
        );
        assert!(require_admin(&session).is_ok());
    }

    #[test]
    fn logout_clears_flag_and_tolerates_repeat() {
        let mut session = MemorySession::logged_in();
        logout(&mut session);
        assert!(require_admin(&session).is_err());
        logout(&mut session);
        assert!(session.is_empty());
    }

    #[test]
    fn unparseable_stored_hash_never_authorizes() {
        let creds = AdminCredentials {
            username: "admin".to_string(),
            password_hash: String::new(),
        };
        let mut session = MemorySession::new();
        assert_eq!(
            login(&mut session, "admin", "", &creds),
            LoginOutcome::InvalidPassword
        );
        assert!(require_admin(&session).is_err());
    }
}
