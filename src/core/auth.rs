//! Session authentication for the dashboard.
//!
//! A single administrator account is configured through the environment and
//! sessions live in process memory, keyed by a random bearer token. Restarting
//! the server invalidates every session, which is acceptable for a
//! single-shop deployment.

use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::errors::{Error, Result};

const TOKEN_LENGTH: usize = 48;

/// The authenticated user's public profile.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone)]
struct Session {
    email: String,
    expires_at: DateTime<Utc>,
}

/// In-process session store with a configured administrator account.
#[derive(Debug, Clone)]
pub struct SessionStore {
    admin_email: String,
    admin_password: String,
    expiry: Duration,
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new(admin_email: String, admin_password: String, token_expiry_days: i64) -> Self {
        Self {
            admin_email,
            admin_password,
            expiry: Duration::days(token_expiry_days),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Checks credentials and issues a new session token.
    ///
    /// # Errors
    /// Returns `Error::Unauthorized` when the credentials do not match the
    /// configured administrator account.
    pub fn login(&self, email: &str, password: &str) -> Result<String> {
        if email != self.admin_email || password != self.admin_password {
            return Err(Error::Unauthorized);
        }

        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();

        let session = Session {
            email: email.to_string(),
            expires_at: Utc::now() + self.expiry,
        };

        let mut sessions = self.sessions.write().map_err(|_| Error::Config {
            message: "session store lock poisoned".to_string(),
        })?;
        sessions.insert(token.clone(), session);

        Ok(token)
    }

    /// Resolves a bearer token to the user's profile.
    ///
    /// Expired sessions are removed on access rather than by a background
    /// sweep.
    pub fn verify(&self, token: &str) -> Result<UserProfile> {
        let mut sessions = self.sessions.write().map_err(|_| Error::Config {
            message: "session store lock poisoned".to_string(),
        })?;

        match sessions.get(token) {
            Some(session) if session.expires_at > Utc::now() => Ok(UserProfile {
                email: session.email.clone(),
                name: "Admin".to_string(),
                role: "admin".to_string(),
            }),
            Some(_) => {
                sessions.remove(token);
                Err(Error::Unauthorized)
            }
            None => Err(Error::Unauthorized),
        }
    }

    /// Ends one session. Unknown tokens are ignored so logout is idempotent.
    pub fn logout(&self, token: &str) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(|_| Error::Config {
            message: "session store lock poisoned".to_string(),
        })?;
        sessions.remove(token);
        Ok(())
    }

    /// Ends every session except the one making the request.
    pub fn logout_all_except(&self, token: &str) -> Result<usize> {
        let mut sessions = self.sessions.write().map_err(|_| Error::Config {
            message: "session store lock poisoned".to_string(),
        })?;
        let before = sessions.len();
        sessions.retain(|key, _| key == token);
        Ok(before.saturating_sub(sessions.len()))
    }

    /// Number of live sessions, for the settings page.
    pub fn active_count(&self) -> Result<usize> {
        let sessions = self.sessions.read().map_err(|_| Error::Config {
            message: "session store lock poisoned".to_string(),
        })?;
        let now = Utc::now();
        Ok(sessions.values().filter(|s| s.expires_at > now).count())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new("admin@gmail.com".to_string(), "admin123".to_string(), 7)
    }

    #[test]
    fn test_login_issues_distinct_tokens() {
        let store = store();
        let first = store.login("admin@gmail.com", "admin123").unwrap();
        let second = store.login("admin@gmail.com", "admin123").unwrap();
        assert_ne!(first, second);
        assert_eq!(first.len(), TOKEN_LENGTH);
    }

    #[test]
    fn test_login_rejects_bad_credentials() {
        let store = store();
        assert!(matches!(
            store.login("admin@gmail.com", "wrong").unwrap_err(),
            Error::Unauthorized
        ));
        assert!(matches!(
            store.login("someone@else.com", "admin123").unwrap_err(),
            Error::Unauthorized
        ));
    }

    #[test]
    fn test_verify_round_trip() {
        let store = store();
        let token = store.login("admin@gmail.com", "admin123").unwrap();
        let profile = store.verify(&token).unwrap();
        assert_eq!(profile.email, "admin@gmail.com");
        assert_eq!(profile.role, "admin");
    }

    #[test]
    fn test_logout_invalidates_token() {
        let store = store();
        let token = store.login("admin@gmail.com", "admin123").unwrap();
        store.logout(&token).unwrap();
        assert!(matches!(store.verify(&token).unwrap_err(), Error::Unauthorized));
        // Logging out again is fine
        store.logout(&token).unwrap();
    }

    #[test]
    fn test_expired_session_is_rejected() {
        let store = SessionStore::new("admin@gmail.com".to_string(), "admin123".to_string(), -1);
        let token = store.login("admin@gmail.com", "admin123").unwrap();
        assert!(matches!(store.verify(&token).unwrap_err(), Error::Unauthorized));
    }

    #[test]
    fn test_logout_all_except_keeps_current() {
        let store = store();
        let keep = store.login("admin@gmail.com", "admin123").unwrap();
        let drop_a = store.login("admin@gmail.com", "admin123").unwrap();
        let drop_b = store.login("admin@gmail.com", "admin123").unwrap();

        let removed = store.logout_all_except(&keep).unwrap();
        assert_eq!(removed, 2);
        assert!(store.verify(&keep).is_ok());
        assert!(store.verify(&drop_a).is_err());
        assert!(store.verify(&drop_b).is_err());
    }
}
