//! Identity provider boundary.
//!
//! The provider issues session credentials on sign-in/sign-up and resolves a
//! presented credential back into a [`User`]. Backends: [`firebase`] (Identity
//! Toolkit REST) and [`local`] (in-process accounts for development and tests).

pub mod firebase;
pub mod local;

use async_trait::async_trait;
use regex::Regex;
use secrecy::SecretString;
use std::fmt;
use thiserror::Error;

/// Signed-in user as seen by the views and stores.
///
/// The credential is kept so backends that enforce their own access rules
/// (Firestore) can act on the user's behalf.
#[derive(Clone)]
pub struct User {
    id: String,
    email: String,
    credential: SecretString,
}

impl User {
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>, credential: SecretString) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            credential,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn credential(&self) -> &SecretString {
        &self.credential
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("credential", &"***")
            .finish()
    }
}

/// Result of a successful sign-in or sign-up.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: User,
    /// Lifetime the provider granted to the credential, if it reported one.
    pub expires_in_seconds: Option<u64>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("an account with this email already exists")]
    EmailExists,

    #[error("password is too weak: {0}")]
    WeakPassword(String),

    #[error("identity provider unreachable: {0}")]
    Unavailable(#[from] reqwest::Error),

    #[error("identity provider returned {status}: {message}")]
    Provider { status: u16, message: String },
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a session credential. `Ok(None)` means the credential is not
    /// (or no longer) valid.
    async fn resolve(&self, credential: &SecretString) -> Result<Option<User>, IdentityError>;

    async fn sign_in(&self, email: &str, password: &SecretString)
        -> Result<SignedIn, IdentityError>;

    async fn sign_up(&self, email: &str, password: &SecretString)
        -> Result<SignedIn, IdentityError>;

    /// Forget a credential on sign-out. Providers issuing self-contained
    /// tokens let them run out instead.
    async fn revoke(&self, _credential: &SecretString) -> Result<(), IdentityError> {
        Ok(())
    }

    /// Short backend name used in logs and the health report.
    fn name(&self) -> &'static str;
}

/// Lightweight email sanity check applied before calling the provider.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Lowercase and trim so lookups are stable.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
