//! In-process identity provider.
//!
//! Accounts and sessions live in memory and vanish on restart. Meant for
//! development and tests, not for real credentials: passwords are kept as a
//! salted SHA-256 digest, which is not a password hashing function.
//!
//! Session tokens are stored as SHA-256 hashes together with their issue time
//! and stop resolving once the session TTL has elapsed. The raw token is
//! handed back once so it can be set as the session cookie.

use super::{normalize_email, IdentityError, IdentityProvider, SignedIn, User};
use async_trait::async_trait;
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use ulid::Ulid;

const MIN_PASSWORD_LENGTH: usize = 6;
const SALT_LENGTH: usize = 16;
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
struct Account {
    id: String,
    email: String,
    salt: [u8; SALT_LENGTH],
    password_hash: Vec<u8>,
}

impl Account {
    fn password_matches(&self, password: &SecretString) -> bool {
        self.password_hash == salted_hash(&self.salt, password.expose_secret())
    }
}

#[derive(Debug)]
struct Session {
    // normalized email
    email: String,
    issued_at: Instant,
}

#[derive(Debug)]
pub struct LocalIdentity {
    session_ttl: Duration,
    // keyed by normalized email
    accounts: RwLock<HashMap<String, Account>>,
    // keyed by token hash
    sessions: RwLock<HashMap<Vec<u8>, Session>>,
}

impl Default for LocalIdentity {
    fn default() -> Self {
        Self::with_session_ttl(DEFAULT_SESSION_TTL)
    }
}

impl LocalIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions stop resolving once `session_ttl` has passed since sign-in.
    #[must_use]
    pub fn with_session_ttl(session_ttl: Duration) -> Self {
        Self {
            session_ttl,
            accounts: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn is_expired(&self, session: &Session) -> bool {
        session.issued_at.elapsed() >= self.session_ttl
    }

    async fn open_session(&self, account: &Account) -> SignedIn {
        let token = Ulid::new().to_string();
        {
            let mut sessions = self.sessions.write().await;
            sessions.retain(|_, session| !self.is_expired(session));
            sessions.insert(
                hash(&token),
                Session {
                    email: normalize_email(&account.email),
                    issued_at: Instant::now(),
                },
            );
        }

        SignedIn {
            user: User::new(
                account.id.clone(),
                account.email.clone(),
                SecretString::from(token),
            ),
            expires_in_seconds: Some(self.session_ttl.as_secs()),
        }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    #[instrument(skip_all)]
    async fn resolve(&self, credential: &SecretString) -> Result<Option<User>, IdentityError> {
        let key = hash(credential.expose_secret());
        let email = {
            let sessions = self.sessions.read().await;
            match sessions.get(&key) {
                None => {
                    debug!("unknown session token");
                    return Ok(None);
                }
                Some(session) if self.is_expired(session) => None,
                Some(session) => Some(session.email.clone()),
            }
        };
        let Some(email) = email else {
            debug!("expired session token");
            self.sessions.write().await.remove(&key);
            return Ok(None);
        };

        let accounts = self.accounts.read().await;
        Ok(accounts
            .get(&email)
            .map(|account| User::new(account.id.clone(), account.email.clone(), credential.clone())))
    }

    #[instrument(skip(self, password))]
    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SignedIn, IdentityError> {
        let account = self
            .accounts
            .read()
            .await
            .get(&normalize_email(email))
            .cloned()
            .ok_or(IdentityError::InvalidCredentials)?;

        if !account.password_matches(password) {
            return Err(IdentityError::InvalidCredentials);
        }

        Ok(self.open_session(&account).await)
    }

    #[instrument(skip(self, password))]
    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SignedIn, IdentityError> {
        if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(IdentityError::WeakPassword(format!(
                "Password should be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let key = normalize_email(email);
        let account = {
            let mut accounts = self.accounts.write().await;
            if accounts.contains_key(&key) {
                return Err(IdentityError::EmailExists);
            }
            let mut salt = [0u8; SALT_LENGTH];
            OsRng.fill_bytes(&mut salt);
            let account = Account {
                id: Ulid::new().to_string(),
                email: email.trim().to_string(),
                password_hash: salted_hash(&salt, password.expose_secret()),
                salt,
            };
            accounts.insert(key, account.clone());
            account
        };

        Ok(self.open_session(&account).await)
    }

    async fn revoke(&self, credential: &SecretString) -> Result<(), IdentityError> {
        self.sessions
            .write()
            .await
            .remove(&hash(credential.expose_secret()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

fn hash(value: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hasher.finalize().to_vec()
}

fn salted_hash(salt: &[u8], value: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(value.as_bytes());
    hasher.finalize().to_vec()
}
