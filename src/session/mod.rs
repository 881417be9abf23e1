//! Session handling: the `auth` cookie, the route guard, and the per-request
//! auth context.

pub mod context;
pub mod cookie;
pub mod guard;

pub use self::context::{AuthContext, SessionState};
pub use self::guard::{session_guard, GuardDecision};

const DEFAULT_SESSION_TTL_SECONDS: u64 = 60 * 60;

#[derive(Clone, Debug)]
pub struct SessionConfig {
    ttl_seconds: u64,
    cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            cookie_secure: false,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_ttl_seconds(mut self, seconds: u64) -> Self {
        self.ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }
}
