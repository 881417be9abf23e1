//! Auth context: the current signed-in user, or none.
//!
//! Built per request from the session credential. Resolution runs as a task
//! that publishes into a `watch` channel; readers wait for the first resolved
//! value. Dropping the context cancels a pending resolution.

use crate::identity::{IdentityProvider, User};
use secrecy::SecretString;
use std::sync::Arc;
use tokio::{
    sync::watch,
    task::{AbortHandle, JoinHandle},
};
use tracing::{error, warn};

#[derive(Clone, Debug)]
pub enum SessionState {
    Pending,
    Resolved(Option<User>),
}

impl SessionState {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

pub struct AuthContext {
    sender: Arc<watch::Sender<SessionState>>,
    receiver: watch::Receiver<SessionState>,
    resolution: AbortHandle,
    task: JoinHandle<()>,
}

impl AuthContext {
    /// Start resolving `credential` against `provider`.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn subscribe(
        provider: Arc<dyn IdentityProvider>,
        credential: Option<SecretString>,
    ) -> Self {
        let (sender, receiver) = watch::channel(SessionState::Pending);
        let sender = Arc::new(sender);
        let publisher = Arc::clone(&sender);

        let resolution = tokio::spawn(async move {
            let credential = credential?;
            match provider.resolve(&credential).await {
                Ok(user) => user,
                Err(e) => {
                    warn!("failed to resolve session with {}: {e}", provider.name());
                    None
                }
            }
        });
        let abort = resolution.abort_handle();

        // A panicking or cancelled resolution still settles the state.
        let task = tokio::spawn(async move {
            let user = match resolution.await {
                Ok(user) => user,
                Err(e) => {
                    if e.is_panic() {
                        error!("session resolution panicked");
                    }
                    None
                }
            };
            publisher.send_replace(SessionState::Resolved(user));
        });

        Self {
            sender,
            receiver,
            resolution: abort,
            task,
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.receiver.borrow().clone()
    }

    /// Receiver for session-change notifications.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.receiver.clone()
    }

    /// Wait for the first resolution and return the user it produced.
    pub async fn current_user(&self) -> Option<User> {
        let mut receiver = self.receiver.clone();
        let state = receiver
            .wait_for(|state| !state.is_pending())
            .await
            .ok()?;
        match &*state {
            SessionState::Resolved(user) => user.clone(),
            SessionState::Pending => None,
        }
    }

    pub fn sign_out(&self) {
        self.resolution.abort();
        self.task.abort();
        self.sender.send_replace(SessionState::Resolved(None));
    }
}

impl Drop for AuthContext {
    fn drop(&mut self) {
        self.resolution.abort();
        self.task.abort();
    }
}
