// services/infra-dash/src/session.rs
//
// Session store: login/logout/restore over a durable token.
//
// The token is a client-generated placeholder. It carries no identity, no
// expiry and no signature, so restoring a session only proves that some
// earlier login on this machine succeeded.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use svckit::config::AuthConfig;
use svckit::{metrics, InfraError, KeyValueStore, AUTH_TOKEN_KEY};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Display name for sessions restored from a bare token.
pub const RESTORED_USERNAME: &str = "Telkom User";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    LoggedOut,
    LoggingIn,
    LoggedIn,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub error: Option<String>,
    /// A login call is waiting out its delay.
    pub pending: bool,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.user.is_some() {
            SessionPhase::LoggedIn
        } else if self.pending {
            SessionPhase::LoggingIn
        } else {
            SessionPhase::LoggedOut
        }
    }
}

#[derive(Debug, Clone)]
struct Credentials {
    username: String,
    password: String,
}

struct Inner {
    state: watch::Sender<Session>,
    storage: Arc<dyn KeyValueStore>,
    credentials: Credentials,
    login_delay: Duration,
}

/// Process-wide authentication state. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, auth: &AuthConfig) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            inner: Arc::new(Inner {
                state,
                storage,
                credentials: Credentials {
                    username: auth.username.clone(),
                    password: auth.password.clone(),
                },
                login_delay: auth.login_delay(),
            }),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner.state.borrow().is_logged_in()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Overlapping calls are not serialized; whichever settles last wins.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        self.inner.state.send_modify(|s| {
            s.error = None;
            s.pending = true;
        });
        debug!("Login attempt for '{}'", username);

        tokio::time::sleep(self.inner.login_delay).await;

        let outcome = self.authenticate(username, password);
        metrics::record_login(outcome.is_ok());

        match outcome {
            Ok(user) => {
                info!("Login succeeded for '{}'", user.username);
                self.inner.state.send_replace(Session {
                    user: Some(user),
                    error: None,
                    pending: false,
                });
                true
            }
            Err(e) => {
                warn!("Login failed: {}", e);
                self.inner.state.send_replace(Session {
                    user: None,
                    error: Some(e.to_string()),
                    pending: false,
                });
                false
            }
        }
    }

    fn authenticate(&self, username: &str, password: &str) -> Result<User, InfraError> {
        let expected = &self.inner.credentials;
        if username != expected.username || password != expected.password {
            return Err(InfraError::InvalidCredentials(username.to_string()));
        }
        let token = issue_token();
        self.inner.storage.set(AUTH_TOKEN_KEY, &token)?;
        Ok(User {
            username: username.to_string(),
            token,
        })
    }

    pub fn logout(&self) {
        if let Err(e) = self.inner.storage.remove(AUTH_TOKEN_KEY) {
            warn!("Could not clear stored token: {}", e);
        }
        self.inner.state.send_replace(Session::default());
        info!("Session logged out");
    }

    /// Re-reads the durable token and aligns the in-memory session with it.
    pub fn check_auth_status(&self) {
        let token = match self.inner.storage.get(AUTH_TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!("Could not read stored token: {}", e);
                None
            }
        };

        self.inner.state.send_if_modified(|s| {
            let current = s.user.as_ref().map(|u| u.token.clone());
            match (token, current) {
                (Some(token), Some(current)) if current == token => false,
                (Some(token), _) => {
                    debug!("Restoring session from stored token");
                    s.user = Some(User {
                        username: RESTORED_USERNAME.to_string(),
                        token,
                    });
                    s.error = None;
                    true
                }
                (None, Some(_)) => {
                    debug!("Stored token disappeared, dropping session");
                    *s = Session::default();
                    true
                }
                (None, None) => false,
            }
        });
    }
}

fn issue_token() -> String {
    format!(
        "session-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use svckit::MemoryStore;

    fn store_with(storage: Arc<MemoryStore>) -> SessionStore {
        SessionStore::new(storage, &AuthConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_with_valid_credentials() {
        let storage = Arc::new(MemoryStore::new());
        let session = store_with(storage.clone());

        assert!(session.login("telkom_admin", "123").await);

        let state = session.snapshot();
        assert!(state.is_logged_in());
        assert_eq!(state.user.as_ref().unwrap().username, "telkom_admin");
        assert_eq!(state.error, None);
        assert_eq!(state.phase(), SessionPhase::LoggedIn);
        let stored = storage.get(AUTH_TOKEN_KEY).unwrap();
        assert_eq!(stored.as_deref(), Some(state.user.unwrap().token.as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_with_invalid_credentials() {
        let storage = Arc::new(MemoryStore::new());
        let session = store_with(storage.clone());

        assert!(!session.login("wrong", "wrong").await);

        let state = session.snapshot();
        assert!(!state.is_logged_in());
        assert_eq!(state.user, None);
        assert!(!state.error.unwrap().is_empty());
        assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_cleared_on_next_attempt() {
        let session = store_with(Arc::new(MemoryStore::new()));
        assert!(!session.login("telkom_admin", "nope").await);
        assert!(session.snapshot().error.is_some());

        assert!(session.login("telkom_admin", "123").await);
        assert_eq!(session.snapshot().error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_is_pending_during_delay() {
        let session = store_with(Arc::new(MemoryStore::new()));
        let task = {
            let session = session.clone();
            tokio::spawn(async move { session.login("telkom_admin", "123").await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(session.snapshot().phase(), SessionPhase::LoggingIn);

        assert!(task.await.unwrap());
        assert_eq!(session.snapshot().phase(), SessionPhase::LoggedIn);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokens_are_unique_per_login() {
        let session = store_with(Arc::new(MemoryStore::new()));
        assert!(session.login("telkom_admin", "123").await);
        let first = session.snapshot().user.unwrap().token;
        assert!(session.login("telkom_admin", "123").await);
        let second = session.snapshot().user.unwrap().token;
        assert_ne!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_resets_from_any_state() {
        let storage = Arc::new(MemoryStore::new());
        let session = store_with(storage.clone());

        session.logout();
        assert_eq!(session.snapshot(), Session::default());

        assert!(!session.login("x", "y").await);
        session.logout();
        assert_eq!(session.snapshot(), Session::default());

        assert!(session.login("telkom_admin", "123").await);
        session.logout();
        assert_eq!(session.snapshot(), Session::default());
        assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_restores_session_while_token_present() {
        let storage = Arc::new(MemoryStore::new());
        let first_tab = store_with(storage.clone());
        assert!(first_tab.login("telkom_admin", "123").await);

        let reloaded = store_with(storage.clone());
        assert!(!reloaded.is_logged_in());
        reloaded.check_auth_status();
        assert!(reloaded.is_logged_in());
        assert_eq!(reloaded.snapshot().user.unwrap().username, RESTORED_USERNAME);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_without_token_stays_logged_out() {
        let storage = Arc::new(MemoryStore::new());
        let first_tab = store_with(storage.clone());
        assert!(first_tab.login("telkom_admin", "123").await);
        storage.remove(AUTH_TOKEN_KEY).unwrap();

        let reloaded = store_with(storage.clone());
        reloaded.check_auth_status();
        assert!(!reloaded.is_logged_in());

        // The live session notices the out-of-band removal on its next check.
        first_tab.check_auth_status();
        assert!(!first_tab.is_logged_in());
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_keeps_identity_when_token_unchanged() {
        let session = store_with(Arc::new(MemoryStore::new()));
        assert!(session.login("telkom_admin", "123").await);
        let mut rx = session.subscribe();
        rx.borrow_and_update();

        session.check_auth_status();
        assert_eq!(session.snapshot().user.unwrap().username, "telkom_admin");
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_logout() {
        let session = store_with(Arc::new(MemoryStore::new()));
        assert!(session.login("telkom_admin", "123").await);
        let mut rx = session.subscribe();
        rx.borrow_and_update();

        session.logout();
        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().is_logged_in());
    }
}
