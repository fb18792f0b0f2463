//! Signed-in state shared by the API client, services, controllers and UI.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use exam_core::model::{Role, User};
use storage::repository::{SessionRecord, SessionRepository, StorageError};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Bearer token plus the profile it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Explicit session handle. Cheap to clone; all clones observe the same state.
#[derive(Clone)]
pub struct SessionContext {
    current: Arc<RwLock<Option<AuthSession>>>,
    store: Arc<dyn SessionRepository>,
    changes: Arc<watch::Sender<u64>>,
}

impl SessionContext {
    #[must_use]
    pub fn new(store: Arc<dyn SessionRepository>) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            current: Arc::new(RwLock::new(None)),
            store,
            changes: Arc::new(changes),
        }
    }

    /// Load the persisted credential. A stored profile that no longer decodes
    /// counts as logged out and is wiped.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub async fn restore(&self) -> Result<Option<AuthSession>, StorageError> {
        let Some(record) = self.store.load_session().await? else {
            return Ok(None);
        };
        match record.user() {
            Ok(user) => {
                let session = AuthSession {
                    token: record.token,
                    user,
                };
                debug!(user = %session.user.email, "restored session");
                self.replace(Some(session.clone()));
                Ok(Some(session))
            }
            Err(err) => {
                warn!(error = %err, "discarding unreadable stored profile");
                self.store.clear_session().await?;
                Ok(None)
            }
        }
    }

    /// Remember a fresh credential in memory and in local storage.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails; the in-memory session is
    /// set regardless.
    pub async fn set_credentials(&self, token: String, user: User) -> Result<(), StorageError> {
        let record = SessionRecord::new(token.clone(), &user, Utc::now())?;
        self.replace(Some(AuthSession { token, user }));
        self.store.save_session(&record).await
    }

    /// Forget the credential everywhere.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be cleared; memory is
    /// cleared first either way.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.replace(None);
        self.store.clear_session().await
    }

    #[must_use]
    pub fn current(&self) -> Option<AuthSession> {
        self.current.read().ok().and_then(|guard| guard.clone())
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.current().map(|session| session.token)
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.current().map(|session| session.user)
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.current().map(|session| session.user.role)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    /// Bumped on every sign-in and sign-out.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    fn replace(&self, next: Option<AuthSession>) {
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        self.changes.send_modify(|generation| *generation += 1);
    }
}
