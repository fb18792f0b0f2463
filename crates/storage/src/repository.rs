use async_trait::async_trait;
use chrono::{DateTime, Utc};
use exam_core::model::User;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted credential pair.
///
/// The profile is kept as the raw JSON text the backend returned so a record
/// written by an older client still loads; decoding happens on read via
/// [`SessionRecord::user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token: String,
    pub user_json: String,
    pub saved_at: DateTime<Utc>,
}

impl SessionRecord {
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the profile cannot be encoded.
    pub fn new(
        token: impl Into<String>,
        user: &User,
        saved_at: DateTime<Utc>,
    ) -> Result<Self, StorageError> {
        let user_json =
            serde_json::to_string(user).map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(Self {
            token: token.into(),
            user_json,
            saved_at,
        })
    }

    /// Decode the stored profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` when the stored text is not a valid profile.
    pub fn user(&self) -> Result<User, StorageError> {
        serde_json::from_str(&self.user_json).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

/// Repository contract for the persisted credential.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Fetch the stored credential, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn load_session(&self) -> Result<Option<SessionRecord>, StorageError>;

    /// Persist or replace the stored credential.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_session(&self, record: &SessionRecord) -> Result<(), StorageError>;

    /// Remove the stored credential. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn clear_session(&self) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    session: Arc<Mutex<Option<SessionRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store, as if a previous run had signed in.
    #[must_use]
    pub fn with_session(record: SessionRecord) -> Self {
        Self {
            session: Arc::new(Mutex::new(Some(record))),
        }
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn load_session(&self) -> Result<Option<SessionRecord>, StorageError> {
        let guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(record.clone());
        Ok(())
    }

    async fn clear_session(&self) -> Result<(), StorageError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.take();
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    #[must_use]
    pub fn from_repository(repo: impl SessionRepository + 'static) -> Self {
        Self {
            sessions: Arc::new(repo),
        }
    }
}
