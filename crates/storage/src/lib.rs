//! Local persistence for the exam client.
//!
//! Only the bearer token and the signed-in user's profile survive a restart.
//! Everything else is owned by the backend.

#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryRepository, SessionRecord, SessionRepository, Storage, StorageError};
