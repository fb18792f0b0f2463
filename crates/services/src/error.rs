//! Shared error types for the services crate.

use std::fmt;

use exam_core::validation::FieldErrors;
use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Backend detail strings that mean "this attempt is closed".
const ALREADY_SUBMITTED_DETAILS: [&str; 2] = [
    "you have already submitted this exam",
    "exam is already submitted",
];

/// Why the backend refused a request that was well-formed on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    AlreadySubmitted,
    Rejected(String),
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::AlreadySubmitted => f.write_str("exam already submitted"),
            ConflictReason::Rejected(detail) => f.write_str(detail),
        }
    }
}

/// Tagged failure of one backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("not authenticated")]
    Unauthorized,
    #[error("{0}")]
    Conflict(ConflictReason),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("temporarily unavailable: {0}")]
    Transient(String),
    #[error("unexpected response ({status}): {detail}")]
    Unknown { status: u16, detail: String },
}

impl ApiError {
    /// Classify a non-success status. `code` is the optional machine-readable
    /// code from the error body and takes precedence over `detail` matching.
    #[must_use]
    pub fn from_status(status: u16, code: Option<&str>, detail: String) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            403 | 404 => ApiError::NotFound(detail),
            400 | 409 | 422 => {
                if is_already_submitted(code, &detail) {
                    ApiError::Conflict(ConflictReason::AlreadySubmitted)
                } else {
                    ApiError::Conflict(ConflictReason::Rejected(detail))
                }
            }
            408 | 429 | 500..=599 => ApiError::Transient(detail),
            _ => ApiError::Unknown { status, detail },
        }
    }

    /// Connection, timeout and other transport failures.
    #[must_use]
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_decode() {
            let status = err.status().map_or(0, |s| s.as_u16());
            return ApiError::Unknown {
                status,
                detail: err.to_string(),
            };
        }
        ApiError::Transient(err.to_string())
    }

    #[must_use]
    pub fn is_already_submitted(&self) -> bool {
        matches!(self, ApiError::Conflict(ConflictReason::AlreadySubmitted))
    }

    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Transient(_))
    }

    /// Message suitable for showing next to a form or in a banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Your session has expired. Please sign in again.".into(),
            ApiError::Conflict(reason) => reason.to_string(),
            ApiError::NotFound(detail) if !detail.is_empty() => detail.clone(),
            ApiError::NotFound(_) => "Not found".into(),
            ApiError::Transient(_) => "Server is unreachable. Please try again.".into(),
            ApiError::Unknown { detail, .. } => detail.clone(),
        }
    }
}

fn is_already_submitted(code: Option<&str>, detail: &str) -> bool {
    if let Some(code) = code {
        return code == "already_submitted";
    }
    let detail = detail.trim().to_ascii_lowercase();
    ALREADY_SUBMITTED_DETAILS
        .iter()
        .any(|known| detail.contains(known))
}

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthServiceError {
    #[error("invalid input: {0}")]
    Invalid(FieldErrors),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AdminService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdminServiceError {
    #[error("invalid input: {0}")]
    Invalid(FieldErrors),
    #[error("exam {exam_id} was created but assembling it failed: {source}")]
    PartialAssembly {
        exam_id: String,
        #[source]
        source: ApiError,
    },
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<FieldErrors> for AdminServiceError {
    fn from(errors: FieldErrors) -> Self {
        AdminServiceError::Invalid(errors)
    }
}

impl From<FieldErrors> for AuthServiceError {
    fn from(errors: FieldErrors) -> Self {
        AuthServiceError::Invalid(errors)
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
