use exam_core::model::{AttemptId, AttemptReview, AttemptSummary, Exam, ExamFilter};

use crate::api::ApiClient;
use crate::error::ApiError;

/// Student-facing read models.
#[derive(Clone)]
pub struct ExamService {
    api: ApiClient,
}

impl ExamService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Exams visible to the current user, narrowed by `filter`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn list_exams(&self, filter: ExamFilter) -> Result<Vec<Exam>, ApiError> {
        let exams = self.api.list_exams().await?;
        Ok(exams.into_iter().filter(|exam| filter.matches(exam)).collect())
    }

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn attempt_history(&self) -> Result<Vec<AttemptSummary>, ApiError> {
        self.api.attempt_history().await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn attempt_review(&self, attempt_id: &AttemptId) -> Result<AttemptReview, ApiError> {
        self.api.attempt_review(attempt_id).await
    }
}
