use exam_core::model::{AttemptId, AttemptReview, AttemptSummary, Exam, ExamId, Question, QuestionId};
use exam_core::validation::{ExamForm, check_import_file, score_in_range};
use tracing::{info, warn};

use crate::api::{ApiClient, ImportReport};
use crate::error::{AdminServiceError, ApiError};

/// Question bank, exam assembly and grading.
#[derive(Clone)]
pub struct AdminService {
    api: ApiClient,
}

impl AdminService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Upload a spreadsheet of questions.
    ///
    /// # Errors
    ///
    /// Returns `AdminServiceError::Invalid` for anything but `.xlsx`,
    /// otherwise the API error.
    pub async fn import_questions(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ImportReport, AdminServiceError> {
        check_import_file(file_name)?;
        let report = self.api.import_questions(file_name, bytes).await?;
        info!(
            file_name,
            imported = report.imported_count,
            rejected = report.errors.len(),
            "imported questions"
        );
        Ok(report)
    }

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn list_questions(&self) -> Result<Vec<Question>, ApiError> {
        self.api.list_questions().await
    }

    /// # Errors
    ///
    /// Returns `AdminServiceError::Invalid` when the form fails validation.
    pub async fn create_exam(&self, form: &ExamForm) -> Result<Exam, AdminServiceError> {
        let new_exam = form.to_new_exam()?;
        let exam = self.api.create_exam(&new_exam).await?;
        info!(exam_id = %exam.id, title = %exam.title, "created exam");
        Ok(exam)
    }

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn add_questions(
        &self,
        exam_id: &ExamId,
        question_ids: &[QuestionId],
    ) -> Result<(), ApiError> {
        self.api.add_questions(exam_id, question_ids).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn set_published(&self, exam_id: &ExamId, published: bool) -> Result<Exam, ApiError> {
        let exam = self.api.set_published(exam_id, published).await?;
        info!(exam_id = %exam_id, published, "changed exam visibility");
        Ok(exam)
    }

    /// Create an exam, attach questions and optionally publish it.
    ///
    /// # Errors
    ///
    /// Returns `AdminServiceError::Invalid` before any request on bad input.
    /// Once the exam exists, later failures come back as
    /// `AdminServiceError::PartialAssembly` naming the created exam.
    pub async fn assemble_exam(
        &self,
        form: &ExamForm,
        question_ids: &[QuestionId],
        publish: bool,
    ) -> Result<Exam, AdminServiceError> {
        let exam = self.create_exam(form).await?;
        let partial = |source: ApiError| {
            warn!(exam_id = %exam.id, error = %source, "exam assembly stopped midway");
            AdminServiceError::PartialAssembly {
                exam_id: exam.id.to_string(),
                source,
            }
        };

        if !question_ids.is_empty() {
            self.add_questions(&exam.id, question_ids)
                .await
                .map_err(partial)?;
        }
        if publish {
            return self.set_published(&exam.id, true).await.map_err(partial);
        }
        Ok(exam)
    }

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn exam_attempts(&self, exam_id: &ExamId) -> Result<Vec<AttemptSummary>, ApiError> {
        self.api.exam_attempts(exam_id).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn attempt_review(&self, attempt_id: &AttemptId) -> Result<AttemptReview, ApiError> {
        self.api.attempt_review(attempt_id).await
    }

    /// Award a manual score; the value must lie within `0..=max_score`.
    ///
    /// # Errors
    ///
    /// Returns `AdminServiceError::Invalid` for out-of-range scores without
    /// calling the backend.
    pub async fn update_score(
        &self,
        attempt_id: &AttemptId,
        question_id: &QuestionId,
        score: f64,
        max_score: f64,
    ) -> Result<AttemptReview, AdminServiceError> {
        let score = score_in_range(score, max_score)?;
        let review = self.api.update_score(attempt_id, question_id, score).await?;
        info!(attempt_id = %attempt_id, question_id = %question_id, score, "graded answer");
        Ok(review)
    }
}
