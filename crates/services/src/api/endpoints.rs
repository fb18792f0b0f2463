//! Typed wrappers for each backend operation, with the cache tags they read
//! or invalidate.

use exam_core::model::{
    AttemptId, AttemptResult, AttemptReview, AttemptState, AttemptSummary, Exam, ExamId, NewExam,
    Question, QuestionId, Role, SavedAnswer, User,
};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::cache::CacheTag;
use crate::api::client::ApiClient;
use crate::error::ApiError;

#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: User,
}

#[derive(Clone, Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: &'a str,
    pub role: Role,
}

/// Outcome of a spreadsheet import; row errors do not fail the request.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ImportReport {
    #[serde(default)]
    pub imported_count: u32,
    #[serde(default)]
    pub errors: Vec<Value>,
}

impl ImportReport {
    #[must_use]
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|err| match err {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

#[derive(Serialize)]
struct AddQuestions<'a> {
    question_ids: &'a [QuestionId],
}

#[derive(Serialize)]
struct PublishUpdate {
    is_published: bool,
}

#[derive(Serialize)]
struct GradeUpdate {
    score: f64,
}

impl ApiClient {
    //
    // ─── AUTH ──────────────────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `ApiError` for rejected credentials or transport failures.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.send_form(
            "/auth/login",
            &[("username", email), ("password", password)],
            &[CacheTag::Auth],
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `ApiError` when the backend refuses the account.
    pub async fn signup(&self, request: &SignupRequest<'_>) -> Result<User, ApiError> {
        self.send_json(Method::POST, "/auth/signup", request, &[CacheTag::Auth])
            .await
    }

    //
    // ─── EXAMS ─────────────────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn list_exams(&self) -> Result<Vec<Exam>, ApiError> {
        self.query("/exams/", CacheTag::Exam).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn create_exam(&self, exam: &NewExam) -> Result<Exam, ApiError> {
        self.send_json(Method::POST, "/exams/", exam, &[CacheTag::Exam])
            .await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn add_questions(
        &self,
        exam_id: &ExamId,
        question_ids: &[QuestionId],
    ) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .send_json(
                Method::POST,
                &format!("/exams/{exam_id}/questions"),
                &AddQuestions { question_ids },
                &[CacheTag::Exam],
            )
            .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn set_published(&self, exam_id: &ExamId, published: bool) -> Result<Exam, ApiError> {
        self.send_json(
            Method::PATCH,
            &format!("/exams/{exam_id}"),
            &PublishUpdate {
                is_published: published,
            },
            &[CacheTag::Exam],
        )
        .await
    }

    //
    // ─── QUESTIONS ─────────────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn import_questions(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ImportReport, ApiError> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        self.send_multipart("/questions/import", form, &[CacheTag::Question])
            .await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn list_questions(&self) -> Result<Vec<Question>, ApiError> {
        self.query("/questions/", CacheTag::Question).await
    }

    //
    // ─── ATTEMPTS ──────────────────────────────────────────────────────────────
    //

    /// Start or resume; the dashboard's attempt status changes as a result.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn start_attempt(&self, exam_id: &ExamId) -> Result<AttemptState, ApiError> {
        self.send_empty(
            Method::POST,
            &format!("/attempts/start/{exam_id}"),
            &[CacheTag::Exam],
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn save_answer(
        &self,
        attempt_id: &AttemptId,
        answer: &SavedAnswer,
    ) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .send_json(
                Method::POST,
                &format!("/attempts/{attempt_id}/save"),
                answer,
                &[],
            )
            .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn submit_attempt(&self, attempt_id: &AttemptId) -> Result<AttemptResult, ApiError> {
        self.send_empty(
            Method::POST,
            &format!("/attempts/{attempt_id}/submit"),
            &[CacheTag::Attempt, CacheTag::Exam],
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn attempt_history(&self) -> Result<Vec<AttemptSummary>, ApiError> {
        self.query("/attempts/history", CacheTag::Attempt).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn attempt_review(&self, attempt_id: &AttemptId) -> Result<AttemptReview, ApiError> {
        self.query(&format!("/attempts/{attempt_id}"), CacheTag::Attempt)
            .await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn exam_attempts(&self, exam_id: &ExamId) -> Result<Vec<AttemptSummary>, ApiError> {
        self.query(&format!("/attempts/exam/{exam_id}"), CacheTag::Attempt)
            .await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on failure.
    pub async fn update_score(
        &self,
        attempt_id: &AttemptId,
        question_id: &QuestionId,
        score: f64,
    ) -> Result<AttemptReview, ApiError> {
        self.send_json(
            Method::PATCH,
            &format!("/attempts/{attempt_id}/grade/{question_id}"),
            &GradeUpdate { score },
            &[CacheTag::Attempt],
        )
        .await
    }
}
