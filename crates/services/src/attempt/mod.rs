//! Exam attempt session: start/resume, answering, autosave, countdown, submit.

mod autosave;
mod controller;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use exam_core::model::{AttemptId, AttemptResult, AttemptState, ExamId, SavedAnswer};

use crate::api::ApiClient;
use crate::error::ApiError;

pub use autosave::{SaveSlots, SlotAction, SlotState};
pub use controller::{
    AttemptController, AttemptFailure, AttemptPhase, AttemptSnapshot, StartOutcome, SubmitOutcome,
};

/// Backend operations an attempt needs.
#[async_trait]
pub trait AttemptApi: Send + Sync {
    /// Whether a credential is available to attach.
    fn has_credential(&self) -> bool;

    async fn start(&self, exam_id: &ExamId) -> Result<AttemptState, ApiError>;

    async fn save(&self, attempt_id: &AttemptId, answer: &SavedAnswer) -> Result<(), ApiError>;

    async fn submit(&self, attempt_id: &AttemptId) -> Result<AttemptResult, ApiError>;
}

#[async_trait]
impl AttemptApi for ApiClient {
    fn has_credential(&self) -> bool {
        self.session().is_authenticated()
    }

    async fn start(&self, exam_id: &ExamId) -> Result<AttemptState, ApiError> {
        self.start_attempt(exam_id).await
    }

    async fn save(&self, attempt_id: &AttemptId, answer: &SavedAnswer) -> Result<(), ApiError> {
        self.save_answer(attempt_id, answer).await
    }

    async fn submit(&self, attempt_id: &AttemptId) -> Result<AttemptResult, ApiError> {
        self.submit_attempt(attempt_id).await
    }
}

/// Builds one controller per exam screen visit.
#[derive(Clone)]
pub struct AttemptControllerFactory {
    api: Arc<dyn AttemptApi>,
    debounce: Duration,
}

impl AttemptControllerFactory {
    #[must_use]
    pub fn new(api: Arc<dyn AttemptApi>, debounce: Duration) -> Self {
        Self { api, debounce }
    }

    #[must_use]
    pub fn controller(&self, exam_id: ExamId) -> AttemptController {
        AttemptController::new(exam_id, Arc::clone(&self.api), self.debounce)
    }

    #[must_use]
    pub fn debounce(&self) -> Duration {
        self.debounce
    }
}
