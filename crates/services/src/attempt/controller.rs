use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use exam_core::Countdown;
use exam_core::model::{
    AnswerSheet, AnswerValue, AttemptId, AttemptResult, ExamId, Question, QuestionId,
    QuestionType, SavedAnswer,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at, sleep};
use tracing::{debug, info, warn};

use crate::attempt::AttemptApi;
use crate::attempt::autosave::{SaveSlots, SlotAction};
use crate::error::ApiError;

const TICK: Duration = Duration::from_secs(1);

/// Why an attempt could not be started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptFailure {
    /// The exam does not exist or is not open to this user. Terminal.
    Unavailable(String),
    /// Anything else; `begin` may be called again.
    StartFailed(String),
}

impl AttemptFailure {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, AttemptFailure::StartFailed(_))
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            AttemptFailure::Unavailable(message) | AttemptFailure::StartFailed(message) => message,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttemptPhase {
    Uninitialized,
    Starting,
    Active,
    Submitting,
    /// `None` when the backend reported the attempt closed without a score.
    Submitted(Option<AttemptResult>),
    Errored(AttemptFailure),
}

#[derive(Clone, Debug, PartialEq)]
pub enum StartOutcome {
    Active,
    /// A `begin` from another caller is still waiting on the backend.
    Starting,
    AlreadySubmitted,
    LoginRequired,
    Failed(AttemptFailure),
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    Submitted(AttemptResult),
    AlreadySubmitted,
    LoginRequired,
    /// The attempt stays active and editable; submit can be retried.
    Failed(String),
    /// Nothing to submit: not started, already submitting, or closed.
    NotActive,
}

/// Immutable view of the controller for rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct AttemptSnapshot {
    pub exam_id: ExamId,
    pub phase: AttemptPhase,
    pub attempt_id: Option<AttemptId>,
    pub exam_title: String,
    pub questions: Vec<Question>,
    pub answers: AnswerSheet,
    pub current: usize,
    pub remaining_seconds: Option<u64>,
    pub outstanding_saves: usize,
    pub submit_error: Option<String>,
}

impl AttemptSnapshot {
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn answer(&self, question_id: &QuestionId) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.phase == AttemptPhase::Active && self.outstanding_saves == 0
    }
}

struct Inner {
    phase: AttemptPhase,
    attempt_id: Option<AttemptId>,
    exam_title: String,
    questions: Vec<Question>,
    answers: AnswerSheet,
    current: usize,
    countdown: Option<Countdown>,
    slots: SaveSlots,
    timers: HashMap<QuestionId, JoinHandle<()>>,
    ticker: Option<JoinHandle<()>>,
    submit_error: Option<String>,
    closed: bool,
}

impl Inner {
    fn new() -> Self {
        Self {
            phase: AttemptPhase::Uninitialized,
            attempt_id: None,
            exam_title: String::new(),
            questions: Vec::new(),
            answers: AnswerSheet::new(),
            current: 0,
            countdown: None,
            slots: SaveSlots::new(),
            timers: HashMap::new(),
            ticker: None,
            submit_error: None,
            closed: false,
        }
    }

    fn stop_tasks(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
    }
}

struct Shared {
    exam_id: ExamId,
    api: Arc<dyn AttemptApi>,
    debounce: Duration,
    state: Mutex<Inner>,
    changes: watch::Sender<u64>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        let inner = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        inner.stop_tasks();
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version = version.wrapping_add(1));
    }

    fn apply_slot_action(
        self: &Arc<Self>,
        inner: &mut Inner,
        question_id: &QuestionId,
        action: SlotAction,
    ) {
        let SlotAction::Schedule { generation } = action else {
            return;
        };
        let delay = if inner.phase == AttemptPhase::Submitting {
            Duration::ZERO
        } else {
            self.debounce
        };
        if let Some(previous) = inner.timers.remove(question_id) {
            previous.abort();
        }
        let weak = Arc::downgrade(self);
        let id = question_id.clone();
        let timer = tokio::spawn(async move {
            sleep(delay).await;
            if let Some(shared) = weak.upgrade() {
                shared.fire_save(id, generation).await;
            }
        });
        inner.timers.insert(question_id.clone(), timer);
    }

    async fn fire_save(self: Arc<Self>, question_id: QuestionId, generation: u64) {
        let request = {
            let mut inner = self.lock();
            if inner.closed || !inner.slots.on_timer(&question_id, generation) {
                return;
            }
            // Detach: from here on this task is an in-flight request, which
            // must never be aborted by a later reschedule.
            inner.timers.remove(&question_id);
            let payload = inner
                .answers
                .get(&question_id)
                .map(|value| SavedAnswer::from_value(question_id.clone(), value));
            match (inner.attempt_id.clone(), payload) {
                (Some(attempt_id), Some(payload)) => Some((attempt_id, payload)),
                _ => {
                    let action = inner.slots.on_resolved(&question_id);
                    self.apply_slot_action(&mut inner, &question_id, action);
                    None
                }
            }
        };
        self.notify();
        let Some((attempt_id, payload)) = request else {
            return;
        };

        debug!(attempt_id = %attempt_id, question_id = %question_id, "autosaving answer");
        if let Err(err) = self.api.save(&attempt_id, &payload).await {
            warn!(
                attempt_id = %attempt_id,
                question_id = %question_id,
                error = %err,
                "autosave failed, dropping"
            );
        }

        {
            let mut inner = self.lock();
            let action = inner.slots.on_resolved(&question_id);
            if !inner.closed {
                self.apply_slot_action(&mut inner, &question_id, action);
            }
        }
        self.notify();
    }

    /// One countdown second. Returns `false` when the ticker should stop.
    fn tick(&self) -> bool {
        let keep_going = {
            let mut inner = self.lock();
            let running = !inner.closed
                && matches!(inner.phase, AttemptPhase::Active | AttemptPhase::Submitting);
            match inner.countdown.as_mut() {
                Some(countdown) if running => {
                    countdown.tick();
                    !countdown.is_expired()
                }
                _ => return false,
            }
        };
        self.notify();
        if !keep_going {
            info!(exam_id = %self.exam_id, "exam time is up");
        }
        keep_going
    }

    fn start_ticker(self: &Arc<Self>, inner: &mut Inner) {
        if inner.countdown.is_none_or(|countdown| countdown.is_expired()) {
            return;
        }
        let weak: Weak<Self> = Arc::downgrade(self);
        let ticker = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK, TICK);
            loop {
                interval.tick().await;
                let Some(shared) = weak.upgrade() else {
                    break;
                };
                if !shared.tick() {
                    break;
                }
            }
        });
        if let Some(previous) = inner.ticker.replace(ticker) {
            previous.abort();
        }
    }

    fn edit(
        self: &Arc<Self>,
        question_id: &QuestionId,
        accepts: impl FnOnce(&Question) -> bool,
        apply: impl FnOnce(&mut AnswerSheet) -> AnswerValue,
    ) -> bool {
        {
            let mut inner = self.lock();
            if inner.closed || inner.phase != AttemptPhase::Active {
                return false;
            }
            let Some(question) = inner.questions.iter().find(|q| &q.id == question_id) else {
                return false;
            };
            if !accepts(question) {
                return false;
            }
            apply(&mut inner.answers);
            inner.submit_error = None;
            let action = inner.slots.on_edit(question_id);
            self.apply_slot_action(&mut inner, question_id, action);
        }
        self.notify();
        true
    }
}

/// Drives one student's attempt at one exam: start or resume, local edits,
/// debounced autosave, countdown and submit.
///
/// Cloning yields another handle to the same attempt. Background timers stop
/// when [`AttemptController::shutdown`] is called or the last handle drops;
/// requests already sent are left to complete.
#[derive(Clone)]
pub struct AttemptController {
    shared: Arc<Shared>,
}

impl AttemptController {
    #[must_use]
    pub fn new(exam_id: ExamId, api: Arc<dyn AttemptApi>, debounce: Duration) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            shared: Arc::new(Shared {
                exam_id,
                api,
                debounce,
                state: Mutex::new(Inner::new()),
                changes,
            }),
        }
    }

    #[must_use]
    pub fn exam_id(&self) -> &ExamId {
        &self.shared.exam_id
    }

    /// Start or resume the attempt. Safe to call repeatedly: only the first
    /// call (or a retry after a retryable failure) reaches the backend.
    pub async fn begin(&self) -> StartOutcome {
        {
            let mut inner = self.shared.lock();
            if inner.closed {
                return StartOutcome::Failed(AttemptFailure::StartFailed(
                    "attempt view was closed".into(),
                ));
            }
            match &inner.phase {
                AttemptPhase::Starting => return StartOutcome::Starting,
                AttemptPhase::Active | AttemptPhase::Submitting => return StartOutcome::Active,
                AttemptPhase::Submitted(_) => return StartOutcome::AlreadySubmitted,
                AttemptPhase::Errored(failure) if !failure.is_retryable() => {
                    return StartOutcome::Failed(failure.clone());
                }
                AttemptPhase::Uninitialized | AttemptPhase::Errored(_) => {}
            }
            if !self.shared.api.has_credential() {
                return StartOutcome::LoginRequired;
            }
            inner.phase = AttemptPhase::Starting;
        }
        self.shared.notify();
        debug!(exam_id = %self.shared.exam_id, "starting attempt");

        let result = self.shared.api.start(&self.shared.exam_id).await;

        let outcome = {
            let mut inner = self.shared.lock();
            match result {
                Ok(state) => {
                    inner.attempt_id = Some(state.attempt_id.clone());
                    inner.exam_title.clone_from(&state.exam_title);
                    inner.questions = state.paper();
                    inner.answers = state.answer_sheet();
                    inner.countdown = Some(Countdown::from_budget(state.remaining_seconds));
                    inner.current = 0;
                    inner.phase = AttemptPhase::Active;
                    if !inner.closed {
                        self.shared.start_ticker(&mut inner);
                    }
                    info!(
                        exam_id = %self.shared.exam_id,
                        attempt_id = %state.attempt_id,
                        questions = inner.questions.len(),
                        resumed_answers = inner.answers.len(),
                        "attempt active"
                    );
                    StartOutcome::Active
                }
                Err(err) => {
                    let (phase, outcome) = classify_start_error(err);
                    debug!(exam_id = %self.shared.exam_id, ?outcome, "attempt did not start");
                    inner.phase = phase;
                    outcome
                }
            }
        };
        self.shared.notify();
        outcome
    }

    /// Single choice: `label` becomes the only selection.
    pub fn select_option(&self, question_id: &QuestionId, label: &str) -> bool {
        self.shared.edit(
            question_id,
            |q| q.kind == QuestionType::SingleChoice && q.has_option(label),
            |answers| answers.select_single(question_id, label),
        )
    }

    /// Multi choice: add `label` if absent, remove it if present.
    pub fn toggle_option(&self, question_id: &QuestionId, label: &str) -> bool {
        self.shared.edit(
            question_id,
            |q| q.kind == QuestionType::MultiChoice && q.has_option(label),
            |answers| answers.toggle(question_id, label),
        )
    }

    /// Free text; an empty string is still recorded and saved.
    pub fn set_text(&self, question_id: &QuestionId, text: impl Into<String>) -> bool {
        let text = text.into();
        self.shared.edit(
            question_id,
            |q| q.kind == QuestionType::Text,
            |answers| answers.set_text(question_id, text),
        )
    }

    pub fn go_to(&self, index: usize) -> bool {
        let moved = {
            let mut inner = self.shared.lock();
            if index < inner.questions.len() && index != inner.current {
                inner.current = index;
                true
            } else {
                false
            }
        };
        if moved {
            self.shared.notify();
        }
        moved
    }

    pub fn next(&self) -> bool {
        let current = self.shared.lock().current;
        self.go_to(current + 1)
    }

    pub fn previous(&self) -> bool {
        let current = self.shared.lock().current;
        current.checked_sub(1).is_some_and(|index| self.go_to(index))
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        let inner = self.shared.lock();
        inner.phase == AttemptPhase::Active && inner.slots.outstanding() == 0
    }

    #[must_use]
    pub fn outstanding_saves(&self) -> usize {
        self.shared.lock().slots.outstanding()
    }

    /// Flush pending saves, wait until none are outstanding, then submit.
    pub async fn submit(&self) -> SubmitOutcome {
        let attempt_id = {
            let mut inner = self.shared.lock();
            if inner.closed || inner.phase != AttemptPhase::Active {
                return SubmitOutcome::NotActive;
            }
            let Some(attempt_id) = inner.attempt_id.clone() else {
                return SubmitOutcome::NotActive;
            };
            inner.phase = AttemptPhase::Submitting;
            inner.submit_error = None;
            for (question_id, generation) in inner.slots.flush() {
                self.shared.apply_slot_action(
                    &mut inner,
                    &question_id,
                    SlotAction::Schedule { generation },
                );
            }
            attempt_id
        };
        self.shared.notify();

        let mut changes = self.shared.changes.subscribe();
        loop {
            let outstanding = {
                let mut inner = self.shared.lock();
                if inner.closed {
                    inner.phase = AttemptPhase::Active;
                    drop(inner);
                    debug!(attempt_id = %attempt_id, "controller shut down before submit");
                    self.shared.notify();
                    return SubmitOutcome::NotActive;
                }
                inner.slots.outstanding()
            };
            if outstanding == 0 {
                break;
            }
            debug!(attempt_id = %attempt_id, outstanding, "submit waiting for saves");
            if changes.changed().await.is_err() {
                break;
            }
        }

        let result = self.shared.api.submit(&attempt_id).await;

        let outcome = {
            let mut inner = self.shared.lock();
            match result {
                Ok(result) => {
                    info!(
                        attempt_id = %attempt_id,
                        total_score = result.total_score,
                        max_possible_score = result.max_possible_score,
                        "attempt submitted"
                    );
                    inner.phase = AttemptPhase::Submitted(Some(result.clone()));
                    inner.stop_tasks();
                    SubmitOutcome::Submitted(result)
                }
                Err(err) if err.is_already_submitted() => {
                    inner.phase = AttemptPhase::Submitted(None);
                    inner.stop_tasks();
                    SubmitOutcome::AlreadySubmitted
                }
                Err(ApiError::Unauthorized) => {
                    inner.phase = AttemptPhase::Active;
                    SubmitOutcome::LoginRequired
                }
                Err(err) => {
                    warn!(attempt_id = %attempt_id, error = %err, "submit failed");
                    let message = err.user_message();
                    inner.phase = AttemptPhase::Active;
                    inner.submit_error = Some(message.clone());
                    SubmitOutcome::Failed(message)
                }
            }
        };
        self.shared.notify();
        outcome
    }

    #[must_use]
    pub fn snapshot(&self) -> AttemptSnapshot {
        let inner = self.shared.lock();
        AttemptSnapshot {
            exam_id: self.shared.exam_id.clone(),
            phase: inner.phase.clone(),
            attempt_id: inner.attempt_id.clone(),
            exam_title: inner.exam_title.clone(),
            questions: inner.questions.clone(),
            answers: inner.answers.clone(),
            current: inner.current,
            remaining_seconds: inner.countdown.map(|countdown| countdown.remaining()),
            outstanding_saves: inner.slots.outstanding(),
            submit_error: inner.submit_error.clone(),
        }
    }

    /// Receiver bumped on every observable change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.changes.subscribe()
    }

    /// Stop the countdown and any pending autosave timers. A `submit` still
    /// waiting on saves returns [`SubmitOutcome::NotActive`].
    pub fn shutdown(&self) {
        {
            let mut inner = self.shared.lock();
            if inner.closed {
                return;
            }
            inner.closed = true;
            inner.stop_tasks();
            // Aborted timers and skipped follow-ups would otherwise stay
            // outstanding forever.
            inner.slots = SaveSlots::new();
        }
        debug!(exam_id = %self.shared.exam_id, "attempt controller shut down");
        self.shared.notify();
    }
}

fn classify_start_error(err: ApiError) -> (AttemptPhase, StartOutcome) {
    if err.is_already_submitted() {
        return (AttemptPhase::Submitted(None), StartOutcome::AlreadySubmitted);
    }
    match err {
        ApiError::Unauthorized => (AttemptPhase::Uninitialized, StartOutcome::LoginRequired),
        ApiError::NotFound(detail) => {
            let message = if detail.is_empty() {
                "Exam not found or not active".to_string()
            } else {
                detail
            };
            let failure = AttemptFailure::Unavailable(message);
            (AttemptPhase::Errored(failure.clone()), StartOutcome::Failed(failure))
        }
        other => {
            let failure = AttemptFailure::StartFailed(other.user_message());
            (AttemptPhase::Errored(failure.clone()), StartOutcome::Failed(failure))
        }
    }
}
