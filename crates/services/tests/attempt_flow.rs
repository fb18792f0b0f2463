use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use exam_core::model::{
    AnswerValue, AttemptId, AttemptResult, AttemptState, ExamId, QuestionId, SavedAnswer,
};
use services::attempt::{
    AttemptApi, AttemptController, AttemptFailure, AttemptPhase, StartOutcome, SubmitOutcome,
};
use services::error::{ApiError, ConflictReason};
use tokio::time::{Instant, sleep};

const DEBOUNCE: Duration = Duration::from_secs(1);

#[derive(Clone, Debug, PartialEq)]
enum Event {
    SaveSent { answer: SavedAnswer, at: Instant },
    SaveResolved { question_id: QuestionId, at: Instant },
    Submit { at: Instant },
}

struct FakeBackend {
    credential: bool,
    start_calls: AtomicUsize,
    start_errors: Mutex<Vec<ApiError>>,
    save_latency: Duration,
    fail_saves: AtomicBool,
    submit_errors: Mutex<Vec<ApiError>>,
    events: Mutex<Vec<Event>>,
}

impl FakeBackend {
    fn new() -> Self {
        Self {
            credential: true,
            start_calls: AtomicUsize::new(0),
            start_errors: Mutex::new(Vec::new()),
            save_latency: Duration::from_millis(200),
            fail_saves: AtomicBool::new(false),
            submit_errors: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    fn anonymous() -> Self {
        Self {
            credential: false,
            ..Self::new()
        }
    }

    fn failing_start(err: ApiError) -> Self {
        let backend = Self::new();
        backend.start_errors.lock().unwrap().push(err);
        backend
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn saves(&self) -> Vec<SavedAnswer> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::SaveSent { answer, .. } => Some(answer),
                _ => None,
            })
            .collect()
    }
}

fn paper() -> AttemptState {
    serde_json::from_str(
        r#"{
            "attempt_id": "abc123",
            "exam_title": "Rust 101",
            "start_time": "2024-05-01T09:00:00",
            "duration_minutes": 30,
            "remaining_seconds": 1799.6,
            "questions": [
                {"id":"q1","title":"Pick one","type":"single_choice","options":["A","B","C"],"max_score":1,"correct_answers":["B"]},
                {"id":"q2","title":"Pick many","type":"multi_choice","options":["A","B","C"],"max_score":2,"correct_answers":["A","C"]},
                {"id":"q3","title":"Explain","type":"text","options":null,"max_score":5}
            ],
            "saved_answers": [
                {"question_id":"q1","selected_options":["B"],"text_answer":null}
            ]
        }"#,
    )
    .unwrap()
}

#[async_trait]
impl AttemptApi for FakeBackend {
    fn has_credential(&self) -> bool {
        self.credential
    }

    async fn start(&self, _exam_id: &ExamId) -> Result<AttemptState, ApiError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        sleep(Duration::from_millis(50)).await;
        let next_error = self.start_errors.lock().unwrap().pop();
        match next_error {
            Some(err) => Err(err),
            None => Ok(paper()),
        }
    }

    async fn save(&self, _attempt_id: &AttemptId, answer: &SavedAnswer) -> Result<(), ApiError> {
        self.events.lock().unwrap().push(Event::SaveSent {
            answer: answer.clone(),
            at: Instant::now(),
        });
        sleep(self.save_latency).await;
        self.events.lock().unwrap().push(Event::SaveResolved {
            question_id: answer.question_id.clone(),
            at: Instant::now(),
        });
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(ApiError::Transient("connection reset".into()));
        }
        Ok(())
    }

    async fn submit(&self, attempt_id: &AttemptId) -> Result<AttemptResult, ApiError> {
        self.events
            .lock()
            .unwrap()
            .push(Event::Submit { at: Instant::now() });
        let next_error = self.submit_errors.lock().unwrap().pop();
        if let Some(err) = next_error {
            return Err(err);
        }
        Ok(AttemptResult {
            attempt_id: Some(attempt_id.clone()),
            status: None,
            total_score: 7.0,
            max_possible_score: 8.0,
        })
    }
}

fn controller(backend: &Arc<FakeBackend>) -> AttemptController {
    let api: Arc<dyn AttemptApi> = backend.clone();
    AttemptController::new(ExamId::new("exam-1"), api, DEBOUNCE)
}

async fn active(backend: &Arc<FakeBackend>) -> AttemptController {
    let ctrl = controller(backend);
    assert_eq!(ctrl.begin().await, StartOutcome::Active);
    ctrl
}

fn q(id: &str) -> QuestionId {
    QuestionId::new(id)
}

#[tokio::test(start_paused = true)]
async fn resume_hydrates_saved_answers_and_strips_keys() {
    let backend = Arc::new(FakeBackend::new());
    let ctrl = active(&backend).await;

    let snapshot = ctrl.snapshot();
    assert_eq!(snapshot.attempt_id, Some(AttemptId::new("abc123")));
    assert_eq!(snapshot.exam_title, "Rust 101");
    assert_eq!(snapshot.remaining_seconds, Some(1799));
    assert_eq!(
        snapshot.answer(&q("q1")),
        Some(&AnswerValue::Choices(vec!["B".into()]))
    );
    assert!(snapshot.questions.iter().all(|question| question.correct_answers.is_none()));
    assert!(snapshot.can_submit());
}

#[tokio::test(start_paused = true)]
async fn begin_is_idempotent() {
    let backend = Arc::new(FakeBackend::new());
    let ctrl = controller(&backend);

    let (first, second) = tokio::join!(ctrl.begin(), ctrl.begin());
    assert_eq!(first, StartOutcome::Active);
    assert_eq!(second, StartOutcome::Starting);
    assert_eq!(ctrl.begin().await, StartOutcome::Active);
    assert_eq!(backend.start_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_credential_never_calls_backend() {
    let backend = Arc::new(FakeBackend::anonymous());
    let ctrl = controller(&backend);
    assert_eq!(ctrl.begin().await, StartOutcome::LoginRequired);
    assert_eq!(backend.start_calls.load(Ordering::SeqCst), 0);
    assert_eq!(ctrl.snapshot().phase, AttemptPhase::Uninitialized);
}

#[tokio::test(start_paused = true)]
async fn start_failures_are_classified() {
    let backend = Arc::new(FakeBackend::failing_start(ApiError::Conflict(
        ConflictReason::AlreadySubmitted,
    )));
    assert_eq!(controller(&backend).begin().await, StartOutcome::AlreadySubmitted);

    let backend = Arc::new(FakeBackend::failing_start(ApiError::Unauthorized));
    assert_eq!(controller(&backend).begin().await, StartOutcome::LoginRequired);

    let backend = Arc::new(FakeBackend::failing_start(ApiError::NotFound(
        "Exam not found or not active".into(),
    )));
    let ctrl = controller(&backend);
    let outcome = ctrl.begin().await;
    assert_eq!(
        outcome,
        StartOutcome::Failed(AttemptFailure::Unavailable(
            "Exam not found or not active".into()
        ))
    );
    // Terminal: no second request.
    ctrl.begin().await;
    assert_eq!(backend.start_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn transient_start_failure_is_retryable() {
    let backend = Arc::new(FakeBackend::failing_start(ApiError::Transient("down".into())));
    let ctrl = controller(&backend);
    let StartOutcome::Failed(failure) = ctrl.begin().await else {
        panic!("expected failure");
    };
    assert!(failure.is_retryable());
    assert_eq!(ctrl.begin().await, StartOutcome::Active);
    assert_eq!(backend.start_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn rapid_edits_collapse_into_last_value() {
    let backend = Arc::new(FakeBackend::new());
    let ctrl = active(&backend).await;

    for text in ["a", "ab", "abc"] {
        assert!(ctrl.set_text(&q("q3"), text));
        sleep(Duration::from_millis(300)).await;
    }
    assert!(backend.saves().is_empty());

    sleep(Duration::from_secs(3)).await;
    let saves = backend.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].question_id, q("q3"));
    assert_eq!(saves[0].text_answer.as_deref(), Some("abc"));
    assert_eq!(ctrl.outstanding_saves(), 0);
}

#[tokio::test(start_paused = true)]
async fn saves_for_different_questions_are_independent() {
    let backend = Arc::new(FakeBackend::new());
    let ctrl = active(&backend).await;

    assert!(ctrl.select_option(&q("q1"), "C"));
    assert!(ctrl.toggle_option(&q("q2"), "A"));
    assert!(ctrl.toggle_option(&q("q2"), "C"));
    assert_eq!(ctrl.outstanding_saves(), 2);

    sleep(Duration::from_secs(3)).await;
    let mut saves = backend.saves();
    saves.sort_by(|a, b| a.question_id.cmp(&b.question_id));
    assert_eq!(saves.len(), 2);
    assert_eq!(saves[0].selected_options, Some(vec!["C".to_string()]));
    assert_eq!(
        saves[1].selected_options,
        Some(vec!["A".to_string(), "C".to_string()])
    );
}

#[tokio::test(start_paused = true)]
async fn edits_are_checked_against_question_kind() {
    let backend = Arc::new(FakeBackend::new());
    let ctrl = active(&backend).await;

    assert!(!ctrl.select_option(&q("q2"), "A"));
    assert!(!ctrl.toggle_option(&q("q1"), "A"));
    assert!(!ctrl.select_option(&q("q1"), "Z"));
    assert!(!ctrl.set_text(&q("q1"), "text"));
    assert!(!ctrl.set_text(&q("missing"), "text"));
    assert_eq!(ctrl.outstanding_saves(), 0);

    assert!(ctrl.set_text(&q("q3"), ""));
    assert_eq!(
        ctrl.snapshot().answer(&q("q3")),
        Some(&AnswerValue::Text(String::new()))
    );
}

#[tokio::test(start_paused = true)]
async fn submit_waits_for_pending_and_in_flight_saves() {
    let backend = Arc::new(FakeBackend::new());
    let ctrl = active(&backend).await;

    ctrl.set_text(&q("q3"), "first");
    // Let the debounce fire so the save is in flight, then edit again.
    sleep(DEBOUNCE + Duration::from_millis(50)).await;
    ctrl.set_text(&q("q3"), "second");
    ctrl.select_option(&q("q1"), "A");
    assert!(!ctrl.can_submit());

    let outcome = ctrl.submit().await;
    let SubmitOutcome::Submitted(result) = outcome else {
        panic!("expected submit, got {outcome:?}");
    };
    assert!((result.total_score - 7.0).abs() < f64::EPSILON);

    let events = backend.events();
    let submit_at = events
        .iter()
        .find_map(|event| match event {
            Event::Submit { at } => Some(*at),
            _ => None,
        })
        .expect("submit issued");
    let last_resolution = events
        .iter()
        .filter_map(|event| match event {
            Event::SaveResolved { at, .. } => Some(*at),
            _ => None,
        })
        .max()
        .expect("saves resolved");
    assert!(submit_at >= last_resolution);

    let text_saves: Vec<_> = backend
        .saves()
        .into_iter()
        .filter(|save| save.question_id == q("q3"))
        .collect();
    assert_eq!(text_saves.last().and_then(|s| s.text_answer.clone()).as_deref(), Some("second"));
    assert_eq!(ctrl.snapshot().phase, AttemptPhase::Submitted(Some(result)));
}

#[tokio::test(start_paused = true)]
async fn failed_autosave_is_swallowed_and_submit_proceeds() {
    let backend = Arc::new(FakeBackend::new());
    backend.fail_saves.store(true, Ordering::SeqCst);
    let ctrl = active(&backend).await;

    ctrl.set_text(&q("q3"), "answer");
    sleep(Duration::from_secs(3)).await;
    assert_eq!(ctrl.outstanding_saves(), 0);
    assert!(ctrl.snapshot().submit_error.is_none());
    assert!(matches!(ctrl.submit().await, SubmitOutcome::Submitted(_)));
}

#[tokio::test(start_paused = true)]
async fn submit_failure_keeps_attempt_editable() {
    let backend = Arc::new(FakeBackend::new());
    backend
        .submit_errors
        .lock()
        .unwrap()
        .push(ApiError::Transient("gateway timeout".into()));
    let ctrl = active(&backend).await;

    let SubmitOutcome::Failed(message) = ctrl.submit().await else {
        panic!("expected failure");
    };
    let snapshot = ctrl.snapshot();
    assert_eq!(snapshot.phase, AttemptPhase::Active);
    assert_eq!(snapshot.submit_error.as_deref(), Some(message.as_str()));

    assert!(ctrl.set_text(&q("q3"), "still here"));
    assert!(ctrl.snapshot().submit_error.is_none());
    assert!(matches!(ctrl.submit().await, SubmitOutcome::Submitted(_)));
    assert_eq!(ctrl.submit().await, SubmitOutcome::NotActive);
}

#[tokio::test(start_paused = true)]
async fn countdown_stops_at_zero() {
    let backend = Arc::new(FakeBackend::new());
    let ctrl = active(&backend).await;

    sleep(Duration::from_secs(5)).await;
    let remaining = ctrl.snapshot().remaining_seconds.unwrap();
    assert!((1794..=1795).contains(&remaining), "remaining {remaining}");

    sleep(Duration::from_secs(1_900)).await;
    assert_eq!(ctrl.snapshot().remaining_seconds, Some(0));
    assert!(ctrl.can_submit());
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_saves() {
    let backend = Arc::new(FakeBackend::new());
    let ctrl = active(&backend).await;

    ctrl.set_text(&q("q3"), "draft");
    ctrl.shutdown();
    sleep(Duration::from_secs(5)).await;
    assert!(backend.saves().is_empty());
    assert!(!ctrl.set_text(&q("q3"), "late"));
}

#[tokio::test(start_paused = true)]
async fn shutdown_releases_a_waiting_submit() {
    let backend = Arc::new(FakeBackend::new());
    let ctrl = active(&backend).await;

    ctrl.set_text(&q("q3"), "draft");
    sleep(DEBOUNCE + Duration::from_millis(50)).await;
    // In flight with a follow-up edit queued behind it.
    ctrl.set_text(&q("q3"), "second");
    assert_eq!(ctrl.outstanding_saves(), 2);

    let submitting = tokio::spawn({
        let ctrl = ctrl.clone();
        async move { ctrl.submit().await }
    });
    sleep(Duration::from_millis(10)).await;
    assert_eq!(ctrl.snapshot().phase, AttemptPhase::Submitting);

    ctrl.shutdown();
    let outcome = tokio::time::timeout(Duration::from_secs(60), submitting)
        .await
        .expect("submit returned after shutdown")
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::NotActive);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(ctrl.outstanding_saves(), 0);
    assert!(
        !backend
            .events()
            .iter()
            .any(|event| matches!(event, Event::Submit { .. }))
    );
}

#[tokio::test(start_paused = true)]
async fn navigation_moves_without_saving() {
    let backend = Arc::new(FakeBackend::new());
    let ctrl = active(&backend).await;

    assert!(!ctrl.previous());
    assert!(ctrl.next());
    assert!(ctrl.next());
    assert!(!ctrl.next());
    assert!(ctrl.snapshot().is_last());
    assert!(ctrl.go_to(0));
    assert!(!ctrl.go_to(10));
    assert_eq!(ctrl.snapshot().current_question().map(|q| q.id.clone()), Some(q("q1")));
    assert_eq!(ctrl.outstanding_saves(), 0);
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_changes() {
    let backend = Arc::new(FakeBackend::new());
    let ctrl = active(&backend).await;
    let mut changes = ctrl.subscribe();

    ctrl.toggle_option(&q("q2"), "B");
    assert!(changes.has_changed().unwrap());
    changes.borrow_and_update();
    sleep(Duration::from_millis(1_100)).await;
    assert!(changes.has_changed().unwrap());
}
