use dioxus::prelude::*;
use dioxus_router::Link;
use exam_core::model::{AttemptId, QuestionId};
use exam_core::validation::check_score;
use services::AdminServiceError;
use tracing::warn;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::components::FormError;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ReviewOptionVm, ReviewQuestionVm, format_score, map_review};

/// Save is offered only once the input differs from the awarded score.
pub(crate) fn score_changed(raw: &str, awarded: f64) -> bool {
    match raw.trim().parse::<f64>() {
        Ok(value) => (value - awarded).abs() > f64::EPSILON,
        Err(_) => raw.trim() != format_score(awarded),
    }
}

#[component]
pub fn GradingView(attempt_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let admin = ctx.admin();

    let mut resource = use_resource(use_reactive!(|(attempt_id,)| {
        let admin = admin.clone();
        async move {
            let review = admin
                .attempt_review(&AttemptId::new(attempt_id))
                .await
                .map_err(|err| ViewError::from_api(&err))?;
            Ok(map_review(&review))
        }
    }));

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page grading",
            Link { class: "btn-link", to: Route::AdminExams {}, "Back to exams" }

            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(review) => rsx! {
                    h2 { "Grading: {review.exam_title}" }
                    p { class: "muted",
                        "Submitted {review.submitted_str} | Score {review.score_str} ({review.percent_str})"
                    }
                    for question in review.questions.iter().cloned() {
                        GradeQuestion {
                            key: "{question.id}",
                            attempt_id: review.attempt_id.clone(),
                            question,
                            on_saved: move |()| resource.restart(),
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "error", "{err.message()}" }
                    button { class: "btn", onclick: move |_| resource.restart(), "Retry" }
                },
            }
        }
    }
}

#[component]
fn GradeQuestion(attempt_id: String, question: ReviewQuestionVm, on_saved: EventHandler<()>) -> Element {
    let ctx = use_context::<AppContext>();
    let awarded = question.score_awarded;
    let max_score = question.max_score;
    let mut raw = use_signal(move || format_score(awarded));
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let question_id = question.id.clone();
    let on_save = move |_: MouseEvent| {
        let score = match check_score(&raw(), max_score) {
            Ok(score) => score,
            Err(errors) => {
                error.set(errors.get("score").map(str::to_string));
                return;
            }
        };
        let admin = ctx.admin();
        let attempt_id = AttemptId::new(attempt_id.as_str());
        let question_id = QuestionId::new(question_id.as_str());
        spawn(async move {
            busy.set(true);
            error.set(None);
            let outcome = admin
                .update_score(&attempt_id, &question_id, score, max_score)
                .await;
            busy.set(false);
            match outcome {
                Ok(_) => on_saved.call(()),
                Err(AdminServiceError::Invalid(errors)) => {
                    error.set(errors.get("score").map(str::to_string));
                }
                Err(err) => {
                    warn!(error = %err, "could not save score");
                    error.set(Some(err.to_string()));
                }
            }
        });
    };

    let can_save = !busy() && score_changed(&raw(), awarded);
    rsx! {
        article { class: "question-card",
            header { class: "question-header",
                h3 { "{question.number}. {question.title}" }
                span { class: "badge", "{question.verdict}" }
            }
            p { class: "question-kind", "{question.kind_label}" }
            if question.is_text {
                p { class: "answer-text", "{question.text_answer}" }
            } else {
                ul { class: "options",
                    for option in question.options.iter().cloned() {
                        GradedOption { option }
                    }
                }
            }
            div { class: "grade-input",
                label { r#for: "score-{question.id}", "Score" }
                input {
                    id: "score-{question.id}",
                    r#type: "number",
                    min: "0",
                    max: "{question.max_score}",
                    step: "0.5",
                    value: "{raw}",
                    oninput: move |evt| raw.set(evt.value()),
                }
                span { " / {format_score(max_score)}" }
                button { class: "btn btn-primary", disabled: !can_save, onclick: on_save,
                    if busy() { "Saving..." } else { "Save" }
                }
            }
            FormError { message: error() }
        }
    }
}

#[component]
fn GradedOption(option: ReviewOptionVm) -> Element {
    rsx! {
        li { class: option.css_class(), "{option.label}" }
    }
}
