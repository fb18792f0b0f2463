use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ReviewQuestionVm, ReviewVm, map_review};

#[component]
pub fn ResultDetailView(attempt_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let exams = ctx.exams();

    let mut resource = use_resource(use_reactive!(|(attempt_id,)| {
        let exams = exams.clone();
        async move {
            let review = exams
                .attempt_review(&attempt_id.into())
                .await
                .map_err(|err| ViewError::from_api(&err))?;
            Ok(map_review(&review))
        }
    }));

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            Link { class: "btn-link", to: Route::Results {}, "Back to results" }

            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(review) => rsx! {
                    ReviewDetails { review }
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
pub fn ReviewDetails(review: ReviewVm) -> Element {
    rsx! {
        section { class: "review",
            h2 { "{review.exam_title}" }
            dl { class: "summary",
                dt { "Started" }
                dd { "{review.started_str}" }

                dt { "Submitted" }
                dd { "{review.submitted_str}" }

                dt { "Score" }
                dd { "{review.score_str} ({review.percent_str})" }
            }
            if review.pending_grading > 0 {
                p { class: "notice",
                    "{review.pending_grading} answer(s) are awaiting manual grading; the score may change."
                }
            }
            for question in review.questions.iter().cloned() {
                ReviewQuestion { question }
            }
        }
    }
}

#[component]
fn ReviewQuestion(question: ReviewQuestionVm) -> Element {
    rsx! {
        article { class: "question-card",
            header { class: "question-header",
                h3 { "{question.number}. {question.title}" }
                span { class: "badge", "{question.verdict}" }
            }
            p { class: "question-kind", "{question.kind_label} | {question.score_str}" }
            if question.is_text {
                p { class: "answer-text", "{question.text_answer}" }
            } else {
                ul { class: "options",
                    for option in question.options {
                        li { class: option.css_class(), "{option.label}" }
                    }
                }
            }
        }
    }
}
