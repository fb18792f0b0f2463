use dioxus::prelude::*;
use dioxus_router::Link;
use exam_core::model::ExamFilter;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ExamAction, ExamCardVm, map_exam_cards};

#[component]
pub fn DashboardView() -> Element {
    let ctx = use_context::<AppContext>();
    let exams = ctx.exams();
    let clock = ctx.clock();

    let mut resource = use_resource(move || {
        let exams = exams.clone();
        async move {
            let items = exams
                .list_exams(ExamFilter::published_only())
                .await
                .map_err(|err| ViewError::from_api(&err))?;
            Ok(map_exam_cards(&items, clock.now()))
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            h2 { "Available exams" }

            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(cards) => rsx! {
                    if cards.is_empty() {
                        p { class: "empty", "No exams are available right now." }
                    } else {
                        ul { class: "exam-list",
                            for card in cards {
                                ExamCard { card }
                            }
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
fn ExamCard(card: ExamCardVm) -> Element {
    rsx! {
        li { class: "exam-card",
            header {
                h3 { "{card.title}" }
                span { class: "badge", "{card.status_label}" }
            }
            if let Some(description) = card.description.clone() {
                p { "{description}" }
            }
            p { class: "muted",
                "{card.window_str} | {card.duration_str} | {card.question_count} questions"
            }
            match card.action.clone() {
                ExamAction::Start | ExamAction::Resume => rsx! {
                    Link { class: "btn btn-primary", to: Route::Exam { exam_id: card.id.clone() },
                        "{card.action.label()}"
                    }
                },
                ExamAction::ViewResult(Some(attempt_id)) => rsx! {
                    Link { class: "btn btn-secondary", to: Route::ResultDetail { attempt_id },
                        "{card.action.label()}"
                    }
                },
                ExamAction::ViewResult(None) => rsx! {
                    Link { class: "btn btn-secondary", to: Route::Results {},
                        "{card.action.label()}"
                    }
                },
                ExamAction::NotOpenYet | ExamAction::Closed => rsx! {
                    span { class: "btn btn-disabled", "{card.action.label()}" }
                },
            }
        }
    }
}
