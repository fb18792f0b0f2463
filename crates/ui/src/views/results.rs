use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{AttemptRowVm, map_attempt_rows};

#[component]
pub fn ResultsView() -> Element {
    let ctx = use_context::<AppContext>();
    let exams = ctx.exams();

    let mut resource = use_resource(move || {
        let exams = exams.clone();
        async move {
            let items = exams
                .attempt_history()
                .await
                .map_err(|err| ViewError::from_api(&err))?;
            Ok(map_attempt_rows(&items))
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            h2 { "My results" }

            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(rows) => rsx! {
                    if rows.is_empty() {
                        p { class: "empty", "You have not taken any exams yet." }
                        Link { class: "btn btn-primary", to: Route::Dashboard {}, "Browse exams" }
                    } else {
                        table { class: "table",
                            thead {
                                tr {
                                    th { "Exam" }
                                    th { "Started" }
                                    th { "Submitted" }
                                    th { "Status" }
                                    th { "Score" }
                                    th { "" }
                                }
                            }
                            tbody {
                                for row in rows {
                                    AttemptRow { row }
                                }
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
fn AttemptRow(row: AttemptRowVm) -> Element {
    rsx! {
        tr {
            td { "{row.exam_title}" }
            td { "{row.started_str}" }
            td { "{row.submitted_str}" }
            td { "{row.status_label}" }
            td { "{row.score_str} ({row.percent_str})" }
            td {
                if row.is_submitted {
                    Link { to: Route::ResultDetail { attempt_id: row.id.clone() }, "Details" }
                }
            }
        }
    }
}
