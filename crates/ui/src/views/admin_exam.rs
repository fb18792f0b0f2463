use dioxus::prelude::*;
use dioxus_router::Link;
use exam_core::model::ExamId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::map_attempt_rows;

/// Attempts submitted against one exam, each linking to its grading page.
#[component]
pub fn AdminExamView(exam_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let admin = ctx.admin();

    let mut resource = use_resource(use_reactive!(|(exam_id,)| {
        let admin = admin.clone();
        async move {
            let items = admin
                .exam_attempts(&ExamId::new(exam_id))
                .await
                .map_err(|err| ViewError::from_api(&err))?;
            Ok(map_attempt_rows(&items))
        }
    }));

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            Link { class: "btn-link", to: Route::AdminExams {}, "Back to exams" }
            h2 { "Attempts" }

            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(rows) => rsx! {
                    if rows.is_empty() {
                        p { class: "empty", "Nobody has taken this exam yet." }
                    } else {
                        table { class: "table",
                            thead {
                                tr {
                                    th { "Started" }
                                    th { "Submitted" }
                                    th { "Status" }
                                    th { "Score" }
                                    th { "" }
                                }
                            }
                            tbody {
                                for row in rows {
                                    tr { key: "{row.id}",
                                        td { "{row.started_str}" }
                                        td { "{row.submitted_str}" }
                                        td { "{row.status_label}" }
                                        td { "{row.score_str}" }
                                        td {
                                            if row.is_submitted {
                                                Link { to: Route::Grading { attempt_id: row.id.clone() }, "Grade" }
                                            }
                                        }
                                    }
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
