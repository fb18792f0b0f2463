use dioxus::prelude::*;
use dioxus_router::Link;
use exam_core::model::{ExamFilter, ExamId};
use tracing::warn;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::components::FormError;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{AdminExamRowVm, map_admin_exam_rows};

#[component]
pub fn AdminExamsView() -> Element {
    let ctx = use_context::<AppContext>();
    let exams = ctx.exams();
    let mut toggle_error = use_signal(|| None::<String>);

    let mut resource = use_resource(move || {
        let exams = exams.clone();
        async move {
            let items = exams
                .list_exams(ExamFilter::default())
                .await
                .map_err(|err| ViewError::from_api(&err))?;
            Ok(map_admin_exam_rows(&items))
        }
    });

    let on_toggle = use_callback(move |(exam_id, publish): (String, bool)| {
        let admin = ctx.admin();
        spawn(async move {
            toggle_error.set(None);
            match admin.set_published(&ExamId::new(exam_id), publish).await {
                Ok(_) => resource.restart(),
                Err(err) => {
                    warn!(error = %err, "could not change exam visibility");
                    toggle_error.set(Some(err.user_message()));
                }
            }
        });
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            header { class: "page-header",
                h2 { "Exams" }
                Link { class: "btn btn-primary", to: Route::Admin {}, "New exam" }
            }
            FormError { message: toggle_error() }

            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(rows) => rsx! {
                    if rows.is_empty() {
                        p { class: "empty", "No exams yet." }
                    } else {
                        table { class: "table",
                            thead {
                                tr {
                                    th { "Title" }
                                    th { "Window" }
                                    th { "Duration" }
                                    th { "Questions" }
                                    th { "Status" }
                                    th { "" }
                                }
                            }
                            tbody {
                                for row in rows {
                                    AdminExamRow { key: "{row.id}", row, on_toggle }
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
fn AdminExamRow(row: AdminExamRowVm, on_toggle: EventHandler<(String, bool)>) -> Element {
    let id = row.id.clone();
    let publish = !row.published;
    rsx! {
        tr {
            td {
                Link { to: Route::AdminExam { exam_id: row.id.clone() }, "{row.title}" }
            }
            td { "{row.window_str}" }
            td { "{row.duration_str}" }
            td { "{row.question_count}" }
            td {
                span { class: if row.published { "badge badge-live" } else { "badge" }, "{row.status_label}" }
            }
            td {
                button {
                    class: "btn btn-secondary",
                    onclick: move |_| on_toggle.call((id.clone(), publish)),
                    "{row.toggle_label}"
                }
            }
        }
    }
}
