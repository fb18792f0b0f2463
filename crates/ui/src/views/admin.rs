use std::collections::BTreeSet;
use std::path::Path;

use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use exam_core::model::{Question, QuestionId};
use exam_core::validation::{ExamForm, FieldErrors};
use services::{AdminServiceError, ImportReport};
use tracing::warn;

use crate::context::AppContext;
use crate::routes::{Route, use_notice};
use crate::views::components::{FormError, TextField};
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::parse_input_value;

/// Raw form inputs turned into an [`ExamForm`]; unparseable dates and
/// durations are reported as field errors next to the validator's.
pub(crate) fn exam_form_from_inputs(
    title: &str,
    description: &str,
    start: &str,
    end: &str,
    duration: &str,
) -> Result<ExamForm, FieldErrors> {
    let mut errors = FieldErrors::new();
    let start_time = parse_input_value(start);
    if start_time.is_none() {
        errors.insert("start_time", "Enter a valid start time");
    }
    let end_time = parse_input_value(end);
    if end_time.is_none() {
        errors.insert("end_time", "Enter a valid end time");
    }
    let duration_minutes = duration.trim().parse::<u32>().ok();
    if duration_minutes.is_none() {
        errors.insert("duration_minutes", "Duration must be between 1 and 1440 minutes");
    }

    match (start_time, end_time, duration_minutes) {
        (Some(start_time), Some(end_time), Some(duration_minutes)) => {
            let form = ExamForm {
                title: title.to_string(),
                description: description.to_string(),
                start_time,
                end_time,
                duration_minutes,
            };
            form.check()?;
            Ok(form)
        }
        _ => Err(errors),
    }
}

fn import_summary(report: &ImportReport) -> String {
    let rejected = report.error_messages();
    if rejected.is_empty() {
        format!("Imported {} question(s).", report.imported_count)
    } else {
        format!(
            "Imported {} question(s); {} row(s) rejected.",
            report.imported_count,
            rejected.len()
        )
    }
}

/// Admin landing page: question import, question bank and exam assembly.
#[component]
pub fn AdminView() -> Element {
    let ctx = use_context::<AppContext>();
    let admin = ctx.admin();

    let mut questions = use_resource(move || {
        let admin = admin.clone();
        async move {
            admin
                .list_questions()
                .await
                .map_err(|err| ViewError::from_api(&err))
        }
    });
    let selected = use_signal(BTreeSet::<String>::new);

    let state = view_state_from_resource(&questions);

    rsx! {
        div { class: "page admin",
            header { class: "page-header",
                h2 { "Admin overview" }
                Link { class: "btn btn-secondary", to: Route::AdminExams {}, "Manage exams" }
            }

            ImportPanel { on_imported: move |()| questions.restart() }

            section { class: "panel",
                h3 { "Question bank" }
                match state {
                    ViewState::Idle | ViewState::Loading => rsx! {
                        p { "Loading questions..." }
                    },
                    ViewState::Ready(items) => rsx! {
                        QuestionBank { items, selected }
                    },
                    ViewState::Error(err) => rsx! {
                        p { class: "error", "{err.message()}" }
                        button { class: "btn", onclick: move |_| questions.restart(), "Retry" }
                    },
                }
            }

            CreateExamPanel { selected }
        }
    }
}

#[component]
fn ImportPanel(on_imported: EventHandler<()>) -> Element {
    let ctx = use_context::<AppContext>();
    let path = use_signal(String::new);
    let mut report = use_signal(|| None::<ImportReport>);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let on_import = move |evt: FormEvent| {
        evt.prevent_default();
        if busy() {
            return;
        }
        let raw_path = path().trim().to_string();
        let admin = ctx.admin();
        spawn(async move {
            busy.set(true);
            error.set(None);
            report.set(None);
            let file_name = Path::new(&raw_path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let outcome = match tokio::fs::read(&raw_path).await {
                Ok(bytes) => admin.import_questions(&file_name, bytes).await,
                Err(err) => {
                    warn!(path = %raw_path, error = %err, "could not read import file");
                    busy.set(false);
                    error.set(Some(format!("Could not read {raw_path}: {err}")));
                    return;
                }
            };
            busy.set(false);
            match outcome {
                Ok(done) => {
                    report.set(Some(done));
                    on_imported.call(());
                }
                Err(AdminServiceError::Invalid(errors)) => {
                    error.set(errors.get("file").map(str::to_string));
                }
                Err(err) => {
                    warn!(error = %err, "question import failed");
                    error.set(Some(err.to_string()));
                }
            }
        });
    };

    rsx! {
        section { class: "panel",
            h3 { "Import questions" }
            form { class: "inline-form", onsubmit: on_import,
                TextField { label: "Spreadsheet (.xlsx) path", name: "import_path", value: path }
                button { class: "btn btn-primary", r#type: "submit", disabled: busy(),
                    if busy() { "Importing..." } else { "Import" }
                }
            }
            FormError { message: error() }
            if let Some(done) = report() {
                p { class: "import-summary", "{import_summary(&done)}" }
                ul { class: "import-errors",
                    for message in done.error_messages() {
                        li { "{message}" }
                    }
                }
            }
        }
    }
}

#[component]
fn QuestionBank(items: Vec<Question>, selected: Signal<BTreeSet<String>>) -> Element {
    let mut selected = selected;
    if items.is_empty() {
        return rsx! {
            p { class: "empty", "No questions yet. Import a spreadsheet to get started." }
        };
    }
    rsx! {
        table { class: "table",
            thead {
                tr {
                    th { "" }
                    th { "Title" }
                    th { "Type" }
                    th { "Max score" }
                }
            }
            tbody {
                for question in items {
                    {
                        let id = question.id.to_string();
                        let checked = selected.read().contains(&id);
                        rsx! {
                            tr { key: "{id}",
                                td {
                                    input {
                                        r#type: "checkbox",
                                        checked,
                                        onchange: move |_| {
                                            let mut set = selected.write();
                                            if !set.remove(&id) {
                                                set.insert(id.clone());
                                            }
                                        },
                                    }
                                }
                                td { "{question.title}" }
                                td { "{question.kind.label()}" }
                                td { "{question.max_score}" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn CreateExamPanel(selected: Signal<BTreeSet<String>>) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let notice = use_notice();
    let title = use_signal(String::new);
    let description = use_signal(String::new);
    let start = use_signal(String::new);
    let end = use_signal(String::new);
    let duration = use_signal(|| "60".to_string());
    let mut publish = use_signal(|| false);
    let mut field_errors = use_signal(FieldErrors::new);
    let mut form_error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let on_create = move |evt: FormEvent| {
        evt.prevent_default();
        if busy() {
            return;
        }
        let form = match exam_form_from_inputs(&title(), &description(), &start(), &end(), &duration()) {
            Ok(form) => form,
            Err(errors) => {
                field_errors.set(errors);
                return;
            }
        };
        field_errors.set(FieldErrors::new());
        let question_ids: Vec<QuestionId> =
            selected.read().iter().map(|id| QuestionId::new(id.as_str())).collect();
        let publish_now = publish();
        let admin = ctx.admin();
        spawn(async move {
            busy.set(true);
            form_error.set(None);
            let outcome = admin.assemble_exam(&form, &question_ids, publish_now).await;
            busy.set(false);
            match outcome {
                Ok(exam) => {
                    if let Some(notice) = notice {
                        notice.show(format!("Exam \"{}\" created.", exam.title));
                    }
                    navigator.push(Route::AdminExams {});
                }
                Err(AdminServiceError::Invalid(errors)) => field_errors.set(errors),
                Err(err) => {
                    warn!(error = %err, "exam assembly failed");
                    form_error.set(Some(err.to_string()));
                }
            }
        });
    };

    let errors = field_errors.read().clone();
    let count = selected.read().len();
    rsx! {
        section { class: "panel",
            h3 { "Create exam" }
            form { class: "exam-form", onsubmit: on_create,
                TextField {
                    label: "Title",
                    name: "title",
                    value: title,
                    error: errors.get("title").map(str::to_string),
                }
                TextField { label: "Description", name: "description", value: description }
                TextField {
                    label: "Opens at",
                    name: "start_time",
                    kind: "datetime-local",
                    value: start,
                    error: errors.get("start_time").map(str::to_string),
                }
                TextField {
                    label: "Closes at",
                    name: "end_time",
                    kind: "datetime-local",
                    value: end,
                    error: errors.get("end_time").map(str::to_string),
                }
                TextField {
                    label: "Duration (minutes)",
                    name: "duration_minutes",
                    kind: "number",
                    value: duration,
                    error: errors.get("duration_minutes").map(str::to_string),
                }
                label { class: "field checkbox-field",
                    input {
                        r#type: "checkbox",
                        checked: publish(),
                        onchange: move |evt| publish.set(evt.checked()),
                    }
                    span { "Publish immediately" }
                }
                p { class: "muted", "{count} question(s) selected" }
                FormError { message: form_error() }
                button { class: "btn btn-primary", r#type: "submit", disabled: busy(),
                    if busy() { "Creating..." } else { "Create exam" }
                }
            }
        }
    }
}
