use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use exam_core::model::{ExamId, QuestionId};
use services::{AttemptController, AttemptPhase, AttemptSnapshot, StartOutcome, SubmitOutcome};
use tracing::debug;

use crate::context::AppContext;
use crate::routes::{Route, use_notice};
use crate::views::components::{CountdownBadge, FormError, QuestionCard, QuestionNav};
use crate::vm::{format_score_of, map_attempt_screen, submitted_notice};

fn current_question_id(snapshot: Signal<AttemptSnapshot>) -> Option<QuestionId> {
    snapshot
        .read()
        .current_question()
        .map(|question| question.id.clone())
}

/// Exam screen. One attempt controller per visit; it is shut down when the
/// screen unmounts so no timer outlives the view.
#[component]
pub fn ExamView(exam_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let notice = use_notice();
    let controller: AttemptController =
        use_hook(|| ctx.attempts().controller(ExamId::new(exam_id.clone())));
    let snapshot = use_signal({
        let controller = controller.clone();
        move || controller.snapshot()
    });

    use_future({
        let controller = controller.clone();
        move || {
            let controller = controller.clone();
            async move {
                let mut snapshot = snapshot;
                let mut changes = controller.subscribe();
                snapshot.set(controller.snapshot());
                while changes.changed().await.is_ok() {
                    snapshot.set(controller.snapshot());
                }
            }
        }
    });

    use_drop({
        let controller = controller.clone();
        move || controller.shutdown()
    });

    let begin = use_callback({
        let controller = controller.clone();
        move |()| {
            let controller = controller.clone();
            spawn(async move {
                match controller.begin().await {
                    StartOutcome::AlreadySubmitted => {
                        if let Some(notice) = notice {
                            notice.show("You have already submitted this exam.");
                        }
                        navigator.replace(Route::Results {});
                    }
                    StartOutcome::LoginRequired => {
                        navigator.replace(Route::Login {});
                    }
                    outcome => debug!(?outcome, "exam screen started"),
                }
            });
        }
    });

    use_effect(move || begin.call(()));

    let on_submit = {
        let controller = controller.clone();
        move |_: MouseEvent| {
            let controller = controller.clone();
            spawn(async move {
                match controller.submit().await {
                    SubmitOutcome::Submitted(result) => {
                        if let Some(notice) = notice {
                            notice.show(submitted_notice(&result));
                        }
                        navigator.push(Route::Results {});
                    }
                    SubmitOutcome::AlreadySubmitted => {
                        navigator.replace(Route::Results {});
                    }
                    SubmitOutcome::LoginRequired => {
                        navigator.replace(Route::Login {});
                    }
                    // The snapshot carries the retry message.
                    SubmitOutcome::Failed(_) | SubmitOutcome::NotActive => {}
                }
            });
        }
    };

    let phase = snapshot.read().phase.clone();
    let editable = phase == AttemptPhase::Active;
    match phase {
        AttemptPhase::Uninitialized | AttemptPhase::Starting => rsx! {
            div { class: "page exam-loading",
                p { "Loading your exam paper..." }
            }
        },
        AttemptPhase::Errored(failure) => rsx! {
            div { class: "page exam-error",
                h2 { "Unable to start exam" }
                p { class: "error", "{failure.message()}" }
                div { class: "actions",
                    Link { class: "btn btn-secondary", to: Route::Dashboard {}, "Back to dashboard" }
                    if failure.is_retryable() {
                        button { class: "btn btn-primary", onclick: move |_| begin.call(()), "Retry" }
                    }
                }
            }
        },
        AttemptPhase::Submitted(result) => rsx! {
            div { class: "page exam-done",
                h2 { "Exam submitted" }
                if let Some(result) = result {
                    p { class: "score",
                        "Score: {format_score_of(result.total_score, result.max_possible_score)}"
                    }
                }
                Link { class: "btn btn-primary", to: Route::Results {}, "View results" }
            }
        },
        AttemptPhase::Active | AttemptPhase::Submitting => {
            let vm = map_attempt_screen(&snapshot.read());
            let select_ctrl = controller.clone();
            let toggle_ctrl = controller.clone();
            let text_ctrl = controller.clone();
            let nav_ctrl = controller.clone();
            let prev_ctrl = controller.clone();
            let next_ctrl = controller.clone();
            rsx! {
                div { class: "page exam",
                    header { class: "exam-header",
                        div {
                            h2 { "{vm.exam_title}" }
                            p { class: "muted", "{vm.progress_str} | {vm.answered_str}" }
                        }
                        div { class: "exam-status",
                            CountdownBadge { text: vm.countdown_str.clone(), class: vm.countdown_class }
                            if vm.saving {
                                span { class: "saving", "Saving..." }
                            }
                        }
                    }
                    progress { max: "100", value: "{vm.progress_pct}" }

                    QuestionNav {
                        items: vm.nav.clone(),
                        on_go: move |index: usize| {
                            nav_ctrl.go_to(index);
                        },
                    }

                    if let Some(question) = vm.question.clone() {
                        QuestionCard {
                            question,
                            disabled: !editable,
                            on_select: move |label: String| {
                                if let Some(id) = current_question_id(snapshot) {
                                    select_ctrl.select_option(&id, &label);
                                }
                            },
                            on_toggle: move |label: String| {
                                if let Some(id) = current_question_id(snapshot) {
                                    toggle_ctrl.toggle_option(&id, &label);
                                }
                            },
                            on_text: move |text: String| {
                                if let Some(id) = current_question_id(snapshot) {
                                    text_ctrl.set_text(&id, text);
                                }
                            },
                        }
                    } else {
                        p { class: "empty", "This exam has no questions." }
                    }

                    FormError { message: vm.submit_error.clone() }

                    footer { class: "exam-footer",
                        button {
                            class: "btn btn-secondary",
                            disabled: !vm.has_previous,
                            onclick: move |_| {
                                prev_ctrl.previous();
                            },
                            "Previous"
                        }
                        if vm.is_last {
                            button {
                                class: "btn btn-primary",
                                disabled: !vm.can_submit,
                                onclick: on_submit,
                                "{vm.submit_label}"
                            }
                        } else {
                            button {
                                class: "btn btn-primary",
                                onclick: move |_| {
                                    next_ctrl.next();
                                },
                                "Next"
                            }
                        }
                    }
                }
            }
        }
    }
}
