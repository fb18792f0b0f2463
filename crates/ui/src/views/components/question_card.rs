use dioxus::prelude::*;
use exam_core::model::QuestionType;

use crate::vm::{NavItemVm, QuestionVm};

#[component]
pub fn QuestionCard(
    question: QuestionVm,
    disabled: bool,
    on_select: EventHandler<String>,
    on_toggle: EventHandler<String>,
    on_text: EventHandler<String>,
) -> Element {
    let group = format!("question-{}", question.id);
    rsx! {
        section { class: "question-card",
            header { class: "question-header",
                h3 { "{question.number}. {question.title}" }
                span { class: "badge", "{question.points_str}" }
            }
            if let Some(description) = question.description.clone() {
                p { class: "question-description", "{description}" }
            }
            p { class: "question-kind", "{question.kind_label}" }

            match question.kind {
                QuestionType::SingleChoice => rsx! {
                    div { class: "options",
                        for option in question.options.clone() {
                            label { class: if option.checked { "option option-checked" } else { "option" },
                                input {
                                    r#type: "radio",
                                    name: "{group}",
                                    checked: option.checked,
                                    disabled,
                                    onchange: {
                                        let label = option.label.clone();
                                        move |_| on_select.call(label.clone())
                                    },
                                }
                                span { "{option.label}" }
                            }
                        }
                    }
                },
                QuestionType::MultiChoice => rsx! {
                    div { class: "options",
                        for option in question.options.clone() {
                            label { class: if option.checked { "option option-checked" } else { "option" },
                                input {
                                    r#type: "checkbox",
                                    name: "{group}",
                                    checked: option.checked,
                                    disabled,
                                    onchange: {
                                        let label = option.label.clone();
                                        move |_| on_toggle.call(label.clone())
                                    },
                                }
                                span { "{option.label}" }
                            }
                        }
                    }
                },
                QuestionType::Text => rsx! {
                    textarea {
                        class: "answer-text",
                        rows: "8",
                        placeholder: "Type your answer here...",
                        disabled,
                        value: "{question.text}",
                        oninput: move |evt| on_text.call(evt.value()),
                    }
                },
                QuestionType::ImageUpload | QuestionType::Unsupported => rsx! {
                    p { class: "answer-unsupported",
                        "This answer type is not supported in this client."
                    }
                },
            }
        }
    }
}

#[component]
pub fn QuestionNav(items: Vec<NavItemVm>, on_go: EventHandler<usize>) -> Element {
    rsx! {
        nav { class: "question-nav",
            for item in items {
                button {
                    class: item.css_class(),
                    r#type: "button",
                    onclick: move |_| on_go.call(item.index),
                    "{item.label}"
                }
            }
        }
    }
}

#[component]
pub fn CountdownBadge(text: String, class: &'static str) -> Element {
    rsx! {
        span { class: "{class}", title: "Time remaining", "{text}" }
    }
}
