use dioxus::prelude::*;

/// Labelled input bound to a signal, with its field-level message underneath.
#[component]
pub fn TextField(
    label: &'static str,
    name: &'static str,
    #[props(default = "text")] kind: &'static str,
    value: Signal<String>,
    error: Option<String>,
) -> Element {
    let mut value = value;
    rsx! {
        label { class: "field", r#for: "{name}",
            span { class: "field-label", "{label}" }
            input {
                id: "{name}",
                name: "{name}",
                r#type: "{kind}",
                class: if error.is_some() { "input input-invalid" } else { "input" },
                value: "{value}",
                oninput: move |evt| value.set(evt.value()),
            }
            if let Some(message) = &error {
                span { class: "field-error", "{message}" }
            }
        }
    }
}

#[component]
pub fn FormError(message: Option<String>) -> Element {
    match message {
        Some(message) => rsx! { p { class: "form-error", role: "alert", "{message}" } },
        None => rsx! {},
    }
}
