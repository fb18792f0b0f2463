use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use exam_core::model::Role;
use exam_core::validation::{FieldErrors, SignupForm};
use services::AuthServiceError;

use crate::context::AppContext;
use crate::routes::{Route, use_notice};
use crate::views::components::{FormError, TextField};

fn parse_role(raw: &str) -> Role {
    match raw {
        "admin" => Role::Admin,
        _ => Role::Student,
    }
}

#[component]
pub fn SignupView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let notice = use_notice();
    let full_name = use_signal(String::new);
    let email = use_signal(String::new);
    let password = use_signal(String::new);
    let mut role = use_signal(|| Role::Student);
    let mut field_errors = use_signal(FieldErrors::new);
    let mut form_error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if busy() {
            return;
        }
        let form = SignupForm {
            email: email().trim().to_string(),
            password: password(),
            full_name: full_name().trim().to_string(),
            role: role(),
        };
        let auth = ctx.auth();
        spawn(async move {
            busy.set(true);
            form_error.set(None);
            let outcome = auth.signup(&form).await;
            busy.set(false);
            match outcome {
                Ok(_) => {
                    if let Some(notice) = notice {
                        notice.show("Account created. Please sign in.");
                    }
                    navigator.push(Route::Login {});
                }
                Err(AuthServiceError::Invalid(errors)) => field_errors.set(errors),
                Err(AuthServiceError::Api(err)) => {
                    field_errors.set(FieldErrors::new());
                    form_error.set(Some(err.user_message()));
                }
                Err(err) => form_error.set(Some(err.to_string())),
            }
        });
    };

    let errors = field_errors.read().clone();
    rsx! {
        div { class: "page auth-page",
            h2 { "Create an account" }
            form { class: "auth-form", onsubmit: on_submit,
                TextField {
                    label: "Full name",
                    name: "full_name",
                    value: full_name,
                    error: errors.get("full_name").map(str::to_string),
                }
                TextField {
                    label: "Email",
                    name: "email",
                    kind: "email",
                    value: email,
                    error: errors.get("email").map(str::to_string),
                }
                TextField {
                    label: "Password",
                    name: "password",
                    kind: "password",
                    value: password,
                    error: errors.get("password").map(str::to_string),
                }
                label { class: "field", r#for: "role",
                    span { class: "field-label", "Role" }
                    select {
                        id: "role",
                        class: "input",
                        value: role().as_str(),
                        onchange: move |evt| role.set(parse_role(&evt.value())),
                        option { value: "student", "Student" }
                        option { value: "admin", "Admin" }
                    }
                }
                FormError { message: form_error() }
                button { class: "btn btn-primary", r#type: "submit", disabled: busy(),
                    if busy() { "Creating account..." } else { "Sign up" }
                }
            }
            p { class: "auth-switch",
                "Already registered? "
                Link { to: Route::Login {}, "Sign in" }
            }
        }
    }
}
