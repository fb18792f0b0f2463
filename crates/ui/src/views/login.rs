use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use exam_core::validation::{FieldErrors, LoginForm};
use services::{ApiError, AuthServiceError};
use tracing::warn;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::components::{FormError, TextField};

fn login_error_message(err: &AuthServiceError) -> String {
    match err {
        AuthServiceError::Api(ApiError::Unauthorized) => "Incorrect email or password".to_string(),
        AuthServiceError::Api(api) => api.user_message(),
        _ => "Signed in, but the session could not be stored on this device.".to_string(),
    }
}

#[component]
pub fn LoginView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let email = use_signal(String::new);
    let password = use_signal(String::new);
    let mut field_errors = use_signal(FieldErrors::new);
    let mut form_error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if busy() {
            return;
        }
        let form = LoginForm {
            email: email().trim().to_string(),
            password: password(),
        };
        let auth = ctx.auth();
        spawn(async move {
            busy.set(true);
            form_error.set(None);
            let outcome = auth.login(&form).await;
            busy.set(false);
            match outcome {
                Ok(user) => {
                    field_errors.set(FieldErrors::new());
                    navigator.replace(Route::home(user.role));
                }
                Err(AuthServiceError::Invalid(errors)) => field_errors.set(errors),
                Err(err) => {
                    warn!(error = %err, "sign in failed");
                    field_errors.set(FieldErrors::new());
                    form_error.set(Some(login_error_message(&err)));
                }
            }
        });
    };

    let errors = field_errors.read().clone();
    rsx! {
        div { class: "page auth-page",
            h2 { "Sign in" }
            form { class: "auth-form", onsubmit: on_submit,
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
                FormError { message: form_error() }
                button { class: "btn btn-primary", r#type: "submit", disabled: busy(),
                    if busy() { "Signing in..." } else { "Sign in" }
                }
            }
            p { class: "auth-switch",
                "No account yet? "
                Link { to: Route::Signup {}, "Sign up" }
            }
        }
    }
}
