use dioxus::prelude::*;
use dioxus_router::Link;

use crate::routes::Route;

/// Public start page. Signed-in users never see it; the guard sends them home.
#[component]
pub fn LandingView() -> Element {
    rsx! {
        div { class: "page landing",
            h1 { "Exam Desk" }
            p { "Take scheduled exams online, with answers saved as you go." }
            div { class: "actions",
                Link { class: "btn btn-primary", to: Route::Login {}, "Sign in" }
                Link { class: "btn btn-secondary", to: Route::Signup {}, "Create account" }
            }
        }
    }
}
