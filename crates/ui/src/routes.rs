use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable, use_navigator, use_route};
use exam_core::model::Role;
use exam_core::routing::redirect_target;
use services::SessionContext;
use tracing::{debug, warn};

use crate::context::AppContext;
use crate::views::{
    AdminExamView, AdminExamsView, AdminView, DashboardView, ExamView, GradingView, LandingView,
    LoginView, ResultDetailView, ResultsView, SignupView,
};

#[derive(Clone, Debug, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Guard)]
        #[route("/", LandingView)] Landing {},
        #[route("/login", LoginView)] Login {},
        #[route("/signup", SignupView)] Signup {},
        #[route("/dashboard", DashboardView)] Dashboard {},
        #[route("/exam/:exam_id", ExamView)] Exam { exam_id: String },
        #[route("/results", ResultsView)] Results {},
        #[route("/results/:attempt_id", ResultDetailView)] ResultDetail { attempt_id: String },
        #[route("/admin", AdminView)] Admin {},
        #[route("/admin/exams", AdminExamsView)] AdminExams {},
        #[route("/admin/exam/:exam_id", AdminExamView)] AdminExam { exam_id: String },
        #[route("/admin/grading/:attempt_id", GradingView)] Grading { attempt_id: String },
}

impl Route {
    #[must_use]
    pub fn home(role: Role) -> Self {
        match role {
            Role::Admin => Route::Admin {},
            Role::Student => Route::Dashboard {},
        }
    }
}

/// Who is signed in, as the header and guard see it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthView {
    pub authenticated: bool,
    pub role: Option<Role>,
    pub display_name: Option<String>,
}

impl AuthView {
    #[must_use]
    pub fn of(session: &SessionContext) -> Self {
        let user = session.user();
        Self {
            authenticated: user.is_some(),
            role: user.as_ref().map(|user| user.role),
            display_name: user.map(|user| user.display_name().to_string()),
        }
    }
}

/// Session state as a signal, refreshed on every sign-in and sign-out,
/// including the forced sign-out after a rejected credential.
pub fn use_auth_view() -> Signal<AuthView> {
    let session = use_context::<AppContext>().session();
    let initial = AuthView::of(&session);
    let auth = use_signal(move || initial);
    use_future(move || {
        let session = session.clone();
        async move {
            let mut auth = auth;
            let mut changes = session.subscribe();
            while changes.changed().await.is_ok() {
                auth.set(AuthView::of(&session));
            }
        }
    });
    auth
}

/// One-shot message shown above the current screen.
#[derive(Clone, Copy)]
pub struct Notice(Signal<Option<String>>);

impl Notice {
    pub fn show(mut self, message: impl Into<String>) {
        self.0.set(Some(message.into()));
    }

    pub fn dismiss(mut self) {
        self.0.set(None);
    }

    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.0.read().clone()
    }
}

#[must_use]
pub fn use_notice() -> Option<Notice> {
    try_use_context::<Notice>()
}

#[component]
fn Guard() -> Element {
    let route = use_route::<Route>();
    let navigator = use_navigator();
    let auth = use_auth_view();
    use_context_provider(|| Notice(Signal::new(None)));

    let path = route.to_string();
    let view = auth();
    let target = redirect_target(&path, view.authenticated, view.role);

    use_effect(use_reactive((&target, &path), move |(target, path)| {
        let Some(target) = target else {
            return;
        };
        debug!(from = %path, to = target, "route guard redirect");
        match target.parse::<Route>() {
            Ok(next) => {
                navigator.replace(next);
            }
            Err(_) => warn!(redirect = target, "redirect target is not a known route"),
        }
    }));

    // Nothing of the guarded screen renders while a redirect is pending.
    if target.is_some() {
        return rsx! {};
    }

    rsx! {
        div { class: "app",
            Navbar { auth: view }
            NoticeBanner {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Navbar(auth: AuthView) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    let on_logout = move |_: MouseEvent| {
        let auth_service = ctx.auth();
        spawn(async move {
            if let Err(err) = auth_service.logout().await {
                warn!(error = %err, "logout did not clear stored credential");
            }
            navigator.replace(Route::Login {});
        });
    };

    rsx! {
        nav { class: "navbar",
            Link { class: "brand", to: Route::Landing {}, "Exam Desk" }
            ul {
                match auth.role {
                    Some(Role::Student) => rsx! {
                        li { Link { to: Route::Dashboard {}, "Dashboard" } }
                        li { Link { to: Route::Results {}, "Results" } }
                    },
                    Some(Role::Admin) => rsx! {
                        li { Link { to: Route::Admin {}, "Overview" } }
                        li { Link { to: Route::AdminExams {}, "Exams" } }
                    },
                    None => rsx! {
                        li { Link { to: Route::Login {}, "Sign in" } }
                        li { Link { to: Route::Signup {}, "Sign up" } }
                    },
                }
            }
            if auth.authenticated {
                div { class: "navbar-user",
                    span { "{auth.display_name.clone().unwrap_or_default()}" }
                    button { class: "btn btn-secondary", onclick: on_logout, "Log out" }
                }
            }
        }
    }
}

#[component]
fn NoticeBanner() -> Element {
    let Some(notice) = use_notice() else {
        return rsx! {};
    };
    match notice.message() {
        Some(message) => rsx! {
            div { class: "notice",
                span { "{message}" }
                button { class: "btn-link", onclick: move |_| notice.dismiss(), "Dismiss" }
            }
        },
        None => rsx! {},
    }
}
