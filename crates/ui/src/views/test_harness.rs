use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use exam_core::Clock;
use exam_core::model::{Role, User, UserId};
use exam_core::time::fixed_now;
use services::{AppServices, ClientConfig};
use storage::repository::{InMemoryRepository, SessionRecord, Storage};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{DashboardView, ExamView, LandingView, LoginView, SignupView};

/// Nothing listens here; requests fail fast and views stay in their
/// loading or error states.
const UNREACHABLE_API: &str = "http://127.0.0.1:9/api/v1";

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    Landing,
    Login,
    Signup,
    Dashboard,
    Exam(String),
    /// The real route table, guard included, starting at `/`.
    FullApp,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    ctx: AppContext,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let ctx = props.ctx.clone();
    use_context_provider(|| ctx);
    let view = props.view.clone();
    use_context_provider(|| view);
    if props.view == ViewKind::FullApp {
        return rsx! { Router::<Route> {} };
    }
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    match use_context::<ViewKind>() {
        ViewKind::Landing | ViewKind::FullApp => rsx! { LandingView {} },
        ViewKind::Login => rsx! { LoginView {} },
        ViewKind::Signup => rsx! { SignupView {} },
        ViewKind::Dashboard => rsx! { DashboardView {} },
        ViewKind::Exam(exam_id) => rsx! { ExamView { exam_id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub services: AppServices,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn signed_in_as(role: Role) -> InMemoryRepository {
    let user = User {
        id: UserId::new("u1"),
        email: "sam@example.com".into(),
        full_name: Some("Sam Student".into()),
        role,
    };
    let record = SessionRecord::new("tok-1", &user, fixed_now()).expect("session record");
    InMemoryRepository::with_session(record)
}

pub async fn setup_view_harness(view: ViewKind) -> ViewHarness {
    setup_view_harness_with_repo(view, InMemoryRepository::new()).await
}

pub async fn setup_view_harness_with_repo(view: ViewKind, repo: InMemoryRepository) -> ViewHarness {
    let config = ClientConfig::default().with_api_base_url(UNREACHABLE_API);
    let services = AppServices::with_storage(config, Storage::from_repository(repo))
        .await
        .expect("services");
    let ctx = AppContext::new(&services, Clock::fixed(fixed_now()));

    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { ctx, view });
    ViewHarness { dom, services }
}
