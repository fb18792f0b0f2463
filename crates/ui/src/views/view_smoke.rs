use dioxus::prelude::*;
use exam_core::model::{QuestionType, Role};

use super::test_harness::{ViewKind, setup_view_harness, setup_view_harness_with_repo, signed_in_as};
use crate::views::components::{CountdownBadge, QuestionCard};
use crate::vm::{OptionVm, QuestionVm};

#[tokio::test(flavor = "current_thread")]
async fn login_view_smoke_renders_form() {
    let mut harness = setup_view_harness(ViewKind::Login).await;
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Sign in"), "missing heading in {html}");
    assert!(html.contains(r#"name="email""#), "missing email input in {html}");
    assert!(html.contains(r#"type="password""#), "missing password input in {html}");
    assert!(html.contains("Sign up"), "missing signup link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn signup_view_smoke_offers_both_roles() {
    let mut harness = setup_view_harness(ViewKind::Signup).await;
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Create an account"), "missing heading in {html}");
    assert!(html.contains(r#"value="student""#), "missing student role in {html}");
    assert!(html.contains(r#"value="admin""#), "missing admin role in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_view_smoke_starts_loading() {
    let mut harness = setup_view_harness_with_repo(ViewKind::Dashboard, signed_in_as(Role::Student)).await;
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Available exams"), "missing heading in {html}");
    assert!(html.contains("Loading..."), "missing loading state in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_shows_paper_loading() {
    let mut harness =
        setup_view_harness_with_repo(ViewKind::Exam("e1".into()), signed_in_as(Role::Student)).await;
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Loading your exam paper"), "missing loading state in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn guard_shows_landing_to_visitors() {
    let mut harness = setup_view_harness(ViewKind::FullApp).await;
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Take scheduled exams online"), "missing landing in {html}");
    assert!(html.contains("Sign up"), "missing visitor nav in {html}");
    assert!(!harness.services.session().is_authenticated());
}

#[tokio::test(flavor = "current_thread")]
async fn guard_hides_landing_from_signed_in_users() {
    let mut harness = setup_view_harness_with_repo(ViewKind::FullApp, signed_in_as(Role::Student)).await;
    harness.rebuild();
    let html = harness.render();
    assert!(
        !html.contains("Take scheduled exams online"),
        "landing rendered for a signed-in user: {html}"
    );
}

fn choice_question(kind: QuestionType) -> QuestionVm {
    QuestionVm {
        id: "q1".into(),
        number: 1,
        title: "Pick the borrow checker rule".into(),
        description: None,
        kind,
        kind_label: kind.label(),
        points_str: "2 pts".into(),
        options: vec![
            OptionVm {
                label: "One mutable reference".into(),
                checked: true,
            },
            OptionVm {
                label: "Many mutable references".into(),
                checked: false,
            },
        ],
        text: String::new(),
    }
}

#[derive(Props, Clone, PartialEq)]
struct CardHarnessProps {
    question: QuestionVm,
    disabled: bool,
}

#[component]
fn CardHarness(props: CardHarnessProps) -> Element {
    rsx! {
        CountdownBadge { text: "04:59".to_string(), class: "countdown countdown-critical" }
        QuestionCard {
            question: props.question.clone(),
            disabled: props.disabled,
            on_select: move |_: String| {},
            on_toggle: move |_: String| {},
            on_text: move |_: String| {},
        }
    }
}

fn render_card(question: QuestionVm, disabled: bool) -> String {
    let mut dom = VirtualDom::new_with_props(CardHarness, CardHarnessProps { question, disabled });
    dom.rebuild_in_place();
    dioxus_ssr::render(&dom)
}

#[test]
fn single_choice_renders_radios_with_selection() {
    let html = render_card(choice_question(QuestionType::SingleChoice), false);
    assert!(html.contains(r#"type="radio""#), "missing radios in {html}");
    assert!(html.contains("One mutable reference"), "missing option in {html}");
    assert!(html.contains("2 pts"), "missing points in {html}");
    assert!(html.contains("countdown-critical"), "missing countdown class in {html}");
}

#[test]
fn multi_choice_renders_checkboxes() {
    let html = render_card(choice_question(QuestionType::MultiChoice), false);
    assert!(html.contains(r#"type="checkbox""#), "missing checkboxes in {html}");
}

#[test]
fn upload_question_renders_notice_without_inputs() {
    let mut question = choice_question(QuestionType::ImageUpload);
    question.options.clear();
    let html = render_card(question, false);
    assert!(html.contains("not supported in this client"), "missing notice in {html}");
    assert!(html.contains("Image upload"), "missing kind label in {html}");
    assert!(!html.contains("<input"), "unexpected input in {html}");
    assert!(!html.contains("<textarea"), "unexpected textarea in {html}");
}

#[test]
fn text_question_renders_textarea() {
    let mut question = choice_question(QuestionType::Text);
    question.options.clear();
    question.text = "Ownership moves".into();
    let html = render_card(question, true);
    assert!(html.contains("<textarea"), "missing textarea in {html}");
    assert!(html.contains("Ownership moves"), "missing answer text in {html}");
}
