use exam_core::model::{AnswerValue, Question, QuestionType};
use services::{AttemptPhase, AttemptSnapshot};

use crate::vm::review_vm::format_score;
use crate::vm::time_fmt::{CountdownLevel, format_countdown_opt};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub label: String,
    pub checked: bool,
}

/// The question currently on screen, with the student's answer folded in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub id: String,
    pub number: usize,
    pub title: String,
    pub description: Option<String>,
    pub kind: QuestionType,
    pub kind_label: &'static str,
    pub points_str: String,
    pub options: Vec<OptionVm>,
    pub text: String,
}

impl QuestionVm {
    #[must_use]
    pub fn new(index: usize, question: &Question, answer: Option<&AnswerValue>) -> Self {
        let options = question
            .options
            .iter()
            .map(|label| OptionVm {
                label: label.clone(),
                checked: answer.is_some_and(|value| value.is_selected(label)),
            })
            .collect();
        let points = format_score(question.max_score);
        Self {
            id: question.id.to_string(),
            number: index + 1,
            title: question.title.clone(),
            description: question.description.clone(),
            kind: question.kind,
            kind_label: question.kind.label(),
            points_str: if points == "1" {
                "1 pt".to_string()
            } else {
                format!("{points} pts")
            },
            options,
            text: answer
                .and_then(AnswerValue::text)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// One button of the question navigator strip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavItemVm {
    pub index: usize,
    pub label: String,
    pub answered: bool,
    pub current: bool,
}

impl NavItemVm {
    #[must_use]
    pub fn css_class(&self) -> &'static str {
        match (self.current, self.answered) {
            (true, _) => "nav-item nav-current",
            (false, true) => "nav-item nav-answered",
            (false, false) => "nav-item",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptScreenVm {
    pub exam_title: String,
    pub progress_str: String,
    pub progress_pct: usize,
    pub answered_str: String,
    pub countdown_str: String,
    pub countdown_class: &'static str,
    pub question: Option<QuestionVm>,
    pub nav: Vec<NavItemVm>,
    pub has_previous: bool,
    pub is_last: bool,
    pub saving: bool,
    pub can_submit: bool,
    pub submit_label: &'static str,
    pub submit_error: Option<String>,
}

fn answered(value: Option<&AnswerValue>) -> bool {
    value.is_some_and(|value| !value.is_blank())
}

#[must_use]
pub fn map_attempt_screen(snapshot: &AttemptSnapshot) -> AttemptScreenVm {
    let total = snapshot.questions.len();
    let current = snapshot.current.min(total.saturating_sub(1));
    let question = snapshot
        .current_question()
        .map(|question| QuestionVm::new(current, question, snapshot.answer(&question.id)));
    let nav = snapshot
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| NavItemVm {
            index,
            label: (index + 1).to_string(),
            answered: answered(snapshot.answer(&question.id)),
            current: index == current,
        })
        .collect::<Vec<_>>();
    let answered_count = nav.iter().filter(|item| item.answered).count();
    let countdown_class = snapshot
        .remaining_seconds
        .map_or("countdown", |seconds| {
            CountdownLevel::for_remaining(seconds).css_class()
        });
    let submitting = snapshot.phase == AttemptPhase::Submitting;

    AttemptScreenVm {
        exam_title: snapshot.exam_title.clone(),
        progress_str: if total == 0 {
            "No questions".to_string()
        } else {
            format!("Question {} of {total}", current + 1)
        },
        progress_pct: if total == 0 { 0 } else { (current + 1) * 100 / total },
        answered_str: format!("{answered_count} / {total} answered"),
        countdown_str: format_countdown_opt(snapshot.remaining_seconds),
        countdown_class,
        question,
        nav,
        has_previous: current > 0,
        is_last: snapshot.is_last(),
        saving: snapshot.outstanding_saves > 0,
        can_submit: snapshot.can_submit(),
        submit_label: if submitting {
            "Submitting..."
        } else if snapshot.outstanding_saves > 0 {
            "Saving..."
        } else {
            "Submit exam"
        },
        submit_error: snapshot.submit_error.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{AnswerSheet, ExamId, QuestionId};

    fn question(id: &str, kind: QuestionType, options: &[&str], max_score: f64) -> Question {
        Question {
            id: QuestionId::new(id),
            title: format!("Question {id}"),
            description: None,
            kind,
            options: options.iter().map(|label| (*label).to_string()).collect(),
            max_score,
            correct_answers: None,
            complexity: None,
            tags: None,
        }
    }

    fn snapshot() -> AttemptSnapshot {
        let mut answers = AnswerSheet::new();
        answers.toggle(&QuestionId::new("q2"), "A");
        answers.toggle(&QuestionId::new("q2"), "C");
        answers.set_text(&QuestionId::new("q3"), "");
        AttemptSnapshot {
            exam_id: ExamId::new("e1"),
            phase: AttemptPhase::Active,
            attempt_id: Some("abc123".into()),
            exam_title: "Rust 101".into(),
            questions: vec![
                question("q1", QuestionType::SingleChoice, &["A", "B"], 1.0),
                question("q2", QuestionType::MultiChoice, &["A", "B", "C"], 2.0),
                question("q3", QuestionType::Text, &[], 5.0),
            ],
            answers,
            current: 1,
            remaining_seconds: Some(299),
            outstanding_saves: 0,
            submit_error: None,
        }
    }

    #[test]
    fn options_reflect_answer_sheet() {
        let vm = map_attempt_screen(&snapshot());
        let question = vm.question.unwrap();
        assert_eq!(question.number, 2);
        assert_eq!(question.points_str, "2 pts");
        let checked: Vec<bool> = question.options.iter().map(|o| o.checked).collect();
        assert_eq!(checked, vec![true, false, true]);
        assert_eq!(vm.progress_str, "Question 2 of 3");
        assert_eq!(vm.progress_pct, 66);
    }

    #[test]
    fn blank_text_does_not_count_as_answered() {
        let vm = map_attempt_screen(&snapshot());
        assert_eq!(vm.answered_str, "1 / 3 answered");
        assert_eq!(vm.nav[1].css_class(), "nav-item nav-current");
        assert_eq!(vm.nav[2].css_class(), "nav-item");
    }

    #[test]
    fn countdown_and_submit_gate() {
        let mut snap = snapshot();
        let vm = map_attempt_screen(&snap);
        assert_eq!(vm.countdown_str, "04:59");
        assert_eq!(vm.countdown_class, "countdown countdown-critical");
        assert!(vm.can_submit);
        assert_eq!(vm.submit_label, "Submit exam");

        snap.outstanding_saves = 2;
        let vm = map_attempt_screen(&snap);
        assert!(!vm.can_submit);
        assert!(vm.saving);
        assert_eq!(vm.submit_label, "Saving...");

        snap.remaining_seconds = None;
        assert_eq!(map_attempt_screen(&snap).countdown_str, "--:--");
    }
}
