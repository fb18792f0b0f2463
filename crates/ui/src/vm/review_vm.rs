use exam_core::model::{
    AttemptResult, AttemptReview, AttemptStatus, AttemptSummary, QuestionReview, QuestionType,
    score_percentage,
};

use crate::vm::time_fmt::{format_datetime, format_datetime_opt};

/// Up to two decimals, trailing zeros dropped: `7.0` → `7`, `4.50` → `4.5`.
#[must_use]
pub fn format_score(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[must_use]
pub fn format_score_of(score: f64, max: f64) -> String {
    format!("{} / {}", format_score(score), format_score(max))
}

#[must_use]
pub fn format_percentage(score: f64, max: f64) -> String {
    format!("{:.0}%", score_percentage(score, max))
}

/// Toast-style line shown after a successful submit.
#[must_use]
pub fn submitted_notice(result: &AttemptResult) -> String {
    format!("Exam submitted! Score: {}", format_score(result.total_score))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptRowVm {
    pub id: String,
    pub exam_title: String,
    pub started_str: String,
    pub submitted_str: String,
    pub status_label: &'static str,
    pub score_str: String,
    pub percent_str: String,
    pub is_submitted: bool,
}

impl From<&AttemptSummary> for AttemptRowVm {
    fn from(item: &AttemptSummary) -> Self {
        let is_submitted = item.status == AttemptStatus::Submitted;
        let (score_str, percent_str) = if is_submitted {
            (
                format_score_of(item.total_score, item.max_possible_score),
                format_percentage(item.total_score, item.max_possible_score),
            )
        } else {
            ("-".to_string(), "-".to_string())
        };
        Self {
            id: item.id.to_string(),
            exam_title: item.exam_title.clone(),
            started_str: format_datetime(item.start_time),
            submitted_str: format_datetime_opt(item.submit_time),
            status_label: item.status.label(),
            score_str,
            percent_str,
            is_submitted,
        }
    }
}

#[must_use]
pub fn map_attempt_rows(items: &[AttemptSummary]) -> Vec<AttemptRowVm> {
    items.iter().map(AttemptRowVm::from).collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewOptionVm {
    pub label: String,
    pub selected: bool,
    pub correct: bool,
}

impl ReviewOptionVm {
    #[must_use]
    pub fn css_class(&self) -> &'static str {
        match (self.selected, self.correct) {
            (true, true) => "option option-correct",
            (true, false) => "option option-wrong",
            (false, true) => "option option-missed",
            (false, false) => "option",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReviewQuestionVm {
    pub id: String,
    pub number: usize,
    pub title: String,
    pub description: Option<String>,
    pub kind_label: &'static str,
    pub is_text: bool,
    pub options: Vec<ReviewOptionVm>,
    pub text_answer: String,
    pub score_awarded: f64,
    pub max_score: f64,
    pub score_str: String,
    pub verdict: &'static str,
}

fn question_kind(raw: &str) -> Option<QuestionType> {
    match raw {
        "single_choice" => Some(QuestionType::SingleChoice),
        "multi_choice" => Some(QuestionType::MultiChoice),
        "text" => Some(QuestionType::Text),
        "image_upload" => Some(QuestionType::ImageUpload),
        _ => None,
    }
}

fn verdict(question: &QuestionReview, is_text: bool) -> &'static str {
    if !question.is_graded {
        "Pending grading"
    } else if is_text {
        "Graded"
    } else if question.is_correct {
        "Correct"
    } else {
        "Incorrect"
    }
}

impl ReviewQuestionVm {
    fn new(index: usize, question: &QuestionReview) -> Self {
        let kind = question_kind(&question.kind);
        let is_text = kind.is_some_and(QuestionType::is_manually_graded);
        let selected = question.selected_options.as_deref().unwrap_or_default();
        let options = question
            .options
            .iter()
            .map(|label| ReviewOptionVm {
                label: label.clone(),
                selected: selected.contains(label),
                correct: question.correct_answers.contains(label),
            })
            .collect();
        let text_answer = question
            .text_answer
            .clone()
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| "(No answer)".to_string());

        Self {
            id: question.id.to_string(),
            number: index + 1,
            title: question.title.clone(),
            description: question.description.clone(),
            kind_label: kind.map_or("Question", QuestionType::label),
            is_text,
            options,
            text_answer,
            score_awarded: question.score_awarded,
            max_score: question.max_score,
            score_str: format_score_of(question.score_awarded, question.max_score),
            verdict: verdict(question, is_text),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReviewVm {
    pub attempt_id: String,
    pub exam_title: String,
    pub started_str: String,
    pub submitted_str: String,
    pub score_str: String,
    pub percent_str: String,
    pub pending_grading: usize,
    pub questions: Vec<ReviewQuestionVm>,
}

#[must_use]
pub fn map_review(review: &AttemptReview) -> ReviewVm {
    ReviewVm {
        attempt_id: review.attempt_id.to_string(),
        exam_title: review.exam_title.clone(),
        started_str: format_datetime(review.start_time),
        submitted_str: format_datetime_opt(review.submit_time),
        score_str: format_score_of(review.total_score, review.max_possible_score),
        percent_str: format_percentage(review.total_score, review.max_possible_score),
        pending_grading: review.pending_grading(),
        questions: review
            .questions
            .iter()
            .enumerate()
            .map(|(index, question)| ReviewQuestionVm::new(index, question))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_drop_trailing_zeros() {
        assert_eq!(format_score(7.0), "7");
        assert_eq!(format_score(4.5), "4.5");
        assert_eq!(format_score(10.0), "10");
        assert_eq!(format_score(0.0), "0");
        assert_eq!(format_score(2.0 / 3.0), "0.67");
        assert_eq!(format_score_of(7.0, 10.0), "7 / 10");
        assert_eq!(format_percentage(7.0, 10.0), "70%");
        assert_eq!(format_percentage(1.0, 0.0), "0%");
    }

    #[test]
    fn submit_notice_shows_total() {
        let result = AttemptResult {
            attempt_id: None,
            status: Some(AttemptStatus::Submitted),
            total_score: 7.0,
            max_possible_score: 10.0,
        };
        assert_eq!(submitted_notice(&result), "Exam submitted! Score: 7");
    }

    #[test]
    fn history_rows_hide_scores_until_submitted() {
        let items: Vec<AttemptSummary> = history_items();
        let rows = map_attempt_rows(&items);
        assert_eq!(rows[0].score_str, "7 / 10");
        assert_eq!(rows[0].percent_str, "70%");
        assert!(rows[0].is_submitted);
        assert_eq!(rows[1].score_str, "-");
        assert_eq!(rows[1].status_label, "In progress");
        assert_eq!(rows[1].submitted_str, "-");
    }

    fn history_items() -> Vec<AttemptSummary> {
        let now = exam_core::time::fixed_now();
        vec![
            AttemptSummary {
                id: "abc123".into(),
                exam_title: "Rust 101".into(),
                start_time: now,
                submit_time: Some(now),
                status: AttemptStatus::Submitted,
                total_score: 7.0,
                max_possible_score: 10.0,
            },
            AttemptSummary {
                id: "def456".into(),
                exam_title: "Rust 102".into(),
                start_time: now,
                submit_time: None,
                status: AttemptStatus::InProgress,
                total_score: 0.0,
                max_possible_score: 10.0,
            },
        ]
    }

    #[test]
    fn review_marks_selection_against_key() {
        let question = QuestionReview {
            id: "q2".into(),
            title: "Pick many".into(),
            description: None,
            kind: "multi_choice".into(),
            options: vec!["A".into(), "B".into(), "C".into()],
            correct_answers: vec!["A".into(), "C".into()],
            selected_options: Some(vec!["A".into(), "B".into()]),
            text_answer: None,
            score_awarded: 0.0,
            max_score: 2.0,
            is_correct: false,
            is_graded: true,
        };
        let vm = ReviewQuestionVm::new(1, &question);
        assert_eq!(vm.number, 2);
        assert_eq!(vm.kind_label, "Multiple choice");
        assert_eq!(vm.options[0].css_class(), "option option-correct");
        assert_eq!(vm.options[1].css_class(), "option option-wrong");
        assert_eq!(vm.options[2].css_class(), "option option-missed");
        assert_eq!(vm.verdict, "Incorrect");
        assert_eq!(vm.text_answer, "(No answer)");
    }

    #[test]
    fn ungraded_text_is_pending() {
        let question = QuestionReview {
            id: "q3".into(),
            title: "Explain".into(),
            description: None,
            kind: "text".into(),
            options: Vec::new(),
            correct_answers: Vec::new(),
            selected_options: None,
            text_answer: Some("Because".into()),
            score_awarded: 0.0,
            max_score: 5.0,
            is_correct: false,
            is_graded: false,
        };
        let vm = ReviewQuestionVm::new(0, &question);
        assert!(vm.is_text);
        assert_eq!(vm.verdict, "Pending grading");
        assert_eq!(vm.score_str, "0 / 5");
        assert_eq!(vm.text_answer, "Because");
    }

    #[test]
    fn upload_answers_review_like_text() {
        let question = QuestionReview {
            id: "q4".into(),
            title: "Draw it".into(),
            description: None,
            kind: "image_upload".into(),
            options: Vec::new(),
            correct_answers: Vec::new(),
            selected_options: None,
            text_answer: Some("/uploads/student123/answer456.jpg".into()),
            score_awarded: 3.0,
            max_score: 4.0,
            is_correct: false,
            is_graded: true,
        };
        let vm = ReviewQuestionVm::new(3, &question);
        assert!(vm.is_text);
        assert_eq!(vm.kind_label, "Image upload");
        assert_eq!(vm.verdict, "Graded");
        assert_eq!(vm.text_answer, "/uploads/student123/answer456.jpg");
    }
}
