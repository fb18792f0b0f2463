use chrono::{DateTime, Utc};
use exam_core::model::{Exam, ExamAttemptStatus};

use crate::vm::time_fmt::format_datetime;

/// What the dashboard offers for one exam.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExamAction {
    Start,
    Resume,
    /// Submitted; links to the attempt when the backend reported one.
    ViewResult(Option<String>),
    NotOpenYet,
    Closed,
}

impl ExamAction {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ExamAction::Start => "Start exam",
            ExamAction::Resume => "Resume",
            ExamAction::ViewResult(_) => "View result",
            ExamAction::NotOpenYet => "Not open yet",
            ExamAction::Closed => "Closed",
        }
    }

    #[must_use]
    pub fn enters_exam(&self) -> bool {
        matches!(self, ExamAction::Start | ExamAction::Resume)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExamCardVm {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub window_str: String,
    pub duration_str: String,
    pub question_count: u32,
    pub status_label: &'static str,
    pub action: ExamAction,
}

#[must_use]
pub fn attempt_status_label(status: ExamAttemptStatus) -> &'static str {
    match status {
        ExamAttemptStatus::NotAttempted => "Not started",
        ExamAttemptStatus::InProgress => "In progress",
        ExamAttemptStatus::Submitted => "Submitted",
    }
}

fn action_for(exam: &Exam, now: DateTime<Utc>) -> ExamAction {
    match exam.attempt_status {
        ExamAttemptStatus::Submitted => {
            ExamAction::ViewResult(exam.attempt_id.as_ref().map(ToString::to_string))
        }
        ExamAttemptStatus::InProgress if now < exam.end_time => ExamAction::Resume,
        _ if now < exam.start_time => ExamAction::NotOpenYet,
        _ if exam.is_open_at(now) => ExamAction::Start,
        _ => ExamAction::Closed,
    }
}

fn window_str(exam: &Exam) -> String {
    format!(
        "{} to {}",
        format_datetime(exam.start_time),
        format_datetime(exam.end_time)
    )
}

impl ExamCardVm {
    #[must_use]
    pub fn new(exam: &Exam, now: DateTime<Utc>) -> Self {
        Self {
            id: exam.id.to_string(),
            title: exam.title.clone(),
            description: exam
                .description
                .clone()
                .filter(|text| !text.trim().is_empty()),
            window_str: window_str(exam),
            duration_str: format!("{} min", exam.duration_minutes),
            question_count: exam.question_count,
            status_label: attempt_status_label(exam.attempt_status),
            action: action_for(exam, now),
        }
    }
}

#[must_use]
pub fn map_exam_cards(exams: &[Exam], now: DateTime<Utc>) -> Vec<ExamCardVm> {
    exams.iter().map(|exam| ExamCardVm::new(exam, now)).collect()
}

/// Row of the admin exam table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminExamRowVm {
    pub id: String,
    pub title: String,
    pub window_str: String,
    pub duration_str: String,
    pub question_count: u32,
    pub published: bool,
    pub status_label: &'static str,
    pub toggle_label: &'static str,
}

impl From<&Exam> for AdminExamRowVm {
    fn from(exam: &Exam) -> Self {
        Self {
            id: exam.id.to_string(),
            title: exam.title.clone(),
            window_str: window_str(exam),
            duration_str: format!("{} min", exam.duration_minutes),
            question_count: exam.question_count,
            published: exam.is_published,
            status_label: if exam.is_published { "Published" } else { "Draft" },
            toggle_label: if exam.is_published { "Unpublish" } else { "Publish" },
        }
    }
}

#[must_use]
pub fn map_admin_exam_rows(exams: &[Exam]) -> Vec<AdminExamRowVm> {
    exams.iter().map(AdminExamRowVm::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use exam_core::model::{AttemptId, ExamId};
    use exam_core::time::fixed_now;

    fn exam(status: ExamAttemptStatus) -> Exam {
        let now = fixed_now();
        Exam {
            id: ExamId::new("e1"),
            title: "Rust 101".into(),
            description: Some("  ".into()),
            start_time: now - Duration::hours(1),
            end_time: now + Duration::hours(1),
            duration_minutes: 30,
            is_published: true,
            question_count: 3,
            attempt_status: status,
            attempt_id: None,
        }
    }

    #[test]
    fn open_exam_offers_start() {
        let card = ExamCardVm::new(&exam(ExamAttemptStatus::NotAttempted), fixed_now());
        assert_eq!(card.action, ExamAction::Start);
        assert_eq!(card.status_label, "Not started");
        assert_eq!(card.duration_str, "30 min");
        assert_eq!(card.description, None);
        assert!(card.action.enters_exam());
    }

    #[test]
    fn window_decides_before_and_after() {
        let exam = exam(ExamAttemptStatus::NotAttempted);
        let early = fixed_now() - Duration::hours(2);
        let late = fixed_now() + Duration::hours(2);
        assert_eq!(ExamCardVm::new(&exam, early).action, ExamAction::NotOpenYet);
        assert_eq!(ExamCardVm::new(&exam, late).action, ExamAction::Closed);
    }

    #[test]
    fn attempt_status_wins_over_window() {
        let mut submitted = exam(ExamAttemptStatus::Submitted);
        submitted.attempt_id = Some(AttemptId::new("abc123"));
        assert_eq!(
            ExamCardVm::new(&submitted, fixed_now()).action,
            ExamAction::ViewResult(Some("abc123".into()))
        );
        let resumable = exam(ExamAttemptStatus::InProgress);
        assert_eq!(ExamCardVm::new(&resumable, fixed_now()).action, ExamAction::Resume);
    }

    #[test]
    fn admin_rows_offer_the_opposite_toggle() {
        let mut draft = exam(ExamAttemptStatus::NotAttempted);
        draft.is_published = false;
        let rows = map_admin_exam_rows(&[exam(ExamAttemptStatus::NotAttempted), draft]);
        assert_eq!(rows[0].toggle_label, "Unpublish");
        assert_eq!(rows[1].toggle_label, "Publish");
        assert_eq!(rows[1].status_label, "Draft");
    }
}
