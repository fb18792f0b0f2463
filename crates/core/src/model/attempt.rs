use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::answer::{AnswerSheet, SavedAnswer};
use crate::model::de::{null_as_default, option_labels, optional_labels};
use crate::model::ids::{AttemptId, QuestionId};
use crate::model::question::Question;
use crate::time::api_timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    Submitted,
}

impl AttemptStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AttemptStatus::InProgress => "In progress",
            AttemptStatus::Submitted => "Submitted",
        }
    }
}

/// Response of the start/resume endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptState {
    pub attempt_id: AttemptId,
    pub exam_title: String,
    #[serde(with = "api_timestamp")]
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub remaining_seconds: f64,
    pub questions: Vec<Question>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub saved_answers: Vec<SavedAnswer>,
}

impl AttemptState {
    /// Questions with answer-revealing fields stripped.
    #[must_use]
    pub fn paper(&self) -> Vec<Question> {
        self.questions.iter().cloned().map(Question::for_attempt).collect()
    }

    #[must_use]
    pub fn answer_sheet(&self) -> AnswerSheet {
        AnswerSheet::from_saved(&self.saved_answers)
    }
}

/// Response of the submit endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptResult {
    #[serde(default)]
    pub attempt_id: Option<AttemptId>,
    #[serde(default)]
    pub status: Option<AttemptStatus>,
    pub total_score: f64,
    #[serde(default)]
    pub max_possible_score: f64,
}

/// One row of the attempt history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub id: AttemptId,
    pub exam_title: String,
    #[serde(with = "api_timestamp")]
    pub start_time: DateTime<Utc>,
    #[serde(default, with = "api_timestamp::option")]
    pub submit_time: Option<DateTime<Utc>>,
    pub status: AttemptStatus,
    #[serde(default)]
    pub total_score: f64,
    #[serde(default)]
    pub max_possible_score: f64,
}

/// Graded breakdown for one question of a submitted attempt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestionReview {
    pub id: QuestionId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "option_labels")]
    pub options: Vec<String>,
    #[serde(default, deserialize_with = "option_labels")]
    pub correct_answers: Vec<String>,
    #[serde(default, deserialize_with = "optional_labels")]
    pub selected_options: Option<Vec<String>>,
    #[serde(default)]
    pub text_answer: Option<String>,
    #[serde(default)]
    pub score_awarded: f64,
    pub max_score: f64,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub is_graded: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptReview {
    pub attempt_id: AttemptId,
    pub exam_title: String,
    #[serde(with = "api_timestamp")]
    pub start_time: DateTime<Utc>,
    #[serde(default, with = "api_timestamp::option")]
    pub submit_time: Option<DateTime<Utc>>,
    pub total_score: f64,
    pub max_possible_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<QuestionReview>,
}

impl AttemptReview {
    /// Questions still waiting for manual grading (free-text answers).
    #[must_use]
    pub fn pending_grading(&self) -> usize {
        self.questions.iter().filter(|q| !q.is_graded).count()
    }
}

/// Score as a percentage of the maximum; zero when nothing can be scored.
#[must_use]
pub fn score_percentage(score: f64, max: f64) -> f64 {
    if !max.is_finite() || max <= 0.0 || !score.is_finite() {
        return 0.0;
    }
    (score / max * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::QuestionType;

    #[test]
    fn decodes_start_response_with_saved_answers() {
        let state: AttemptState = serde_json::from_str(
            r#"{
                "attempt_id":"abc123",
                "exam_title":"Rust 101",
                "start_time":"2024-05-01T09:00:00.5",
                "duration_minutes":30,
                "remaining_seconds":1799.7,
                "questions":[
                    {"id":"q1","title":"Pick","type":"single_choice","options":["A","B"],"max_score":1,"correct_answers":["B"]}
                ],
                "saved_answers":[{"question_id":"q1","selected_options":["B"],"text_answer":null}]
            }"#,
        )
        .unwrap();
        assert_eq!(state.attempt_id.as_str(), "abc123");
        assert!(state.paper()[0].correct_answers.is_none());
        let sheet = state.answer_sheet();
        assert_eq!(
            sheet.get(&QuestionId::new("q1")).map(|v| v.selected().to_vec()),
            Some(vec!["B".to_string()])
        );
    }

    #[test]
    fn paper_with_upload_question_still_starts() {
        let state: AttemptState = serde_json::from_str(
            r#"{
                "attempt_id":"abc123",
                "exam_title":"Rust 101",
                "start_time":"2024-05-01T09:00:00",
                "duration_minutes":30,
                "remaining_seconds":1800,
                "questions":[
                    {"id":"q1","title":"Pick","type":"single_choice","options":["A","B"],"max_score":1},
                    {"id":"q2","title":"Draw the borrow graph","type":"image_upload","options":null,"max_score":4},
                    {"id":"q3","title":"Explain","type":"text","options":null,"max_score":5}
                ],
                "saved_answers":[]
            }"#,
        )
        .unwrap();
        let paper = state.paper();
        assert_eq!(paper.len(), 3);
        assert_eq!(paper[1].kind, QuestionType::ImageUpload);
        assert!(paper[1].options.is_empty());
    }

    #[test]
    fn missing_saved_answers_is_a_fresh_attempt() {
        let state: AttemptState = serde_json::from_str(
            r#"{"attempt_id":"a","exam_title":"t","start_time":"2024-05-01T09:00:00",
                "duration_minutes":1,"remaining_seconds":60,"questions":[],"saved_answers":null}"#,
        )
        .unwrap();
        assert!(state.answer_sheet().is_empty());
    }

    #[test]
    fn submit_result_tolerates_score_only_body() {
        let result: AttemptResult = serde_json::from_str(r#"{"total_score":7}"#).unwrap();
        assert!((result.total_score - 7.0).abs() < f64::EPSILON);
        assert!(result.attempt_id.is_none());
    }

    #[test]
    fn percentage_handles_zero_max() {
        assert!((score_percentage(3.0, 4.0) - 75.0).abs() < 1e-9);
        assert!(score_percentage(3.0, 0.0).abs() < f64::EPSILON);
    }
}
