use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::de::{option_labels, optional_labels};
use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question title cannot be empty")]
    EmptyTitle,

    #[error("choice questions need at least one option")]
    MissingOptions,

    #[error("text questions cannot carry options")]
    UnexpectedOptions,

    #[error("max score must be a non-negative number")]
    InvalidMaxScore,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultiChoice,
    Text,
    /// Answered with an uploaded file; this client cannot collect one.
    ImageUpload,
    /// Any type added to the backend after this client was built.
    #[serde(other)]
    Unsupported,
}

impl QuestionType {
    #[must_use]
    pub fn is_choice(self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::MultiChoice)
    }

    /// Scored by a grader rather than against `correct_answers`.
    #[must_use]
    pub fn is_manually_graded(self) -> bool {
        matches!(self, QuestionType::Text | QuestionType::ImageUpload)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "Single choice",
            QuestionType::MultiChoice => "Multiple choice",
            QuestionType::Text => "Free text",
            QuestionType::ImageUpload => "Image upload",
            QuestionType::Unsupported => "Unsupported",
        }
    }
}

fn default_max_score() -> f64 {
    1.0
}

/// A question as seen by the client.
///
/// `correct_answers` is only populated in admin and review contexts; use
/// [`Question::for_attempt`] before handing a question to an exam screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default, deserialize_with = "option_labels")]
    pub options: Vec<String>,
    #[serde(default = "default_max_score")]
    pub max_score: f64,
    #[serde(
        default,
        deserialize_with = "optional_labels",
        skip_serializing_if = "Option::is_none"
    )]
    pub correct_answers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

impl Question {
    /// Check the shape invariants the exam screens rely on.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the title is blank, options do not match
    /// the question type, or the max score is negative.
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.title.trim().is_empty() {
            return Err(QuestionError::EmptyTitle);
        }
        if self.kind.is_choice() && self.options.is_empty() {
            return Err(QuestionError::MissingOptions);
        }
        if !self.kind.is_choice() && !self.options.is_empty() {
            return Err(QuestionError::UnexpectedOptions);
        }
        if !self.max_score.is_finite() || self.max_score < 0.0 {
            return Err(QuestionError::InvalidMaxScore);
        }
        Ok(())
    }

    /// Copy safe to show a student mid-attempt: answer-revealing fields removed.
    #[must_use]
    pub fn for_attempt(mut self) -> Self {
        self.correct_answers = None;
        self
    }

    #[must_use]
    pub fn has_option(&self, label: &str) -> bool {
        self.options.iter().any(|option| option == label)
    }
}
