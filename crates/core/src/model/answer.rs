use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::de::optional_labels;
use crate::model::ids::QuestionId;

/// Current local value for one question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerValue {
    /// Selected option labels, in selection order.
    Choices(Vec<String>),
    Text(String),
}

impl AnswerValue {
    #[must_use]
    pub fn selected(&self) -> &[String] {
        match self {
            AnswerValue::Choices(selected) => selected,
            AnswerValue::Text(_) => &[],
        }
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(text) => Some(text),
            AnswerValue::Choices(_) => None,
        }
    }

    #[must_use]
    pub fn is_selected(&self, label: &str) -> bool {
        self.selected().iter().any(|selected| selected == label)
    }

    /// Nothing worth rendering: no selection, or an empty text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Choices(selected) => selected.is_empty(),
            AnswerValue::Text(text) => text.is_empty(),
        }
    }
}

/// Wire shape of a saved answer, used both for resume hydration and for the
/// save request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAnswer {
    pub question_id: QuestionId,
    #[serde(
        default,
        deserialize_with = "optional_labels",
        skip_serializing_if = "Option::is_none"
    )]
    pub selected_options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_answer: Option<String>,
}

impl SavedAnswer {
    #[must_use]
    pub fn from_value(question_id: QuestionId, value: &AnswerValue) -> Self {
        match value {
            AnswerValue::Choices(selected) => Self {
                question_id,
                selected_options: Some(selected.clone()),
                text_answer: None,
            },
            AnswerValue::Text(text) => Self {
                question_id,
                selected_options: None,
                text_answer: Some(text.clone()),
            },
        }
    }

    /// Selected options win over text; a row with neither carries no value.
    #[must_use]
    pub fn value(&self) -> Option<AnswerValue> {
        if let Some(selected) = &self.selected_options {
            return Some(AnswerValue::Choices(selected.clone()));
        }
        self.text_answer.clone().map(AnswerValue::Text)
    }
}

/// Local answer map for one attempt. At most one value per question; every
/// write overwrites.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    answers: HashMap<QuestionId, AnswerValue>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_saved(saved: &[SavedAnswer]) -> Self {
        let answers = saved
            .iter()
            .filter_map(|row| row.value().map(|value| (row.question_id.clone(), value)))
            .collect();
        Self { answers }
    }

    #[must_use]
    pub fn get(&self, question_id: &QuestionId) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    /// Single choice: the new option replaces any prior selection.
    pub fn select_single(&mut self, question_id: &QuestionId, label: &str) -> AnswerValue {
        let value = AnswerValue::Choices(vec![label.to_string()]);
        self.answers.insert(question_id.clone(), value.clone());
        value
    }

    /// Multi choice: adds the option when absent, removes it when present.
    /// Remaining options keep the order in which they were selected.
    pub fn toggle(&mut self, question_id: &QuestionId, label: &str) -> AnswerValue {
        let mut selected = match self.answers.remove(question_id) {
            Some(AnswerValue::Choices(selected)) => selected,
            Some(AnswerValue::Text(_)) | None => Vec::new(),
        };
        if let Some(pos) = selected.iter().position(|existing| existing == label) {
            selected.remove(pos);
        } else {
            selected.push(label.to_string());
        }
        let value = AnswerValue::Choices(selected);
        self.answers.insert(question_id.clone(), value.clone());
        value
    }

    pub fn set_text(&mut self, question_id: &QuestionId, text: impl Into<String>) -> AnswerValue {
        let value = AnswerValue::Text(text.into());
        self.answers.insert(question_id.clone(), value.clone());
        value
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Questions with a non-blank value.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.values().filter(|value| !value.is_blank()).count()
    }
}
