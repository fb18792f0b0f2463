use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::de::null_as_default;
use crate::model::ids::{AttemptId, ExamId};
use crate::time::api_timestamp;

/// Where the current student stands on an exam, as reported by the exam list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamAttemptStatus {
    #[default]
    NotAttempted,
    InProgress,
    Submitted,
}

/// Exam summary as listed on dashboards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    pub id: ExamId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "api_timestamp")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "api_timestamp")]
    pub end_time: DateTime<Utc>,
    pub duration_minutes: u32,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub question_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attempt_status: ExamAttemptStatus,
    #[serde(default)]
    pub attempt_id: Option<AttemptId>,
}

impl Exam {
    /// Inside the scheduled window (inclusive start, exclusive end).
    #[must_use]
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now < self.end_time
    }
}

/// Client-side exam list filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExamFilter {
    pub published: Option<bool>,
}

impl ExamFilter {
    #[must_use]
    pub fn published_only() -> Self {
        Self {
            published: Some(true),
        }
    }

    #[must_use]
    pub fn matches(&self, exam: &Exam) -> bool {
        self.published.is_none_or(|wanted| exam.is_published == wanted)
    }
}

/// Body of the create-exam request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewExam {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "api_timestamp")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "api_timestamp")]
    pub end_time: DateTime<Utc>,
    pub duration_minutes: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::time::fixed_now;

    fn exam(published: bool) -> Exam {
        Exam {
            id: ExamId::new("e1"),
            title: "Midterm".into(),
            description: None,
            start_time: fixed_now(),
            end_time: fixed_now() + Duration::hours(2),
            duration_minutes: 45,
            is_published: published,
            question_count: 3,
            attempt_status: ExamAttemptStatus::NotAttempted,
            attempt_id: None,
        }
    }

    #[test]
    fn decodes_list_row_with_null_status() {
        let exam: Exam = serde_json::from_str(
            r#"{"id":"e1","title":"Midterm","description":null,
                "start_time":"2024-05-01T09:00:00","end_time":"2024-05-01T11:00:00",
                "duration_minutes":45,"is_published":true,"question_count":3,
                "attempt_status":null,"attempt_id":null}"#,
        )
        .unwrap();
        assert_eq!(exam.attempt_status, ExamAttemptStatus::NotAttempted);
        assert_eq!(exam.question_count, 3);
    }

    #[test]
    fn filter_by_publish_flag() {
        assert!(ExamFilter::default().matches(&exam(false)));
        assert!(ExamFilter::published_only().matches(&exam(true)));
        assert!(!ExamFilter::published_only().matches(&exam(false)));
        let drafts = ExamFilter {
            published: Some(false),
        };
        assert!(drafts.matches(&exam(false)));
    }

    #[test]
    fn window_is_half_open() {
        let exam = exam(true);
        assert!(exam.is_open_at(fixed_now()));
        assert!(!exam.is_open_at(fixed_now() + Duration::hours(2)));
    }
}
