//! Form schemas for the login, signup and admin screens.
//!
//! Validation runs locally so field messages show up without a network round
//! trip. Each form exposes `check()` returning [`FieldErrors`] keyed by field
//! name, first message per field.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::model::{NewExam, Role};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(field, message)| (field.as_str(), message.as_str()))
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, list) in errors.field_errors() {
            if let Some(first) = list.first() {
                let message = first
                    .message
                    .as_ref()
                    .map_or_else(|| first.code.to_string(), ToString::to_string);
                out.insert(field.to_string(), message);
            }
        }
        out
    }
}

//
// ─── AUTH FORMS ────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, Default, PartialEq, Eq, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns `FieldErrors` for each invalid field.
    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(FieldErrors::from)
    }
}

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < 8 {
        return Err(rule("password_length", "Password must be at least 8 characters"));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(rule("password_upper", "Password must contain uppercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(rule("password_lower", "Password must contain lowercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(rule("password_digit", "Password must contain number"));
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(rule("password_special", "Password must contain special character"));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Validate)]
pub struct SignupForm {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(custom(function = validate_password))]
    pub password: String,
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub full_name: String,
    pub role: Role,
}

impl Default for SignupForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            full_name: String::new(),
            role: Role::Student,
        }
    }
}

impl SignupForm {
    /// # Errors
    ///
    /// Returns `FieldErrors` for each invalid field.
    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(FieldErrors::from)
    }
}

//
// ─── ADMIN FORMS ───────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, PartialEq, Eq, Validate)]
pub struct ExamForm {
    #[validate(length(min = 1, max = 200, message = "Title is required (max 200 characters)"))]
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes"))]
    pub duration_minutes: u32,
}

impl ExamForm {
    /// # Errors
    ///
    /// Returns `FieldErrors` for invalid fields, including an `end_time`
    /// entry when the window is empty or inverted.
    pub fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = self.validate().map_or_else(FieldErrors::from, |()| FieldErrors::new());
        if self.end_time <= self.start_time {
            errors.insert("end_time", "End time must be after start time");
        }
        errors.into_result()
    }

    /// Validated request body.
    ///
    /// # Errors
    ///
    /// Returns `FieldErrors` when [`ExamForm::check`] fails.
    pub fn to_new_exam(&self) -> Result<NewExam, FieldErrors> {
        self.check()?;
        let description = self.description.trim();
        Ok(NewExam {
            title: self.title.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            start_time: self.start_time,
            end_time: self.end_time,
            duration_minutes: self.duration_minutes,
        })
    }
}

/// Manual grading input: a number between zero and the question's max score.
///
/// # Errors
///
/// Returns `FieldErrors` with a `score` entry when the input is not a number
/// or is out of range.
pub fn check_score(raw: &str, max_score: f64) -> Result<f64, FieldErrors> {
    match raw.trim().parse::<f64>() {
        Ok(score) => score_in_range(score, max_score),
        Err(_) => {
            let mut errors = FieldErrors::new();
            errors.insert("score", "Please enter a valid number");
            Err(errors)
        }
    }
}

/// # Errors
///
/// Returns `FieldErrors` with a `score` entry outside `0..=max_score`.
pub fn score_in_range(score: f64, max_score: f64) -> Result<f64, FieldErrors> {
    if score.is_finite() && (0.0..=max_score).contains(&score) {
        return Ok(score);
    }
    let mut errors = FieldErrors::new();
    errors.insert("score", format!("Score must be between 0 and {max_score}"));
    Err(errors)
}

/// Only spreadsheet imports are accepted by the question bank.
///
/// # Errors
///
/// Returns `FieldErrors` with a `file` entry for any other extension.
pub fn check_import_file(file_name: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if !file_name.to_ascii_lowercase().ends_with(".xlsx") {
        errors.insert("file", "Only .xlsx files are allowed");
    }
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::time::fixed_now;

    #[test]
    fn login_requires_email_and_password() {
        let errors = LoginForm::default().check().unwrap_err();
        assert_eq!(errors.get("email"), Some("Enter a valid email address"));
        assert_eq!(errors.get("password"), Some("Password is required"));

        let ok = LoginForm {
            email: "ada@example.com".into(),
            password: "x".into(),
        };
        assert!(ok.check().is_ok());
    }

    #[test]
    fn signup_password_rules_report_first_failure() {
        let mut form = SignupForm {
            email: "ada@example.com".into(),
            password: "short".into(),
            full_name: "Ada".into(),
            role: Role::Student,
        };
        let errors = form.check().unwrap_err();
        assert_eq!(errors.get("password"), Some("Password must be at least 8 characters"));

        form.password = "longenough1!".into();
        let errors = form.check().unwrap_err();
        assert_eq!(errors.get("password"), Some("Password must contain uppercase letter"));

        form.password = "Longenough1".into();
        let errors = form.check().unwrap_err();
        assert_eq!(errors.get("password"), Some("Password must contain special character"));

        form.password = "Longenough1!".into();
        assert!(form.check().is_ok());
    }

    #[test]
    fn signup_name_too_short() {
        let form = SignupForm {
            email: "ada@example.com".into(),
            password: "Longenough1!".into(),
            full_name: "A".into(),
            role: Role::Admin,
        };
        let errors = form.check().unwrap_err();
        assert_eq!(errors.get("full_name"), Some("Name must be at least 2 characters"));
    }

    #[test]
    fn exam_window_must_be_ordered() {
        let form = ExamForm {
            title: "Final".into(),
            description: "  ".into(),
            start_time: fixed_now(),
            end_time: fixed_now() - Duration::minutes(1),
            duration_minutes: 60,
        };
        let errors = form.check().unwrap_err();
        assert_eq!(errors.get("end_time"), Some("End time must be after start time"));

        let fixed = ExamForm {
            end_time: fixed_now() + Duration::hours(3),
            ..form
        };
        let exam = fixed.to_new_exam().unwrap();
        assert_eq!(exam.description, None);
    }

    #[test]
    fn exam_duration_range() {
        let form = ExamForm {
            title: "Quiz".into(),
            description: String::new(),
            start_time: fixed_now(),
            end_time: fixed_now() + Duration::hours(1),
            duration_minutes: 0,
        };
        assert!(form.check().unwrap_err().get("duration_minutes").is_some());
    }

    #[test]
    fn score_input_bounds() {
        assert_eq!(check_score(" 2.5 ", 5.0), Ok(2.5));
        assert_eq!(
            check_score("abc", 5.0).unwrap_err().get("score"),
            Some("Please enter a valid number")
        );
        assert!(check_score("6", 5.0).is_err());
        assert!(check_score("-1", 5.0).is_err());
    }

    #[test]
    fn import_accepts_only_xlsx() {
        assert!(check_import_file("bank.XLSX").is_ok());
        assert!(check_import_file("bank.csv").is_err());
    }
}
