mod answer;
mod attempt;
mod de;
mod exam;
mod ids;
mod question;
mod user;

pub use answer::{AnswerSheet, AnswerValue, SavedAnswer};
pub use attempt::{
    AttemptResult, AttemptReview, AttemptState, AttemptStatus, AttemptSummary, QuestionReview,
    score_percentage,
};
pub use exam::{Exam, ExamAttemptStatus, ExamFilter, NewExam};
pub use ids::{AttemptId, ExamId, QuestionId, UserId};
pub use question::{Question, QuestionError, QuestionType};
pub use user::{Role, User};
