mod form;
mod question_card;

pub use form::{FormError, TextField};
pub use question_card::{CountdownBadge, QuestionCard, QuestionNav};
