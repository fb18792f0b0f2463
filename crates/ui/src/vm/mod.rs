mod attempt_vm;
mod exam_vm;
mod review_vm;
mod time_fmt;

pub use attempt_vm::{AttemptScreenVm, NavItemVm, OptionVm, QuestionVm, map_attempt_screen};
pub use exam_vm::{
    AdminExamRowVm, ExamAction, ExamCardVm, attempt_status_label, map_admin_exam_rows,
    map_exam_cards,
};
pub use review_vm::{
    AttemptRowVm, ReviewOptionVm, ReviewQuestionVm, ReviewVm, format_percentage, format_score,
    format_score_of, map_attempt_rows, map_review, submitted_notice,
};
pub use time_fmt::{
    CountdownLevel, format_countdown, format_countdown_opt, format_datetime, parse_input_value,
    to_input_value,
};
