pub(crate) mod components;

mod admin;
mod admin_exam;
mod admin_exams;
mod dashboard;
mod exam;
mod grading;
mod landing;
mod login;
mod result_detail;
mod results;
mod signup;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use admin::AdminView;
pub use admin_exam::AdminExamView;
pub use admin_exams::AdminExamsView;
pub use dashboard::DashboardView;
pub use exam::ExamView;
pub use grading::GradingView;
pub use landing::LandingView;
pub use login::LoginView;
pub use result_detail::ResultDetailView;
pub use results::ResultsView;
pub use signup::SignupView;
pub use state::{ViewError, ViewState, view_state_from_resource};
