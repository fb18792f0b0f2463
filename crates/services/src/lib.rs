#![forbid(unsafe_code)]

pub mod admin_service;
pub mod api;
pub mod app_services;
pub mod attempt;
pub mod auth_service;
pub mod config;
pub mod error;
pub mod exam_service;
pub mod session;

pub use admin_service::AdminService;
pub use api::{ApiClient, CacheTag, ImportReport, QueryCache};
pub use app_services::AppServices;
pub use attempt::{
    AttemptApi, AttemptController, AttemptControllerFactory, AttemptFailure, AttemptPhase,
    AttemptSnapshot, StartOutcome, SubmitOutcome,
};
pub use auth_service::AuthService;
pub use config::ClientConfig;
pub use error::{AdminServiceError, ApiError, AppServicesError, AuthServiceError, ConflictReason};
pub use exam_service::ExamService;
pub use session::{AuthSession, SessionContext};
