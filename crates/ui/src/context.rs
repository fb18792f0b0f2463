use std::sync::Arc;

use exam_core::Clock;
use services::{
    AdminService, AppServices, AttemptControllerFactory, AuthService, ExamService, SessionContext,
};

/// Everything a view needs, provided once at the root of the tree.
#[derive(Clone)]
pub struct AppContext {
    clock: Clock,
    session: SessionContext,
    auth: Arc<AuthService>,
    exams: Arc<ExamService>,
    admin: Arc<AdminService>,
    attempts: AttemptControllerFactory,
}

impl AppContext {
    #[must_use]
    pub fn new(services: &AppServices, clock: Clock) -> Self {
        Self {
            clock,
            session: services.session(),
            auth: services.auth(),
            exams: services.exams(),
            admin: services.admin(),
            attempts: services.attempts(),
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn session(&self) -> SessionContext {
        self.session.clone()
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn exams(&self) -> Arc<ExamService> {
        Arc::clone(&self.exams)
    }

    #[must_use]
    pub fn admin(&self) -> Arc<AdminService> {
        Arc::clone(&self.admin)
    }

    #[must_use]
    pub fn attempts(&self) -> AttemptControllerFactory {
        self.attempts.clone()
    }
}

// Provided by the application composition root (`crates/app`).

#[must_use]
pub fn build_app_context(services: &AppServices) -> AppContext {
    AppContext::new(services, Clock::system())
}
