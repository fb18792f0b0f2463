use std::sync::Arc;

use storage::repository::Storage;
use tracing::info;

use crate::admin_service::AdminService;
use crate::api::ApiClient;
use crate::attempt::{AttemptApi, AttemptControllerFactory};
use crate::auth_service::AuthService;
use crate::config::ClientConfig;
use crate::error::AppServicesError;
use crate::exam_service::ExamService;
use crate::session::SessionContext;

/// Composition root: one session, one API client, and the services built on them.
#[derive(Clone)]
pub struct AppServices {
    config: ClientConfig,
    session: SessionContext,
    api: ApiClient,
    auth: Arc<AuthService>,
    exams: Arc<ExamService>,
    admin: Arc<AdminService>,
    attempts: AttemptControllerFactory,
}

impl AppServices {
    /// Build services backed by `SQLite` local storage and restore any saved
    /// credential.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage or the HTTP client cannot be
    /// initialised.
    pub async fn new_sqlite(config: ClientConfig) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        Self::with_storage(config, storage).await
    }

    /// # Errors
    ///
    /// Returns `AppServicesError` if the stored credential cannot be read or
    /// the HTTP client cannot be built.
    pub async fn with_storage(
        config: ClientConfig,
        storage: Storage,
    ) -> Result<Self, AppServicesError> {
        let session = SessionContext::new(Arc::clone(&storage.sessions));
        if let Some(restored) = session.restore().await? {
            info!(user = %restored.user.email, role = %restored.user.role, "resumed previous session");
        }

        let api = ApiClient::new(&config, session.clone())?;
        let attempt_api: Arc<dyn AttemptApi> = Arc::new(api.clone());

        Ok(Self {
            auth: Arc::new(AuthService::new(api.clone())),
            exams: Arc::new(ExamService::new(api.clone())),
            admin: Arc::new(AdminService::new(api.clone())),
            attempts: AttemptControllerFactory::new(attempt_api, config.autosave_debounce),
            config,
            session,
            api,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> SessionContext {
        self.session.clone()
    }

    #[must_use]
    pub fn api(&self) -> ApiClient {
        self.api.clone()
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
