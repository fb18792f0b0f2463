use exam_core::model::User;
use exam_core::validation::{LoginForm, SignupForm};
use tracing::{debug, info};

use crate::api::{ApiClient, SignupRequest};
use crate::error::AuthServiceError;
use crate::session::SessionContext;

/// Sign-in, sign-up and sign-out.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    session: SessionContext,
}

impl AuthService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let session = api.session().clone();
        Self { api, session }
    }

    /// Validate the form, exchange it for a token and remember both.
    ///
    /// # Errors
    ///
    /// Returns `AuthServiceError::Invalid` before any request when the form
    /// fails validation, otherwise API or storage errors.
    pub async fn login(&self, form: &LoginForm) -> Result<User, AuthServiceError> {
        form.check()?;
        let response = self.api.login(form.email.trim(), &form.password).await?;
        debug!(token_type = ?response.token_type, "login accepted");
        self.session
            .set_credentials(response.access_token, response.user.clone())
            .await?;
        info!(user = %response.user.email, role = %response.user.role, "signed in");
        Ok(response.user)
    }

    /// Create an account. Does not sign the new user in.
    ///
    /// # Errors
    ///
    /// Returns `AuthServiceError::Invalid` before any request when the form
    /// fails validation, otherwise the API error.
    pub async fn signup(&self, form: &SignupForm) -> Result<User, AuthServiceError> {
        form.check()?;
        let request = SignupRequest {
            email: form.email.trim(),
            password: &form.password,
            full_name: form.full_name.trim(),
            role: form.role,
        };
        let user = self.api.signup(&request).await?;
        info!(user = %user.email, "account created");
        Ok(user)
    }

    /// Forget the credential and every cached response.
    ///
    /// # Errors
    ///
    /// Returns `AuthServiceError::Storage` if local storage cannot be cleared.
    pub async fn logout(&self) -> Result<(), AuthServiceError> {
        self.api.cache().clear();
        self.session.clear().await?;
        info!("signed out");
        Ok(())
    }

    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }
}
