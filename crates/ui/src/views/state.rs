use dioxus::prelude::*;
use services::ApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// The credential was rejected; the guard is already on its way to login.
    SignedOut,
    NotFound,
    Offline,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn from_api(err: &ApiError) -> Self {
        match err {
            ApiError::Unauthorized => ViewError::SignedOut,
            ApiError::NotFound(_) => ViewError::NotFound,
            ApiError::Transient(_) => ViewError::Offline,
            _ => ViewError::Unknown,
        }
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            ViewError::SignedOut => "Your session has expired. Please sign in again.",
            ViewError::NotFound => "Not found.",
            ViewError::Offline => "The server could not be reached. Please try again.",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
