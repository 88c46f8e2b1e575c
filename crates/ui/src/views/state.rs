use dioxus::prelude::*;
use services::{ErrorKind, StoreError, UserFacingError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewError {
    Failed(UserFacingError),
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Failed(err) => &err.title,
            Self::Unknown => "Something went wrong",
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Failed(err) => &err.details,
            Self::Unknown => "Something went wrong. Please try again.",
        }
    }

    #[must_use]
    pub fn can_retry(&self) -> bool {
        match self {
            Self::Failed(err) => err.can_retry,
            Self::Unknown => true,
        }
    }
}

impl From<UserFacingError> for ViewError {
    fn from(err: UserFacingError) -> Self {
        Self::Failed(err)
    }
}

impl From<StoreError> for ViewError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Api(api) => Self::Failed(UserFacingError::from(&api)),
            StoreError::MissingFilters => {
                Self::Failed(UserFacingError::new(ErrorKind::Unknown, err.to_string()))
            }
            _ => Self::Unknown,
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
    resource: Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(err.clone()),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
