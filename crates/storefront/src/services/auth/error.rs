//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bookstore_core::EmailError),

    /// Registration without a display name.
    #[error("name is required")]
    MissingName,

    /// Login or registration without a password.
    #[error("password is required")]
    MissingPassword,

    /// The backend refused the request; the message is shown verbatim.
    #[error("{0}")]
    Rejected(String),

    /// The exchange with the backend failed.
    #[error("api error: {0}")]
    Api(#[source] ApiError),
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Rejected(message) => Self::Rejected(message),
            other => Self::Api(other),
        }
    }
}

impl AuthError {
    /// Errors caught before any request was sent.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidEmail(_) | Self::MissingName | Self::MissingPassword
        )
    }
}
