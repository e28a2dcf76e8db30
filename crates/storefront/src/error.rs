//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for page operations. Internal errors
//! are captured to Sentry by [`AppError::report`] before a short message is
//! shown to the user.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::auth::AuthError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Backend API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// A view failed to render.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),
}

impl AppError {
    /// Whether this is a fault on our side (or the backend's) rather than
    /// something the user can fix.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Config(_) => false,
            Self::Api(err) => err.is_transport(),
            Self::Auth(err) => matches!(err, AuthError::Api(_)),
            Self::Storage(_) | Self::Render(_) => true,
        }
    }

    /// Message safe to show the user.
    ///
    /// Backend rejections and validation failures are shown as-is; internal
    /// details are not.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.to_string(),
            Self::Api(ApiError::Rejected(message)) => message.clone(),
            Self::Api(_) => "The bookstore is not reachable right now".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::MissingName => "Please enter your name".to_string(),
                AuthError::MissingPassword => "Please enter your password".to_string(),
                AuthError::Rejected(message) => message.clone(),
                AuthError::Api(_) => "Authentication error".to_string(),
            },
            Self::Storage(StorageError::Corrupt { .. } | StorageError::Invalid { .. }) => {
                "Saved cart is unreadable; run `bookstore cart clear` to reset it".to_string()
            }
            Self::Storage(_) => "Could not access local storage".to_string(),
            Self::Render(_) => "Internal error".to_string(),
        }
    }

    /// Capture internal errors to Sentry and log them.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::debug!(error = %self, "User-facing error");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(name: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(name.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Auth(AuthError::MissingPassword);
        assert_eq!(err.to_string(), "Auth error: password is required");

        let err = AppError::Api(ApiError::Rejected("Out of stock".to_string()));
        assert_eq!(err.to_string(), "API error: Out of stock");
    }

    #[test]
    fn test_user_messages_hide_internals() {
        let err = AppError::Api(ApiError::Status {
            endpoint: "api/product/all",
            status: 500,
        });
        assert!(err.is_internal());
        assert!(!err.user_message().contains("500"));

        let err = AppError::Auth(AuthError::Rejected("Wrong password".to_string()));
        assert!(!err.is_internal());
        assert_eq!(err.user_message(), "Wrong password");
    }

    #[test]
    fn test_corrupt_cart_message_names_the_fix() {
        let source = serde_json::from_str::<u8>("{").unwrap_err();
        let err = AppError::Storage(StorageError::Corrupt {
            key: "bookstore_cart".to_string(),
            source,
        });
        assert!(err.user_message().contains("cart clear"));
    }
}
