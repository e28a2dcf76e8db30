//! Authentication service.
//!
//! The backend owns accounts and sessions; this service validates input
//! before anything is sent and turns the backend's answers into session
//! state. The page decides what to show from the result.

mod error;

pub use error::AuthError;

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

use bookstore_core::Email;

use crate::api::ApiClient;
use crate::api::types::Authenticated;
use crate::models::SessionState;

/// Authentication service.
///
/// Handles session checks, login, registration and logout against the
/// backend API.
pub struct AuthService<'a> {
    api: &'a ApiClient,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Ask the backend who is signed in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the check fails; the caller keeps its
    /// current state in that case.
    #[instrument(skip(self))]
    pub async fn check_session(&self) -> Result<SessionState, AuthError> {
        let user = self.api.current_user().await.map_err(|e| {
            warn!(error = %e, "Session check failed");
            AuthError::from(e)
        })?;
        Ok(SessionState::from(user))
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` or `AuthError::MissingPassword`
    /// before any request is made.
    /// Returns `AuthError::Rejected` with the backend's message on bad
    /// credentials.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Authenticated, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let authenticated = self.api.login(&email, password).await?;
        info!(user = %authenticated.user.name, "Logged in");
        Ok(authenticated)
    }

    /// Create an account; the backend signs the new user in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingName`, `AuthError::InvalidEmail` or
    /// `AuthError::MissingPassword` before any request is made.
    /// Returns `AuthError::Rejected` with the backend's message, e.g. when
    /// the email is already registered.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<Authenticated, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }
        let email = Email::parse(email)?;
        validate_password(password)?;

        let authenticated = self.api.register(name, &email, password).await?;
        info!(user = %authenticated.user.name, "Registered");
        Ok(authenticated)
    }

    /// End the backend session.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses or the request fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.api.logout().await?;
        info!("Logged out");
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// The backend sets the password rules; the client only refuses blanks.
fn validate_password(password: &SecretString) -> Result<(), AuthError> {
    if password.expose_secret().is_empty() {
        return Err(AuthError::MissingPassword);
    }
    Ok(())
}
