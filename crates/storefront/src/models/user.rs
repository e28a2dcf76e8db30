//! User and session state.

use serde::{Deserialize, Serialize};

/// The signed-in user as reported by the backend.
///
/// Held in memory for the lifetime of one page; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// Session state of the current page.
///
/// Starts `Unknown` until the backend has been asked; a failed check leaves
/// it `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unknown,
    Anonymous,
    Authenticated(User),
}

impl SessionState {
    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Unknown | Self::Anonymous => None,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(|u| u.is_admin)
    }
}

impl From<Option<User>> for SessionState {
    fn from(user: Option<User>) -> Self {
        user.map_or(Self::Anonymous, Self::Authenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(is_admin: bool) -> User {
        User {
            name: "Reader".to_string(),
            email: None,
            is_admin,
        }
    }

    #[test]
    fn test_default_is_unknown() {
        let state = SessionState::default();
        assert_eq!(state, SessionState::Unknown);
        assert!(!state.is_authenticated());
        assert!(state.user().is_none());
    }

    #[test]
    fn test_from_backend_answer() {
        assert_eq!(SessionState::from(None), SessionState::Anonymous);
        let state = SessionState::from(Some(user(true)));
        assert!(state.is_authenticated());
        assert!(state.is_admin());
        assert!(!SessionState::from(Some(user(false))).is_admin());
    }
}
