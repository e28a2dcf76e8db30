//! User-facing alerts, notifications and confirmations.
//!
//! The storefront never prints. It hands messages to a [`Notifier`] supplied
//! by the front end (a terminal, a test recorder, ...).

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Severity of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// The alert/confirm surface of a page.
pub trait Notifier: Send + Sync {
    /// Blocking message the user must acknowledge.
    fn alert(&self, message: &str);

    /// Transient message.
    fn notify(&self, kind: NotificationKind, message: &str);

    /// Yes/no question; `true` means the user agreed.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Something a [`Recorder`] saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Alert(String),
    Notify(NotificationKind, String),
    Confirm(String),
}

/// Notifier that records everything and answers confirmations with a fixed
/// reply. Used for headless runs and tests.
#[derive(Debug)]
pub struct Recorder {
    notices: Mutex<Vec<Notice>>,
    confirm_reply: bool,
}

impl Recorder {
    /// Recorder that answers every confirmation with `confirm_reply`.
    #[must_use]
    pub const fn new(confirm_reply: bool) -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
            confirm_reply,
        }
    }

    /// Everything recorded so far, oldest first.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Alert messages only.
    #[must_use]
    pub fn alerts(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::Alert(message) => Some(message),
                Notice::Notify(..) | Notice::Confirm(_) => None,
            })
            .collect()
    }

    fn push(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

impl Notifier for Recorder {
    fn alert(&self, message: &str) {
        self.push(Notice::Alert(message.to_string()));
    }

    fn notify(&self, kind: NotificationKind, message: &str) {
        self.push(Notice::Notify(kind, message.to_string()));
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.push(Notice::Confirm(prompt.to_string()));
        self.confirm_reply
    }
}
