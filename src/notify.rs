//! Toast notifications raised by widgets and shown once by the page

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub text: String,
}

/// Pending toasts, handed to the renderer exactly once
#[derive(Debug, Default)]
pub struct Notifications {
    pending: Vec<Notification>,
}

impl Notifications {
    pub fn success<S: Into<String>>(&mut self, text: S) {
        self.push(Level::Success, text.into());
    }

    pub fn error<S: Into<String>>(&mut self, text: S) {
        self.push(Level::Error, text.into());
    }

    fn push(&mut self, level: Level, text: String) {
        tracing::debug!(?level, %text, "Raising notification");
        self.pending.push(Notification { level, text });
    }

    #[must_use]
    pub fn pending(&self) -> &[Notification] {
        &self.pending
    }

    /// Take every pending toast, leaving the queue empty
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }
}
