//! User-facing notifications raised by watchlist mutations.

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Saved,
    Removed,
    SaveFailed,
    RemoveFailed,
}

/// An alert the shell shows after a toggle resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    /// Success carries the server's confirmation text verbatim.
    pub fn saved(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Saved,
            title: "Saved".to_string(),
            message: message.into(),
        }
    }

    pub fn removed(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Removed,
            title: "Removed".to_string(),
            message: message.into(),
        }
    }

    pub fn save_failed(err: &ApiError) -> Self {
        Self {
            kind: NotificationKind::SaveFailed,
            title: "Save failed".to_string(),
            message: format!("Failed to save movie: {err}"),
        }
    }

    pub fn remove_failed(err: &ApiError) -> Self {
        Self {
            kind: NotificationKind::RemoveFailed,
            title: "Remove failed".to_string(),
            message: format!("Failed to remove movie: {err}"),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            NotificationKind::SaveFailed | NotificationKind::RemoveFailed
        )
    }
}
