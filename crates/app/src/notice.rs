//! User-visible notices: the one channel for telling the user what happened.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: "Success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error".to_string(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl core::fmt::Display for Notice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// A finished action and the notice to show for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Completed<T> {
    pub value: T,
    pub notice: Notice,
}

impl<T> Completed<T> {
    pub fn with_success(value: T, message: &str) -> Self {
        Self {
            value,
            notice: Notice::success(message),
        }
    }
}

/// Success with its notice, or the error notice.
pub type ActionResult<T> = Result<Completed<T>, Notice>;
