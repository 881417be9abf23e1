//! Server-side view models for the dashboard pages.
//!
//! Each view walks `Initializing -> Loading -> {Ready | NotFound | Error}` once
//! per request; a new request starts over.

pub mod detail;
pub mod html;
pub mod list;

pub use self::detail::VehicleDetailView;
pub use self::list::{CreateOutcome, VehicleListView};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewState {
    #[default]
    Initializing,
    Loading,
    Ready,
    NotFound,
    Error,
}

impl ViewState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::NotFound | Self::Error)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

impl NotificationLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Transient toast shown once on the rendered page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}
