//! Error modeling for the terminal controller.

use std::fmt;

use client_core::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Login,
    Extract,
    Simplify,
    Translate,
    Export,
    Profile,
    General,
}

impl UiErrorContext {
    /// Fixed alert shown when a workflow stage fails.
    pub fn alert(self) -> Option<&'static str> {
        match self {
            Self::Extract => Some("Error extracting text from document"),
            Self::Simplify => Some("Error simplifying text"),
            Self::Translate => Some("Error translating text"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
    detail: Option<String>,
}

impl UiError {
    pub fn from_client(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::Unauthorized(_) | ClientError::MissingToken => UiErrorCategory::Auth,
            ClientError::Connect { .. } => UiErrorCategory::Transport,
            ClientError::InvalidDocument(_) | ClientError::Rejected(_) => {
                UiErrorCategory::Validation
            }
            ClientError::Server { status, .. } if (400..500).contains(status) => {
                UiErrorCategory::Validation
            }
            _ => UiErrorCategory::Unknown,
        };

        // Stage failures show the stage alert and keep the cause as detail.
        let (message, detail) = match context.alert() {
            Some(alert) => (alert.to_string(), Some(err.user_message())),
            None => (err.user_message(), None),
        };

        Self {
            category,
            context,
            message,
            detail,
        }
    }

    pub fn validation(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            category: UiErrorCategory::Validation,
            context,
            message: message.into(),
            detail: None,
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} ({detail})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for UiError {}
