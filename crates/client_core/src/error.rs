use thiserror::Error;

pub const CANNOT_CONNECT_MESSAGE: &str =
    "Cannot connect to server. Please make sure the backend is running.";
pub const MISSING_TOKEN_MESSAGE: &str = "Authentication failed - no token received";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unauthorized: {}", .0.as_deref().unwrap_or("credentials rejected"))]
    Unauthorized(Option<String>),
    #[error("server returned {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Server { status: u16, detail: Option<String> },
    #[error("failed to reach {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request rejected by server: {0}")]
    Rejected(String),
    #[error("authentication response did not contain an access token")]
    MissingToken,
    #[error("unexpected response payload: {0}")]
    Decode(String),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

impl ClientError {
    pub(crate) fn transport(url: &str, source: reqwest::Error) -> Self {
        if source.is_connect() || source.is_timeout() || source.is_request() {
            Self::Connect {
                url: url.to_string(),
                source,
            }
        } else if source.is_decode() {
            Self::Decode(source.to_string())
        } else {
            Self::Other(source.to_string())
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect { .. })
    }

    /// Human-readable message: server detail, then HTTP status, then
    /// connectivity, then the raw error text.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized(Some(detail)) => detail.clone(),
            Self::Unauthorized(None) => "Server error: 401".to_string(),
            Self::Server {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::Server {
                status,
                detail: None,
            } => format!("Server error: {status}"),
            Self::Connect { .. } => CANNOT_CONNECT_MESSAGE.to_string(),
            Self::MissingToken => MISSING_TOKEN_MESSAGE.to_string(),
            Self::Rejected(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
