use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response, StatusCode,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Language, SimplificationLevel},
    error::ErrorBody,
    protocol::{
        ExtractTextResponse, LoginRequest, ServiceInfo, SignupRequest, SimplifyRequest,
        SimplifyResponse, TokenResponse, TranslateRequest, TranslateResponse, UserProfile,
    },
};
use tracing::{debug, info};

pub mod annotation;
pub mod document;
pub mod error;
pub mod export;
pub mod session;
pub mod workflow;

pub use annotation::{AnnotatedText, Segment};
pub use document::SourceDocument;
pub use error::ClientError;
pub use export::{Artifact, ExportFormat, ExportTarget};
pub use session::{Session, SessionStore};
pub use workflow::{
    Simplification, SimplifyJob, Stage, Ticket, TranslateJob, Workflow, WorkflowError, WorkflowState,
};

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Login => Self::Register,
            Self::Register => Self::Login,
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/signup",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Register => "Sign Up",
        }
    }
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl AuthForm {
    pub fn login(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn register(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// First required field left blank for `mode`, if any.
    pub fn missing_field(&self, mode: AuthMode) -> Option<&'static str> {
        if mode == AuthMode::Register && self.name.trim().is_empty() {
            Some("name")
        } else if self.email.trim().is_empty() {
            Some("email")
        } else if self.password.is_empty() {
            Some("password")
        } else {
            None
        }
    }
}

impl fmt::Debug for AuthForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Backend operations the client depends on. Authenticated calls take the
/// session explicitly; nothing here reads ambient credential state.
#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn authenticate(&self, mode: AuthMode, form: &AuthForm) -> Result<Session, ClientError>;
    async fn extract_text(
        &self,
        session: &Session,
        document: &SourceDocument,
    ) -> Result<String, ClientError>;
    async fn simplify(
        &self,
        session: &Session,
        text: &str,
        level: SimplificationLevel,
    ) -> Result<Simplification, ClientError>;
    async fn translate(
        &self,
        session: &Session,
        text: &str,
        language: Language,
    ) -> Result<String, ClientError>;
    async fn current_user(&self, session: &Session) -> Result<UserProfile, ClientError>;
    async fn service_info(&self) -> Result<ServiceInfo, ClientError>;
}

pub struct SimplifierClient {
    http: Client,
    api_base: String,
    auth_timeout: Duration,
}

impl SimplifierClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base: String = api_base.into();
        Self {
            http: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
        }
    }

    pub fn with_auth_timeout(mut self, auth_timeout: Duration) -> Self {
        self.auth_timeout = auth_timeout;
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }
}

impl Default for SimplifierClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

#[async_trait]
impl DocumentService for SimplifierClient {
    async fn authenticate(&self, mode: AuthMode, form: &AuthForm) -> Result<Session, ClientError> {
        let url = self.url(mode.endpoint());
        info!(endpoint = mode.endpoint(), email = %form.email, "auth: submitting credentials");

        let request = self.http.post(&url).timeout(self.auth_timeout);
        let request = match mode {
            AuthMode::Login => request.json(&LoginRequest {
                email: form.email.clone(),
                password: form.password.clone(),
            }),
            AuthMode::Register => request.json(&SignupRequest {
                name: form.name.clone(),
                email: form.email.clone(),
                password: form.password.clone(),
            }),
        };
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::transport(&url, e))?;
        let body: TokenResponse = decode(response).await?;

        match (body.access_token.filter(|t| !t.is_empty()), body.user_id) {
            (Some(token), Some(user_id)) => {
                info!(user_id = user_id.0, "auth: credentials accepted");
                Ok(Session::new(token, user_id))
            }
            _ => Err(ClientError::MissingToken),
        }
    }

    async fn extract_text(
        &self,
        session: &Session,
        document: &SourceDocument,
    ) -> Result<String, ClientError> {
        let url = self.url("/extract-text");
        info!(
            file = %document.file_name,
            mime_type = %document.mime_type,
            bytes = document.size_bytes(),
            "extract: uploading document"
        );

        let part = Part::bytes(document.bytes.clone())
            .file_name(document.file_name.clone())
            .mime_str(&document.mime_type)
            .map_err(|e| ClientError::InvalidDocument(e.to_string()))?;
        let response = self
            .http
            .post(&url)
            .bearer_auth(session.access_token())
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .map_err(|e| ClientError::transport(&url, e))?;
        let body: ExtractTextResponse = decode(response).await?;

        if let Some(error) = body.error {
            return Err(ClientError::Rejected(error));
        }
        let extracted = body
            .extracted_text
            .ok_or_else(|| ClientError::Decode("response is missing extracted_text".into()))?;
        debug!(chars = extracted.chars().count(), "extract: text received");
        Ok(extracted)
    }

    async fn simplify(
        &self,
        session: &Session,
        text: &str,
        level: SimplificationLevel,
    ) -> Result<Simplification, ClientError> {
        let url = self.url("/simplify");
        info!(level = %level, chars = text.chars().count(), "simplify: requesting rewrite");

        let response = self
            .http
            .post(&url)
            .bearer_auth(session.access_token())
            .json(&SimplifyRequest {
                text: text.to_string(),
                level,
            })
            .send()
            .await
            .map_err(|e| ClientError::transport(&url, e))?;
        let body: SimplifyResponse = decode(response).await?;

        let annotated = AnnotatedText::resolve(
            &body.simplified_text,
            body.annotated_simplified.as_deref(),
            &body.simplified_risks,
        );
        debug!(
            annotated = annotated.is_annotated(),
            risks = body.simplified_risks.len(),
            "simplify: rewrite received"
        );
        Ok(Simplification {
            plain: body.simplified_text,
            annotated,
            level,
        })
    }

    async fn translate(
        &self,
        session: &Session,
        text: &str,
        language: Language,
    ) -> Result<String, ClientError> {
        let url = self.url("/translate");
        info!(language = %language, chars = text.chars().count(), "translate: requesting translation");

        let response = self
            .http
            .post(&url)
            .bearer_auth(session.access_token())
            .json(&TranslateRequest {
                text: text.to_string(),
                language,
            })
            .send()
            .await
            .map_err(|e| ClientError::transport(&url, e))?;
        let body: TranslateResponse = decode(response).await?;
        Ok(body.translated_text)
    }

    async fn current_user(&self, session: &Session) -> Result<UserProfile, ClientError> {
        let url = self.url("/users/me");
        let response = self
            .http
            .get(&url)
            .bearer_auth(session.access_token())
            .send()
            .await
            .map_err(|e| ClientError::transport(&url, e))?;
        decode(response).await
    }

    async fn service_info(&self) -> Result<ServiceInfo, ClientError> {
        let url = self.url("/");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::transport(&url, e))?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()));
    }

    let detail = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.detail_message());
    debug!(status = status.as_u16(), detail = ?detail, "request failed");
    if status == StatusCode::UNAUTHORIZED {
        Err(ClientError::Unauthorized(detail))
    } else {
        Err(ClientError::Server {
            status: status.as_u16(),
            detail,
        })
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
