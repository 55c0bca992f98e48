//! Recording fake backend shared by the controller and command tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use client_core::{
    AnnotatedText, AuthForm, AuthMode, ClientError, DocumentService, Session, Simplification,
    SourceDocument,
};
use shared::{
    domain::{Language, SimplificationLevel, UserId},
    protocol::{ServiceInfo, UserProfile},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Unauthorized,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Authenticate(AuthMode, String),
    Extract(String),
    Simplify(String, SimplificationLevel),
    Translate(String, Language),
    CurrentUser,
    ServiceInfo,
}

#[derive(Clone)]
pub struct FakeService {
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub auth: Reply,
    pub extract: Reply,
    pub simplify: Reply,
    pub translate: Reply,
    pub profile: Reply,
    pub extracted: String,
    pub simplified: String,
    pub annotated: Option<String>,
    pub translated: String,
}

impl Default for FakeService {
    fn default() -> Self {
        Self {
            calls: Arc::default(),
            auth: Reply::Ok,
            extract: Reply::Ok,
            simplify: Reply::Ok,
            translate: Reply::Ok,
            profile: Reply::Ok,
            extracted: "This agreement binds...".into(),
            simplified: "This deal binds...".into(),
            annotated: None,
            translated: "यह सौदा...".into(),
        }
    }
}

impl FakeService {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn failure(reply: Reply) -> Option<ClientError> {
        match reply {
            Reply::Ok => None,
            Reply::Unauthorized => Some(ClientError::Unauthorized(Some(
                "Could not validate credentials".into(),
            ))),
            Reply::Fail => Some(ClientError::Server {
                status: 500,
                detail: Some("backend exploded".into()),
            }),
        }
    }
}

#[async_trait]
impl DocumentService for FakeService {
    async fn authenticate(&self, mode: AuthMode, form: &AuthForm) -> Result<Session, ClientError> {
        self.record(Call::Authenticate(mode, form.email.clone()));
        match self.auth {
            Reply::Ok => Ok(Session::new("token-abc", UserId(7))),
            Reply::Unauthorized => Err(ClientError::Unauthorized(Some(
                "Invalid email or password".into(),
            ))),
            Reply::Fail => Err(ClientError::MissingToken),
        }
    }

    async fn extract_text(
        &self,
        _session: &Session,
        document: &SourceDocument,
    ) -> Result<String, ClientError> {
        self.record(Call::Extract(document.file_name.clone()));
        match Self::failure(self.extract) {
            Some(err) => Err(err),
            None => Ok(self.extracted.clone()),
        }
    }

    async fn simplify(
        &self,
        _session: &Session,
        text: &str,
        level: SimplificationLevel,
    ) -> Result<Simplification, ClientError> {
        self.record(Call::Simplify(text.to_string(), level));
        if let Some(err) = Self::failure(self.simplify) {
            return Err(err);
        }
        Ok(Simplification {
            plain: self.simplified.clone(),
            annotated: AnnotatedText::resolve(&self.simplified, self.annotated.as_deref(), &[]),
            level,
        })
    }

    async fn translate(
        &self,
        _session: &Session,
        text: &str,
        language: Language,
    ) -> Result<String, ClientError> {
        self.record(Call::Translate(text.to_string(), language));
        match Self::failure(self.translate) {
            Some(err) => Err(err),
            None => Ok(self.translated.clone()),
        }
    }

    async fn current_user(&self, session: &Session) -> Result<UserProfile, ClientError> {
        self.record(Call::CurrentUser);
        match Self::failure(self.profile) {
            Some(err) => Err(err),
            None => Ok(UserProfile {
                id: session.user_id(),
                name: "Ana Lopez".into(),
                email: "ana@example.com".into(),
            }),
        }
    }

    async fn service_info(&self) -> Result<ServiceInfo, ClientError> {
        self.record(Call::ServiceInfo);
        Ok(ServiceInfo {
            message: "Legal Document Simplifier API".into(),
        })
    }
}
