//! Screen state and request orchestration for the terminal client.

use std::path::{Path, PathBuf};

use client_core::{
    export, AuthForm, AuthMode, ClientError, DocumentService, ExportFormat, ExportTarget, Session,
    SessionStore, SourceDocument, Ticket, Workflow, WorkflowError,
};
use shared::protocol::{ServiceInfo, UserProfile};
use tracing::{debug, info, warn};

use super::{
    events::{UiError, UiErrorContext},
    gate::{self, Route, Screen},
};

/// Result of triggering a workflow stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    /// Refused locally; no request was sent.
    Skipped(WorkflowError),
    /// The server rejected the credential and the session was dropped.
    SignedOut,
    Failed(UiError),
}

#[derive(Debug, Default)]
struct AuthScreen {
    mode: AuthMode,
    error: Option<String>,
}

pub struct AppController<S> {
    service: S,
    store: SessionStore,
    route: Route,
    screen: Screen,
    auth: AuthScreen,
    workflow: Workflow,
}

impl<S: DocumentService> AppController<S> {
    pub fn new(service: S, store: SessionStore) -> Self {
        let mut controller = Self {
            service,
            store,
            route: Route::Root,
            screen: Screen::Auth,
            auth: AuthScreen::default(),
            workflow: Workflow::new(),
        };
        controller.navigate(Route::Root);
        controller
    }

    pub fn navigate(&mut self, requested: Route) -> Screen {
        let resolution = gate::resolve(requested, self.store.is_signed_in());
        if resolution.redirected {
            debug!(from = %requested, to = %resolution.route, "gate redirect");
        }
        if resolution.screen != self.screen {
            // The workflow screen is discarded whenever it is left.
            self.workflow.reset();
            self.auth = AuthScreen::default();
        }
        self.route = resolution.route;
        self.screen = resolution.screen;
        self.screen
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn session(&self) -> Option<&Session> {
        self.store.current()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth.mode
    }

    pub fn auth_error(&self) -> Option<&str> {
        self.auth.error.as_deref()
    }

    pub fn toggle_auth_mode(&mut self) -> AuthMode {
        self.auth.mode = self.auth.mode.toggled();
        self.auth.error = None;
        self.auth.mode
    }

    pub fn set_auth_mode(&mut self, mode: AuthMode) {
        if self.auth.mode != mode {
            self.toggle_auth_mode();
        }
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// Selector access (level, language, compare view). Stage transitions go
    /// through the controller.
    pub fn workflow_mut(&mut self) -> &mut Workflow {
        &mut self.workflow
    }

    pub async fn submit_auth(&mut self, form: &AuthForm) -> Result<(), UiError> {
        if self.screen != Screen::Auth {
            return Err(UiError::validation(UiErrorContext::Login, "Already signed in"));
        }
        let mode = self.auth.mode;
        if let Some(field) = form.missing_field(mode) {
            let err =
                UiError::validation(UiErrorContext::Login, format!("Please enter your {field}"));
            self.auth.error = Some(err.message().to_string());
            return Err(err);
        }

        self.auth.error = None;
        let session = match self.service.authenticate(mode, form).await {
            Ok(session) => session,
            Err(err) => {
                warn!(mode = mode.title(), error = %err, "auth: request failed");
                let ui = UiError::from_client(UiErrorContext::Login, &err);
                self.auth.error = Some(ui.message().to_string());
                return Err(ui);
            }
        };

        self.store
            .store(session)
            .map_err(|err| UiError::from_client(UiErrorContext::Login, &err))?;
        self.navigate(Route::Upload);
        Ok(())
    }

    pub async fn upload(&mut self, path: &Path) -> StepOutcome {
        match SourceDocument::from_path(path) {
            Ok(document) => self.upload_document(document).await,
            Err(err) => StepOutcome::Failed(UiError::from_client(UiErrorContext::Extract, &err)),
        }
    }

    pub async fn upload_document(&mut self, document: SourceDocument) -> StepOutcome {
        let Some(session) = self.active_session() else {
            return StepOutcome::SignedOut;
        };
        let ticket = match self.workflow.begin_extract() {
            Ok(ticket) => ticket,
            Err(err) => return StepOutcome::Skipped(err),
        };

        match self.service.extract_text(&session, &document).await {
            Ok(text) => settled(
                self.workflow
                    .finish_extract(ticket, document.file_name, text),
            ),
            Err(err) => self.stage_failed(ticket, UiErrorContext::Extract, err),
        }
    }

    pub async fn simplify(&mut self) -> StepOutcome {
        let Some(session) = self.active_session() else {
            return StepOutcome::SignedOut;
        };
        let job = match self.workflow.begin_simplify() {
            Ok(job) => job,
            Err(err) => return StepOutcome::Skipped(err),
        };

        match self.service.simplify(&session, &job.text, job.level).await {
            Ok(simplification) => {
                settled(self.workflow.finish_simplify(job.ticket, simplification))
            }
            Err(err) => self.stage_failed(job.ticket, UiErrorContext::Simplify, err),
        }
    }

    pub async fn translate(&mut self) -> StepOutcome {
        let Some(session) = self.active_session() else {
            return StepOutcome::SignedOut;
        };
        let job = match self.workflow.begin_translate() {
            Ok(job) => job,
            Err(err) => return StepOutcome::Skipped(err),
        };

        match self
            .service
            .translate(&session, &job.text, job.language)
            .await
        {
            Ok(translated) => settled(
                self.workflow
                    .finish_translate(job.ticket, job.language, translated),
            ),
            Err(err) => self.stage_failed(job.ticket, UiErrorContext::Translate, err),
        }
    }

    /// Writes the latest output for `target` into `dir`.
    pub fn export(
        &self,
        target: ExportTarget,
        format: ExportFormat,
        dir: &Path,
    ) -> Result<PathBuf, UiError> {
        let content = self.workflow.export_content(target).ok_or_else(|| {
            UiError::validation(
                UiErrorContext::Export,
                format!("No {target} text to export"),
            )
        })?;
        export::render(target, format, content)
            .and_then(|artifact| artifact.write_to(dir))
            .map_err(|err| UiError::from_client(UiErrorContext::Export, &err))
    }

    pub async fn whoami(&mut self) -> Result<UserProfile, UiError> {
        let session = self.active_session().ok_or_else(|| {
            UiError::validation(UiErrorContext::Profile, "Not signed in")
        })?;
        match self.service.current_user(&session).await {
            Ok(profile) => Ok(profile),
            Err(err) => {
                if err.is_unauthorized() {
                    self.sign_out_rejected();
                }
                Err(UiError::from_client(UiErrorContext::Profile, &err))
            }
        }
    }

    pub async fn ping(&self) -> Result<ServiceInfo, UiError> {
        self.service
            .service_info()
            .await
            .map_err(|err| UiError::from_client(UiErrorContext::General, &err))
    }

    pub fn logout(&mut self) -> Result<(), UiError> {
        let cleared = self.store.clear();
        self.navigate(Route::Root);
        info!("signed out");
        cleared.map_err(|err| UiError::from_client(UiErrorContext::General, &err))
    }

    fn active_session(&self) -> Option<Session> {
        if self.screen != Screen::Workflow {
            return None;
        }
        self.store.current().cloned()
    }

    fn stage_failed(
        &mut self,
        ticket: Ticket,
        context: UiErrorContext,
        err: ClientError,
    ) -> StepOutcome {
        self.workflow.fail(ticket);
        if err.is_unauthorized() {
            warn!(stage = %ticket.stage(), "credential rejected; signing out");
            self.sign_out_rejected();
            return StepOutcome::SignedOut;
        }
        warn!(stage = %ticket.stage(), error = %err, "workflow request failed");
        StepOutcome::Failed(UiError::from_client(context, &err))
    }

    fn sign_out_rejected(&mut self) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to remove stored session");
        }
        self.navigate(Route::Root);
    }
}

fn settled(result: Result<(), WorkflowError>) -> StepOutcome {
    match result {
        Ok(()) => StepOutcome::Completed,
        Err(err) => StepOutcome::Skipped(err),
    }
}

#[cfg(test)]
#[path = "../tests/app_tests.rs"]
mod tests;
