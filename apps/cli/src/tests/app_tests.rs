use super::*;

use std::fs;

use client_core::WorkflowState;
use shared::domain::{Language, RiskCategory, SimplificationLevel, UserId};

use crate::{
    controller::events::UiErrorCategory,
    test_support::{Call, FakeService, Reply},
};

fn signed_in_store() -> SessionStore {
    let mut store = SessionStore::in_memory();
    store
        .store(Session::new("token-abc", UserId(7)))
        .expect("store session");
    store
}

fn signed_in(service: &FakeService) -> AppController<FakeService> {
    AppController::new(service.clone(), signed_in_store())
}

fn write_document(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"%PDF-1.4 fake").expect("write document");
    path
}

async fn upload_simplify_translate(
    controller: &mut AppController<FakeService>,
    dir: &Path,
) -> Vec<StepOutcome> {
    let path = write_document(dir, "contract.pdf");
    let mut outcomes = vec![controller.upload(&path).await];
    outcomes.push(controller.simplify().await);
    controller
        .workflow_mut()
        .set_language(Some(Language::Hindi));
    outcomes.push(controller.translate().await);
    outcomes
}

#[test]
fn root_without_credential_shows_auth() {
    let mut controller = AppController::new(FakeService::default(), SessionStore::in_memory());
    assert_eq!(controller.screen(), Screen::Auth);
    assert_eq!(controller.route(), Route::Root);

    assert_eq!(controller.navigate(Route::Upload), Screen::Auth);
    assert_eq!(controller.route(), Route::Root);
}

#[test]
fn stored_credential_redirects_root_to_workflow() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.json");
    SessionStore::open(&path)
        .store(Session::new("token-abc", UserId(7)))
        .expect("store");

    let mut controller = AppController::new(FakeService::default(), SessionStore::open(&path));
    assert_eq!(controller.screen(), Screen::Workflow);
    assert_eq!(controller.route(), Route::Upload);
    assert_eq!(controller.navigate(Route::Root), Screen::Workflow);
}

#[tokio::test]
async fn valid_auth_persists_session_and_opens_workflow() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.json");
    let service = FakeService::default();
    let mut controller = AppController::new(service.clone(), SessionStore::open(&path));

    controller
        .submit_auth(&AuthForm::login("ana@example.com", "hunter2"))
        .await
        .expect("login");

    assert_eq!(controller.screen(), Screen::Workflow);
    assert_eq!(controller.route(), Route::Upload);
    let reopened = SessionStore::open(&path);
    let session = reopened.current().expect("persisted session");
    assert_eq!(session.access_token(), "token-abc");
    assert_eq!(session.user_id(), UserId(7));
    assert_eq!(
        service.calls(),
        vec![Call::Authenticate(AuthMode::Login, "ana@example.com".into())]
    );
}

#[tokio::test]
async fn invalid_auth_leaves_storage_empty_and_shows_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.json");
    let service = FakeService {
        auth: Reply::Unauthorized,
        ..FakeService::default()
    };
    let mut controller = AppController::new(service, SessionStore::open(&path));

    let err = controller
        .submit_auth(&AuthForm::login("ana@example.com", "wrong"))
        .await
        .expect_err("rejected");

    assert_eq!(err.message(), "Invalid email or password");
    assert!(err.requires_reauth());
    assert_eq!(controller.auth_error(), Some("Invalid email or password"));
    assert_eq!(controller.screen(), Screen::Auth);
    assert!(controller.session().is_none());
    assert!(!path.exists());
}

#[tokio::test]
async fn missing_token_is_an_auth_error() {
    let service = FakeService {
        auth: Reply::Fail,
        ..FakeService::default()
    };
    let mut controller = AppController::new(service, SessionStore::in_memory());
    let err = controller
        .submit_auth(&AuthForm::login("ana@example.com", "hunter2"))
        .await
        .expect_err("no token");
    assert_eq!(err.message(), "Authentication failed - no token received");
    assert_eq!(controller.screen(), Screen::Auth);
}

#[tokio::test]
async fn incomplete_form_is_rejected_without_request() {
    let service = FakeService::default();
    let mut controller = AppController::new(service.clone(), SessionStore::in_memory());
    assert_eq!(controller.toggle_auth_mode(), AuthMode::Register);

    let err = controller
        .submit_auth(&AuthForm::register("", "ana@example.com", "hunter2"))
        .await
        .expect_err("missing name");
    assert_eq!(err.category(), UiErrorCategory::Validation);
    assert_eq!(controller.auth_error(), Some("Please enter your name"));
    assert!(service.calls().is_empty());

    controller.toggle_auth_mode();
    assert!(controller.auth_error().is_none());
}

#[tokio::test]
async fn signup_uses_register_mode() {
    let service = FakeService::default();
    let mut controller = AppController::new(service.clone(), SessionStore::in_memory());
    controller.set_auth_mode(AuthMode::Register);
    controller
        .submit_auth(&AuthForm::register("Ana Lopez", "ana@example.com", "hunter2"))
        .await
        .expect("signup");
    assert_eq!(
        service.calls(),
        vec![Call::Authenticate(AuthMode::Register, "ana@example.com".into())]
    );
    assert_eq!(controller.screen(), Screen::Workflow);
}

#[tokio::test]
async fn new_upload_clears_simplified_and_translated_text() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = FakeService::default();
    let mut controller = signed_in(&service);
    let outcomes = upload_simplify_translate(&mut controller, dir.path()).await;
    assert!(outcomes.iter().all(|o| *o == StepOutcome::Completed));
    assert!(controller.workflow().translated_text().is_some());

    let lease = write_document(dir.path(), "lease.docx");
    assert_eq!(controller.upload(&lease).await, StepOutcome::Completed);

    let workflow = controller.workflow();
    assert_eq!(workflow.source_name(), Some("lease.docx"));
    assert_eq!(workflow.extracted_text(), Some("This agreement binds..."));
    assert!(workflow.simplified_text().is_none());
    assert!(workflow.translated_text().is_none());
}

#[tokio::test]
async fn simplify_without_extracted_text_sends_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = FakeService {
        extracted: String::new(),
        ..FakeService::default()
    };
    let mut controller = signed_in(&service);

    assert!(matches!(
        controller.simplify().await,
        StepOutcome::Skipped(WorkflowError::NotReady { .. })
    ));
    assert!(service.calls().is_empty());

    let path = write_document(dir.path(), "scan.png");
    assert_eq!(controller.upload(&path).await, StepOutcome::Completed);
    assert!(matches!(
        controller.simplify().await,
        StepOutcome::Skipped(WorkflowError::NotReady { .. })
    ));
    assert_eq!(service.calls(), vec![Call::Extract("scan.png".into())]);
}

#[tokio::test]
async fn translate_without_language_sends_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = FakeService::default();
    let mut controller = signed_in(&service);
    let path = write_document(dir.path(), "contract.pdf");
    controller.upload(&path).await;
    controller.simplify().await;

    assert_eq!(
        controller.translate().await,
        StepOutcome::Skipped(WorkflowError::NotReady {
            stage: client_core::Stage::Translate,
            reason: "no target language selected",
        })
    );
    assert!(!service
        .calls()
        .iter()
        .any(|call| matches!(call, Call::Translate(..))));
}

#[tokio::test]
async fn missing_annotation_shows_plain_simplified_text() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = FakeService::default();
    let mut controller = signed_in(&service);
    let path = write_document(dir.path(), "contract.pdf");
    controller.upload(&path).await;
    controller.simplify().await;

    let simplification = controller.workflow().simplification().expect("simplified");
    assert_eq!(simplification.annotated.plain_text(), "This deal binds...");
    assert!(!simplification.annotated.is_annotated());
}

#[tokio::test]
async fn annotated_markup_becomes_segments() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = FakeService {
        simplified: "You must pay.".into(),
        annotated: Some(
            r#"You <span class="obligation">must</span> pay.<script>alert(1)</script>"#.into(),
        ),
        ..FakeService::default()
    };
    let mut controller = signed_in(&service);
    let path = write_document(dir.path(), "contract.pdf");
    controller.upload(&path).await;
    controller.simplify().await;

    let annotated = &controller
        .workflow()
        .simplification()
        .expect("simplified")
        .annotated;
    assert_eq!(annotated.plain_text(), "You must pay.");
    assert!(annotated.categories().contains(&RiskCategory::Obligation));
}

#[tokio::test]
async fn unauthorized_at_any_stage_signs_out() {
    for stage in ["extract", "simplify", "translate"] {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut service = FakeService::default();
        match stage {
            "extract" => service.extract = Reply::Unauthorized,
            "simplify" => service.simplify = Reply::Unauthorized,
            _ => service.translate = Reply::Unauthorized,
        }
        let mut controller = signed_in(&service);

        let outcomes = upload_simplify_translate(&mut controller, dir.path()).await;

        assert!(
            outcomes.contains(&StepOutcome::SignedOut),
            "{stage}: {outcomes:?}"
        );
        assert!(controller.session().is_none(), "{stage}");
        assert_eq!(controller.screen(), Screen::Auth, "{stage}");
        assert_eq!(controller.workflow().state(), &WorkflowState::Idle, "{stage}");
    }
}

#[tokio::test]
async fn other_failures_alert_and_keep_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = FakeService {
        simplify: Reply::Fail,
        ..FakeService::default()
    };
    let mut controller = signed_in(&service);
    let path = write_document(dir.path(), "contract.pdf");
    controller.upload(&path).await;

    let StepOutcome::Failed(err) = controller.simplify().await else {
        panic!("expected an alert");
    };
    assert_eq!(err.message(), "Error simplifying text");
    assert_eq!(err.detail(), Some("backend exploded"));
    assert_eq!(controller.screen(), Screen::Workflow);
    assert_eq!(
        controller.workflow().extracted_text(),
        Some("This agreement binds...")
    );
    assert!(controller.workflow().pending().is_none());
    assert!(controller.workflow().can_simplify());
}

#[tokio::test]
async fn unsupported_file_is_rejected_before_upload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = FakeService::default();
    let mut controller = signed_in(&service);
    let path = dir.path().join("malware.exe");
    fs::write(&path, b"MZ").expect("write");

    let StepOutcome::Failed(err) = controller.upload(&path).await else {
        panic!("expected rejection");
    };
    assert_eq!(err.message(), "Error extracting text from document");
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn contract_runs_end_to_end_to_translated_export() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("out");
    let service = FakeService::default();
    let mut controller = signed_in(&service);

    let path = write_document(dir.path(), "contract.pdf");
    assert_eq!(controller.upload(&path).await, StepOutcome::Completed);
    assert_eq!(
        controller.workflow().extracted_text(),
        Some("This agreement binds...")
    );
    controller
        .workflow_mut()
        .set_level(SimplificationLevel::Moderate);
    assert_eq!(controller.simplify().await, StepOutcome::Completed);
    controller
        .workflow_mut()
        .set_language(Some(Language::Hindi));
    assert_eq!(controller.translate().await, StepOutcome::Completed);
    assert_eq!(controller.workflow().translated_text(), Some("यह सौदा..."));

    let exported = controller
        .export(ExportTarget::Translated, ExportFormat::Txt, &out)
        .expect("export");
    assert_eq!(exported, out.join("translated.txt"));
    assert_eq!(fs::read_to_string(&exported).expect("read"), "यह सौदा...");

    assert_eq!(
        service.calls(),
        vec![
            Call::Extract("contract.pdf".into()),
            Call::Simplify(
                "This agreement binds...".into(),
                SimplificationLevel::Moderate
            ),
            Call::Translate("This deal binds...".into(), Language::Hindi),
        ]
    );
}

#[tokio::test]
async fn export_requires_content() {
    let dir = tempfile::tempdir().expect("tempdir");
    let controller = signed_in(&FakeService::default());
    let err = controller
        .export(ExportTarget::Simplified, ExportFormat::Docx, dir.path())
        .expect_err("nothing to export");
    assert_eq!(err.message(), "No simplified text to export");
}

#[tokio::test]
async fn whoami_unauthorized_signs_out() {
    let service = FakeService {
        profile: Reply::Unauthorized,
        ..FakeService::default()
    };
    let mut controller = signed_in(&service);
    let err = controller.whoami().await.expect_err("rejected");
    assert!(err.requires_reauth());
    assert_eq!(controller.screen(), Screen::Auth);
    assert!(controller.session().is_none());
}

#[tokio::test]
async fn whoami_returns_profile() {
    let mut controller = signed_in(&FakeService::default());
    let profile = controller.whoami().await.expect("profile");
    assert_eq!(profile.id, UserId(7));
    assert_eq!(profile.email, "ana@example.com");
}

#[tokio::test]
async fn logout_clears_session_and_workflow() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = FakeService::default();
    let mut controller = signed_in(&service);
    upload_simplify_translate(&mut controller, dir.path()).await;

    controller.logout().expect("logout");
    assert_eq!(controller.screen(), Screen::Auth);
    assert!(controller.session().is_none());
    assert_eq!(controller.workflow().state(), &WorkflowState::Idle);
    assert!(controller.workflow().language().is_none());
}

#[tokio::test]
async fn workflow_commands_need_a_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = FakeService::default();
    let mut controller = AppController::new(service.clone(), SessionStore::in_memory());
    let path = write_document(dir.path(), "contract.pdf");

    assert_eq!(controller.upload(&path).await, StepOutcome::SignedOut);
    assert_eq!(controller.simplify().await, StepOutcome::SignedOut);
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn ping_needs_no_session() {
    let service = FakeService::default();
    let controller = AppController::new(service.clone(), SessionStore::in_memory());
    let info = controller.ping().await.expect("ping");
    assert_eq!(info.message, "Legal Document Simplifier API");
    assert_eq!(service.calls(), vec![Call::ServiceInfo]);
}
