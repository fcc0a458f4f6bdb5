use integration_tests::support::{BackendState, MockBackend, PASSWORD};
use lokiz::api::types::ReportType;
use lokiz::validation::{report, LoginForm, ReportTarget, ValidationError};
use lokiz::{ApiError, Session};

async fn signed_in(backend: &MockBackend, dir: &std::path::Path) -> lokiz::ApiClient {
    let api = backend.client(&backend.config(dir), Session::ephemeral());
    api.login(&LoginForm { email: "mina@lokiz.com".into(), password: PASSWORD.into() }).await.unwrap();
    api
}

#[tokio::test]
async fn report_with_one_target_is_sent() {
    let backend = MockBackend::start(BackendState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let api = signed_in(&backend, dir.path()).await;

    let req = report(ReportTarget::Video("v3".into()), ReportType::Spam, Some("reposted ads".into())).unwrap();
    let res = api.report(&req).await.unwrap();
    assert_eq!(res.report_type, ReportType::Spam);
    assert_eq!(res.status, "pending");
    assert_eq!(backend.state.count("POST /v1/moderation/report"), 1);
}

#[tokio::test]
async fn invalid_reports_stay_local() {
    let backend = MockBackend::start(BackendState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let api = signed_in(&backend, dir.path()).await;

    let mut two_targets = report(ReportTarget::User("u-glitch".into()), ReportType::Harassment, None).unwrap();
    two_targets.reported_comment_id = Some("c1".into());
    match api.report(&two_targets).await.unwrap_err() {
        ApiError::Invalid(err) => assert_eq!(err, ValidationError::ReportTarget(2)),
        other => panic!("unexpected error {other:?}"),
    }

    let mut no_target = report(ReportTarget::Video("v1".into()), ReportType::Other, None).unwrap();
    no_target.reported_video_id = None;
    assert!(matches!(api.report(&no_target).await.unwrap_err(), ApiError::Invalid(ValidationError::ReportTarget(0))));

    let mut long_reason = report(ReportTarget::Comment("c1".into()), ReportType::Other, None).unwrap();
    long_reason.reason = Some("x".repeat(501));
    assert!(matches!(api.report(&long_reason).await.unwrap_err(), ApiError::Invalid(ValidationError::ReasonTooLong(501))));

    assert_eq!(backend.state.count("POST /v1/moderation/report"), 0);
    assert_eq!(backend.state.hits(), ["POST /v1/auth/login"]);
}
