use integration_tests::support::{account_json, BackendState, MockBackend, PASSWORD, TAKEN_EMAIL, TOKEN};
use lokiz::api::types::AccountUser;
use lokiz::validation::{LoginForm, RegisterForm, ValidationError};
use lokiz::{ApiError, Session};

fn login_form(password: &str) -> LoginForm {
    LoginForm { email: "mina@lokiz.com".into(), password: password.into() }
}

#[tokio::test]
async fn login_persists_session_across_restarts() {
    let backend = MockBackend::start(BackendState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let config = backend.config(dir.path());
    let session = Session::load(&config.session_path).unwrap();
    let api = backend.client(&config, session.clone());

    let user = api.login(&login_form(PASSWORD)).await.unwrap();
    assert_eq!(user.username, "mina");
    assert!(session.is_authenticated());

    let resumed = Session::load(&config.session_path).unwrap();
    assert!(resumed.is_authenticated());
    assert_eq!(resumed.token().as_deref(), Some(TOKEN));
    assert_eq!(resumed.user().unwrap().email, "mina@lokiz.com");
}

#[tokio::test]
async fn wrong_password_leaves_session_signed_out() {
    let backend = MockBackend::start(BackendState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let config = backend.config(dir.path());
    let session = Session::load(&config.session_path).unwrap();
    let api = backend.client(&config, session.clone());

    let err = api.login(&login_form("nope")).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert!(!session.is_authenticated());
    assert_eq!(session.token(), None);
}

#[tokio::test]
async fn expired_token_clears_the_stored_session() {
    let backend = MockBackend::start(BackendState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let config = backend.config(dir.path());
    let session = Session::load(&config.session_path).unwrap();
    let user: AccountUser = serde_json::from_value(account_json("mina", "mina@lokiz.com")).unwrap();
    session.set_auth(user, "stale-token".into()).unwrap();
    let api = backend.client(&config, session.clone());

    let err = api.me().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert!(!session.is_authenticated());

    let reloaded = Session::load(&config.session_path).unwrap();
    assert!(!reloaded.is_authenticated());
    assert_eq!(reloaded.user(), None);
}

#[tokio::test]
async fn me_refreshes_the_stored_account() {
    let backend = MockBackend::start(BackendState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let config = backend.config(dir.path());
    let session = Session::load(&config.session_path).unwrap();
    let api = backend.client(&config, session.clone());

    api.login(&login_form(PASSWORD)).await.unwrap();
    assert_eq!(session.user().unwrap().display_name, None);
    let fresh = api.me().await.unwrap();
    assert_eq!(fresh.display_name.as_deref(), Some("Mina K"));
    assert_eq!(session.user().unwrap().display_name.as_deref(), Some("Mina K"));
    assert_eq!(api.unread_count().await.unwrap(), 3);
}

#[tokio::test]
async fn mismatched_passwords_never_reach_the_backend() {
    let backend = MockBackend::start(BackendState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let config = backend.config(dir.path());
    let api = backend.client(&config, Session::ephemeral());

    let form = RegisterForm {
        username: "newbie".into(),
        email: "newbie@lokiz.com".into(),
        password: "abc12345".into(),
        confirm_password: "abc1234".into(),
    };
    let err = api.register(&form).await.unwrap_err();
    assert!(matches!(err, ApiError::Invalid(ValidationError::PasswordMismatch)));
    assert_eq!(backend.state.count("POST /v1/auth/register"), 0);
}

#[tokio::test]
async fn register_signs_in_or_reports_backend_detail() {
    let backend = MockBackend::start(BackendState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let config = backend.config(dir.path());
    let session = Session::load(&config.session_path).unwrap();
    let api = backend.client(&config, session.clone());

    let mut form = RegisterForm {
        username: "taken".into(),
        email: TAKEN_EMAIL.into(),
        password: "abc12345".into(),
        confirm_password: "abc12345".into(),
    };
    match api.register(&form).await.unwrap_err() {
        ApiError::Status { status, detail } => {
            assert_eq!(status, 400);
            assert_eq!(detail, "Email already registered");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!session.is_authenticated());

    form.username = "newbie".into();
    form.email = "newbie@lokiz.com".into();
    let user = api.register(&form).await.unwrap();
    assert_eq!(user.username, "newbie");
    assert!(session.is_authenticated());
    assert_eq!(backend.state.count("POST /v1/auth/register"), 2);
}

#[tokio::test]
async fn logout_forgets_token_for_later_requests() {
    let backend = MockBackend::start(BackendState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let config = backend.config(dir.path());
    let session = Session::load(&config.session_path).unwrap();
    let api = backend.client(&config, session.clone());

    api.login(&login_form(PASSWORD)).await.unwrap();
    api.logout().unwrap();
    assert!(!Session::load(&config.session_path).unwrap().is_authenticated());
    assert!(matches!(api.unread_count().await.unwrap_err(), ApiError::Unauthorized));
}
