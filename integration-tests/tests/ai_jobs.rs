use std::time::Duration;

use integration_tests::support::{BackendState, MockBackend, PASSWORD};
use lokiz::api::types::{JobStatus, StickerToRealityRequest};
use lokiz::validation::{LoginForm, ValidationError};
use lokiz::{ApiError, Session};

const POLL: Duration = Duration::from_millis(5);

#[tokio::test]
async fn wait_for_job_polls_until_completed() {
    let backend = MockBackend::start(BackendState { job_ready_after: 3, ..BackendState::default() }).await;
    let dir = tempfile::tempdir().unwrap();
    let api = backend.client(&backend.config(dir.path()), Session::ephemeral());

    let job = api.wait_for_job("job-7", POLL, 10).await.unwrap();
    assert_eq!(job.id, "job-7");
    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.completed_at.is_some());
    assert_eq!(job.output_data.unwrap()["video_url"], "https://cdn.lokiz.test/glitched.mp4");
    assert_eq!(backend.state.job_polls(), 3);
}

#[tokio::test]
async fn wait_for_job_gives_up_after_max_attempts() {
    let backend = MockBackend::start(BackendState { job_ready_after: 100, ..BackendState::default() }).await;
    let dir = tempfile::tempdir().unwrap();
    let api = backend.client(&backend.config(dir.path()), Session::ephemeral());

    match api.wait_for_job("job-8", POLL, 4).await.unwrap_err() {
        ApiError::Timeout(id) => assert_eq!(id, "job-8"),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(backend.state.job_polls(), 4);
}

fn sticker(start_time: f64, end_time: f64) -> StickerToRealityRequest {
    StickerToRealityRequest {
        video_id: "v1".into(),
        user_image_url: "https://cdn.lokiz.test/me.png".into(),
        start_time,
        end_time,
        prompt: "make it real".into(),
        is_glitch: false,
    }
}

#[tokio::test]
async fn daily_claim_updates_stored_credits() {
    let backend = MockBackend::start(BackendState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let config = backend.config(dir.path());
    let session = Session::load(&config.session_path).unwrap();
    let api = backend.client(&config, session.clone());
    api.login(&LoginForm { email: "mina@lokiz.com".into(), password: PASSWORD.into() }).await.unwrap();
    assert_eq!(session.user().unwrap().credits, 100);

    let claim = api.daily_claim().await.unwrap();
    assert!(claim.claimed);
    assert_eq!(claim.new_balance, 150);
    assert_eq!(session.user().unwrap().credits, 150);
    assert_eq!(Session::load(&config.session_path).unwrap().user().unwrap().credits, 150);
}

#[tokio::test]
async fn out_of_range_sticker_never_reaches_the_backend() {
    let backend = MockBackend::start(BackendState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let api = backend.client(&backend.config(dir.path()), Session::ephemeral());

    for (start, end) in [(2.0, 13.5), (4.0, 4.0), (6.0, 1.0)] {
        match api.sticker_to_reality(&sticker(start, end)).await.unwrap_err() {
            ApiError::Invalid(err) => assert_eq!(err, ValidationError::StickerRange { start, end }),
            other => panic!("unexpected error {other:?}"),
        }
    }
    assert!(backend.state.hits().is_empty());
}

#[tokio::test]
async fn sticker_within_ten_seconds_starts_a_job() {
    let backend = MockBackend::start(BackendState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let config = backend.config(dir.path());
    let api = backend.client(&config, Session::ephemeral());
    api.login(&LoginForm { email: "mina@lokiz.com".into(), password: PASSWORD.into() }).await.unwrap();

    let job = api.sticker_to_reality(&sticker(2.0, 12.0)).await.unwrap();
    assert_eq!(job.job_type, "sticker_to_reality");
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.input_data["end_time"], 12.0);
    assert_eq!(backend.state.count("POST /v1/ai/sticker-to-reality"), 1);
}
