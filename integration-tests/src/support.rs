use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::debug;
use lokiz::{ApiClient, ClientConfig, Session};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const TOKEN: &str = "tok-lokiz-1";
pub const PASSWORD: &str = "hunter22";
pub const TAKEN_EMAIL: &str = "taken@lokiz.com";
pub const COMMENTS_OFF: &str = "Comments are turned off for this video";
pub const TRENDING: [&str; 4] = ["glitch", "lokiz", "vhs", "datamosh"];
const CREATED_AT: &str = "2025-03-01T10:00:00Z";

/// What the mock serves, plus the log of every request it saw.
#[derive(Clone)]
pub struct BackendState {
    pub feed_size: usize,
    /// The job reports `completed` on this poll.
    pub job_ready_after: u32,
    pub hits: Arc<Mutex<Vec<String>>>,
    pub job_polls: Arc<AtomicU32>,
}

impl Default for BackendState {
    fn default() -> Self {
        Self { feed_size: 5, job_ready_after: 3, hits: Arc::default(), job_polls: Arc::default() }
    }
}

impl BackendState {
    /// `"{METHOD} {path}"` for every request, oldest first.
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.hits.lock().unwrap().iter().filter(|h| h.starts_with(prefix)).count()
    }

    pub fn job_polls(&self) -> u32 {
        self.job_polls.load(Ordering::SeqCst)
    }
}

pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: BackendState,
}

impl MockBackend {
    pub async fn start(state: BackendState) -> Self {
        let app = router(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service()).await.unwrap();
        });
        Self { addr, state }
    }

    /// Client settings pointing at this backend, with the session file under `dir`.
    pub fn config(&self, dir: &FsPath) -> ClientConfig {
        ClientConfig {
            api_url: format!("http://{}", self.addr),
            timeout_secs: 5,
            session_path: dir.join("auth-storage.json"),
            settle_delay_ms: 20,
            ..ClientConfig::default()
        }
    }

    pub fn client(&self, config: &ClientConfig, session: Session) -> ApiClient {
        ApiClient::new(config, session).unwrap()
    }
}

fn router(state: BackendState) -> Router {
    Router::new()
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/me", get(me))
        .route("/v1/feed/for-you", get(for_you))
        .route("/v1/likes/videos/{id}", post(like))
        .route("/v1/comments/videos/{id}", get(comments).post(post_comment))
        .route("/v1/videos/upload-url", post(upload_url))
        .route("/v1/videos/{id}/complete", post(complete_upload))
        .route("/v1/glitch/videos/{id}/glitches", get(glitch_chain))
        .route("/v1/hashtags/trending", get(trending_hashtags))
        .route("/v1/moderation/report", post(report))
        .route("/v1/credits/daily-claim", post(daily_claim))
        .route("/v1/ai/sticker-to-reality", post(sticker_to_reality))
        .route("/v1/notifications/unread-count", get(unread_count))
        .route("/v1/search/videos", get(search_videos))
        .route("/v1/ai/jobs/{id}", get(job))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<BackendState>, req: Request, next: Next) -> Response {
    let hit = format!("{} {}", req.method(), req.uri().path());
    debug!("mock backend: {hit}");
    state.hits.lock().unwrap().push(hit);
    next.run(req).await
}

fn detail(status: StatusCode, detail: Value) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some(format!("Bearer {TOKEN}").as_str())
}

pub fn account_json(username: &str, email: &str) -> Value {
    json!({
        "id": format!("u-{username}"),
        "username": username,
        "email": email,
        "display_name": null,
        "bio": null,
        "profile_image_url": null,
        "credits": 100,
        "created_at": CREATED_AT,
    })
}

fn token_json(username: &str, email: &str) -> Value {
    json!({ "access_token": TOKEN, "token_type": "bearer", "user": account_json(username, email) })
}

fn video_json(index: usize) -> Value {
    json!({
        "id": format!("v{index}"),
        "user": { "id": "u-glitch", "username": "glitch", "display_name": "Glitch Artist", "profile_image_url": null },
        "video_url": format!("https://cdn.lokiz.test/v{index}.mp4"),
        "thumbnail_url": format!("https://cdn.lokiz.test/v{index}.jpg"),
        "duration_seconds": 15,
        "caption": format!("clip {index} #glitch #lokiz"),
        "view_count": 1000 + index,
        "like_count": 10 * index,
        "comment_count": index,
        "glitch_count": 0,
        "original_video_id": null,
        "created_at": CREATED_AT,
    })
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != PASSWORD {
        return detail(StatusCode::UNAUTHORIZED, json!("Incorrect email or password"));
    }
    let email = body["email"].as_str().unwrap_or_default();
    let username = email.split('@').next().unwrap_or_default();
    Json(token_json(username, email)).into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    if email == TAKEN_EMAIL {
        return detail(StatusCode::BAD_REQUEST, json!("Email already registered"));
    }
    let username = body["username"].as_str().unwrap_or_default();
    (StatusCode::CREATED, Json(token_json(username, email))).into_response()
}

async fn me(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, json!("Not authenticated"));
    }
    let mut user = account_json("mina", "mina@lokiz.com");
    user["display_name"] = json!("Mina K");
    Json(user).into_response()
}

#[derive(Deserialize)]
struct FeedQuery {
    page_size: usize,
    cursor: Option<String>,
}

async fn for_you(State(state): State<BackendState>, Query(q): Query<FeedQuery>) -> Json<Value> {
    let start = q.cursor.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0).min(state.feed_size);
    let end = (start + q.page_size).min(state.feed_size);
    let has_more = end < state.feed_size;
    Json(json!({
        "videos": (start..end).map(video_json).collect::<Vec<_>>(),
        "total": state.feed_size,
        "page_size": q.page_size,
        "has_more": has_more,
        "next_cursor": has_more.then(|| end.to_string()),
        "feed_type": "for_you",
    }))
}

async fn like(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, json!("Not authenticated"));
    }
    Json(json!({ "id": format!("like-{id}"), "user_id": "u-mina", "video_id": id })).into_response()
}

async fn unread_count(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, json!("Not authenticated"));
    }
    Json(json!({ "unread_count": 3 })).into_response()
}

async fn search_videos() -> Response {
    detail(
        StatusCode::UNPROCESSABLE_ENTITY,
        json!([
            { "loc": ["query", "q"], "msg": "field required", "type": "missing" },
            { "loc": ["query", "limit"], "msg": "limit must be at most 50", "type": "value_error" },
        ]),
    )
}

fn job_json(id: &str, job_type: &str, status: &str, input: Value) -> Value {
    let done = status == "completed";
    json!({
        "id": id,
        "user_id": "u-mina",
        "job_type": job_type,
        "status": status,
        "input_data": input,
        "output_data": done.then(|| json!({ "video_url": "https://cdn.lokiz.test/glitched.mp4" })),
        "error_message": null,
        "credits_used": 10,
        "created_at": CREATED_AT,
        "completed_at": done.then_some(CREATED_AT),
    })
}

async fn job(State(state): State<BackendState>, Path(id): Path<String>) -> Json<Value> {
    let polls = state.job_polls.fetch_add(1, Ordering::SeqCst) + 1;
    let status = if polls >= state.job_ready_after { "completed" } else { "processing" };
    Json(job_json(&id, "glitch_animate", status, json!({})))
}

async fn comments() -> Json<Value> {
    Json(json!({ "comments": [], "total": 0, "page": 1, "page_size": 20 }))
}

async fn post_comment(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, json!("Not authenticated"));
    }
    detail(StatusCode::FORBIDDEN, json!(COMMENTS_OFF))
}

async fn upload_url(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, json!("Not authenticated"));
    }
    let filename = body["filename"].as_str().unwrap_or_default();
    Json(json!({
        "video_id": "v-new",
        "video_upload_url": format!("https://upload.lokiz.test/v-new/{filename}"),
        "thumbnail_upload_url": "https://upload.lokiz.test/v-new/thumbnail.jpg",
    }))
    .into_response()
}

async fn complete_upload(headers: HeaderMap, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, json!("Not authenticated"));
    }
    let mut video = video_json(0);
    video["id"] = json!(id);
    video["duration_seconds"] = body.get("actual_duration").cloned().unwrap_or(json!(15));
    video["view_count"] = json!(0);
    Json(video).into_response()
}

async fn glitch_chain(Path(id): Path<String>) -> Json<Value> {
    let glitches: Vec<Value> = (1..=2)
        .map(|i| {
            let mut video = video_json(i);
            video["id"] = json!(format!("{id}-g{i}"));
            video["original_video_id"] = json!(id);
            video
        })
        .collect();
    Json(json!({ "original_video_id": id, "glitch_count": glitches.len(), "glitches": glitches }))
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: usize,
}

async fn trending_hashtags(Query(q): Query<LimitQuery>) -> Json<Value> {
    let hashtags: Vec<Value> = TRENDING
        .iter()
        .enumerate()
        .take(q.limit)
        .map(|(i, name)| json!({ "id": format!("h{i}"), "name": name, "use_count": 1000 - 100 * i }))
        .collect();
    Json(json!({ "hashtags": hashtags, "total": TRENDING.len() }))
}

async fn report(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, json!("Not authenticated"));
    }
    (StatusCode::CREATED, Json(json!({ "id": "report-1", "report_type": body["report_type"], "status": "pending" }))).into_response()
}

async fn daily_claim(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, json!("Not authenticated"));
    }
    Json(json!({ "claimed": true, "amount": 50, "next_claim_at": "2025-03-02T10:00:00Z", "new_balance": 150 })).into_response()
}

async fn sticker_to_reality(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, json!("Not authenticated"));
    }
    Json(job_json("job-sticker", "sticker_to_reality", "pending", body)).into_response()
}
