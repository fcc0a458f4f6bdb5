//! Typed client for the LOKIZ backend under `{api_url}/v1`.
//!
//! Every request carries the session's bearer token. A 401 answer clears the
//! session (memory and file) before [`ApiError::Unauthorized`] is returned.

mod ai;
mod auth;
mod feed;
mod moderation;
mod notifications;
mod search;
mod social;
pub mod types;

use log::{debug, warn};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::session::{Session, SessionError};
use crate::validation::ValidationError;
use types::ErrorBody;

pub use ai::JOB_POLL_INTERVAL;
pub use feed::FEED_PAGE_SIZE;
pub use search::SEARCH_LIMIT;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not signed in or the session expired")]
    Unauthorized,
    #[error("request failed ({status}): {detail}")]
    Status { status: u16, detail: String },
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("timed out waiting for job {0}")]
    Timeout(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { http, base_url: config.base_url(), session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let resp = builder.send().await?;
        let status = resp.status();
        debug!("{} {}", status.as_u16(), resp.url().path());
        if status == StatusCode::UNAUTHORIZED {
            warn!("backend answered 401 for {}, clearing session", resp.url().path());
            self.session.clear()?;
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = error_detail(&body).unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            warn!("backend error {}: {detail}", status.as_u16());
            return Err(ApiError::Status { status: status.as_u16(), detail });
        }
        Ok(resp)
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        Ok(self.execute(builder).await?.json().await?)
    }

    async fn fetch_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.execute(builder).await.map(drop)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    fn patch(&self, path: &str) -> RequestBuilder {
        self.request(Method::PATCH, path)
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        self.request(Method::DELETE, path)
    }
}

/// Human-readable `detail` from a FastAPI error body. Validation errors come
/// as a list of objects whose `msg` fields are joined.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        Value::String(s) => Some(s),
        Value::Array(items) => {
            let msgs: Vec<_> = items.iter().filter_map(|i| i.get("msg").and_then(Value::as_str)).collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_variants() {
        assert_eq!(error_detail(r#"{"detail":"Email already registered"}"#).as_deref(), Some("Email already registered"));
        assert_eq!(
            error_detail(r#"{"detail":[{"loc":["body","q"],"msg":"field required"},{"msg":"too short"}]}"#).as_deref(),
            Some("field required; too short")
        );
        assert_eq!(error_detail("<html>bad gateway</html>"), None);
        assert_eq!(error_detail(r#"{"detail":null}"#), None);
    }

    #[test]
    fn client_uses_versioned_base() {
        let cfg = ClientConfig { api_url: "http://127.0.0.1:9/".into(), ..ClientConfig::default() };
        let api = ApiClient::new(&cfg, Session::ephemeral()).unwrap();
        assert_eq!(api.base_url(), "http://127.0.0.1:9/v1");
    }
}
