use super::types::{TrendingHashtagsResponse, UnifiedSearchResult, UserSearchResult, VideoSearchResult};
use super::{ApiClient, ApiError};

pub const SEARCH_LIMIT: u32 = 20;

impl ApiClient {
    pub async fn search_users(&self, q: &str, limit: u32) -> Result<UserSearchResult, ApiError> {
        self.fetch(self.get("/search/users").query(&[("q", q.to_string()), ("limit", limit.to_string())])).await
    }

    pub async fn search_videos(&self, q: &str, limit: u32) -> Result<VideoSearchResult, ApiError> {
        self.fetch(self.get("/search/videos").query(&[("q", q.to_string()), ("limit", limit.to_string())])).await
    }

    /// Users and videos in one call. Blank queries are answered locally with nothing.
    pub async fn search(&self, q: &str, limit: u32) -> Result<UnifiedSearchResult, ApiError> {
        let q = q.trim();
        if q.is_empty() {
            return Ok(UnifiedSearchResult { users: Vec::new(), videos: Vec::new(), user_count: 0, video_count: 0 });
        }
        self.fetch(self.get("/search/").query(&[("q", q.to_string()), ("limit", limit.to_string())])).await
    }

    pub async fn trending_hashtags(&self, limit: u32) -> Result<TrendingHashtagsResponse, ApiError> {
        self.fetch(self.get("/hashtags/trending").query(&[("limit", limit)])).await
    }
}
