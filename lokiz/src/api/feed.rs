use super::types::{
    FeedKind,
    FeedResponse,
    GlitchChainResponse,
    UserProfileResponse,
    VideoCompleteRequest,
    VideoResponse,
    VideoUploadUrlRequest,
    VideoUploadUrlResponse,
};
use super::{ApiClient, ApiError};

pub const FEED_PAGE_SIZE: u32 = 20;

impl ApiClient {
    /// One feed page. Pass the previous page's `next_cursor` to continue.
    pub async fn feed(&self, kind: FeedKind, page_size: u32, cursor: Option<&str>) -> Result<FeedResponse, ApiError> {
        let mut query = vec![("page_size", page_size.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        self.fetch(self.get(kind.path()).query(&query)).await
    }

    pub async fn video(&self, video_id: &str) -> Result<VideoResponse, ApiError> {
        self.fetch(self.get(&format!("/videos/{video_id}"))).await
    }

    pub async fn record_view(&self, video_id: &str) -> Result<(), ApiError> {
        self.fetch_empty(self.post(&format!("/videos/{video_id}/view"))).await
    }

    pub async fn upload_url(&self, req: &VideoUploadUrlRequest) -> Result<VideoUploadUrlResponse, ApiError> {
        self.fetch(self.post("/videos/upload-url").json(req)).await
    }

    pub async fn complete_upload(&self, video_id: &str, req: &VideoCompleteRequest) -> Result<VideoResponse, ApiError> {
        self.fetch(self.post(&format!("/videos/{video_id}/complete")).json(req)).await
    }

    pub async fn user_profile(&self, user_id: &str) -> Result<UserProfileResponse, ApiError> {
        self.fetch(self.get(&format!("/users/{user_id}"))).await
    }

    /// Videos generated from `video_id` as a template.
    pub async fn glitch_chain(&self, video_id: &str) -> Result<GlitchChainResponse, ApiError> {
        self.fetch(self.get(&format!("/glitch/videos/{video_id}/glitches"))).await
    }
}
