use super::types::{CommentCreateRequest, CommentListResponse, CommentResponse, FollowListResponse, FollowResponse, LikeResponse};
use super::{ApiClient, ApiError};

impl ApiClient {
    pub async fn like(&self, video_id: &str) -> Result<LikeResponse, ApiError> {
        self.fetch(self.post(&format!("/likes/videos/{video_id}"))).await
    }

    pub async fn unlike(&self, video_id: &str) -> Result<(), ApiError> {
        self.fetch_empty(self.delete(&format!("/likes/videos/{video_id}"))).await
    }

    /// Mirrors a local like toggle: `liked` is the new state.
    pub async fn set_liked(&self, video_id: &str, liked: bool) -> Result<(), ApiError> {
        if liked {
            self.like(video_id).await.map(drop)
        } else {
            self.unlike(video_id).await
        }
    }

    pub async fn bookmark(&self, video_id: &str) -> Result<(), ApiError> {
        self.fetch_empty(self.post(&format!("/bookmarks/videos/{video_id}"))).await
    }

    pub async fn unbookmark(&self, video_id: &str) -> Result<(), ApiError> {
        self.fetch_empty(self.delete(&format!("/bookmarks/videos/{video_id}"))).await
    }

    pub async fn set_bookmarked(&self, video_id: &str, bookmarked: bool) -> Result<(), ApiError> {
        if bookmarked {
            self.bookmark(video_id).await
        } else {
            self.unbookmark(video_id).await
        }
    }

    pub async fn post_comment(&self, video_id: &str, content: &str) -> Result<CommentResponse, ApiError> {
        let req = CommentCreateRequest { content: content.to_string() };
        self.fetch(self.post(&format!("/comments/videos/{video_id}")).json(&req)).await
    }

    pub async fn comments(&self, video_id: &str, page: u32, page_size: u32) -> Result<CommentListResponse, ApiError> {
        let query = [("page", page), ("page_size", page_size)];
        self.fetch(self.get(&format!("/comments/videos/{video_id}")).query(&query)).await
    }

    pub async fn follow(&self, user_id: &str) -> Result<FollowResponse, ApiError> {
        self.fetch(self.post(&format!("/follows/users/{user_id}"))).await
    }

    pub async fn unfollow(&self, user_id: &str) -> Result<(), ApiError> {
        self.fetch_empty(self.delete(&format!("/follows/users/{user_id}"))).await
    }

    pub async fn followers(&self, user_id: &str, page: u32, page_size: u32) -> Result<FollowListResponse, ApiError> {
        let query = [("page", page), ("page_size", page_size)];
        self.fetch(self.get(&format!("/follows/users/{user_id}/followers")).query(&query)).await
    }

    pub async fn following(&self, user_id: &str, page: u32, page_size: u32) -> Result<FollowListResponse, ApiError> {
        let query = [("page", page), ("page_size", page_size)];
        self.fetch(self.get(&format!("/follows/users/{user_id}/following")).query(&query)).await
    }
}
