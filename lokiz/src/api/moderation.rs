use super::types::{BlockListResponse, BlockResponse, BlockUserRequest, ReportRequest, ReportResponse};
use super::{ApiClient, ApiError};
use crate::validation::check_report;

impl ApiClient {
    pub async fn block(&self, user_id: &str) -> Result<BlockResponse, ApiError> {
        let req = BlockUserRequest { blocked_user_id: user_id.to_string() };
        self.fetch(self.post("/moderation/block").json(&req)).await
    }

    pub async fn unblock(&self, user_id: &str) -> Result<(), ApiError> {
        self.fetch_empty(self.delete(&format!("/moderation/block/{user_id}"))).await
    }

    pub async fn blocks(&self) -> Result<BlockListResponse, ApiError> {
        self.fetch(self.get("/moderation/blocks")).await
    }

    /// Rejected locally unless exactly one target is set and the reason fits.
    pub async fn report(&self, req: &ReportRequest) -> Result<ReportResponse, ApiError> {
        check_report(req)?;
        self.fetch(self.post("/moderation/report").json(req)).await
    }
}
