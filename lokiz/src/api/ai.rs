//! Credits and the AI generation jobs they pay for.

use std::time::Duration;

use log::{debug, info};

use super::types::{
    AiJobResponse,
    CreditBalanceResponse,
    CreditHistoryResponse,
    DailyClaimResponse,
    GlitchRequest,
    MusicRequest,
    StickerToRealityRequest,
};
use super::{ApiClient, ApiError};
use crate::validation::check_sticker_range;

pub const JOB_POLL_INTERVAL: Duration = Duration::from_secs(2);

impl ApiClient {
    pub async fn credit_balance(&self) -> Result<CreditBalanceResponse, ApiError> {
        self.fetch(self.get("/credits/balance")).await
    }

    pub async fn credit_history(&self, page: u32, page_size: u32) -> Result<CreditHistoryResponse, ApiError> {
        let query = [("page", page), ("page_size", page_size)];
        self.fetch(self.get("/credits/history").query(&query)).await
    }

    /// Claims the daily bonus and mirrors the new balance into the session.
    pub async fn daily_claim(&self) -> Result<DailyClaimResponse, ApiError> {
        let claim: DailyClaimResponse = self.fetch(self.post("/credits/daily-claim")).await?;
        if claim.claimed {
            let balance = claim.new_balance;
            self.session.update_user(|u| u.credits = balance)?;
        }
        Ok(claim)
    }

    pub async fn glitch_animate(&self, req: &GlitchRequest) -> Result<AiJobResponse, ApiError> {
        self.fetch(self.post("/ai/glitch/animate").json(req)).await
    }

    pub async fn glitch_replace(&self, req: &GlitchRequest) -> Result<AiJobResponse, ApiError> {
        self.fetch(self.post("/ai/glitch/replace").json(req)).await
    }

    pub async fn generate_music(&self, req: &MusicRequest) -> Result<AiJobResponse, ApiError> {
        self.fetch(self.post("/ai/music").json(req)).await
    }

    pub async fn sticker_to_reality(&self, req: &StickerToRealityRequest) -> Result<AiJobResponse, ApiError> {
        check_sticker_range(req)?;
        self.fetch(self.post("/ai/sticker-to-reality").json(req)).await
    }

    pub async fn job(&self, job_id: &str) -> Result<AiJobResponse, ApiError> {
        self.fetch(self.get(&format!("/ai/jobs/{job_id}"))).await
    }

    /// Polls until the job completes or fails. Failed jobs are returned, not turned into errors.
    pub async fn wait_for_job(&self, job_id: &str, interval: Duration, max_attempts: u32) -> Result<AiJobResponse, ApiError> {
        for attempt in 1..=max_attempts {
            let job = self.job(job_id).await?;
            if job.status.is_terminal() {
                info!("job {job_id} finished as {:?} after {attempt} polls", job.status);
                return Ok(job);
            }
            debug!("job {job_id} is {:?} (poll {attempt}/{max_attempts})", job.status);
            if attempt < max_attempts {
                tokio::time::sleep(interval).await;
            }
        }
        Err(ApiError::Timeout(job_id.to_string()))
    }
}
