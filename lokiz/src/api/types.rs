//! Wire types of the backend JSON API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Comment, User, Video, VideoStats};

/// Backend timestamps may come without an offset; those are taken as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok().map(|t| t.and_utc()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(d)? {
                None => Ok(None),
                Some(raw) => parse(&raw).map(Some).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`"))),
            }
        }
    }
}

// ----- auth -----

#[derive(Clone, Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

/// The signed-in account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub credits: i64,
    #[serde(default, deserialize_with = "timestamp::option::deserialize", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: AccountUser,
}

// ----- users & videos -----

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBasicInfo {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UserProfileResponse {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub video_count: u64,
    #[serde(default)]
    pub total_likes: u64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VideoResponse {
    pub id: String,
    pub user: UserBasicInfo,
    pub video_url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    pub duration_seconds: u32,
    pub caption: Option<String>,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub glitch_count: u64,
    pub original_video_id: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct VideoUploadUrlRequest {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub duration_seconds: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VideoUploadUrlResponse {
    pub video_id: String,
    pub video_upload_url: String,
    pub thumbnail_upload_url: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct VideoCompleteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_duration: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    ForYou,
    Following,
}

impl FeedKind {
    pub fn path(&self) -> &'static str {
        match self {
            FeedKind::ForYou => "/feed/for-you",
            FeedKind::Following => "/feed/following",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct FeedResponse {
    pub videos: Vec<VideoResponse>,
    pub total: u64,
    pub page_size: u32,
    pub has_more: bool,
    pub next_cursor: Option<String>,
    pub feed_type: FeedKind,
}

// ----- social -----

#[derive(Clone, Debug, Serialize)]
pub struct CommentCreateRequest {
    pub content: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CommentResponse {
    pub id: String,
    pub user: UserBasicInfo,
    pub video_id: String,
    pub content: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CommentListResponse {
    pub comments: Vec<CommentResponse>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LikeResponse {
    pub id: String,
    pub user_id: String,
    pub video_id: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FollowResponse {
    pub id: String,
    pub follower: UserBasicInfo,
    pub following: UserBasicInfo,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FollowListResponse {
    pub follows: Vec<FollowResponse>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

// ----- notifications -----

#[derive(Clone, Debug, Deserialize)]
pub struct NotificationResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub actor: UserBasicInfo,
    pub target_id: Option<String>,
    pub is_read: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationResponse>,
    pub total: u64,
    pub unread_count: u64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct UnreadCountResponse {
    pub unread_count: u64,
}

// ----- search & hashtags -----

#[derive(Clone, Debug, Deserialize)]
pub struct UserSearchResult {
    pub users: Vec<UserBasicInfo>,
    pub total: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VideoSearchResult {
    pub videos: Vec<VideoResponse>,
    pub total: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UnifiedSearchResult {
    pub users: Vec<UserBasicInfo>,
    pub videos: Vec<VideoResponse>,
    pub user_count: u64,
    pub video_count: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct HashtagResponse {
    pub id: String,
    pub name: String,
    pub use_count: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TrendingHashtagsResponse {
    pub hashtags: Vec<HashtagResponse>,
    pub total: u64,
}

// ----- moderation -----

#[derive(Clone, Debug, Serialize)]
pub struct BlockUserRequest {
    pub blocked_user_id: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlockResponse {
    pub id: String,
    pub blocker_id: String,
    pub blocked_id: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlockedUserResponse {
    pub id: String,
    pub blocked_user: UserBasicInfo,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlockListResponse {
    pub blocks: Vec<BlockedUserResponse>,
    pub total: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Spam,
    Harassment,
    Inappropriate,
    Copyright,
    Other,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReportRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_comment_id: Option<String>,
    pub report_type: ReportType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ReportResponse {
    pub id: String,
    pub report_type: ReportType,
    pub status: String,
}

// ----- credits -----

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct CreditBalanceResponse {
    pub balance: i64,
    pub total_earned: i64,
    pub total_spent: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreditHistoryItem {
    pub id: String,
    pub transaction_type: String,
    /// Positive for additions, negative for usage.
    pub credits: i64,
    pub balance_after: i64,
    pub description: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreditHistoryResponse {
    pub transactions: Vec<CreditHistoryItem>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DailyClaimResponse {
    pub claimed: bool,
    pub amount: i64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub next_claim_at: DateTime<Utc>,
    pub new_balance: i64,
}

// ----- AI jobs -----

#[derive(Clone, Debug, Serialize)]
pub struct GlitchRequest {
    pub template_video_id: String,
    pub user_image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MusicRequest {
    pub prompt: String,
    pub duration: u32,
}

impl MusicRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), duration: 60 }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct StickerToRealityRequest {
    pub video_id: String,
    pub user_image_url: String,
    pub start_time: f64,
    pub end_time: f64,
    pub prompt: String,
    pub is_glitch: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AiJobResponse {
    pub id: String,
    pub user_id: String,
    pub job_type: String,
    pub status: JobStatus,
    #[serde(default)]
    pub input_data: Value,
    pub output_data: Option<Value>,
    pub error_message: Option<String>,
    pub credits_used: i64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GlitchChainResponse {
    pub original_video_id: String,
    pub glitch_count: u64,
    pub glitches: Vec<VideoResponse>,
}

/// FastAPI error body.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Value,
}

// ----- conversions into the display model -----

impl From<UserBasicInfo> for User {
    fn from(u: UserBasicInfo) -> Self {
        User {
            nickname: u.display_name.unwrap_or_else(|| u.username.clone()),
            avatar: u.profile_image_url.unwrap_or_default(),
            id: u.id,
            username: u.username,
            ..User::default()
        }
    }
}

impl From<UserProfileResponse> for User {
    fn from(p: UserProfileResponse) -> Self {
        User {
            nickname: p.display_name.unwrap_or_else(|| p.username.clone()),
            avatar: p.profile_image_url.unwrap_or_default(),
            bio: p.bio,
            followers_count: p.follower_count,
            following_count: p.following_count,
            likes_count: p.total_likes,
            id: p.id,
            username: p.username,
            is_following: false,
        }
    }
}

impl From<&AccountUser> for User {
    fn from(a: &AccountUser) -> Self {
        User {
            id: a.id.clone(),
            username: a.username.clone(),
            nickname: a.display_name.clone().unwrap_or_else(|| a.username.clone()),
            avatar: a.profile_image_url.clone().unwrap_or_default(),
            bio: a.bio.clone(),
            ..User::default()
        }
    }
}

impl From<CommentResponse> for Comment {
    fn from(c: CommentResponse) -> Self {
        Comment {
            id: c.id,
            video_id: c.video_id,
            user: c.user.into(),
            text: c.content,
            likes: 0,
            is_liked: false,
            created_at: c.created_at,
            replies: Vec::new(),
        }
    }
}

/// `#tag` words in a caption, without the hash.
pub fn caption_hashtags(caption: &str) -> Vec<String> {
    caption
        .split_whitespace()
        .filter_map(|word| word.strip_prefix('#'))
        .map(|tag| tag.trim_end_matches(|c: char| !c.is_alphanumeric() && c != '_'))
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

impl From<VideoResponse> for Video {
    fn from(v: VideoResponse) -> Self {
        let caption = v.caption.unwrap_or_default();
        Video {
            id: v.id,
            user: v.user.into(),
            video_url: v.video_url,
            thumbnail_url: v.thumbnail_url,
            hashtags: caption_hashtags(&caption),
            caption,
            music_name: None,
            stats: VideoStats { likes: v.like_count, comments: v.comment_count, views: v.view_count, ..VideoStats::default() },
            created_at: v.created_at,
            is_liked: false,
            is_bookmarked: false,
            recently_watched: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn naive_and_offset_timestamps_both_parse() {
        assert!(timestamp::parse("2025-01-02T03:04:05.123456").is_some());
        assert!(timestamp::parse("2025-01-02T03:04:05Z").is_some());
        assert!(timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn video_response_converts_for_display() {
        let raw = json!({
            "id": "v1",
            "user": { "id": "u1", "username": "kim", "display_name": null, "profile_image_url": null },
            "video_url": "https://cdn/v1.mp4",
            "thumbnail_url": "https://cdn/v1.jpg",
            "duration_seconds": 12,
            "caption": "night ride #neon #city!",
            "view_count": 10, "like_count": 2, "comment_count": 1, "glitch_count": 0,
            "original_video_id": null,
            "created_at": "2025-03-01T10:00:00"
        });
        let video: Video = serde_json::from_value::<VideoResponse>(raw).unwrap().into();
        assert_eq!(video.user.nickname, "kim");
        assert_eq!(video.hashtags, ["neon", "city"]);
        assert_eq!(video.stats.likes, 2);
    }

    #[test]
    fn report_request_omits_unset_targets() {
        let req = ReportRequest {
            reported_user_id: None,
            reported_video_id: Some("v1".into()),
            reported_comment_id: None,
            report_type: ReportType::Spam,
            reason: None,
        };
        assert_eq!(serde_json::to_value(req).unwrap(), json!({ "reported_video_id": "v1", "report_type": "spam" }));
    }
}
