//! Display records shared by the feed, the pages and the overlays.
//!
//! Records are plain values. Nothing here validates references (a comment's
//! `video_id` may name a video that is not loaded); toggles only touch local
//! state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub nickname: String,
    pub avatar: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub is_following: bool,
}

impl User {
    pub fn handle(&self) -> String {
        format!("@{}", self.username)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoStats {
    pub likes: u64,
    pub comments: u64,
    pub bookmarks: u64,
    pub shares: u64,
    pub views: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub user: User,
    pub video_url: String,
    pub thumbnail_url: String,
    pub caption: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub music_name: Option<String>,
    pub stats: VideoStats,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub is_bookmarked: bool,
    #[serde(default)]
    pub recently_watched: bool,
}

impl Video {
    pub fn has_hashtag(&self, tag: &str) -> bool {
        self.hashtags.iter().any(|t| t == tag)
    }

    /// Flip the viewer's like and keep the counter consistent with it.
    pub fn toggle_like(&mut self) -> bool {
        self.is_liked = !self.is_liked;
        if self.is_liked {
            self.stats.likes += 1;
        } else {
            self.stats.likes = self.stats.likes.saturating_sub(1);
        }
        self.is_liked
    }

    pub fn toggle_bookmark(&mut self) -> bool {
        self.is_bookmarked = !self.is_bookmarked;
        if self.is_bookmarked {
            self.stats.bookmarks += 1;
        } else {
            self.stats.bookmarks = self.stats.bookmarks.saturating_sub(1);
        }
        self.is_bookmarked
    }

    pub fn share_url(&self) -> String {
        share_url(&self.id)
    }
}

pub fn share_url(video_id: &str) -> String {
    format!("https://lokiz.com/video/{video_id}")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub video_id: String,
    pub user: User,
    pub text: String,
    pub likes: u64,
    #[serde(default)]
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
    /// Replies are one level deep; replies never carry replies of their own.
    #[serde(default)]
    pub replies: Vec<Comment>,
}

impl Comment {
    pub fn toggle_like(&mut self) -> bool {
        self.is_liked = !self.is_liked;
        if self.is_liked {
            self.likes += 1;
        } else {
            self.likes = self.likes.saturating_sub(1);
        }
        self.is_liked
    }

    pub fn thread_len(&self) -> usize {
        1 + self.replies.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user: User,
    pub last_message: String,
    pub last_message_time: String,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn is_unread(&self) -> bool {
        self.unread_count > 0
    }

    pub fn mark_read(&mut self) {
        self.unread_count = 0;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Comment,
    Follow,
    Message,
    Glitch,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Like => "like",
            NotificationKind::Comment => "comment",
            NotificationKind::Follow => "follow",
            NotificationKind::Message => "message",
            NotificationKind::Glitch => "glitch",
            NotificationKind::System => "system",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub video_id: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlitchEffect {
    pub id: String,
    pub name: String,
    pub thumbnail: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Compact counter used on the engagement rail and profile stats.
pub fn format_count(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Short relative label ("5m ago", "2h ago", "3d ago") for list rows.
pub fn relative_label(now: DateTime<Utc>, at: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds().max(0);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3_599 => format!("{}m ago", secs / 60),
        3_600..=86_399 => format!("{}h ago", secs / 3_600),
        _ => format!("{}d ago", secs / 86_400),
    }
}
