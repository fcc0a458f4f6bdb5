use super::types::{NotificationListResponse, NotificationResponse, UnreadCountResponse};
use super::{ApiClient, ApiError};
use crate::model::{Notification, NotificationKind};

impl ApiClient {
    pub async fn notifications(&self, page: u32, page_size: u32) -> Result<NotificationListResponse, ApiError> {
        let query = [("page", page), ("page_size", page_size)];
        self.fetch(self.get("/notifications/").query(&query)).await
    }

    pub async fn unread_count(&self) -> Result<u64, ApiError> {
        let count: UnreadCountResponse = self.fetch(self.get("/notifications/unread-count")).await?;
        Ok(count.unread_count)
    }

    pub async fn mark_read(&self, notification_id: &str) -> Result<(), ApiError> {
        self.fetch_empty(self.patch(&format!("/notifications/{notification_id}/read"))).await
    }

    pub async fn mark_all_read(&self) -> Result<(), ApiError> {
        self.fetch_empty(self.patch("/notifications/read-all")).await
    }
}

fn kind(raw: &str) -> NotificationKind {
    match raw {
        "like" => NotificationKind::Like,
        "comment" => NotificationKind::Comment,
        "follow" => NotificationKind::Follow,
        "message" => NotificationKind::Message,
        "glitch" => NotificationKind::Glitch,
        _ => NotificationKind::System,
    }
}

impl From<NotificationResponse> for Notification {
    fn from(n: NotificationResponse) -> Self {
        let kind = kind(&n.kind);
        let message = match kind {
            NotificationKind::Like => "liked your video".to_string(),
            NotificationKind::Comment => "commented on your video".to_string(),
            NotificationKind::Follow => "started following you".to_string(),
            NotificationKind::Message => "sent you a message".to_string(),
            NotificationKind::Glitch => "glitched your video".to_string(),
            NotificationKind::System => n.kind.clone(),
        };
        let video_id = match kind {
            NotificationKind::Like | NotificationKind::Comment | NotificationKind::Glitch => n.target_id,
            _ => None,
        };
        Notification { id: n.id, kind, user: Some(n.actor.into()), video_id, message, created_at: n.created_at, is_read: n.is_read }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_follow_without_video() {
        let raw = json!({
            "id": "n1",
            "type": "follow",
            "actor": { "id": "u2", "username": "joon", "display_name": "Joon", "profile_image_url": null },
            "target_id": "u1",
            "is_read": false,
            "created_at": "2025-03-01T10:00:00Z"
        });
        let n: Notification = serde_json::from_value::<NotificationResponse>(raw).unwrap().into();
        assert_eq!(n.kind, NotificationKind::Follow);
        assert_eq!(n.message, "started following you");
        assert_eq!(n.user.unwrap().nickname, "Joon");
        assert_eq!(n.video_id, None);
    }
}
