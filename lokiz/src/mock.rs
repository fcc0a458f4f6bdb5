//! Static catalogue standing in for backend responses during offline runs.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{
    Comment, Conversation, GlitchEffect, Message, Notification, NotificationKind, User, Video, VideoStats,
};

pub const EXPLORE_PAGE_SIZE: usize = 20;
pub const EXPLORE_LATENCY: Duration = Duration::from_millis(1000);

pub const CATEGORIES: [&str; 14] = [
    "All",
    "Sing along",
    "Comedy",
    "Sports",
    "Anime & comics",
    "Relationships",
    "Shows",
    "Hip hop",
    "Daily life",
    "Beauty",
    "Gaming",
    "Society",
    "Fashion",
    "Cars",
];

fn at(y: i32, m: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(y, m, d).and_then(|date| date.and_hms_opt(h, mi, 0)).map(|n| n.and_utc()).unwrap_or_default()
}

fn avatar(seed: &str) -> String {
    format!("https://api.dicebear.com/7.x/avataaars/svg?seed={seed}")
}

pub fn users() -> Vec<User> {
    vec![
        User {
            id: "user1".into(),
            username: "user1".into(),
            nickname: "Glitch Artist".into(),
            avatar: avatar("user1"),
            bio: Some("AI glitch artist 🎨".into()),
            followers_count: 12_300,
            following_count: 169,
            likes_count: 456_000,
            is_following: false,
        },
        User {
            id: "user2".into(),
            username: "user2".into(),
            nickname: "Creative Maker".into(),
            avatar: avatar("user2"),
            bio: Some("Creative video maker ✨".into()),
            followers_count: 45_600,
            following_count: 234,
            likes_count: 789_000,
            is_following: false,
        },
        User {
            id: "user3".into(),
            username: "user3".into(),
            nickname: "Rainbow Fan".into(),
            avatar: avatar("user3"),
            bio: Some("Glitch enthusiast 🌈".into()),
            followers_count: 78_900,
            following_count: 345,
            likes_count: 1_234_000,
            is_following: false,
        },
    ]
}

pub fn videos() -> Vec<Video> {
    let u = users();
    vec![
        Video {
            id: "1".into(),
            user: u[0].clone(),
            video_url: "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4".into(),
            thumbnail_url: "https://images.unsplash.com/photo-1618005182384-a83a8bd57fbe?w=400&h=600&fit=crop".into(),
            caption: "Amazing video! #lokiz #glitch #ai".into(),
            hashtags: vec!["lokiz".into(), "glitch".into(), "ai".into()],
            music_name: Some("original sound - user1".into()),
            stats: VideoStats { likes: 12_300, comments: 456, bookmarks: 89, shares: 234, views: 123_000 },
            created_at: at(2024, 1, 15, 10, 30),
            is_liked: false,
            is_bookmarked: false,
            recently_watched: false,
        },
        Video {
            id: "2".into(),
            user: u[1].clone(),
            video_url: "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ElephantsDream.mp4".into(),
            thumbnail_url: "https://images.unsplash.com/photo-1618556450994-a6a128ef0d9d?w=400&h=600&fit=crop".into(),
            caption: "Check this out! #trending".into(),
            hashtags: vec!["trending".into()],
            music_name: Some("original sound - user2".into()),
            stats: VideoStats { likes: 45_600, comments: 789, bookmarks: 123, shares: 567, views: 456_000 },
            created_at: at(2024, 1, 14, 15, 20),
            is_liked: true,
            is_bookmarked: false,
            recently_watched: true,
        },
        Video {
            id: "3".into(),
            user: u[2].clone(),
            video_url: "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ForBiggerBlazes.mp4".into(),
            thumbnail_url: "https://images.unsplash.com/photo-1618005198919-d3d4b5a92ead?w=400&h=600&fit=crop".into(),
            caption: "Epic moment! #viral".into(),
            hashtags: vec!["viral".into()],
            music_name: Some("original sound - user3".into()),
            stats: VideoStats { likes: 78_900, comments: 1_234, bookmarks: 456, shares: 890, views: 789_000 },
            created_at: at(2024, 1, 13, 9, 45),
            is_liked: false,
            is_bookmarked: true,
            recently_watched: false,
        },
    ]
}

fn commenter(id: &str, username: &str) -> User {
    User { id: id.into(), username: username.into(), nickname: username.into(), avatar: avatar(id), ..User::default() }
}

/// Threaded comments shown in the comment overlay for any video.
pub fn comments(video_id: &str) -> Vec<Comment> {
    let created_at = at(2024, 8, 12, 12, 0);
    vec![
        Comment {
            id: "1".into(),
            video_id: video_id.into(),
            user: commenter("user1", "user1"),
            text: "This glitch is unreal".into(),
            likes: 5,
            is_liked: false,
            created_at,
            replies: vec![Comment {
                id: "1-1".into(),
                video_id: video_id.into(),
                user: commenter("user2", "user2"),
                text: "Reply test".into(),
                likes: 2,
                is_liked: false,
                created_at,
                replies: Vec::new(),
            }],
        },
        Comment {
            id: "2".into(),
            video_id: video_id.into(),
            user: commenter("user3", "blackship"),
            text: "How did you make this?".into(),
            likes: 25,
            is_liked: false,
            created_at,
            replies: Vec::new(),
        },
        Comment {
            id: "3".into(),
            video_id: video_id.into(),
            user: commenter("user4", "byungsoo"),
            text: "The colors are gorgeous".into(),
            likes: 0,
            is_liked: false,
            created_at,
            replies: Vec::new(),
        },
    ]
}

pub fn conversations() -> Vec<Conversation> {
    let u = users();
    vec![
        Conversation {
            id: "conv1".into(),
            user: u[0].clone(),
            last_message: "Hello!".into(),
            last_message_time: "13:32".into(),
            unread_count: 2,
            messages: vec![Message {
                id: "m1".into(),
                sender_id: u[0].id.clone(),
                text: "Hello!".into(),
                created_at: at(2024, 1, 15, 13, 32),
            }],
        },
        Conversation {
            id: "conv2".into(),
            user: u[1].clone(),
            last_message: "Thanks for the great video".into(),
            last_message_time: "13:31".into(),
            unread_count: 0,
            messages: vec![Message {
                id: "m2".into(),
                sender_id: u[1].id.clone(),
                text: "Thanks for the great video".into(),
                created_at: at(2024, 1, 15, 13, 31),
            }],
        },
    ]
}

/// Notifications timestamped relative to `now`, newest first.
pub fn notifications(now: DateTime<Utc>) -> Vec<Notification> {
    let u = users();
    let ago = |minutes: i64| now - chrono::Duration::minutes(minutes);
    vec![
        Notification {
            id: "n1".into(),
            kind: NotificationKind::Like,
            user: Some(u[1].clone()),
            video_id: Some("1".into()),
            message: "liked your video".into(),
            created_at: ago(5),
            is_read: false,
        },
        Notification {
            id: "n2".into(),
            kind: NotificationKind::Comment,
            user: Some(u[2].clone()),
            video_id: Some("1".into()),
            message: "commented: \"So cool!\"".into(),
            created_at: ago(10),
            is_read: false,
        },
        Notification {
            id: "n3".into(),
            kind: NotificationKind::Follow,
            user: Some(u[0].clone()),
            video_id: None,
            message: "started following you".into(),
            created_at: ago(60),
            is_read: true,
        },
        Notification {
            id: "n4".into(),
            kind: NotificationKind::Message,
            user: Some(u[1].clone()),
            video_id: None,
            message: "sent you a message".into(),
            created_at: ago(120),
            is_read: true,
        },
        Notification {
            id: "n5".into(),
            kind: NotificationKind::System,
            user: None,
            video_id: None,
            message: "New AI glitch effects are available!".into(),
            created_at: ago(24 * 60),
            is_read: true,
        },
    ]
}

pub fn glitch_effects() -> Vec<GlitchEffect> {
    [
        ("effect1", "VHS", "Retro VHS look"),
        ("effect2", "Pixel", "Pixel art"),
        ("effect3", "Glitch", "Digital glitch"),
        ("effect4", "Chromatic", "Chromatic aberration"),
    ]
    .into_iter()
    .map(|(id, name, description)| GlitchEffect {
        id: id.into(),
        name: name.into(),
        thumbnail: format!("https://via.placeholder.com/100?text={name}"),
        description: Some(description.into()),
    })
    .collect()
}

/// Repeat the catalogue `count` times starting after `start_index`, giving every copy a fresh id.
pub fn generate_videos(count: usize, start_index: usize) -> Vec<Video> {
    let source = videos();
    (0..count)
        .map(|i| {
            let mut video = source[i % source.len()].clone();
            video.id = (start_index + i + 1).to_string();
            video
        })
        .collect()
}

/// A pending page of the mock infinite scroll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub start_index: usize,
    pub count: usize,
    pub latency: Duration,
}

impl PageRequest {
    /// Resolve the page after the simulated network latency.
    pub async fn fulfil(self) -> Vec<Video> {
        tokio::time::sleep(self.latency).await;
        generate_videos(self.count, self.start_index)
    }
}

/// Timeout-based mock pagination: one outstanding request at a time.
#[derive(Debug)]
pub struct MockFeed {
    loaded: usize,
    loading: bool,
    page_size: usize,
    latency: Duration,
}

impl Default for MockFeed {
    fn default() -> Self {
        Self::new(EXPLORE_PAGE_SIZE, EXPLORE_LATENCY)
    }
}

impl MockFeed {
    pub fn new(page_size: usize, latency: Duration) -> Self {
        Self { loaded: 0, loading: false, page_size, latency }
    }

    /// Start from an already rendered first page.
    pub fn with_loaded(mut self, loaded: usize) -> Self {
        self.loaded = loaded;
        self
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn loaded(&self) -> usize {
        self.loaded
    }

    /// Returns `None` while a page is already in flight.
    pub fn begin_load(&mut self) -> Option<PageRequest> {
        if self.loading {
            return None;
        }
        self.loading = true;
        Some(PageRequest { start_index: self.loaded, count: self.page_size, latency: self.latency })
    }

    pub fn finish_load(&mut self, page: &[Video]) {
        self.loaded += page.len();
        self.loading = false;
    }
}

pub fn user_by_id(id: &str) -> Option<User> {
    users().into_iter().find(|u| u.id == id)
}

pub fn video_by_id(id: &str) -> Option<Video> {
    videos().into_iter().find(|v| v.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_continue_after_start() {
        let page = generate_videos(5, 20);
        let ids: Vec<_> = page.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["21", "22", "23", "24", "25"]);
        assert_eq!(page[3].caption, videos()[0].caption);
    }

    #[test]
    fn only_one_page_in_flight() {
        let mut feed = MockFeed::new(20, Duration::from_millis(10)).with_loaded(20);
        let req = feed.begin_load().unwrap();
        assert_eq!(req.start_index, 20);
        assert!(feed.begin_load().is_none());
        feed.finish_load(&generate_videos(req.count, req.start_index));
        assert_eq!(feed.loaded(), 40);
        assert!(!feed.is_loading());
        assert_eq!(feed.begin_load().unwrap().start_index, 40);
    }

    #[tokio::test(start_paused = true)]
    async fn page_resolves_after_latency() {
        let req = PageRequest { start_index: 3, count: 2, latency: EXPLORE_LATENCY };
        let started = tokio::time::Instant::now();
        let page = req.fulfil().await;
        assert!(started.elapsed() >= EXPLORE_LATENCY);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, "4");
    }

    #[test]
    fn lookups() {
        assert_eq!(user_by_id("user2").unwrap().nickname, "Creative Maker");
        assert!(video_by_id("99").is_none());
        assert_eq!(comments("7")[0].replies[0].video_id, "7");
    }
}
