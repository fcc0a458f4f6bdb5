//! Modal panels opened over a page. The shell shows at most one at a time.

use chrono::{DateTime, Utc};

use crate::model::{share_url, Comment, GlitchEffect, User, Video};
use crate::search::videos_with_hashtag;

#[derive(Debug)]
pub enum Overlay {
    Comments(CommentPanel),
    Share(ShareSheet),
    Follow(FollowLists),
    Glitch(GlitchPicker),
    Hashtag(HashtagView),
    VideoDetail(Box<Video>),
    LoginPrompt,
}

impl Overlay {
    pub fn title(&self) -> String {
        match self {
            Overlay::Comments(panel) => format!("Comments ({})", panel.total()),
            Overlay::Share(_) => "Share".to_string(),
            Overlay::Follow(lists) => lists.tab.title().to_string(),
            Overlay::Glitch(_) => "Glitch effects".to_string(),
            Overlay::Hashtag(view) => format!("#{}", view.tag),
            Overlay::VideoDetail(video) => video.user.handle(),
            Overlay::LoginPrompt => "Log in to continue".to_string(),
        }
    }
}

/// The open overlay, if any. Opening a new one replaces the current one.
#[derive(Debug, Default)]
pub struct Overlays {
    current: Option<Overlay>,
}

impl Overlays {
    pub fn open(&mut self, overlay: Overlay) {
        self.current = Some(overlay);
    }

    pub fn close(&mut self) -> Option<Overlay> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&Overlay> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Overlay> {
        self.current.as_mut()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }
}

// ----- comments -----

#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank draft; nothing happened.
    Empty,
    /// Signed out; the caller should open the login prompt.
    LoginRequired,
    Posted(Comment),
}

#[derive(Debug)]
pub struct CommentPanel {
    pub video_id: String,
    pub comments: Vec<Comment>,
    pub draft: String,
    local_seq: usize,
}

impl CommentPanel {
    pub fn new(video_id: impl Into<String>, comments: Vec<Comment>) -> Self {
        Self { video_id: video_id.into(), comments, draft: String::new(), local_seq: 0 }
    }

    /// Comments including replies.
    pub fn total(&self) -> usize {
        self.comments.iter().map(Comment::thread_len).sum()
    }

    fn find_mut(&mut self, comment_id: &str) -> Option<&mut Comment> {
        for comment in self.comments.iter_mut() {
            if comment.id == comment_id {
                return Some(comment);
            }
            if let Some(reply) = comment.replies.iter_mut().find(|r| r.id == comment_id) {
                return Some(reply);
            }
        }
        None
    }

    /// Returns the new liked state, or `None` for an unknown id.
    pub fn toggle_like(&mut self, comment_id: &str) -> Option<bool> {
        self.find_mut(comment_id).map(Comment::toggle_like)
    }

    pub fn submit(&mut self, author: Option<&User>, now: DateTime<Utc>) -> SubmitOutcome {
        let text = self.draft.trim();
        if text.is_empty() {
            return SubmitOutcome::Empty;
        }
        let Some(author) = author else {
            return SubmitOutcome::LoginRequired;
        };
        self.local_seq += 1;
        let comment = Comment {
            id: format!("local-{}", self.local_seq),
            video_id: self.video_id.clone(),
            user: author.clone(),
            text: text.to_string(),
            likes: 0,
            is_liked: false,
            created_at: now,
            replies: Vec::new(),
        };
        self.comments.insert(0, comment.clone());
        self.draft.clear();
        SubmitOutcome::Posted(comment)
    }

    /// Takes back a top-level comment the backend refused.
    pub fn retract(&mut self, comment_id: &str) -> Option<Comment> {
        let index = self.comments.iter().position(|c| c.id == comment_id)?;
        Some(self.comments.remove(index))
    }
}

// ----- share -----

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SocialTarget {
    Repost,
    CopyLink,
    WhatsApp,
    Embed,
    Facebook,
}

impl SocialTarget {
    pub const ALL: [SocialTarget; 5] =
        [SocialTarget::Repost, SocialTarget::CopyLink, SocialTarget::WhatsApp, SocialTarget::Embed, SocialTarget::Facebook];

    pub fn label(&self) -> &'static str {
        match self {
            SocialTarget::Repost => "Repost",
            SocialTarget::CopyLink => "Copy link",
            SocialTarget::WhatsApp => "WhatsApp",
            SocialTarget::Embed => "Embed",
            SocialTarget::Facebook => "Facebook",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ShareMessage {
    pub recipient_id: String,
    pub message: String,
    pub url: String,
}

#[derive(Debug)]
pub struct ShareSheet {
    pub video_id: String,
    pub recipients: Vec<User>,
    pub message: String,
    self_id: Option<String>,
    selected: Option<String>,
}

impl ShareSheet {
    /// `self_id` is the viewer, who can never be picked as a recipient.
    pub fn new(video_id: impl Into<String>, recipients: Vec<User>, self_id: Option<String>) -> Self {
        Self { video_id: video_id.into(), recipients, message: String::new(), self_id, selected: None }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, user_id: &str) -> bool {
        if self.self_id.as_deref() == Some(user_id) || !self.recipients.iter().any(|u| u.id == user_id) {
            return false;
        }
        self.selected = Some(user_id.to_string());
        true
    }

    /// Clears the picked recipient. `false` when nothing was picked.
    pub fn deselect(&mut self) -> bool {
        self.selected.take().is_some()
    }

    /// Sends to the selected recipient and resets the sheet.
    pub fn send(&mut self) -> Option<ShareMessage> {
        let recipient_id = self.selected.take()?;
        let message = std::mem::take(&mut self.message);
        Some(ShareMessage { recipient_id, message, url: share_url(&self.video_id) })
    }

    /// The link to hand to a social target.
    pub fn social(&self, target: SocialTarget) -> String {
        let url = share_url(&self.video_id);
        match target {
            SocialTarget::Embed => format!("<iframe src=\"{url}/embed\"></iframe>"),
            _ => url,
        }
    }
}

// ----- follow lists -----

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FollowTab {
    #[default]
    Following,
    Followers,
    Friends,
    Suggested,
}

impl FollowTab {
    pub fn next(self) -> Self {
        match self {
            FollowTab::Following => FollowTab::Followers,
            FollowTab::Followers => FollowTab::Friends,
            FollowTab::Friends => FollowTab::Suggested,
            FollowTab::Suggested => FollowTab::Following,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FollowTab::Following => "Following",
            FollowTab::Followers => "Followers",
            FollowTab::Friends => "Friends",
            FollowTab::Suggested => "Suggested",
        }
    }
}

#[derive(Debug, Default)]
pub struct FollowLists {
    pub tab: FollowTab,
    pub following: Vec<User>,
    pub followers: Vec<User>,
    pub suggested: Vec<User>,
}

impl FollowLists {
    /// People followed back: in both lists.
    pub fn friends(&self) -> Vec<&User> {
        self.following.iter().filter(|u| self.followers.iter().any(|f| f.id == u.id)).collect()
    }

    pub fn users(&self) -> Vec<&User> {
        match self.tab {
            FollowTab::Following => self.following.iter().collect(),
            FollowTab::Followers => self.followers.iter().collect(),
            FollowTab::Friends => self.friends(),
            FollowTab::Suggested => self.suggested.iter().collect(),
        }
    }

    /// The follow button of the current tab. On "following" and "friends" it
    /// unfollows and removes the row; elsewhere it flips `is_following`.
    pub fn toggle(&mut self, user_id: &str) {
        match self.tab {
            FollowTab::Following | FollowTab::Friends => self.following.retain(|u| u.id != user_id),
            FollowTab::Followers => flip(&mut self.followers, user_id),
            FollowTab::Suggested => flip(&mut self.suggested, user_id),
        }
    }
}

fn flip(users: &mut [User], user_id: &str) {
    if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
        user.is_following = !user.is_following;
    }
}

// ----- glitch & hashtag -----

#[derive(Debug)]
pub struct GlitchPicker {
    pub video_id: String,
    pub effects: Vec<GlitchEffect>,
    pub selected: usize,
}

impl GlitchPicker {
    pub fn new(video_id: impl Into<String>, effects: Vec<GlitchEffect>) -> Self {
        Self { video_id: video_id.into(), effects, selected: 0 }
    }

    pub fn next(&mut self) {
        if !self.effects.is_empty() {
            self.selected = (self.selected + 1) % self.effects.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.effects.is_empty() {
            self.selected = (self.selected + self.effects.len() - 1) % self.effects.len();
        }
    }

    pub fn current(&self) -> Option<&GlitchEffect> {
        self.effects.get(self.selected)
    }
}

#[derive(Debug)]
pub struct HashtagView {
    pub tag: String,
    pub videos: Vec<Video>,
}

impl HashtagView {
    pub fn new(tag: &str, catalogue: &[Video]) -> Self {
        let tag = tag.trim_start_matches('#').to_string();
        let videos = videos_with_hashtag(&tag, catalogue).into_iter().cloned().collect();
        Self { tag, videos }
    }

    pub fn total_views(&self) -> u64 {
        self.videos.iter().map(|v| v.stats.views).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;

    #[test]
    fn opening_replaces_current_overlay() {
        let mut overlays = Overlays::default();
        overlays.open(Overlay::Comments(CommentPanel::new("1", mock::comments("1"))));
        overlays.open(Overlay::LoginPrompt);
        assert!(matches!(overlays.current(), Some(Overlay::LoginPrompt)));
        assert!(overlays.close().is_some());
        assert!(!overlays.is_open());
    }

    #[test]
    fn signed_out_comment_needs_login_and_keeps_draft() {
        let mut panel = CommentPanel::new("1", mock::comments("1"));
        assert_eq!(panel.submit(None, Utc::now()), SubmitOutcome::Empty);
        panel.draft = "nice".into();
        assert_eq!(panel.submit(None, Utc::now()), SubmitOutcome::LoginRequired);
        assert_eq!(panel.draft, "nice");
        assert_eq!(panel.total(), 4);
    }

    #[test]
    fn posted_comment_goes_first() {
        let mut panel = CommentPanel::new("1", mock::comments("1"));
        let me = mock::users().remove(0);
        panel.draft = "  first!  ".into();
        let SubmitOutcome::Posted(comment) = panel.submit(Some(&me), Utc::now()) else {
            panic!("expected a posted comment");
        };
        assert_eq!(comment.text, "first!");
        assert_eq!(panel.comments[0].id, comment.id);
        assert!(panel.draft.is_empty());
    }

    #[test]
    fn retracted_comment_leaves_the_thread() {
        let mut panel = CommentPanel::new("1", mock::comments("1"));
        let me = mock::users().remove(0);
        panel.draft = "first!".into();
        let SubmitOutcome::Posted(comment) = panel.submit(Some(&me), Utc::now()) else {
            panic!("expected a posted comment");
        };
        assert_eq!(panel.total(), 5);
        assert_eq!(panel.retract(&comment.id).map(|c| c.text), Some("first!".to_string()));
        assert_eq!(panel.total(), 4);
        assert!(panel.retract(&comment.id).is_none());
    }

    #[test]
    fn like_reaches_replies() {
        let mut panel = CommentPanel::new("1", mock::comments("1"));
        assert_eq!(panel.toggle_like("1-1"), Some(true));
        assert_eq!(panel.comments[0].replies[0].likes, 3);
        assert_eq!(panel.toggle_like("missing"), None);
    }

    #[test]
    fn share_refuses_self_and_resets_after_send() {
        let mut sheet = ShareSheet::new("7", mock::users(), Some("user1".into()));
        assert!(!sheet.select("user1"));
        assert!(!sheet.select("nobody"));
        assert!(sheet.select("user2"));
        sheet.message = "look".into();
        let sent = sheet.send().unwrap();
        assert_eq!(sent, ShareMessage { recipient_id: "user2".into(), message: "look".into(), url: "https://lokiz.com/video/7".into() });
        assert!(sheet.selected().is_none());
        assert!(sheet.send().is_none());
        assert_eq!(sheet.social(SocialTarget::CopyLink), "https://lokiz.com/video/7");
    }

    #[test]
    fn deselect_keeps_the_draft_message() {
        let mut sheet = ShareSheet::new("7", mock::users(), None);
        assert!(!sheet.deselect());
        sheet.select("user3");
        sheet.message = "look".into();
        assert!(sheet.deselect());
        assert_eq!(sheet.selected(), None);
        assert_eq!(sheet.message, "look");
    }

    #[test]
    fn follow_tabs() {
        let users = mock::users();
        let mut lists = FollowLists {
            tab: FollowTab::Friends,
            following: users[..2].to_vec(),
            followers: users[1..].to_vec(),
            suggested: users.clone(),
        };
        assert_eq!(lists.users().len(), 1);
        lists.toggle("user2");
        assert!(lists.friends().is_empty());
        assert_eq!(lists.following.len(), 1);

        lists.tab = FollowTab::Suggested;
        lists.toggle("user3");
        assert!(lists.suggested[2].is_following);
        assert_eq!(lists.tab.next(), FollowTab::Following);
    }

    #[test]
    fn glitch_picker_wraps() {
        let mut picker = GlitchPicker::new("1", mock::glitch_effects());
        picker.prev();
        assert_eq!(picker.current().unwrap().name, "Chromatic");
        picker.next();
        assert_eq!(picker.current().unwrap().name, "VHS");
    }

    #[test]
    fn hashtag_view_collects_tagged_videos() {
        let view = HashtagView::new("#trending", &mock::generate_videos(6, 0));
        assert_eq!(view.tag, "trending");
        assert_eq!(view.videos.len(), 2);
        assert_eq!(view.total_views(), 2 * 456_000);
    }
}
