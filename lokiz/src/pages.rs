//! State behind the simple pages: explore, profile, messages, notifications, settings.

use chrono::{DateTime, Utc};

use crate::mock::{self, MockFeed, PageRequest, CATEGORIES};
use crate::model::{Conversation, Message, Notification, User, Video};

// ----- explore -----

#[derive(Debug)]
pub struct ExplorePage {
    pub category: usize,
    pub videos: Vec<Video>,
    pub selected: usize,
    pager: MockFeed,
}

impl Default for ExplorePage {
    fn default() -> Self {
        let first = mock::generate_videos(mock::EXPLORE_PAGE_SIZE, 0);
        let pager = MockFeed::default().with_loaded(first.len());
        Self { category: 0, videos: first, selected: 0, pager }
    }
}

impl ExplorePage {
    pub fn category_name(&self) -> &'static str {
        CATEGORIES[self.category % CATEGORIES.len()]
    }

    pub fn next_category(&mut self) {
        self.category = (self.category + 1) % CATEGORIES.len();
    }

    pub fn prev_category(&mut self) {
        self.category = (self.category + CATEGORIES.len() - 1) % CATEGORIES.len();
    }

    pub fn is_loading(&self) -> bool {
        self.pager.is_loading()
    }

    /// Called when the grid nears its end. `None` while a page is still loading.
    pub fn request_more(&mut self) -> Option<PageRequest> {
        self.pager.begin_load()
    }

    pub fn receive(&mut self, page: Vec<Video>) {
        self.pager.finish_load(&page);
        self.videos.extend(page);
    }

    pub fn select_next(&mut self, columns: usize) {
        if !self.videos.is_empty() {
            self.selected = (self.selected + columns.max(1)).min(self.videos.len() - 1);
        }
    }

    pub fn select_prev(&mut self, columns: usize) {
        self.selected = self.selected.saturating_sub(columns.max(1));
    }

    pub fn near_end(&self, rows_left: usize, columns: usize) -> bool {
        self.selected + rows_left * columns.max(1) >= self.videos.len()
    }
}

// ----- profile -----

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProfileTab {
    #[default]
    Videos,
    Liked,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Latest,
    Popular,
    Oldest,
}

impl SortOrder {
    pub fn next(self) -> Self {
        match self {
            SortOrder::Latest => SortOrder::Popular,
            SortOrder::Popular => SortOrder::Oldest,
            SortOrder::Oldest => SortOrder::Latest,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Latest => "Latest",
            SortOrder::Popular => "Popular",
            SortOrder::Oldest => "Oldest",
        }
    }
}

#[derive(Debug)]
pub struct ProfilePage {
    pub user: User,
    pub videos: Vec<Video>,
    pub tab: ProfileTab,
    pub sort: SortOrder,
}

impl ProfilePage {
    pub fn new(user: User, catalogue: &[Video]) -> Self {
        let videos = catalogue.iter().filter(|v| v.user.id == user.id).cloned().collect();
        Self { user, videos, tab: ProfileTab::Videos, sort: SortOrder::Latest }
    }

    pub fn with_videos(mut self, videos: Vec<Video>) -> Self {
        self.videos = videos;
        self
    }

    /// Videos of the current tab in the current order.
    pub fn visible(&self) -> Vec<&Video> {
        let mut list: Vec<&Video> = match self.tab {
            ProfileTab::Videos => self.videos.iter().collect(),
            ProfileTab::Liked => self.videos.iter().filter(|v| v.is_liked).collect(),
        };
        match self.sort {
            SortOrder::Latest => list.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Oldest => list.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortOrder::Popular => list.sort_by(|a, b| b.stats.views.cmp(&a.stats.views)),
        }
        list
    }

    pub fn toggle_tab(&mut self) {
        self.tab = match self.tab {
            ProfileTab::Videos => ProfileTab::Liked,
            ProfileTab::Liked => ProfileTab::Videos,
        };
    }

    /// Local follow toggle; the follower count follows along.
    pub fn toggle_follow(&mut self) -> bool {
        self.user.is_following = !self.user.is_following;
        if self.user.is_following {
            self.user.followers_count += 1;
        } else {
            self.user.followers_count = self.user.followers_count.saturating_sub(1);
        }
        self.user.is_following
    }
}

// ----- messages -----

#[derive(Debug)]
pub struct MessagesPage {
    pub conversations: Vec<Conversation>,
    pub selected: Option<usize>,
    pub draft: String,
    sent: usize,
}

impl MessagesPage {
    pub fn new(conversations: Vec<Conversation>) -> Self {
        Self { conversations, selected: None, draft: String::new(), sent: 0 }
    }

    pub fn select(&mut self, index: usize) {
        if let Some(conv) = self.conversations.get_mut(index) {
            conv.mark_read();
            self.selected = Some(index);
        }
    }

    pub fn current(&self) -> Option<&Conversation> {
        self.selected.and_then(|i| self.conversations.get(i))
    }

    /// Appends the draft to the open conversation. Blank drafts are ignored.
    pub fn send(&mut self, sender_id: &str, now: DateTime<Utc>) -> Option<&Message> {
        let text = self.draft.trim().to_string();
        if text.is_empty() {
            return None;
        }
        let conv = self.conversations.get_mut(self.selected?)?;
        self.sent += 1;
        conv.last_message = text.clone();
        conv.last_message_time = now.format("%H:%M").to_string();
        conv.messages.push(Message { id: format!("sent-{}", self.sent), sender_id: sender_id.to_string(), text, created_at: now });
        self.draft.clear();
        conv.messages.last()
    }

    pub fn unread_total(&self) -> u32 {
        self.conversations.iter().map(|c| c.unread_count).sum()
    }
}

// ----- notifications -----

#[derive(Debug, Default)]
pub struct NotificationsPage {
    pub items: Vec<Notification>,
    pub selected: usize,
}

impl NotificationsPage {
    pub fn new(items: Vec<Notification>) -> Self {
        Self { items, selected: 0 }
    }

    pub fn unread(&self) -> usize {
        self.items.iter().filter(|n| !n.is_read).count()
    }

    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id && !n.is_read) {
            Some(n) => {
                n.is_read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        self.items.iter_mut().for_each(|n| n.is_read = true);
    }
}

// ----- settings -----

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsToggle {
    PrivateAccount,
    AllowComments,
    AllowMessages,
    NotifyLikes,
    NotifyComments,
    NotifyFollows,
    NotifyMessages,
}

impl SettingsToggle {
    pub const ALL: [SettingsToggle; 7] = [
        SettingsToggle::PrivateAccount,
        SettingsToggle::AllowComments,
        SettingsToggle::AllowMessages,
        SettingsToggle::NotifyLikes,
        SettingsToggle::NotifyComments,
        SettingsToggle::NotifyFollows,
        SettingsToggle::NotifyMessages,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SettingsToggle::PrivateAccount => "Private account",
            SettingsToggle::AllowComments => "Allow comments",
            SettingsToggle::AllowMessages => "Allow direct messages",
            SettingsToggle::NotifyLikes => "Notify on likes",
            SettingsToggle::NotifyComments => "Notify on comments",
            SettingsToggle::NotifyFollows => "Notify on follows",
            SettingsToggle::NotifyMessages => "Notify on messages",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub nickname: String,
    pub username: String,
    pub bio: String,
    pub email: String,
    pub private_account: bool,
    pub allow_comments: bool,
    pub allow_messages: bool,
    pub notify_likes: bool,
    pub notify_comments: bool,
    pub notify_follows: bool,
    pub notify_messages: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nickname: String::new(),
            username: String::new(),
            bio: String::new(),
            email: String::new(),
            private_account: false,
            allow_comments: true,
            allow_messages: true,
            notify_likes: true,
            notify_comments: true,
            notify_follows: true,
            notify_messages: true,
        }
    }
}

impl Settings {
    pub fn get(&self, toggle: SettingsToggle) -> bool {
        match toggle {
            SettingsToggle::PrivateAccount => self.private_account,
            SettingsToggle::AllowComments => self.allow_comments,
            SettingsToggle::AllowMessages => self.allow_messages,
            SettingsToggle::NotifyLikes => self.notify_likes,
            SettingsToggle::NotifyComments => self.notify_comments,
            SettingsToggle::NotifyFollows => self.notify_follows,
            SettingsToggle::NotifyMessages => self.notify_messages,
        }
    }

    pub fn toggle(&mut self, toggle: SettingsToggle) -> bool {
        let slot = match toggle {
            SettingsToggle::PrivateAccount => &mut self.private_account,
            SettingsToggle::AllowComments => &mut self.allow_comments,
            SettingsToggle::AllowMessages => &mut self.allow_messages,
            SettingsToggle::NotifyLikes => &mut self.notify_likes,
            SettingsToggle::NotifyComments => &mut self.notify_comments,
            SettingsToggle::NotifyFollows => &mut self.notify_follows,
            SettingsToggle::NotifyMessages => &mut self.notify_messages,
        };
        *slot = !*slot;
        *slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn explore_loads_one_page_at_a_time() {
        let mut page = ExplorePage::default();
        assert_eq!(page.videos.len(), 20);
        let req = page.request_more().unwrap();
        assert!(page.request_more().is_none());
        assert_eq!(req.start_index, 20);
        assert_eq!(req.latency, Duration::from_millis(1000));
        page.receive(mock::generate_videos(req.count, req.start_index));
        assert_eq!(page.videos.len(), 40);
        assert_eq!(page.videos[20].id, "21");
        assert!(!page.is_loading());
    }

    #[test]
    fn explore_categories_wrap() {
        let mut page = ExplorePage::default();
        page.prev_category();
        assert_eq!(page.category_name(), "Cars");
        page.next_category();
        assert_eq!(page.category_name(), "All");
    }

    #[test]
    fn profile_sorting_and_liked_tab() {
        let catalogue = mock::videos();
        let user = mock::users().remove(1);
        let mut page = ProfilePage::new(user, &catalogue).with_videos(catalogue.clone());
        let ids = |p: &ProfilePage| p.visible().iter().map(|v| v.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&page), ["1", "2", "3"]);
        page.sort = SortOrder::Oldest;
        assert_eq!(ids(&page), ["3", "2", "1"]);
        page.sort = SortOrder::Popular;
        assert_eq!(ids(&page), ["3", "2", "1"]);
        page.toggle_tab();
        assert_eq!(ids(&page), ["2"]);
    }

    #[test]
    fn profile_follow_adjusts_count() {
        let user = mock::users().remove(0);
        let before = user.followers_count;
        let mut page = ProfilePage::new(user, &mock::videos());
        assert_eq!(page.videos.len(), 1);
        assert!(page.toggle_follow());
        assert_eq!(page.user.followers_count, before + 1);
        assert!(!page.toggle_follow());
        assert_eq!(page.user.followers_count, before);
    }

    #[test]
    fn messages_ignore_blank_and_mark_read() {
        let mut page = MessagesPage::new(mock::conversations());
        assert_eq!(page.unread_total(), 2);
        page.draft = "hi".into();
        assert!(page.send("me", Utc::now()).is_none());
        page.select(0);
        assert_eq!(page.unread_total(), 0);
        page.draft = "   ".into();
        assert!(page.send("me", Utc::now()).is_none());
        page.draft = "see you".into();
        assert_eq!(page.send("me", Utc::now()).unwrap().text, "see you");
        assert_eq!(page.current().unwrap().last_message, "see you");
        assert!(page.draft.is_empty());
    }

    #[test]
    fn notifications_read_state() {
        let mut page = NotificationsPage::new(mock::notifications(Utc::now()));
        assert_eq!(page.unread(), 2);
        assert!(page.mark_read("n1"));
        assert!(!page.mark_read("n1"));
        page.mark_all_read();
        assert_eq!(page.unread(), 0);
    }

    #[test]
    fn settings_toggles() {
        let mut settings = Settings::default();
        for toggle in SettingsToggle::ALL {
            let before = settings.get(toggle);
            assert_eq!(settings.toggle(toggle), !before);
        }
        assert!(settings.private_account);
        assert!(!settings.allow_comments);
    }
}
