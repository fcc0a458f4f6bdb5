use std::iter;
use std::time::Instant;

use chrono::Utc;
use log::{debug, info, warn};
use lokiz::api::types::{AccountUser, AiJobResponse, FeedKind, GlitchRequest, JobStatus, UpdateProfileRequest};
use lokiz::api::{FEED_PAGE_SIZE, JOB_POLL_INTERVAL, SEARCH_LIMIT};
use lokiz::feed::{Feed, SettleTicket, SimulatedMedia};
use lokiz::mock::{self, MockFeed};
use lokiz::model::{Comment, User, Video};
use lokiz::overlay::{
    CommentPanel,
    FollowLists,
    FollowTab,
    GlitchPicker,
    HashtagView,
    Overlay,
    Overlays,
    ShareSheet,
    SocialTarget,
    SubmitOutcome,
};
use lokiz::pages::{ExplorePage, MessagesPage, NotificationsPage, ProfilePage, Settings, SettingsToggle};
use lokiz::search::{self, SearchResults, SearchTab};
use lokiz::toast::Toasts;
use lokiz::validation::{LoginForm, RegisterForm};
use lokiz::{ApiClient, ApiError, ClientConfig, Session};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// The simulated host has no real media, so every clip is this long.
const CLIP_SECONDS: f64 = 15.0;
/// Scroll units per mouse wheel notch.
const WHEEL_STEP: f64 = 120.0;
pub const EXPLORE_COLUMNS: usize = 3;
pub const SETTINGS_FIELDS: usize = 4;
const JOB_MAX_POLLS: u32 = 90;
const FOLLOW_PAGE_SIZE: u32 = 50;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Feed,
    Explore,
    Search,
    /// `None` is the signed-in user's own profile.
    Profile(Option<String>),
    Messages,
    Notifications,
    Settings,
    Login,
    Register,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Feed => "/".to_string(),
            Route::Explore => "/explore".to_string(),
            Route::Search => "/search".to_string(),
            Route::Profile(Some(id)) => format!("/profile/{id}"),
            Route::Profile(None) => "/profile".to_string(),
            Route::Messages => "/messages".to_string(),
            Route::Notifications => "/notifications".to_string(),
            Route::Settings => "/settings".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
        }
    }
}

/// Results of background work, applied on the event loop.
pub enum Loaded {
    FeedPage { generation: u64, videos: Vec<Video>, cursor: Option<String>, has_more: bool },
    ExplorePage(Vec<Video>),
    Job(AiJobResponse),
    Failed(ApiError),
}

pub struct App {
    pub config: ClientConfig,
    pub route: Route,
    pub feed: Feed<SimulatedMedia>,
    pub explore: ExplorePage,
    pub search_query: String,
    pub search_tab: SearchTab,
    pub search_results: SearchResults,
    pub profile: Option<ProfilePage>,
    pub messages: MessagesPage,
    pub notifications: NotificationsPage,
    pub settings: Settings,
    pub login: LoginForm,
    pub register: RegisterForm,
    pub overlays: Overlays,
    pub toasts: Toasts,
    /// Row of the current page's list, or field of the current form.
    pub cursor: usize,
    pub overlay_cursor: usize,
    pub social_cursor: usize,
    pub editing: bool,
    session: Session,
    api: Option<ApiClient>,
    settle_rx: UnboundedReceiver<SettleTicket>,
    loaded_tx: UnboundedSender<Loaded>,
    loaded_rx: UnboundedReceiver<Loaded>,
    feed_pager: MockFeed,
    feed_generation: u64,
    feed_cursor: Option<String>,
    feed_has_more: bool,
    feed_loading: bool,
    clip: (usize, f64),
    last_tick: Instant,
}

fn new_feed(config: &ClientConfig, videos: Vec<Video>) -> (Feed<SimulatedMedia>, UnboundedReceiver<SettleTicket>) {
    let policy = config.autoplay;
    Feed::new(videos, config.viewport_height, config.settle_delay(), move |_| SimulatedMedia::new(policy))
}

impl App {
    /// `api` is `None` in offline mode; every page then runs on mock data.
    pub fn new(config: ClientConfig, session: Session, api: Option<ApiClient>) -> Self {
        let videos = if api.is_some() { Vec::new() } else { mock::videos() };
        let feed_pager = MockFeed::default().with_loaded(videos.len());
        let (feed, settle_rx) = new_feed(&config, videos);
        let (loaded_tx, loaded_rx) = unbounded_channel();
        Self {
            config,
            route: Route::Feed,
            feed,
            explore: ExplorePage::default(),
            search_query: String::new(),
            search_tab: SearchTab::Videos,
            search_results: SearchResults::default(),
            profile: None,
            messages: MessagesPage::new(mock::conversations()),
            notifications: NotificationsPage::default(),
            settings: Settings::default(),
            login: LoginForm::default(),
            register: RegisterForm::default(),
            overlays: Overlays::default(),
            toasts: Toasts::default(),
            cursor: 0,
            overlay_cursor: 0,
            social_cursor: 0,
            editing: false,
            session,
            api,
            settle_rx,
            loaded_tx,
            loaded_rx,
            feed_pager,
            feed_generation: 0,
            feed_cursor: None,
            feed_has_more: true,
            feed_loading: false,
            clip: (0, 0.0),
            last_tick: Instant::now(),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.api.is_none()
    }

    pub fn signed_in_user(&self) -> Option<AccountUser> {
        self.session.user()
    }

    /// Refreshes the stored account and loads the first feed page.
    pub async fn start(&mut self) {
        if let Some(api) = self.api.clone() {
            if self.session.is_authenticated() {
                if let Err(err) = api.me().await {
                    self.fail(err);
                }
            }
            self.reload_feed().await;
        }
    }

    // ----- event loop plumbing -----

    /// Applies fired settle timers and finished background loads.
    pub fn drain(&mut self) {
        while let Ok(ticket) = self.settle_rx.try_recv() {
            if let Some(snap) = self.feed.on_settled(ticket) {
                if snap.changed {
                    self.record_view();
                }
                self.maybe_prefetch();
            }
        }
        while let Ok(loaded) = self.loaded_rx.try_recv() {
            self.apply(loaded);
        }
    }

    pub fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick).as_secs_f64();
        self.last_tick = now;
        self.toasts.tick(now);

        let index = self.feed.active_index();
        if self.clip.0 != index {
            self.clip = (index, 0.0);
        }
        if self.route != Route::Feed {
            return;
        }
        if let Some(player) = self.feed.active_player_mut() {
            if player.is_playing() {
                self.clip.1 = (self.clip.1 + elapsed) % CLIP_SECONDS;
                player.update_progress(self.clip.1, CLIP_SECONDS);
            }
        }
    }

    fn apply(&mut self, loaded: Loaded) {
        match loaded {
            Loaded::FeedPage { generation, videos, cursor, has_more } => {
                if generation != self.feed_generation {
                    debug!("dropping feed page from an older feed");
                    return;
                }
                self.feed_loading = false;
                if self.api.is_none() {
                    self.feed_pager.finish_load(&videos);
                }
                self.feed_cursor = cursor;
                self.feed_has_more = has_more;
                self.feed.append(videos);
            }
            Loaded::ExplorePage(videos) => self.explore.receive(videos),
            Loaded::Job(job) => match job.status {
                JobStatus::Completed => self.toasts.success(format!("{} job finished", job.job_type)),
                _ => self.toasts.error(job.error_message.unwrap_or_else(|| format!("{} job failed", job.job_type))),
            },
            Loaded::Failed(err) => {
                self.feed_loading = false;
                self.fail(err);
            }
        }
    }

    /// Every failure ends as a toast. A rejected token sends the user to the login page.
    fn fail(&mut self, err: ApiError) {
        warn!("{err}");
        match err {
            ApiError::Unauthorized => {
                self.toasts.error("Session expired, please log in");
                self.go(Route::Login);
            }
            other => self.toasts.error(other.to_string()),
        }
    }

    // ----- routing -----

    fn go(&mut self, route: Route) {
        debug!("route {} -> {}", self.route.path(), route.path());
        self.route = route;
        self.cursor = 0;
        self.editing = false;
        self.overlays.close();
    }

    pub async fn open(&mut self, route: Route) {
        self.go(route.clone());
        match route {
            Route::Profile(id) => self.load_profile(id).await,
            Route::Notifications => self.load_notifications().await,
            Route::Settings => self.load_settings(),
            Route::Search => self.refresh_search(),
            _ => {}
        }
    }

    /// Steps back one level: a picked share recipient, then the overlay, then the page.
    pub fn back(&mut self) {
        if let Some(Overlay::Share(sheet)) = self.overlays.current_mut() {
            if sheet.deselect() {
                return;
            }
        }
        if self.overlays.close().is_none() && self.route != Route::Feed {
            self.go(Route::Feed);
        }
    }

    pub async fn refresh(&mut self) {
        match self.route {
            Route::Feed => self.reload_feed().await,
            Route::Notifications => self.load_notifications().await,
            _ => {}
        }
    }

    // ----- feed -----

    fn replace_feed(&mut self, videos: Vec<Video>) {
        let (feed, settle_rx) = new_feed(&self.config, videos);
        self.feed = feed;
        self.settle_rx = settle_rx;
        self.feed_generation += 1;
        self.feed_loading = false;
        self.clip = (0, 0.0);
    }

    async fn reload_feed(&mut self) {
        match self.api.clone() {
            Some(api) => match api.feed(FeedKind::ForYou, FEED_PAGE_SIZE, None).await {
                Ok(page) => {
                    info!("loaded {} of {} feed videos", page.videos.len(), page.total);
                    self.feed_cursor = page.next_cursor;
                    self.feed_has_more = page.has_more;
                    self.replace_feed(page.videos.into_iter().map(Video::from).collect());
                }
                Err(err) => {
                    self.fail(err);
                    self.feed_has_more = false;
                    self.replace_feed(mock::videos());
                }
            },
            None => {
                let videos = mock::videos();
                self.feed_pager = MockFeed::default().with_loaded(videos.len());
                self.feed_has_more = true;
                self.replace_feed(videos);
            }
        }
    }

    fn maybe_prefetch(&mut self) {
        if self.feed_loading || !self.feed_has_more || !self.feed.should_prefetch() {
            return;
        }
        let tx = self.loaded_tx.clone();
        let generation = self.feed_generation;
        match self.api.clone() {
            Some(api) => {
                let cursor = self.feed_cursor.clone();
                self.feed_loading = true;
                tokio::spawn(async move {
                    let loaded = match api.feed(FeedKind::ForYou, FEED_PAGE_SIZE, cursor.as_deref()).await {
                        Ok(page) => Loaded::FeedPage {
                            generation,
                            videos: page.videos.into_iter().map(Video::from).collect(),
                            cursor: page.next_cursor,
                            has_more: page.has_more,
                        },
                        Err(err) => Loaded::Failed(err),
                    };
                    let _ = tx.send(loaded);
                });
            }
            None => {
                if let Some(req) = self.feed_pager.begin_load() {
                    self.feed_loading = true;
                    tokio::spawn(async move {
                        let videos = req.fulfil().await;
                        let _ = tx.send(Loaded::FeedPage { generation, videos, cursor: None, has_more: true });
                    });
                }
            }
        }
    }

    fn record_view(&self) {
        let (Some(api), Some(video)) = (self.api.clone(), self.feed.active_video()) else {
            return;
        };
        let id = video.id.clone();
        tokio::spawn(async move {
            if let Err(err) = api.record_view(&id).await {
                debug!("view of {id} not recorded: {err}");
            }
        });
    }

    pub fn wheel(&mut self, down: bool) {
        if self.overlays.is_open() {
            return;
        }
        match self.route {
            Route::Feed => self.feed.scroll_by(if down { WHEEL_STEP } else { -WHEEL_STEP }),
            _ if down => self.down(),
            _ => self.up(),
        }
    }

    fn step_feed(&mut self, forward: bool) {
        let snap = if forward { self.feed.next() } else { self.feed.prev() };
        if snap.is_some_and(|s| s.changed) {
            self.record_view();
        }
        self.maybe_prefetch();
    }

    pub fn toggle_play(&mut self) {
        if self.route == Route::Feed {
            self.feed.toggle_play();
        }
    }

    pub fn toggle_mute(&mut self) {
        if self.route == Route::Feed {
            self.feed.toggle_mute();
        }
    }

    /// Online engagement needs a session; offline it only touches local state.
    fn require_login(&mut self) -> bool {
        if self.api.is_some() && !self.session.is_authenticated() {
            self.overlays.open(Overlay::LoginPrompt);
            return false;
        }
        true
    }

    pub async fn like(&mut self) {
        if self.route != Route::Feed || !self.require_login() {
            return;
        }
        let Some(video) = self.feed.active_video_mut() else {
            return;
        };
        let liked = video.toggle_like();
        let id = video.id.clone();
        if let Some(api) = self.api.clone() {
            if let Err(err) = api.set_liked(&id, liked).await {
                if let Some(video) = self.feed.active_video_mut() {
                    video.toggle_like();
                }
                self.fail(err);
            }
        }
    }

    pub async fn bookmark(&mut self) {
        if self.route != Route::Feed || !self.require_login() {
            return;
        }
        let Some(video) = self.feed.active_video_mut() else {
            return;
        };
        let saved = video.toggle_bookmark();
        let id = video.id.clone();
        if let Some(api) = self.api.clone() {
            if let Err(err) = api.set_bookmarked(&id, saved).await {
                if let Some(video) = self.feed.active_video_mut() {
                    video.toggle_bookmark();
                }
                self.fail(err);
                return;
            }
        }
        self.toasts.info(if saved { "Saved to bookmarks" } else { "Removed from bookmarks" });
    }

    // ----- overlays -----

    fn open_overlay(&mut self, overlay: Overlay) {
        self.overlays.open(overlay);
        self.overlay_cursor = 0;
        self.social_cursor = 0;
        self.editing = false;
    }

    fn active_video_id(&self) -> Option<String> {
        (self.route == Route::Feed).then(|| self.feed.active_video().map(|v| v.id.clone())).flatten()
    }

    pub async fn open_comments(&mut self) {
        let Some(id) = self.active_video_id() else {
            return;
        };
        let comments = match self.api.clone() {
            Some(api) => match api.comments(&id, 1, 20).await {
                Ok(list) => list.comments.into_iter().map(Comment::from).collect(),
                Err(err) => return self.fail(err),
            },
            None => mock::comments(&id),
        };
        self.open_overlay(Overlay::Comments(CommentPanel::new(id, comments)));
    }

    async fn post_comment(&mut self) {
        let author = self.session.user().map(|u| User::from(&u));
        let Some(Overlay::Comments(panel)) = self.overlays.current_mut() else {
            return;
        };
        match panel.submit(author.as_ref(), Utc::now()) {
            SubmitOutcome::Empty => {}
            SubmitOutcome::LoginRequired => self.open_overlay(Overlay::LoginPrompt),
            SubmitOutcome::Posted(comment) => {
                self.editing = false;
                if let Some(video) = self.feed.active_video_mut().filter(|v| v.id == comment.video_id) {
                    video.stats.comments += 1;
                }
                if let Some(api) = self.api.clone() {
                    if let Err(err) = api.post_comment(&comment.video_id, &comment.text).await {
                        self.retract_comment(&comment);
                        return self.fail(err);
                    }
                }
                self.toasts.success("Comment posted");
            }
        }
    }

    fn retract_comment(&mut self, comment: &Comment) {
        if let Some(Overlay::Comments(panel)) = self.overlays.current_mut() {
            if panel.retract(&comment.id).is_some() && panel.draft.is_empty() {
                panel.draft = comment.text.clone();
            }
        }
        if let Some(video) = self.feed.active_video_mut().filter(|v| v.id == comment.video_id) {
            video.stats.comments = video.stats.comments.saturating_sub(1);
        }
    }

    async fn share_recipients(&mut self) -> Vec<User> {
        let me = self.session.user();
        if let (Some(api), Some(me)) = (self.api.clone(), me) {
            match api.following(&me.id, 1, FOLLOW_PAGE_SIZE).await {
                Ok(list) => return list.follows.into_iter().map(|f| User::from(f.following)).collect(),
                Err(err) => self.fail(err),
            }
        }
        mock::users()
    }

    pub async fn open_share(&mut self) {
        let Some(id) = self.active_video_id() else {
            return;
        };
        let recipients = self.share_recipients().await;
        let self_id = self.session.user().map(|u| u.id);
        self.open_overlay(Overlay::Share(ShareSheet::new(id, recipients, self_id)));
    }

    fn pick_recipient(&mut self) {
        let Some(Overlay::Share(sheet)) = self.overlays.current_mut() else {
            return;
        };
        let Some(id) = sheet.recipients.get(self.overlay_cursor).map(|u| u.id.clone()) else {
            return;
        };
        if !sheet.select(&id) {
            self.toasts.error("You can't share a video with yourself");
        }
    }

    fn send_share(&mut self) {
        let Some(Overlay::Share(sheet)) = self.overlays.current_mut() else {
            return;
        };
        let name = sheet.recipients.iter().find(|u| Some(u.id.as_str()) == sheet.selected()).map(|u| u.nickname.clone());
        match sheet.send() {
            Some(msg) => {
                info!("shared {} with {}", msg.url, msg.recipient_id);
                self.editing = false;
                self.toasts.success(format!("Sent to {}", name.unwrap_or(msg.recipient_id)));
            }
            None => self.toasts.info("Pick a recipient first"),
        }
    }

    fn share_to_social(&mut self) {
        let Some(Overlay::Share(sheet)) = self.overlays.current() else {
            return;
        };
        let target = SocialTarget::ALL[self.social_cursor % SocialTarget::ALL.len()];
        let link = sheet.social(target);
        self.toasts.success(format!("{}: {link}", target.label()));
    }

    pub async fn open_follow(&mut self) {
        let mut lists = FollowLists::default();
        match (self.api.clone(), self.session.user()) {
            (Some(api), Some(me)) => {
                let following = api.following(&me.id, 1, FOLLOW_PAGE_SIZE).await;
                let followers = api.followers(&me.id, 1, FOLLOW_PAGE_SIZE).await;
                match (following, followers) {
                    (Ok(following), Ok(followers)) => {
                        lists.following = following.follows.into_iter().map(|f| User::from(f.following)).collect();
                        lists.followers = followers.follows.into_iter().map(|f| User::from(f.follower)).collect();
                    }
                    (Err(err), _) | (_, Err(err)) => return self.fail(err),
                }
            }
            (Some(_), None) => return self.open_overlay(Overlay::LoginPrompt),
            (None, _) => {
                let users = mock::users();
                lists.following = users.iter().take(2).cloned().collect();
                lists.followers = users.iter().skip(1).cloned().collect();
            }
        }
        for user in lists.following.iter_mut() {
            user.is_following = true;
        }
        let mut suggested: Vec<User> = Vec::new();
        for author in self.feed.videos().iter().map(|v| &v.user) {
            let known = lists.following.iter().chain(suggested.iter()).any(|u| u.id == author.id);
            if !known {
                suggested.push(author.clone());
            }
        }
        lists.suggested = suggested;
        self.open_overlay(Overlay::Follow(lists));
    }

    async fn toggle_follow_row(&mut self) {
        let Some(Overlay::Follow(lists)) = self.overlays.current_mut() else {
            return;
        };
        let Some(id) = lists.users().get(self.overlay_cursor).map(|u| u.id.clone()) else {
            return;
        };
        let unfollow = matches!(lists.tab, FollowTab::Following | FollowTab::Friends);
        lists.toggle(&id);
        let follow = !unfollow && lists.users().iter().any(|u| u.id == id && u.is_following);
        let rows = lists.users().len();
        self.overlay_cursor = self.overlay_cursor.min(rows.saturating_sub(1));
        if let Some(api) = self.api.clone() {
            let result = if follow { api.follow(&id).await.map(drop) } else { api.unfollow(&id).await };
            if let Err(err) = result {
                self.fail(err);
            }
        }
    }

    pub fn open_glitch(&mut self) {
        if let Some(id) = self.active_video_id() {
            self.open_overlay(Overlay::Glitch(GlitchPicker::new(id, mock::glitch_effects())));
        }
    }

    async fn apply_glitch(&mut self) {
        let Some(Overlay::Glitch(picker)) = self.overlays.current() else {
            return;
        };
        let Some(effect) = picker.current().cloned() else {
            return;
        };
        let video_id = picker.video_id.clone();
        match (self.api.clone(), self.session.user()) {
            (Some(api), Some(user)) => {
                let Some(image) = user.profile_image_url else {
                    return self.toasts.error("Add a profile image before glitching");
                };
                let req = GlitchRequest { template_video_id: video_id, user_image_url: image, prompt: Some(effect.name.clone()) };
                match api.glitch_animate(&req).await {
                    Ok(job) => {
                        info!("glitch job {} queued for {} credits", job.id, job.credits_used);
                        self.toasts.info(format!("{} queued", effect.name));
                        let tx = self.loaded_tx.clone();
                        tokio::spawn(async move {
                            let loaded = match api.wait_for_job(&job.id, JOB_POLL_INTERVAL, JOB_MAX_POLLS).await {
                                Ok(job) => Loaded::Job(job),
                                Err(err) => Loaded::Failed(err),
                            };
                            let _ = tx.send(loaded);
                        });
                    }
                    Err(err) => self.fail(err),
                }
            }
            (Some(_), None) => self.open_overlay(Overlay::LoginPrompt),
            (None, _) => self.toasts.success(format!("{} applied", effect.name)),
        }
    }

    pub fn open_hashtag(&mut self) {
        let tag = match self.route {
            Route::Feed => self.feed.active_video().and_then(|v| v.hashtags.first().cloned()),
            Route::Search if self.search_tab == SearchTab::Hashtags => {
                self.search_results.hashtags.get(self.cursor).map(|h| h.name.clone())
            }
            _ => None,
        };
        match tag {
            Some(tag) => {
                let view = HashtagView::new(&tag, self.feed.videos());
                self.open_overlay(Overlay::Hashtag(view));
            }
            None => self.toasts.info("No hashtag here"),
        }
    }

    fn open_detail(&mut self, video: Option<Video>) {
        if let Some(video) = video {
            self.open_overlay(Overlay::VideoDetail(Box::new(video)));
        }
    }

    // ----- pages -----

    async fn load_profile(&mut self, id: Option<String>) {
        let me = self.session.user();
        let id = id.or_else(|| me.as_ref().map(|u| u.id.clone()));
        let user = match (self.api.clone(), id) {
            (Some(api), Some(id)) => match api.user_profile(&id).await {
                Ok(profile) => Some(User::from(profile)),
                Err(err) => return self.fail(err),
            },
            (Some(_), None) => {
                self.toasts.info("Log in to see your profile");
                return self.go(Route::Login);
            }
            (None, Some(id)) => mock::user_by_id(&id).or_else(|| me.as_ref().filter(|u| u.id == id).map(User::from)),
            (None, None) => mock::users().into_iter().next(),
        };
        self.profile = user.map(|u| ProfilePage::new(u, self.feed.videos()));
        if self.profile.is_none() {
            self.toasts.error("User not found");
        }
    }

    pub async fn toggle_profile_follow(&mut self) {
        let me = self.session.user().map(|u| u.id);
        let Some(profile) = self.profile.as_ref() else {
            return;
        };
        if me.as_deref() == Some(profile.user.id.as_str()) {
            return self.open_follow().await;
        }
        if !self.require_login() {
            return;
        }
        let Some(profile) = self.profile.as_mut() else {
            return;
        };
        let following = profile.toggle_follow();
        let id = profile.user.id.clone();
        if let Some(api) = self.api.clone() {
            let result = if following { api.follow(&id).await.map(drop) } else { api.unfollow(&id).await };
            if let Err(err) = result {
                if let Some(profile) = self.profile.as_mut() {
                    profile.toggle_follow();
                }
                self.fail(err);
            }
        }
    }

    async fn load_notifications(&mut self) {
        let items = match self.api.clone() {
            Some(api) if self.session.is_authenticated() => match api.notifications(1, 20).await {
                Ok(list) => list.notifications.into_iter().map(Into::into).collect(),
                Err(err) => return self.fail(err),
            },
            Some(_) => Vec::new(),
            None => mock::notifications(Utc::now()),
        };
        self.notifications = NotificationsPage::new(items);
    }

    async fn read_notification(&mut self) {
        let Some(id) = self.notifications.items.get(self.cursor).map(|n| n.id.clone()) else {
            return;
        };
        if !self.notifications.mark_read(&id) {
            return;
        }
        if let Some(api) = self.api.clone() {
            if let Err(err) = api.mark_read(&id).await {
                self.fail(err);
            }
        }
    }

    pub async fn mark_all_read(&mut self) {
        if self.route != Route::Notifications {
            return;
        }
        self.notifications.mark_all_read();
        if let Some(api) = self.api.clone() {
            if let Err(err) = api.mark_all_read().await {
                return self.fail(err);
            }
        }
        self.toasts.success("All notifications read");
    }

    fn send_message(&mut self) {
        let sender = self.session.user().map(|u| u.id).unwrap_or_else(|| "me".to_string());
        if self.messages.selected.is_none() {
            return self.toasts.info("Pick a conversation first");
        }
        if self.messages.send(&sender, Utc::now()).is_some() {
            self.editing = false;
        }
    }

    fn load_settings(&mut self) {
        if let Some(user) = self.session.user() {
            self.settings.nickname = user.display_name.clone().unwrap_or_else(|| user.username.clone());
            self.settings.username = user.username;
            self.settings.bio = user.bio.unwrap_or_default();
            self.settings.email = user.email;
        }
    }

    async fn save_settings(&mut self) {
        self.editing = false;
        if !self.session.is_authenticated() {
            return self.open_overlay(Overlay::LoginPrompt);
        }
        let nickname = self.settings.nickname.trim().to_string();
        let bio = self.settings.bio.trim().to_string();
        match self.api.clone() {
            Some(api) => {
                let req = UpdateProfileRequest {
                    display_name: (!nickname.is_empty()).then_some(nickname),
                    bio: Some(bio),
                    profile_image_url: None,
                };
                if let Err(err) = api.update_profile(&req).await {
                    return self.fail(err);
                }
            }
            None => {
                let updated = self.session.update_user(|u| {
                    u.display_name = (!nickname.is_empty()).then_some(nickname);
                    u.bio = (!bio.is_empty()).then_some(bio);
                });
                if let Err(err) = updated {
                    return self.fail(err.into());
                }
            }
        }
        self.toasts.success("Profile saved");
    }

    fn refresh_search(&mut self) {
        self.search_results = search::search(&self.search_query, self.feed.videos(), &mock::users());
        self.cursor = 0;
    }

    async fn remote_search(&mut self) {
        self.editing = false;
        let Some(api) = self.api.clone() else {
            return self.refresh_search();
        };
        match api.search(&self.search_query, SEARCH_LIMIT).await {
            Ok(found) => {
                let videos: Vec<Video> = found.videos.into_iter().map(Video::from).collect();
                let users: Vec<User> = found.users.into_iter().map(User::from).collect();
                let hashtags = search::search(&self.search_query, &videos, &[]).hashtags;
                self.search_results = SearchResults { videos, users, hashtags };
                self.cursor = 0;
            }
            Err(err) => self.fail(err),
        }
    }

    // ----- sign in / out -----

    /// Offline sign-in: a local account named after the e-mail.
    fn offline_sign_in(&self, email: &str, username: Option<&str>) -> Result<AccountUser, ApiError> {
        let username = username.map(str::to_string).unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());
        let user = AccountUser {
            id: format!("local-{username}"),
            username,
            email: email.to_string(),
            display_name: None,
            bio: None,
            profile_image_url: None,
            credits: 0,
            created_at: Some(Utc::now()),
        };
        self.session.set_auth(user.clone(), "offline".to_string())?;
        Ok(user)
    }

    fn signed_in(&mut self, user: AccountUser) {
        info!("signed in as {}", user.username);
        self.toasts.success(format!("Welcome, {}", user.display_name.as_deref().unwrap_or(&user.username)));
        self.go(Route::Feed);
    }

    async fn submit_login(&mut self) {
        let result = match self.api.clone() {
            Some(api) => api.login(&self.login).await,
            None => self.login.validate().map_err(ApiError::from).and_then(|req| self.offline_sign_in(&req.email, None)),
        };
        match result {
            Ok(user) => {
                self.login = LoginForm::default();
                self.signed_in(user);
            }
            Err(ApiError::Unauthorized) => self.toasts.error("Invalid e-mail or password"),
            Err(err) => self.fail(err),
        }
    }

    async fn submit_register(&mut self) {
        let result = match self.api.clone() {
            Some(api) => api.register(&self.register).await,
            None => self
                .register
                .validate()
                .map_err(ApiError::from)
                .and_then(|req| self.offline_sign_in(&req.email, Some(&req.username))),
        };
        match result {
            Ok(user) => {
                self.register = RegisterForm::default();
                self.signed_in(user);
            }
            Err(err) => self.fail(err),
        }
    }

    pub fn logout(&mut self) {
        if !self.session.is_authenticated() {
            return;
        }
        if let Err(err) = self.session.clear() {
            return self.fail(err.into());
        }
        info!("signed out");
        self.toasts.info("Signed out");
        self.go(Route::Feed);
    }

    // ----- input -----

    fn overlay_rows(&self) -> usize {
        match self.overlays.current() {
            Some(Overlay::Comments(panel)) => panel.total(),
            Some(Overlay::Share(sheet)) => sheet.recipients.len(),
            Some(Overlay::Follow(lists)) => lists.users().len(),
            Some(Overlay::Hashtag(view)) => view.videos.len(),
            _ => 0,
        }
    }

    fn page_rows(&self) -> usize {
        match self.route {
            Route::Search => self.search_results.count(self.search_tab),
            Route::Profile(_) => self.profile.as_ref().map_or(0, |p| p.visible().len()),
            Route::Messages => self.messages.conversations.len(),
            Route::Notifications => self.notifications.items.len(),
            Route::Settings => SETTINGS_FIELDS + SettingsToggle::ALL.len(),
            Route::Login => 2,
            Route::Register => 4,
            Route::Feed | Route::Explore => 0,
        }
    }

    pub fn down(&mut self) {
        if let Some(Overlay::Glitch(picker)) = self.overlays.current_mut() {
            return picker.next();
        }
        if self.overlays.is_open() {
            self.overlay_cursor = (self.overlay_cursor + 1).min(self.overlay_rows().saturating_sub(1));
            return;
        }
        match self.route {
            Route::Feed => self.step_feed(true),
            Route::Explore => {
                self.explore.select_next(EXPLORE_COLUMNS);
                self.explore_prefetch();
            }
            _ => self.cursor = (self.cursor + 1).min(self.page_rows().saturating_sub(1)),
        }
    }

    pub fn up(&mut self) {
        if let Some(Overlay::Glitch(picker)) = self.overlays.current_mut() {
            return picker.prev();
        }
        if self.overlays.is_open() {
            self.overlay_cursor = self.overlay_cursor.saturating_sub(1);
            return;
        }
        match self.route {
            Route::Feed => self.step_feed(false),
            Route::Explore => self.explore.select_prev(EXPLORE_COLUMNS),
            _ => self.cursor = self.cursor.saturating_sub(1),
        }
    }

    pub fn left(&mut self) {
        match self.overlays.current_mut() {
            Some(Overlay::Share(_)) => {
                self.social_cursor = (self.social_cursor + SocialTarget::ALL.len() - 1) % SocialTarget::ALL.len();
            }
            Some(Overlay::Glitch(picker)) => picker.prev(),
            Some(_) => {}
            None if self.route == Route::Explore => self.explore.select_prev(1),
            None => {}
        }
    }

    pub fn right(&mut self) {
        match self.overlays.current_mut() {
            Some(Overlay::Share(_)) => self.social_cursor = (self.social_cursor + 1) % SocialTarget::ALL.len(),
            Some(Overlay::Glitch(picker)) => picker.next(),
            Some(_) => {}
            None => match self.route {
                Route::Explore => {
                    self.explore.select_next(1);
                    self.explore_prefetch();
                }
                Route::Profile(_) => {
                    if let Some(profile) = self.profile.as_mut() {
                        profile.sort = profile.sort.next();
                    }
                }
                _ => {}
            },
        }
    }

    fn explore_prefetch(&mut self) {
        if !self.explore.near_end(2, EXPLORE_COLUMNS) {
            return;
        }
        if let Some(req) = self.explore.request_more() {
            let tx = self.loaded_tx.clone();
            tokio::spawn(async move {
                let _ = tx.send(Loaded::ExplorePage(req.fulfil().await));
            });
        }
    }

    pub fn next_tab(&mut self) {
        if let Some(overlay) = self.overlays.current_mut() {
            match overlay {
                Overlay::Follow(lists) => {
                    lists.tab = lists.tab.next();
                    self.overlay_cursor = 0;
                }
                Overlay::Share(_) => self.share_to_social(),
                _ => {}
            }
            return;
        }
        match self.route {
            Route::Explore => self.explore.next_category(),
            Route::Search => {
                self.search_tab = self.search_tab.next();
                self.cursor = 0;
            }
            Route::Profile(_) => {
                if let Some(profile) = self.profile.as_mut() {
                    profile.toggle_tab();
                }
                self.cursor = 0;
            }
            Route::Login | Route::Register => self.cursor = (self.cursor + 1) % self.page_rows(),
            _ => {}
        }
    }

    pub async fn select(&mut self) {
        if self.overlays.is_open() {
            return self.select_in_overlay().await;
        }
        match self.route.clone() {
            Route::Feed => {
                if let Some(author) = self.feed.active_video().map(|v| v.user.id.clone()) {
                    self.open(Route::Profile(Some(author))).await;
                }
            }
            Route::Explore => self.open_detail(self.explore.videos.get(self.explore.selected).cloned()),
            Route::Search => match self.search_tab {
                SearchTab::Videos => self.open_detail(self.search_results.videos.get(self.cursor).cloned()),
                SearchTab::Users => {
                    if let Some(id) = self.search_results.users.get(self.cursor).map(|u| u.id.clone()) {
                        self.open(Route::Profile(Some(id))).await;
                    }
                }
                SearchTab::Hashtags => self.open_hashtag(),
            },
            Route::Profile(_) => {
                let video = self.profile.as_ref().and_then(|p| p.visible().get(self.cursor).map(|v| (*v).clone()));
                self.open_detail(video);
            }
            Route::Messages => self.messages.select(self.cursor),
            Route::Notifications => self.read_notification().await,
            Route::Settings => match self.cursor.checked_sub(SETTINGS_FIELDS) {
                Some(i) => {
                    if let Some(toggle) = SettingsToggle::ALL.get(i) {
                        self.settings.toggle(*toggle);
                    }
                }
                None => self.editing = true,
            },
            Route::Login | Route::Register => self.editing = true,
        }
    }

    async fn select_in_overlay(&mut self) {
        match self.overlays.current_mut() {
            Some(Overlay::Comments(panel)) => {
                let ids: Vec<String> =
                    panel.comments.iter().flat_map(|c| iter::once(c).chain(c.replies.iter())).map(|c| c.id.clone()).collect();
                if let Some(id) = ids.get(self.overlay_cursor) {
                    panel.toggle_like(id);
                }
            }
            Some(Overlay::Share(_)) => self.pick_recipient(),
            Some(Overlay::Follow(_)) => self.toggle_follow_row().await,
            Some(Overlay::Glitch(_)) => self.apply_glitch().await,
            Some(Overlay::Hashtag(view)) => {
                let video = view.videos.get(self.overlay_cursor).cloned();
                self.open_detail(video);
            }
            Some(Overlay::LoginPrompt) => self.go(Route::Login),
            Some(Overlay::VideoDetail(_)) | None => {}
        }
    }

    fn input_mut(&mut self) -> Option<&mut String> {
        if let Some(overlay) = self.overlays.current_mut() {
            return match overlay {
                Overlay::Comments(panel) => Some(&mut panel.draft),
                Overlay::Share(sheet) => Some(&mut sheet.message),
                _ => None,
            };
        }
        match self.route {
            Route::Search => Some(&mut self.search_query),
            Route::Messages => Some(&mut self.messages.draft),
            Route::Login => Some(if self.cursor == 0 { &mut self.login.email } else { &mut self.login.password }),
            Route::Register => Some(match self.cursor {
                0 => &mut self.register.username,
                1 => &mut self.register.email,
                2 => &mut self.register.password,
                _ => &mut self.register.confirm_password,
            }),
            Route::Settings => match self.cursor {
                0 => Some(&mut self.settings.nickname),
                1 => Some(&mut self.settings.username),
                2 => Some(&mut self.settings.bio),
                3 => Some(&mut self.settings.email),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn begin_edit(&mut self) {
        self.editing = self.input_mut().is_some();
    }

    pub fn type_char(&mut self, c: char) {
        if let Some(buf) = self.input_mut() {
            buf.push(c);
        }
        if self.route == Route::Search && !self.overlays.is_open() {
            self.refresh_search();
        }
    }

    pub fn backspace(&mut self) {
        if let Some(buf) = self.input_mut() {
            buf.pop();
        }
        if self.route == Route::Search && !self.overlays.is_open() {
            self.refresh_search();
        }
    }

    pub async fn submit_edit(&mut self) {
        let in_comments = matches!(self.overlays.current(), Some(Overlay::Comments(_)));
        let in_share = matches!(self.overlays.current(), Some(Overlay::Share(_)));
        if in_comments {
            return self.post_comment().await;
        }
        if in_share {
            return self.send_share();
        }
        match self.route {
            Route::Search => self.remote_search().await,
            Route::Messages => self.send_message(),
            Route::Login if self.cursor == 0 => self.cursor = 1,
            Route::Login => self.submit_login().await,
            Route::Register if self.cursor < 3 => self.cursor += 1,
            Route::Register => self.submit_register().await,
            Route::Settings => self.save_settings().await,
            _ => self.editing = false,
        }
    }
}
