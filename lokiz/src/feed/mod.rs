//! The vertical single-active-player feed.
//!
//! [`Feed`] owns the videos, one [`Player`] per video and the scroll state.
//! Scroll input goes in through [`Feed::on_scroll`]; settle tickets come back
//! from the receiver returned by [`Feed::new`] and are applied with
//! [`Feed::on_settled`]. After every transition exactly the player at
//! [`ScrollSync::playing_index`] is active and every other one is inactive.

pub mod player;
pub mod scroll;
pub mod timer;

use std::time::Duration;

use log::{debug, info};
use tokio::sync::mpsc::UnboundedReceiver;

pub use player::{AutoplayPolicy, MediaSurface, PlayTrigger, PlaybackError, PlaybackState, Player, SimulatedMedia};
pub use scroll::{nearest_index, FeedScroller, ScrollSync, SettleTicket, Snap, SETTLE_DELAY};

use crate::model::Video;

pub const PREFETCH_THRESHOLD: usize = 2;

type MediaFactory<M> = Box<dyn Fn(&Video) -> M>;

pub struct Feed<M> {
    videos: Vec<Video>,
    players: Vec<Player<M>>,
    scroller: FeedScroller,
    media: MediaFactory<M>,
}

impl<M: MediaSurface> Feed<M> {
    /// Builds the feed with the first video active. `media` creates the host surface for each video.
    pub fn new<F>(videos: Vec<Video>, viewport_height: f64, settle_delay: Duration, media: F) -> (Self, UnboundedReceiver<SettleTicket>)
    where
        F: Fn(&Video) -> M + 'static,
    {
        let players = videos.iter().map(|v| Player::new(v.id.clone(), media(v))).collect();
        let (scroller, settled) = FeedScroller::new(ScrollSync::new(videos.len(), viewport_height), settle_delay);
        let mut feed = Self { videos, players, scroller, media: Box::new(media) };
        feed.sync_players();
        (feed, settled)
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn scroll(&self) -> &ScrollSync {
        self.scroller.state()
    }

    pub fn active_index(&self) -> usize {
        self.scroll().active_index()
    }

    pub fn active_video(&self) -> Option<&Video> {
        self.videos.get(self.active_index())
    }

    pub fn active_video_mut(&mut self) -> Option<&mut Video> {
        let index = self.active_index();
        self.videos.get_mut(index)
    }

    pub fn player(&self, index: usize) -> Option<&Player<M>> {
        self.players.get(index)
    }

    pub fn active_player_mut(&mut self) -> Option<&mut Player<M>> {
        let index = self.active_index();
        self.players.get_mut(index)
    }

    pub fn players(&self) -> &[Player<M>] {
        &self.players
    }

    pub fn playing_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_playing()).count()
    }

    pub fn on_scroll(&mut self, offset: f64) {
        self.scroller.on_scroll(offset);
        self.sync_players();
    }

    pub fn scroll_by(&mut self, delta: f64) {
        self.scroller.scroll_by(delta);
        self.sync_players();
    }

    /// Applies a fired settle timer. Returns the snap, or `None` for a stale ticket.
    pub fn on_settled(&mut self, ticket: SettleTicket) -> Option<Snap> {
        let snap = self.scroller.settle(ticket);
        self.sync_players();
        if let Some(snap) = snap.filter(|s| s.changed) {
            info!("feed settled on video {} (index {})", self.videos[snap.index].id, snap.index);
        }
        snap
    }

    pub fn jump_to(&mut self, index: usize) -> Option<Snap> {
        let snap = self.scroller.jump_to(index);
        self.sync_players();
        snap
    }

    pub fn next(&mut self) -> Option<Snap> {
        self.jump_to(self.active_index() + 1)
    }

    pub fn prev(&mut self) -> Option<Snap> {
        self.jump_to(self.active_index().saturating_sub(1))
    }

    pub fn set_viewport_height(&mut self, viewport_height: f64) {
        self.scroller.set_viewport_height(viewport_height);
        self.sync_players();
    }

    /// Infinite scroll: appends without moving the active index.
    pub fn append(&mut self, videos: Vec<Video>) {
        debug!("appending {} videos to a feed of {}", videos.len(), self.videos.len());
        self.players.extend(videos.iter().map(|v| Player::new(v.id.clone(), (self.media)(v))));
        self.videos.extend(videos);
        self.scroller.set_item_count(self.videos.len());
        self.sync_players();
    }

    pub fn should_prefetch(&self) -> bool {
        self.scroll().near_end(PREFETCH_THRESHOLD)
    }

    pub fn toggle_play(&mut self) -> Option<PlaybackState> {
        self.active_player_mut().map(Player::toggle_play)
    }

    pub fn toggle_mute(&mut self) -> Option<bool> {
        self.active_player_mut().map(Player::toggle_mute)
    }

    // Deactivate before activating so two players never play at once.
    fn sync_players(&mut self) {
        let target = self.scroller.state().playing_index();
        for (i, player) in self.players.iter_mut().enumerate() {
            if Some(i) != target {
                player.set_active(false);
            }
        }
        if let Some(player) = target.and_then(|i| self.players.get_mut(i)) {
            player.set_active(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;

    fn feed(count: usize, policy: AutoplayPolicy) -> (Feed<SimulatedMedia>, UnboundedReceiver<SettleTicket>) {
        Feed::new(mock::generate_videos(count, 0), 800.0, SETTLE_DELAY, move |_| SimulatedMedia::new(policy))
    }

    fn states(feed: &Feed<SimulatedMedia>) -> Vec<PlaybackState> {
        feed.players().iter().map(Player::state).collect()
    }

    #[tokio::test]
    async fn first_video_starts_active() {
        let (feed, _rx) = feed(3, AutoplayPolicy::Allowed);
        assert_eq!(states(&feed), [PlaybackState::Playing, PlaybackState::Inactive, PlaybackState::Inactive]);
    }

    #[tokio::test(start_paused = true)]
    async fn scroll_to_third_video_and_wait() {
        let (mut feed, mut rx) = feed(3, AutoplayPolicy::Allowed);
        feed.on_scroll(1600.0);
        assert_eq!(feed.playing_count(), 0);
        tokio::time::sleep(SETTLE_DELAY + Duration::from_millis(1)).await;
        let ticket = rx.recv().await.unwrap();
        let snap = feed.on_settled(ticket).unwrap();
        assert_eq!(snap.index, 2);
        assert_eq!(feed.scroll().offset(), 1600.0);
        assert_eq!(states(&feed), [PlaybackState::Inactive, PlaybackState::Inactive, PlaybackState::Playing]);
    }

    #[tokio::test(start_paused = true)]
    async fn bursts_settle_once_per_quiet_period() {
        let (mut feed, mut rx) = feed(10, AutoplayPolicy::Allowed);
        let mut changes = 0;
        for burst in 0..3 {
            for step in 1..=8 {
                feed.on_scroll(((burst * 8 + step) * 40) as f64);
                tokio::time::sleep(Duration::from_millis(20)).await;
                assert!(rx.try_recv().is_err());
            }
            tokio::time::sleep(SETTLE_DELAY).await;
            while let Ok(ticket) = rx.try_recv() {
                if feed.on_settled(ticket).is_some_and(|s| s.changed) {
                    changes += 1;
                }
            }
        }
        assert!(changes <= 3);
        assert_eq!(feed.playing_count(), 1);
    }

    #[tokio::test]
    async fn exactly_one_player_for_any_transition_sequence() {
        let (mut feed, _rx) = feed(6, AutoplayPolicy::Allowed);
        // Deterministic pseudo-random walk over the available transitions.
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            match seed % 6 {
                0 => {
                    feed.next();
                }
                1 => {
                    feed.prev();
                }
                2 => {
                    feed.toggle_play();
                }
                3 => {
                    feed.jump_to((seed >> 8) as usize % 9);
                }
                4 => feed.scroll_by(((seed >> 16) % 1200) as f64 - 600.0),
                _ => {
                    feed.toggle_mute();
                }
            }
            assert!(feed.playing_count() <= 1);
            assert!(feed.active_index() < feed.len());
        }
    }

    #[tokio::test]
    async fn blocked_autoplay_is_silent() {
        let (mut feed, _rx) = feed(3, AutoplayPolicy::Blocked);
        assert_eq!(feed.player(0).unwrap().state(), PlaybackState::Paused);
        feed.next();
        assert_eq!(states(&feed), [PlaybackState::Inactive, PlaybackState::Paused, PlaybackState::Inactive]);
        assert_eq!(feed.toggle_play(), Some(PlaybackState::Playing));
    }

    #[tokio::test]
    async fn navigation_clamps_at_both_ends() {
        let (mut feed, _rx) = feed(2, AutoplayPolicy::Allowed);
        assert!(!feed.prev().unwrap().changed);
        assert_eq!(feed.next().unwrap().index, 1);
        assert!(!feed.next().unwrap().changed);
        assert_eq!(feed.active_index(), 1);
    }

    #[tokio::test]
    async fn append_keeps_active_index_and_prefetch_flag_follows() {
        let (mut feed, _rx) = feed(3, AutoplayPolicy::Allowed);
        feed.jump_to(1);
        assert!(feed.should_prefetch());
        feed.append(mock::generate_videos(20, 3));
        assert_eq!(feed.len(), 23);
        assert_eq!(feed.active_index(), 1);
        assert!(!feed.should_prefetch());
        assert_eq!(feed.playing_count(), 1);
    }

    #[tokio::test]
    async fn empty_feed_activates_on_first_page() {
        let (mut feed, _rx) = feed(0, AutoplayPolicy::Allowed);
        assert!(feed.active_video().is_none());
        assert!(feed.next().is_none());
        feed.append(mock::generate_videos(3, 0));
        assert!(feed.player(0).unwrap().is_playing());
    }

    #[tokio::test]
    async fn mute_only_touches_active_player() {
        let (mut feed, _rx) = feed(2, AutoplayPolicy::Allowed);
        assert_eq!(feed.toggle_mute(), Some(false));
        assert!(feed.player(1).unwrap().is_muted());
    }
}
