use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Inactive,
    Playing,
    Paused,
}

/// Who asked for playback. Hosts treat autoplay differently from user gestures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayTrigger {
    Autoplay,
    UserGesture,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("autoplay rejected by host policy")]
    AutoplayRejected,
    #[error("media unavailable: {0}")]
    Unavailable(String),
}

/// The host element that actually renders a video.
pub trait MediaSurface {
    fn play(&mut self, trigger: PlayTrigger) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn set_muted(&mut self, muted: bool);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutoplayPolicy {
    #[default]
    Allowed,
    /// Autoplay only succeeds while muted.
    MutedOnly,
    Blocked,
}

impl FromStr for AutoplayPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allowed" => Ok(Self::Allowed),
            "muted-only" => Ok(Self::MutedOnly),
            "blocked" => Ok(Self::Blocked),
            other => Err(format!("unknown autoplay policy `{other}` (expected allowed, muted-only or blocked)")),
        }
    }
}

/// In-process media host with a browser-like autoplay policy.
#[derive(Clone, Debug, Default)]
pub struct SimulatedMedia {
    policy: AutoplayPolicy,
    muted: bool,
    playing: bool,
    play_requests: usize,
}

impl SimulatedMedia {
    pub fn new(policy: AutoplayPolicy) -> Self {
        Self { policy, ..Default::default() }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn play_requests(&self) -> usize {
        self.play_requests
    }
}

impl MediaSurface for SimulatedMedia {
    fn play(&mut self, trigger: PlayTrigger) -> Result<(), PlaybackError> {
        self.play_requests += 1;
        let allowed = match (trigger, self.policy) {
            (PlayTrigger::UserGesture, _) | (PlayTrigger::Autoplay, AutoplayPolicy::Allowed) => true,
            (PlayTrigger::Autoplay, AutoplayPolicy::MutedOnly) => self.muted,
            (PlayTrigger::Autoplay, AutoplayPolicy::Blocked) => false,
        };
        if !allowed {
            return Err(PlaybackError::AutoplayRejected);
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

/// One feed item's playback controller. Purely reactive: the feed decides
/// which player is active, the player only follows.
#[derive(Debug)]
pub struct Player<M> {
    video_id: String,
    media: M,
    state: PlaybackState,
    muted: bool,
    progress: f64,
}

impl<M: MediaSurface> Player<M> {
    pub fn new(video_id: impl Into<String>, mut media: M) -> Self {
        media.set_muted(true);
        Self { video_id: video_id.into(), media, state: PlaybackState::Inactive, muted: true, progress: 0.0 }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != PlaybackState::Inactive
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Percentage in `[0, 100]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn set_active(&mut self, active: bool) {
        match (active, self.state) {
            (true, PlaybackState::Inactive) => {
                self.state = match self.media.play(PlayTrigger::Autoplay) {
                    Ok(()) => PlaybackState::Playing,
                    Err(err) => {
                        debug!("autoplay of video {} suppressed: {err}", self.video_id);
                        PlaybackState::Paused
                    }
                };
            }
            (false, PlaybackState::Playing | PlaybackState::Paused) => {
                self.media.pause();
                self.state = PlaybackState::Inactive;
            }
            _ => {}
        }
    }

    /// Tap on the video surface. Ignored while the player is not the active one.
    pub fn toggle_play(&mut self) -> PlaybackState {
        match self.state {
            PlaybackState::Inactive => debug!("toggle on inactive video {} ignored", self.video_id),
            PlaybackState::Playing => {
                self.media.pause();
                self.state = PlaybackState::Paused;
            }
            PlaybackState::Paused => match self.media.play(PlayTrigger::UserGesture) {
                Ok(()) => self.state = PlaybackState::Playing,
                Err(err) => debug!("resume of video {} failed: {err}", self.video_id),
            },
        }
        self.state
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.media.set_muted(self.muted);
        self.muted
    }

    pub fn update_progress(&mut self, current: f64, duration: f64) {
        self.progress = if duration.is_finite() && duration > 0.0 && current.is_finite() {
            (current / duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
    }
}
