//! Core of the LOKIZ short-video client.
//!
//! The vertical feed (scroll sync and the single-playback rule) lives in [`feed`];
//! [`api`] talks to the backend; everything else is headless page and overlay
//! state that a front end renders.

pub mod api;
pub mod config;
pub mod feed;
pub mod mock;
pub mod model;
pub mod overlay;
pub mod pages;
pub mod search;
pub mod session;
pub mod toast;
pub mod validation;

pub use api::{ApiClient, ApiError};
pub use config::ClientConfig;
pub use feed::{Feed, FeedScroller, Player, ScrollSync};
pub use session::Session;
