//! Transient notices. Every recoverable failure ends up here.

use std::time::{Duration, Instant};

pub const TOAST_LIFETIME: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub msg: String,
    pub level: ToastLevel,
    shown_at: Instant,
}

/// Holds the toast currently on screen; a newer one replaces it.
#[derive(Debug)]
pub struct Toasts {
    current: Option<Toast>,
    lifetime: Duration,
}

impl Default for Toasts {
    fn default() -> Self {
        Self { current: None, lifetime: TOAST_LIFETIME }
    }
}

impl Toasts {
    pub fn show(&mut self, level: ToastLevel, msg: impl Into<String>) {
        self.show_at(level, msg, Instant::now());
    }

    pub fn show_at(&mut self, level: ToastLevel, msg: impl Into<String>, now: Instant) {
        self.current = Some(Toast { msg: msg.into(), level, shown_at: now });
    }

    pub fn info(&mut self, msg: impl Into<String>) {
        self.show(ToastLevel::Info, msg);
    }

    pub fn success(&mut self, msg: impl Into<String>) {
        self.show(ToastLevel::Success, msg);
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.show(ToastLevel::Error, msg);
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    /// Drops the toast once it has been visible for its lifetime.
    pub fn tick(&mut self, now: Instant) {
        if self.current.as_ref().is_some_and(|t| now.duration_since(t.shown_at) > self.lifetime) {
            self.current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_lifetime() {
        let start = Instant::now();
        let mut toasts = Toasts::default();
        toasts.show_at(ToastLevel::Error, "login failed", start);
        toasts.tick(start + Duration::from_millis(2900));
        assert_eq!(toasts.current().unwrap().level, ToastLevel::Error);
        toasts.tick(start + Duration::from_millis(3100));
        assert!(toasts.current().is_none());
    }

    #[test]
    fn newer_toast_replaces_and_restarts() {
        let start = Instant::now();
        let mut toasts = Toasts::default();
        toasts.show_at(ToastLevel::Info, "a", start);
        toasts.show_at(ToastLevel::Success, "b", start + Duration::from_secs(2));
        toasts.tick(start + Duration::from_millis(3500));
        assert_eq!(toasts.current().unwrap().msg, "b");
    }
}
