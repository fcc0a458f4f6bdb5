//! Scroll-snap synchronization for the vertical feed.
//!
//! The container holds `item_count` sections, each exactly one viewport tall.
//! Every scroll event marks the container as scrolling and restarts the settle
//! timer; once the timer fires without interruption the nearest section becomes
//! the active one. The offset is snapped only when the active section changes.

use std::time::Duration;

use log::debug;
use tokio::sync::mpsc;

use super::timer::Debouncer;

pub const SETTLE_DELAY: Duration = Duration::from_millis(150);

/// Nearest section for `offset`, clamped into `[0, item_count)`.
///
/// `None` when there is nothing to snap to: no items, or a viewport height
/// that is not a positive finite number.
pub fn nearest_index(offset: f64, viewport_height: f64, item_count: usize) -> Option<usize> {
    if item_count == 0 || !viewport_height.is_finite() || viewport_height <= 0.0 || !offset.is_finite() {
        return None;
    }
    let last = (item_count - 1) as f64;
    Some((offset / viewport_height).round().clamp(0.0, last) as usize)
}

/// Identifies the scroll event a settle notification belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettleTicket(u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snap {
    pub index: usize,
    pub offset: f64,
    /// The active index moved.
    pub changed: bool,
}

/// Pure scroll state; time is driven from outside through tickets.
#[derive(Clone, Debug)]
pub struct ScrollSync {
    offset: f64,
    viewport_height: f64,
    item_count: usize,
    active: usize,
    scrolling: bool,
    generation: u64,
}

impl ScrollSync {
    pub fn new(item_count: usize, viewport_height: f64) -> Self {
        Self { offset: 0.0, viewport_height, item_count, active: 0, scrolling: false, generation: 0 }
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// The section allowed to play: the active one, but only while no scroll is pending.
    pub fn playing_index(&self) -> Option<usize> {
        if self.scrolling || self.item_count == 0 {
            None
        } else {
            Some(self.active)
        }
    }

    pub fn on_scroll(&mut self, offset: f64) -> SettleTicket {
        self.offset = offset;
        self.scrolling = true;
        self.generation += 1;
        SettleTicket(self.generation)
    }

    pub fn scroll_by(&mut self, delta: f64) -> SettleTicket {
        self.on_scroll(self.offset + delta)
    }

    /// Apply a fired settle timer. Tickets superseded by a later scroll are ignored.
    pub fn settle(&mut self, ticket: SettleTicket) -> Option<Snap> {
        if ticket.0 != self.generation || !self.scrolling {
            debug!("ignoring stale settle ticket {} (current {})", ticket.0, self.generation);
            return None;
        }
        self.scrolling = false;
        let index = nearest_index(self.offset, self.viewport_height, self.item_count)?;
        if index == self.active {
            return Some(Snap { index, offset: self.offset, changed: false });
        }
        Some(self.snap_to(index))
    }

    /// Programmatic navigation: activates `index` (clamped) without waiting for a settle.
    pub fn jump_to(&mut self, index: usize) -> Option<Snap> {
        if self.item_count == 0 {
            return None;
        }
        self.generation += 1;
        self.scrolling = false;
        Some(self.snap_to(index.min(self.item_count - 1)))
    }

    fn snap_to(&mut self, index: usize) -> Snap {
        let changed = index != self.active;
        self.active = index;
        self.offset = index as f64 * self.viewport_height;
        Snap { index, offset: self.offset, changed }
    }

    /// Items were appended or removed; the active index only moves if it fell off the end.
    pub fn set_item_count(&mut self, item_count: usize) {
        self.item_count = item_count;
        if item_count == 0 {
            self.active = 0;
            self.offset = 0.0;
        } else if self.active >= item_count {
            self.snap_to(item_count - 1);
        }
    }

    /// Viewport resize: keeps the active section and re-snaps to its new boundary.
    pub fn set_viewport_height(&mut self, viewport_height: f64) {
        if !viewport_height.is_finite() || viewport_height <= 0.0 {
            return;
        }
        self.viewport_height = viewport_height;
        self.generation += 1;
        self.scrolling = false;
        self.offset = self.active as f64 * viewport_height;
    }

    /// True once the active section is within the last `threshold` items.
    pub fn near_end(&self, threshold: usize) -> bool {
        self.item_count > 0 && self.active + threshold >= self.item_count
    }
}

/// [`ScrollSync`] plus the settle timer. Fired tickets arrive on the receiver
/// returned by [`FeedScroller::new`] and must be fed back through [`FeedScroller::settle`].
#[derive(Debug)]
pub struct FeedScroller {
    sync: ScrollSync,
    debouncer: Debouncer,
    tx: mpsc::UnboundedSender<SettleTicket>,
}

impl FeedScroller {
    pub fn new(sync: ScrollSync, settle_delay: Duration) -> (Self, mpsc::UnboundedReceiver<SettleTicket>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { sync, debouncer: Debouncer::new(settle_delay), tx }, rx)
    }

    pub fn state(&self) -> &ScrollSync {
        &self.sync
    }

    pub fn on_scroll(&mut self, offset: f64) {
        let ticket = self.sync.on_scroll(offset);
        self.arm(ticket);
    }

    pub fn scroll_by(&mut self, delta: f64) {
        let ticket = self.sync.scroll_by(delta);
        self.arm(ticket);
    }

    fn arm(&mut self, ticket: SettleTicket) {
        let tx = self.tx.clone();
        self.debouncer.schedule(move || {
            // The receiver is gone once the feed is torn down.
            let _ = tx.send(ticket);
        });
    }

    pub fn settle(&mut self, ticket: SettleTicket) -> Option<Snap> {
        self.sync.settle(ticket)
    }

    pub fn jump_to(&mut self, index: usize) -> Option<Snap> {
        self.debouncer.cancel();
        self.sync.jump_to(index)
    }

    pub fn set_item_count(&mut self, item_count: usize) {
        self.sync.set_item_count(item_count);
    }

    pub fn set_viewport_height(&mut self, viewport_height: f64) {
        self.debouncer.cancel();
        self.sync.set_viewport_height(viewport_height);
    }

    pub fn has_pending_settle(&self) -> bool {
        self.debouncer.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_index_rounds_within_band() {
        for offset in [1200.0, 1599.0, 1600.0, 1999.0] {
            assert_eq!(nearest_index(offset, 800.0, 5), Some(2), "offset {offset}");
        }
        assert_eq!(nearest_index(2000.0, 800.0, 5), Some(3));
    }

    #[test]
    fn nearest_index_clamps_and_rejects_degenerate_input() {
        assert_eq!(nearest_index(-500.0, 800.0, 3), Some(0));
        assert_eq!(nearest_index(99_999.0, 800.0, 3), Some(2));
        assert_eq!(nearest_index(0.0, 800.0, 0), None);
        assert_eq!(nearest_index(100.0, 0.0, 3), None);
        assert_eq!(nearest_index(f64::NAN, 800.0, 3), None);
    }

    #[test]
    fn settle_snaps_offset_and_activates() {
        let mut sync = ScrollSync::new(3, 800.0);
        let ticket = sync.on_scroll(1550.0);
        assert_eq!(sync.playing_index(), None);
        let snap = sync.settle(ticket).unwrap();
        assert_eq!(snap, Snap { index: 2, offset: 1600.0, changed: true });
        assert_eq!(sync.playing_index(), Some(2));
    }

    #[test]
    fn settle_on_same_index_keeps_offset() {
        let mut sync = ScrollSync::new(3, 800.0);
        let ticket = sync.on_scroll(300.0);
        let snap = sync.settle(ticket).unwrap();
        assert_eq!(snap, Snap { index: 0, offset: 300.0, changed: false });
        assert_eq!(sync.offset(), 300.0);
        assert_eq!(sync.playing_index(), Some(0));
    }

    #[test]
    fn stale_and_repeated_tickets_are_ignored() {
        let mut sync = ScrollSync::new(3, 800.0);
        let first = sync.on_scroll(800.0);
        let second = sync.on_scroll(1600.0);
        assert!(sync.settle(first).is_none());
        assert!(sync.is_scrolling());
        assert_eq!(sync.settle(second).unwrap().index, 2);
        assert!(sync.settle(second).is_none());
    }

    #[test]
    fn jump_invalidates_pending_scroll() {
        let mut sync = ScrollSync::new(4, 800.0);
        let ticket = sync.on_scroll(2400.0);
        assert_eq!(sync.jump_to(10).unwrap().index, 3);
        assert!(sync.settle(ticket).is_none());
        assert_eq!(sync.active_index(), 3);
    }

    #[test]
    fn shrinking_clamps_active_index() {
        let mut sync = ScrollSync::new(5, 100.0);
        sync.jump_to(4);
        sync.set_item_count(2);
        assert_eq!(sync.active_index(), 1);
        assert_eq!(sync.offset(), 100.0);
        sync.set_item_count(10);
        assert_eq!(sync.active_index(), 1);
    }

    #[test]
    fn resize_keeps_active_section() {
        let mut sync = ScrollSync::new(3, 800.0);
        sync.jump_to(1);
        sync.set_viewport_height(600.0);
        assert_eq!(sync.offset(), 600.0);
        sync.set_viewport_height(0.0);
        assert_eq!(sync.viewport_height(), 600.0);
    }

    #[test]
    fn near_end_threshold() {
        let mut sync = ScrollSync::new(5, 100.0);
        assert!(!sync.near_end(2));
        sync.jump_to(3);
        assert!(sync.near_end(2));
    }

    #[tokio::test(start_paused = true)]
    async fn scroller_delivers_only_the_last_ticket() {
        let (mut scroller, mut rx) = FeedScroller::new(ScrollSync::new(3, 800.0), SETTLE_DELAY);
        for offset in [200.0, 500.0, 900.0, 1300.0, 1600.0] {
            scroller.on_scroll(offset);
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(rx.try_recv().is_err());
        tokio::time::sleep(SETTLE_DELAY).await;
        let ticket = rx.try_recv().unwrap();
        assert!(rx.try_recv().is_err());
        assert_eq!(scroller.settle(ticket).unwrap().index, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_scroller_releases_the_timer() {
        let (mut scroller, mut rx) = FeedScroller::new(ScrollSync::new(3, 800.0), SETTLE_DELAY);
        scroller.on_scroll(800.0);
        assert!(scroller.has_pending_settle());
        drop(scroller);
        tokio::time::sleep(SETTLE_DELAY * 2).await;
        // Sender dropped with the scroller and the timer never fired.
        assert!(matches!(rx.try_recv(), Err(mpsc::error::TryRecvError::Disconnected)));
    }
}
