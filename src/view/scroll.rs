//! Remember and restore the grid's scroll position per collection.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::debounce::Debounced;

pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_millis(1000);
pub const DEFAULT_RESTORE_SUPPRESS: Duration = Duration::from_millis(750);

#[derive(Debug)]
pub struct ScrollPersistence {
    /// Last offset seen, saved or not
    offset: usize,
    save: Debounced<usize>,
    pending_restore: Option<usize>,
    suppress_for: Duration,
    suppressed_until: Option<Instant>,
}

impl ScrollPersistence {
    pub fn new(save_delay: Duration, suppress_for: Duration) -> Self {
        Self {
            offset: 0,
            save: Debounced::new(save_delay),
            pending_restore: None,
            suppress_for,
            suppressed_until: None,
        }
    }

    /// Start tracking a collection, replaying `stored` once its first page
    /// has arrived.
    pub fn mount(&mut self, stored: Option<usize>) {
        self.save.cancel();
        self.offset = 0;
        self.suppressed_until = None;
        self.pending_restore = stored.filter(|&offset| offset > 0);
    }

    /// Stop tracking; a save that has not fired yet is dropped.
    pub fn unmount(&mut self) {
        self.save.cancel();
        self.pending_restore = None;
        self.suppressed_until = None;
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Note a scroll position. Schedules a save unless a restore just happened.
    pub fn record(&mut self, offset: usize, now: Instant) {
        if offset == self.offset {
            return;
        }
        self.offset = offset;
        if self.suppressed_until.is_some_and(|until| now < until) {
            return;
        }
        self.save.schedule(offset, now);
    }

    /// Offset to scroll to after the first successful fetch. Yields at most
    /// once per mount.
    pub fn take_restore(&mut self, now: Instant) -> Option<usize> {
        let offset = self.pending_restore.take()?;
        debug!("Restoring scroll offset {}", offset);
        self.offset = offset;
        self.save.cancel();
        self.suppressed_until = Some(now + self.suppress_for);
        Some(offset)
    }

    /// Offset due for saving, if any.
    pub fn poll_save(&mut self, now: Instant) -> Option<usize> {
        self.save.poll(now)
    }
}

impl Default for ScrollPersistence {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_DEBOUNCE, DEFAULT_RESTORE_SUPPRESS)
    }
}
