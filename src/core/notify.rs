//! Notification centre and transient toasts.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{Duration as Span, NaiveDateTime};

/// Colour family shared by toasts and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Info,
    Success,
    Warning,
    Error,
}

// ───────────────────────────────────────── notifications ─────

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub variant: Variant,
    pub title: String,
    pub message: String,
    pub timestamp: NaiveDateTime,
    pub read: bool,
}

/// Newest-first list of notifications.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    items: Vec<Notification>,
    next_id: u64,
}

impl Notifications {
    /// The three notifications the dashboard starts with.
    pub fn seeded(now: NaiveDateTime) -> Self {
        let mut n = Self::default();
        n.push(Variant::Info, "Updates Available", "12 system updates are available", now - Span::hours(24), true);
        n.push(Variant::Warning, "High Memory Usage", "Memory usage exceeded 80% threshold", now - Span::hours(2), false);
        n.push(Variant::Success, "Backup Complete", "System backup completed successfully", now - Span::hours(1), false);
        n
    }

    fn push(&mut self, variant: Variant, title: &str, message: &str, timestamp: NaiveDateTime, read: bool) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.insert(
            0,
            Notification {
                id,
                variant,
                title: title.to_string(),
                message: message.to_string(),
                timestamp,
                read,
            },
        );
        id
    }

    pub fn mark_read(&mut self, id: u64) {
        if let Some(n) = self.items.iter_mut().find(|n| n.id == id) {
            n.read = true;
        }
    }

    pub fn mark_all_read(&mut self) {
        self.items.iter_mut().for_each(|n| n.read = true);
    }

    pub fn remove(&mut self, id: u64) -> Option<Notification> {
        let pos = self.items.iter().position(|n| n.id == id)?;
        Some(self.items.remove(pos))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn unread(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }
}

// ───────────────────────────────────────── toasts ────────────

pub const MAX_TOASTS: usize = 5;
pub const DEFAULT_TOAST_MS: u64 = 4000;

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub variant: Variant,
    pub message: String,
    pub expires: Instant,
}

/// Bounded queue of visible toasts, oldest first.
#[derive(Debug, Clone)]
pub struct Toasts {
    queue: VecDeque<Toast>,
    ttl: Duration,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_TOAST_MS))
    }
}

impl Toasts {
    pub fn new(ttl: Duration) -> Self {
        Self {
            queue: VecDeque::with_capacity(MAX_TOASTS),
            ttl,
        }
    }

    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }

    /// Show `message` unless an identical one is already visible.  Returns
    /// `false` when suppressed.
    pub fn push(&mut self, variant: Variant, message: impl Into<String>, now: Instant) -> bool {
        let message = message.into();
        if self.queue.iter().any(|t| t.message == message) {
            return false;
        }
        if self.queue.len() == MAX_TOASTS {
            self.queue.pop_front();
        }
        self.queue.push_back(Toast {
            variant,
            message,
            expires: now + self.ttl,
        });
        true
    }

    /// Drop expired toasts.  Returns `true` if anything was removed.
    pub fn prune(&mut self, now: Instant) -> bool {
        let before = self.queue.len();
        self.queue.retain(|t| t.expires > now);
        self.queue.len() != before
    }

    /// Dismiss the newest toast.
    pub fn dismiss(&mut self) -> Option<Toast> {
        self.queue.pop_back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.queue.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock::at;

    #[test]
    fn seeded_notifications() {
        let n = Notifications::seeded(at("2024-01-20 15:30:00"));
        assert_eq!(n.items().len(), 3);
        assert_eq!(n.unread(), 2);
        assert_eq!(n.items()[0].title, "Backup Complete");
    }

    #[test]
    fn notification_lifecycle() {
        let now = at("2024-01-20 15:30:00");
        let mut n = Notifications::seeded(now);
        let id = n.push(Variant::Error, "Disk", "Disk failing", now, false);
        assert_eq!(n.items()[0].id, id);
        assert_eq!(n.unread(), 3);

        n.mark_read(id);
        n.mark_read(id);
        assert_eq!(n.unread(), 2);

        let read_one = n.items().iter().find(|x| x.read && x.id != id).map(|x| x.id).unwrap();
        n.remove(read_one);
        assert_eq!(n.unread(), 2);

        n.mark_all_read();
        assert_eq!(n.unread(), 0);
        n.clear();
        assert!(n.items().is_empty());
        assert_eq!(n.unread(), 0);
    }

    #[test]
    fn toasts_are_capped_and_deduplicated() {
        let t0 = Instant::now();
        let mut toasts = Toasts::default();
        for i in 0..7 {
            assert!(toasts.push(Variant::Info, format!("msg {i}"), t0));
        }
        assert_eq!(toasts.iter().count(), MAX_TOASTS);
        assert_eq!(toasts.iter().next().map(|t| t.message.as_str()), Some("msg 2"));
        assert!(!toasts.push(Variant::Success, "msg 6", t0));
        assert_eq!(toasts.iter().count(), MAX_TOASTS);
    }

    #[test]
    fn toasts_expire() {
        let t0 = Instant::now();
        let mut toasts = Toasts::new(Duration::from_millis(100));
        toasts.push(Variant::Warning, "first", t0);
        toasts.push(Variant::Warning, "second", t0 + Duration::from_millis(50));
        assert!(!toasts.prune(t0 + Duration::from_millis(99)));
        assert!(toasts.prune(t0 + Duration::from_millis(100)));
        assert_eq!(toasts.iter().count(), 1);
        assert!(toasts.prune(t0 + Duration::from_millis(200)));
        assert_eq!(toasts.iter().count(), 0);
    }
}
