//! In-memory session log.
//!
//! One field session has a single active logger, so the log is a plain
//! append-only list with no locking. Readers get snapshots, never a live
//! handle: a suggestion computation is never affected by events appended
//! after it was invoked.

use crate::model::SessionEvent;

/// Append-only record of (category played, response observed) pairs for
/// the current field session.
#[derive(Debug, Default)]
pub struct SessionLog {
    events: Vec<SessionEvent>,
}

impl SessionLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event. Appends are totally ordered by caller sequence.
    pub fn append(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    /// Number of logged events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The trailing `n` events in log order.
    #[must_use]
    pub fn recent(&self, n: usize) -> &[SessionEvent] {
        let start = self.events.len().saturating_sub(n);
        &self.events[start..]
    }

    /// An immutable copy of the whole log.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SessionEvent> {
        self.events.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut log = SessionLog::new();
        log.append(SessionEvent::new("kontaktrop", "answered"));
        log.append(SessionEvent::new("matrop", "approached"));
        log.append(SessionEvent::new("alarm", "fled"));

        let snapshot = log.snapshot();
        let ids: Vec<&str> = snapshot.iter().map(|e| e.category_id.as_str()).collect();
        assert_eq!(ids, vec!["kontaktrop", "matrop", "alarm"]);
    }

    #[test]
    fn test_recent_trailing_window() {
        let mut log = SessionLog::new();
        for id in ["a", "b", "c", "d"] {
            log.append(SessionEvent::new(id, "answered"));
        }

        let recent: Vec<&str> = log.recent(3).iter().map(|e| e.category_id.as_str()).collect();
        assert_eq!(recent, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_recent_larger_than_log() {
        let mut log = SessionLog::new();
        log.append(SessionEvent::new("a", "answered"));
        assert_eq!(log.recent(10).len(), 1);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_appends() {
        let mut log = SessionLog::new();
        log.append(SessionEvent::new("a", "answered"));
        let snapshot = log.snapshot();
        log.append(SessionEvent::new("b", "ignored"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_empty_log() {
        let log = SessionLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        assert!(log.recent(3).is_empty());
        assert!(log.snapshot().is_empty());
    }
}
