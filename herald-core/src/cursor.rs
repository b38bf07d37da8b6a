//! Per-stream cursors over monotonically increasing row ids.

use crate::events::StreamKind;

/// Tracks the newest row id a stream has processed.
///
/// Cursors live in memory only. A restart re-baselines from the latest
/// row, trading missed-while-down events for guaranteed no replay.
#[derive(Debug, Clone)]
pub struct StreamCursor {
    stream: StreamKind,
    last_seen: Option<i64>,
}

impl StreamCursor {
    pub fn new(stream: StreamKind) -> Self {
        StreamCursor {
            stream,
            last_seen: None,
        }
    }

    pub fn stream(&self) -> StreamKind {
        self.stream
    }

    pub fn last_seen(&self) -> Option<i64> {
        self.last_seen
    }

    /// Move the cursor forward. Returns false and leaves the cursor
    /// untouched if `id` does not advance it.
    pub fn advance(&mut self, id: i64) -> bool {
        match self.last_seen {
            Some(seen) if id <= seen => false,
            _ => {
                self.last_seen = Some(id);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_is_monotonic() {
        let mut cursor = StreamCursor::new(StreamKind::StreakWinners);
        assert_eq!(cursor.last_seen(), None);
        assert!(cursor.advance(3));
        assert!(cursor.advance(7));
        assert_eq!(cursor.last_seen(), Some(7));
    }

    #[test]
    fn regressions_are_ignored() {
        let mut cursor = StreamCursor::new(StreamKind::PrizePools);
        assert!(cursor.advance(10));
        assert!(!cursor.advance(10));
        assert!(!cursor.advance(4));
        assert_eq!(cursor.last_seen(), Some(10));
    }
}
