use crate::config::{MAX_CURSOR_THROTTLE_MS, MIN_CURSOR_THROTTLE_MS};
use crate::models::Position;
use std::time::Duration;
use tokio::time::Instant;

/// Rate limiter for cursor broadcasts.
///
/// At most one cursor is released per interval. Updates arriving in between
/// overwrite a single pending slot, so only the latest position is ever sent.
#[derive(Debug, Clone)]
pub struct CursorThrottle {
    interval: Duration,
    last_sent: Option<Instant>,
    pending: Option<Position>,
}

impl CursorThrottle {
    /// The interval is clamped to the permitted 50-100 ms range.
    pub fn from_millis(millis: u64) -> Self {
        let clamped = millis.clamp(MIN_CURSOR_THROTTLE_MS, MAX_CURSOR_THROTTLE_MS);
        Self {
            interval: Duration::from_millis(clamped),
            last_sent: None,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn pending(&self) -> Option<Position> {
        self.pending
    }

    /// Offer a new cursor position.
    ///
    /// Returns the position to send right now, or `None` if it was parked for
    /// the next permitted tick.
    pub fn offer(&mut self, cursor: Position, now: Instant) -> Option<Position> {
        if self.is_open(now) {
            self.pending = None;
            self.last_sent = Some(now);
            Some(cursor)
        } else {
            self.pending = Some(cursor);
            None
        }
    }

    /// Release the parked position if the interval has elapsed
    pub fn flush(&mut self, now: Instant) -> Option<Position> {
        if self.pending.is_some() && self.is_open(now) {
            self.last_sent = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    /// When the parked position may be released, if one is parked
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending?;
        Some(match self.last_sent {
            Some(sent) => sent + self.interval,
            None => Instant::now(),
        })
    }

    fn is_open(&self, now: Instant) -> bool {
        match self.last_sent {
            Some(sent) => now.duration_since(sent) >= self.interval,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_is_clamped() {
        assert_eq!(CursorThrottle::from_millis(10).interval(), Duration::from_millis(50));
        assert_eq!(CursorThrottle::from_millis(500).interval(), Duration::from_millis(100));
        assert_eq!(CursorThrottle::from_millis(75).interval(), Duration::from_millis(75));
    }

    #[test]
    fn test_burst_is_coalesced_to_latest() {
        let mut throttle = CursorThrottle::from_millis(50);
        let start = Instant::now();

        assert_eq!(throttle.offer(Position::new(1.0, 1.0), start), Some(Position::new(1.0, 1.0)));
        assert_eq!(throttle.offer(Position::new(2.0, 2.0), start + Duration::from_millis(10)), None);
        assert_eq!(throttle.offer(Position::new(3.0, 3.0), start + Duration::from_millis(20)), None);
        assert_eq!(throttle.pending(), Some(Position::new(3.0, 3.0)));

        assert_eq!(throttle.flush(start + Duration::from_millis(30)), None);
        assert_eq!(
            throttle.flush(start + Duration::from_millis(50)),
            Some(Position::new(3.0, 3.0))
        );
        assert_eq!(throttle.flush(start + Duration::from_millis(200)), None);
    }

    #[test]
    fn test_deadline_follows_last_send() {
        let mut throttle = CursorThrottle::from_millis(60);
        let start = Instant::now();
        assert!(throttle.next_deadline().is_none());

        throttle.offer(Position::ORIGIN, start);
        throttle.offer(Position::new(1.0, 0.0), start + Duration::from_millis(5));
        assert_eq!(throttle.next_deadline(), Some(start + Duration::from_millis(60)));
    }
}
