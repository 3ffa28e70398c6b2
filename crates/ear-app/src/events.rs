use std::time::{SystemTime, UNIX_EPOCH};

use ear_core::RecognitionEvent;

/// Bounded, newest-first log of recent recognitions.
pub struct EventLog {
    events: Vec<RecognitionEvent>,
    capacity: usize,
}

impl EventLog {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Vec::new(),
            capacity,
        }
    }

    pub fn push(&mut self, event: RecognitionEvent) {
        self.events.insert(0, event);
        self.events.truncate(self.capacity);
    }

    /// Newest first.
    #[must_use]
    pub fn recent(&self) -> &[RecognitionEvent] {
        &self.events
    }
}

/// "just now", "3m ago", "2h ago" — the age of an event relative to `now`.
#[must_use]
pub fn format_time_since(timestamp: u64, now: u64) -> String {
    let elapsed = now.saturating_sub(timestamp);
    if elapsed < 60 {
        "just now".to_string()
    } else if elapsed < 3600 {
        format!("{}m ago", elapsed / 60)
    } else {
        format!("{}h ago", elapsed / 3600)
    }
}

/// Current wall clock in unix seconds.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(timestamp: u64, name: &str) -> RecognitionEvent {
        RecognitionEvent {
            timestamp,
            sound_name: name.to_string(),
        }
    }

    #[test]
    fn log_is_newest_first_and_bounded() {
        let mut log = EventLog::new(2);
        log.push(event(1, "a"));
        log.push(event(2, "b"));
        log.push(event(3, "c"));
        let names: Vec<&str> = log.recent().iter().map(|e| e.sound_name.as_str()).collect();
        assert_eq!(names, ["c", "b"]);
    }

    #[test]
    fn time_since_buckets() {
        assert_eq!(format_time_since(1000, 1000), "just now");
        assert_eq!(format_time_since(1000, 1059), "just now");
        assert_eq!(format_time_since(1000, 1060), "1m ago");
        assert_eq!(format_time_since(1000, 1000 + 59 * 60), "59m ago");
        assert_eq!(format_time_since(1000, 1000 + 3600), "1h ago");
        // A clock that went backwards reads as current.
        assert_eq!(format_time_since(2000, 1000), "just now");
    }
}
