use chrono::Utc;

/// Source of wall-clock time in milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Time-based gate for periodic side effects.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    interval_ms: i64,
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(200)
    }
}

impl Throttle {
    pub fn new(interval_ms: i64) -> Self {
        Self {
            interval_ms: interval_ms.max(0),
        }
    }

    pub fn interval_ms(&self) -> i64 {
        self.interval_ms
    }

    /// `None` means nothing has fired yet, which is always eligible.
    pub fn can_fire(&self, now_ms: i64, last_fired_ms: Option<i64>) -> bool {
        match last_fired_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        }
    }
}
