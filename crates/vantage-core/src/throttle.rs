use web_time::{Duration, Instant};

/// Coalesces bursts of scroll events into at most one sample per interval.
/// The last value of a burst is kept and handed out by `flush`, so the
/// resting offset is always processed.
#[derive(Debug)]
pub struct FrameThrottle {
    interval: Duration,
    last_emit: Option<Instant>,
    pending: Option<f64>,
}

impl FrameThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
            pending: None,
        }
    }

    /// Returns the value to process now, or `None` if it was parked.
    pub fn offer(&mut self, value: f64, now: Instant) -> Option<f64> {
        match self.last_emit {
            Some(last) if now.saturating_duration_since(last) < self.interval => {
                self.pending = Some(value);
                None
            }
            _ => {
                self.last_emit = Some(now);
                self.pending = None;
                Some(value)
            }
        }
    }

    /// When a parked value may be flushed.
    pub fn trailing_deadline(&self) -> Option<Instant> {
        self.pending?;
        Some(self.last_emit? + self.interval)
    }

    pub fn flush(&mut self, now: Instant) -> Option<f64> {
        let deadline = self.trailing_deadline()?;
        if now < deadline {
            return None;
        }
        self.last_emit = Some(now);
        self.pending.take()
    }
}
