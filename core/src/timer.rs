use core::time::Duration;
use web_time::{Instant, SystemTime, UNIX_EPOCH};

/// Wall-clock milliseconds since the Unix epoch, 0 if the clock is before it.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Monotonic game timer, frozen once stopped.
#[derive(Copy, Clone, Debug, Default)]
pub struct Stopwatch {
    started_at: Option<Instant>,
    stopped_after: Option<Duration>,
}

impl Stopwatch {
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
            self.stopped_after = None;
        }
    }

    pub fn stop(&mut self) {
        if self.stopped_after.is_none() {
            self.stopped_after = Some(self.elapsed());
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.stopped_after.is_none()
    }

    pub fn elapsed(&self) -> Duration {
        match (self.started_at, self.stopped_after) {
            (_, Some(frozen)) => frozen,
            (Some(started_at), None) => started_at.elapsed(),
            (None, None) => Duration::ZERO,
        }
    }
}
