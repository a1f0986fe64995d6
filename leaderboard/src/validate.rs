use std::collections::HashMap;

use crate::{RateLimitConfig, ValidationError};

pub const MAX_NAME_CHARS: usize = 20;
pub const MIN_TIME_SECS: f64 = 0.5;
pub const MAX_TIME_SECS: f64 = 9999.0;

/// Checks the name and time of a submission, ignoring rate limits.
pub fn validate_fields(name: &str, time: f64) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(ValidationError::NameTooLong);
    }
    // NaN fails the range check too
    if !(MIN_TIME_SECS..=MAX_TIME_SECS).contains(&time) {
        return Err(ValidationError::InvalidTime);
    }
    Ok(())
}

/// Per-name history of accepted submissions over a trailing window.
///
/// Lives in memory only, so it throttles honest double-submits rather than abuse.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    max_submissions: usize,
    window_ms: u64,
    history: HashMap<String, Vec<u64>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            max_submissions: config.max_submissions,
            window_ms: config.window_secs.saturating_mul(1000),
            history: HashMap::new(),
        }
    }

    /// Fails when `name` already used up its submissions inside the window ending at `now_ms`.
    pub fn check(&mut self, name: &str, now_ms: u64) -> Result<(), ValidationError> {
        let name = name.trim();
        let window_start = self.window_start(now_ms);
        let Some(stamps) = self.history.get_mut(name) else {
            return Ok(());
        };

        stamps.retain(|&stamp| stamp > window_start);
        let recent = stamps.len();
        if recent == 0 {
            self.history.remove(name);
        }
        if recent >= self.max_submissions {
            return Err(ValidationError::TooManySubmissions);
        }
        Ok(())
    }

    /// Counts an accepted submission and forgets every name whose window has expired.
    pub fn record(&mut self, name: &str, now_ms: u64) {
        let window_start = self.window_start(now_ms);
        self.history.retain(|_, stamps| {
            stamps.retain(|&stamp| stamp > window_start);
            !stamps.is_empty()
        });
        self.history
            .entry(name.trim().to_string())
            .or_default()
            .push(now_ms);
    }

    /// Number of names with submissions still inside the window.
    pub fn tracked_names(&self) -> usize {
        self.history.len()
    }

    fn window_start(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.window_ms)
    }

    /// Full validation of a submission at `now_ms`.
    pub fn validate(&mut self, name: &str, time: f64, now_ms: u64) -> Result<(), ValidationError> {
        validate_fields(name, time)?;
        self.check(name, now_ms)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(&RateLimitConfig::default())
    }
}
