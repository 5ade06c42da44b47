use std::env;
use std::time::Duration;

use crate::log::DEFAULT_CAPACITY;

/// Scheduler and log settings for one session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Spacing between periodic cycles. The first cycle fires one full
    /// interval after the stream starts.
    pub tick_interval: Duration,
    /// Observation log bound.
    pub log_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(5),
            log_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl SessionConfig {
    /// Reads `SNARE_TICK_SECS` and `SNARE_LOG_CAPACITY`, falling back
    /// to the defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let tick_interval = env::var("SNARE_TICK_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.tick_interval);
        let log_capacity = env::var("SNARE_LOG_CAPACITY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.log_capacity);
        Self {
            tick_interval,
            log_capacity,
        }
    }
}
