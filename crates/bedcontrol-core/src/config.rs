// ── Runtime platform configuration ──
//
// Built by the config crate (or tests) and handed to `Platform`. Core
// never reads files or the environment.

use std::time::Duration;

/// Default write debounce, in seconds.
pub const DEFAULT_SEND_DELAY_SECS: u64 = 2;

/// Settings that shape discovery, polling and write debouncing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Seconds between poll ticks. 0 disables polling.
    pub update_interval_secs: u64,
    /// Seconds a write waits for further changes before it is sent.
    pub send_delay_secs: u64,
    /// Vendor platform label, informational only.
    pub bed_platform: Option<String>,
    /// Exclusion entries (`bedId`, `bedId.leftSide`, `bedId.rightSide.outlet`, ...).
    pub ignore: Vec<String>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: 0,
            send_delay_secs: DEFAULT_SEND_DELAY_SECS,
            bed_platform: None,
            ignore: Vec::new(),
        }
    }
}

impl PlatformConfig {
    /// Poll period, or `None` when polling is disabled.
    pub fn poll_interval(&self) -> Option<Duration> {
        (self.update_interval_secs > 0).then(|| Duration::from_secs(self.update_interval_secs))
    }

    pub fn send_delay(&self) -> Duration {
        Duration::from_secs(self.send_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_disables_polling() {
        let config = PlatformConfig::default();
        assert_eq!(config.poll_interval(), None);
        assert_eq!(config.send_delay(), Duration::from_secs(2));

        let config = PlatformConfig {
            update_interval_secs: 30,
            ..PlatformConfig::default()
        };
        assert_eq!(config.poll_interval(), Some(Duration::from_secs(30)));
    }
}
