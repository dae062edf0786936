//! Command configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default command timeout: package builds can be slow on cold caches.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 600;

/// Per-command options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Timeout in seconds (0 = no timeout)
    pub timeout_seconds: u64,
    /// Echo output lines while the command runs
    pub stream_logs: bool,
    /// Extra environment variables
    pub env: HashMap<String, String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            stream_logs: false,
            env: HashMap::new(),
        }
    }
}

impl RunConfig {
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn stream_logs(mut self, enabled: bool) -> Self {
        self.stream_logs = enabled;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_config_builder() {
        let config = RunConfig::default().timeout(30).env("CI", "true").stream_logs(true);
        assert_eq!(config.timeout_seconds, 30);
        assert!(config.stream_logs);
        assert_eq!(config.env.get("CI").map(String::as_str), Some("true"));
        assert_eq!(RunConfig::default().timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
    }
}
