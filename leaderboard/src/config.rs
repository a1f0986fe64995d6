use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Environment variable that overrides the configured endpoint.
pub const ENDPOINT_ENV: &str = "MOSWEEPER_ENDPOINT";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Accepted submissions allowed per name inside the window.
    pub max_submissions: usize,
    pub window_secs: u64,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_submissions: 3,
            window_secs: 5 * 60,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// Score endpoint, an empty value disables the leaderboard.
    pub endpoint: String,
    pub page_size: usize,
    pub top_n: usize,
    pub refresh_interval_secs: u64,
    pub date_check_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub rate_limit: RateLimitConfig,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            page_size: 20,
            top_n: 10,
            refresh_interval_secs: 30,
            date_check_interval_secs: 60,
            request_timeout_secs: 10,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl LeaderboardConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Applies [`ENDPOINT_ENV`] when it is set and not blank.
    pub fn with_env_override(self) -> Self {
        self.with_endpoint_override(std::env::var(ENDPOINT_ENV).ok())
    }

    fn with_endpoint_override(mut self, endpoint: Option<String>) -> Self {
        if let Some(endpoint) = endpoint.filter(|value| !value.trim().is_empty()) {
            log::debug!("Endpoint taken from {}", ENDPOINT_ENV);
            self.endpoint = endpoint.trim().to_string();
        }
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty()
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn date_check_interval(&self) -> Duration {
        Duration::from_secs(self.date_check_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_game() {
        let config = LeaderboardConfig::default();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.top_n, 10);
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.date_check_interval(), Duration::from_secs(60));
        assert_eq!(config.rate_limit.max_submissions, 3);
        assert_eq!(config.rate_limit.window(), Duration::from_secs(300));
        assert!(!config.is_configured());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = LeaderboardConfig::from_toml_str(
            r#"
            endpoint = "https://scores.example.com/exec"
            top_n = 5

            [rate_limit]
            max_submissions = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.endpoint, "https://scores.example.com/exec");
        assert_eq!(config.top_n, 5);
        assert_eq!(config.page_size, 20);
        assert_eq!(config.rate_limit.max_submissions, 1);
        assert_eq!(config.rate_limit.window_secs, 300);
    }

    #[test]
    fn shipped_example_matches_defaults() {
        let config =
            LeaderboardConfig::from_toml_str(include_str!("../leaderboard.example.toml")).unwrap();
        assert!(config.is_configured());
        assert_eq!(
            LeaderboardConfig {
                endpoint: String::new(),
                ..config
            },
            LeaderboardConfig::default()
        );
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = LeaderboardConfig::from_toml_str("top_n = \"many\"").unwrap_err();
        assert!(matches!(err, crate::LeaderboardError::Config(_)));
    }

    #[test]
    fn endpoint_override_ignores_blank_values() {
        let config = LeaderboardConfig::default()
            .with_endpoint_override(Some(" https://a.example/exec ".to_string()));
        assert_eq!(config.endpoint, "https://a.example/exec");

        let config = config.with_endpoint_override(Some("   ".to_string()));
        assert_eq!(config.endpoint, "https://a.example/exec");

        let config = config.with_endpoint_override(None);
        assert!(config.is_configured());
    }
}
