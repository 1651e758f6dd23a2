//! Gateway configuration from the environment

use balloon_tracking::WINDOW_HOURS;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_FEED_BASE_URL: &str = "https://a.windbornesystems.com/treasure";
pub const DEFAULT_OPENSKY_BASE_URL: &str = "https://opensky-network.org/api";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub port: u16,
    /// Hourly payloads live at `{feed_base_url}/HH.json`
    pub feed_base_url: String,
    /// Number of hours fetched, 1..=24
    pub feed_hours: u8,
    pub opensky_base_url: String,
    /// Basic auth for OpenSky; anonymous when absent
    pub opensky_credentials: Option<(String, String)>,
    pub http_timeout_secs: u64,
    pub static_dir: PathBuf,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            feed_base_url: DEFAULT_FEED_BASE_URL.to_string(),
            feed_hours: WINDOW_HOURS,
            opensky_base_url: DEFAULT_OPENSKY_BASE_URL.to_string(),
            opensky_credentials: None,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            static_dir: PathBuf::from("static"),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparseable values fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = lookup("CONSTELLATION_GATEWAY_PORT")
            .or_else(|| lookup("PORT"))
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(defaults.port);

        let feed_hours = lookup("FEED_HOURS")
            .and_then(|h| h.trim().parse::<u8>().ok())
            .map(|h| h.clamp(1, WINDOW_HOURS))
            .unwrap_or(defaults.feed_hours);

        let opensky_credentials = match (lookup("OPENSKY_USERNAME"), lookup("OPENSKY_PASSWORD")) {
            (Some(user), Some(pass)) if !user.is_empty() => Some((user, pass)),
            _ => None,
        };

        let http_timeout_secs = lookup("HTTP_TIMEOUT_SECS")
            .and_then(|t| t.trim().parse().ok())
            .unwrap_or(defaults.http_timeout_secs);

        Self {
            port,
            feed_base_url: lookup("FEED_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.feed_base_url),
            feed_hours,
            opensky_base_url: lookup("OPENSKY_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.opensky_base_url),
            opensky_credentials,
            http_timeout_secs,
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::from_lookup(|_| None);
        assert_eq!(config, GatewayConfig::default());
        assert_eq!(config.port, 5001);
        assert_eq!(config.feed_hours, 24);
    }

    #[test]
    fn test_overrides() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("FEED_BASE_URL", "http://localhost:9000/feed/"),
            ("FEED_HOURS", "6"),
            ("OPENSKY_USERNAME", "alice"),
            ("OPENSKY_PASSWORD", "secret"),
        ]));

        assert_eq!(config.port, 8080);
        assert_eq!(config.feed_base_url, "http://localhost:9000/feed");
        assert_eq!(config.feed_hours, 6);
        assert_eq!(
            config.opensky_credentials,
            Some(("alice".to_string(), "secret".to_string()))
        );
    }

    #[test]
    fn test_service_port_wins_over_generic() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            ("CONSTELLATION_GATEWAY_PORT", "7000"),
            ("PORT", "8080"),
        ]));
        assert_eq!(config.port, 7000);
    }

    #[test]
    fn test_feed_hours_clamped() {
        let zero = GatewayConfig::from_lookup(lookup_from(&[("FEED_HOURS", "0")]));
        assert_eq!(zero.feed_hours, 1);

        let many = GatewayConfig::from_lookup(lookup_from(&[("FEED_HOURS", "99")]));
        assert_eq!(many.feed_hours, 24);

        let junk = GatewayConfig::from_lookup(lookup_from(&[("FEED_HOURS", "lots")]));
        assert_eq!(junk.feed_hours, 24);
    }
}
