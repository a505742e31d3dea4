//! Server configuration.
//!
//! Settings come from environment variables, each with a default:
//!
//! | Variable | Default |
//! |---|---|
//! | `ARRIVALS_BASE_URL` | production arrivals API |
//! | `ARRIVALS_TIMEOUT_SECS` | unset (no timeout) |
//! | `ARRIVALS_BIND_ADDR` | `127.0.0.1:3000` |
//! | `ARRIVALS_CACHE_TTL_SECS` | `10` (`0` disables the cache) |
//! | `ARRIVALS_POLL_SECS` | `30` (`0` disables polling) |
//! | `ARRIVALS_POLL_PLATFORMS` | empty (comma-separated platform list) |
//! | `ARRIVALS_PLATFORM_FILE` | unset (use the built-in directory) |
//! | `ARRIVALS_MOCK_DIR` | unset (use the live API) |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::domain::PlatformId;
use crate::upstream::ArrivalsConfig;

/// Default listen address.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Default poll interval in seconds.
const DEFAULT_POLL_SECS: u64 = 30;

/// Error from reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value {value:?} for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Upstream client settings
    pub arrivals: ArrivalsConfig,
    /// Address the HTTP API listens on
    pub bind_addr: SocketAddr,
    /// Upstream response cache
    pub cache: CacheConfig,
    /// How often to refresh `poll_platforms`; `None` disables polling
    pub poll_interval: Option<Duration>,
    /// Platforms refreshed in the background
    pub poll_platforms: Vec<PlatformId>,
    /// Optional JSON file replacing the built-in station directory
    pub platform_file: Option<PathBuf>,
    /// Serve canned boards from this directory instead of the live API
    pub mock_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            arrivals: ArrivalsConfig::default(),
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 3000))),
            cache: CacheConfig::default(),
            poll_interval: Some(Duration::from_secs(DEFAULT_POLL_SECS)),
            poll_platforms: Vec::new(),
            platform_file: None,
            mock_dir: None,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value
    /// if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("ARRIVALS_BASE_URL") {
            config.arrivals = config.arrivals.with_base_url(url.trim());
        }

        if let Some(raw) = get("ARRIVALS_TIMEOUT_SECS") {
            let secs = parse_secs("ARRIVALS_TIMEOUT_SECS", &raw)?;
            config.arrivals = config.arrivals.with_timeout(secs);
        }

        if let Some(raw) = get("ARRIVALS_BIND_ADDR") {
            config.bind_addr = raw.trim().parse().map_err(|e| ConfigError {
                var: "ARRIVALS_BIND_ADDR",
                value: raw.clone(),
                reason: format!("{e}"),
            })?;
        }

        if let Some(raw) = get("ARRIVALS_CACHE_TTL_SECS") {
            let secs = parse_secs("ARRIVALS_CACHE_TTL_SECS", &raw)?;
            config.cache.ttl = Duration::from_secs(secs);
        }

        if let Some(raw) = get("ARRIVALS_POLL_SECS") {
            let secs = parse_secs("ARRIVALS_POLL_SECS", &raw)?;
            config.poll_interval = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(raw) = get("ARRIVALS_POLL_PLATFORMS") {
            config.poll_platforms = raw
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(PlatformId::new)
                .collect();
        }

        config.platform_file = get("ARRIVALS_PLATFORM_FILE").map(PathBuf::from);
        config.mock_dir = get("ARRIVALS_MOCK_DIR").map(PathBuf::from);

        Ok(config)
    }
}

fn parse_secs(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|e| ConfigError {
        var,
        value: raw.to_string(),
        reason: format!("expected whole seconds ({e})"),
    })
}
