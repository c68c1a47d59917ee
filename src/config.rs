//! Service configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_REPLY_DELAY_MS: u64 = 1000;
pub const DEFAULT_COMPLETE_DELAY_MS: u64 = 3000;
pub const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 1800;

/// Fixed delays of the simulated assistant reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTiming {
    /// Submit → assistant message appended.
    pub reply_delay: Duration,
    /// Assistant message appended → status flipped to `completed`.
    pub complete_delay: Duration,
}

impl Default for ReplyTiming {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(DEFAULT_REPLY_DELAY_MS),
            complete_delay: Duration::from_millis(DEFAULT_COMPLETE_DELAY_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub timing: ReplyTiming,
    /// Client-less sessions untouched this long are evicted. Zero disables.
    pub session_idle_ttl: Duration,
    /// JSON fixture replacing the built-in demo catalog.
    pub catalog_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            timing: ReplyTiming::default(),
            session_idle_ttl: Duration::from_secs(DEFAULT_SESSION_IDLE_TTL_SECS),
            catalog_path: None,
        }
    }
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `BIND_ADDR`: default `0.0.0.0`
    /// - `REPLY_DELAY_MS`: default 1000
    /// - `COMPLETE_DELAY_MS`: default 3000
    /// - `SESSION_IDLE_TTL_SECS`: default 1800, `0` keeps sessions forever
    /// - `CATALOG_PATH`: built-in demo catalog when absent
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Unparseable numbers fall
    /// back to their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = lookup("BIND_ADDR")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let timing = ReplyTiming {
            reply_delay: Duration::from_millis(parse_or(&lookup, "REPLY_DELAY_MS", DEFAULT_REPLY_DELAY_MS)),
            complete_delay: Duration::from_millis(parse_or(&lookup, "COMPLETE_DELAY_MS", DEFAULT_COMPLETE_DELAY_MS)),
        };
        let catalog_path = lookup("CATALOG_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let session_idle_ttl =
            Duration::from_secs(parse_or(&lookup, "SESSION_IDLE_TTL_SECS", DEFAULT_SESSION_IDLE_TTL_SECS));

        Self { bind_addr, port: parse_or(&lookup, "PORT", DEFAULT_PORT), timing, session_idle_ttl, catalog_path }
    }

    /// `host:port` string for the listener.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
