//! Client configuration.
//!
//! `ClientConfig` can be deserialized from any serde source (a TOML or JSON
//! settings file in the host application) or read from `CANVAS_*`
//! environment variables. Every field has a default except `base_url`.

use std::env;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_API_VERSION: u32 = 1;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_READ_TIMEOUT_MS: u64 = 120_000;
const DEFAULT_PAGE_SIZE: u32 = 100;

/// Per-call connect and read timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Timeouts {
    pub fn new(connect: Duration, read: Duration) -> Self {
        Self { connect, read }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            read: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
        }
    }
}

/// Settings for talking to one Canvas instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Root of the Canvas instance, e.g. `https://canvas.example.edu`.
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: u32,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Sent as `per_page` on list requests.
    #[serde(default = "default_page_size")]
    pub pagination_page_size: u32,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_version: DEFAULT_API_VERSION,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            pagination_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Read `CANVAS_BASE_URL` plus optional overrides. Returns `None` when
    /// the base URL is unset; malformed numbers fall back to the defaults.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let mut config = Self::new(lookup("CANVAS_BASE_URL")?);
        if let Some(v) = parsed(&lookup, "CANVAS_API_VERSION") {
            config.api_version = v;
        }
        if let Some(v) = parsed(&lookup, "CANVAS_CONNECT_TIMEOUT_MS") {
            config.connect_timeout_ms = v;
        }
        if let Some(v) = parsed(&lookup, "CANVAS_READ_TIMEOUT_MS") {
            config.read_timeout_ms = v;
        }
        if let Some(v) = parsed(&lookup, "CANVAS_PAGE_SIZE") {
            config.pagination_page_size = v;
        }
        Some(config)
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts::new(
            Duration::from_millis(self.connect_timeout_ms),
            Duration::from_millis(self.read_timeout_ms),
        )
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable configuration value");
            None
        }
    }
}

fn default_api_version() -> u32 {
    DEFAULT_API_VERSION
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}
