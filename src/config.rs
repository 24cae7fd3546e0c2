//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::path::PathBuf;

/// Top-level pipeline configuration.
///
/// Loaded once at startup via [`PipelineConfig::from_env`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8000`).
    pub listen_addr: SocketAddr,

    /// Root directory of the blob store. Scope directories are created
    /// underneath it as `<data_root>/<user_id>/<uuid>/`.
    pub data_root: PathBuf,

    /// Capacity of the snapshot broadcast stream.
    pub snapshot_stream_capacity: usize,

    /// Capacity of each per-topic result stream.
    pub result_stream_capacity: usize,

    /// Request timeout in seconds for the HTTP layer.
    pub request_timeout_secs: u64,
}

impl PipelineConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
            .parse()?;

        let data_root =
            PathBuf::from(std::env::var("DATA_ROOT").unwrap_or_else(|_| "data".to_string()));

        let snapshot_stream_capacity = parse_env("SNAPSHOT_STREAM_CAPACITY", 1024);
        let result_stream_capacity = parse_env("RESULT_STREAM_CAPACITY", 1024);
        let request_timeout_secs = parse_env("REQUEST_TIMEOUT_SECS", 30);

        Ok(Self {
            listen_addr,
            data_root,
            snapshot_stream_capacity,
            result_stream_capacity,
            request_timeout_secs,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
