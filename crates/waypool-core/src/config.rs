//! Application configuration.
//!
//! Values come from the environment with local-development defaults:
//! `WAYPOOL_API_URL` overrides the backend base URL and
//! `WAYPOOL_DATA_DIR` overrides where the browser-platform store keeps
//! its file.

use std::path::PathBuf;

use anyhow::Result;

/// Application name used for data directory paths
const APP_NAME: &str = "waypool";

/// Default backend base URL for local development
const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// HTTP request timeout in seconds.
/// 10s matches the mobile clients - slow enough for a weak cell link,
/// fast enough that a dead backend doesn't hang the UI.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub data_dir: PathBuf,
}

impl Config {
    /// Build configuration from the environment
    pub fn from_env() -> Result<Self> {
        let api_url =
            std::env::var("WAYPOOL_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let data_dir = match std::env::var_os("WAYPOOL_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        Ok(Self {
            api_url,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            data_dir,
        })
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
    Ok(data_dir.join(APP_NAME))
}
