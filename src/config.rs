// Runtime configuration: where the service lives and where credentials are
// kept. Values come from command-line flags or their environment variables,
// falling back to the defaults below.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://server.open-verse.ai/cli";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
pub const CONFIG_DIR_NAME: &str = ".openverse";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub config_dir: PathBuf,
    /// Limit on establishing a connection. Transfers themselves are not
    /// time-limited.
    pub connect_timeout: Duration,
}

impl Config {
    /// Resolve unset values to defaults. The config directory defaults to
    /// `~/.openverse`, or `./.openverse` when no home directory is known.
    pub fn resolve(api_url: Option<String>, config_dir: Option<PathBuf>, connect_timeout_secs: Option<u64>) -> Self {
        let api_url = api_url
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let config_dir = config_dir.unwrap_or_else(default_config_dir);
        let connect_timeout = Duration::from_secs(connect_timeout_secs.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS));
        Config {
            api_url,
            config_dir,
            connect_timeout,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::resolve(None, None, None)
    }
}

fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}
