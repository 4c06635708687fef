use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub forms: FormsConfig,
}

/// Linked-record cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// A fetch running longer than this settles as failed (default: 10000).
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    /// Capacity of the change broadcast channel (default: 64).
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,
}

/// HTTP record service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Records live under `{base_url}/{entity}/{id}`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Connection timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

/// Form-level defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormsConfig {
    /// Accept lists with no items instead of reporting them as empty.
    #[serde(default)]
    pub allow_empty_lists: bool,
}

fn default_fetch_timeout_ms() -> u64 {
    10_000
}

fn default_subscriber_buffer() -> usize {
    64
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080/api".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    5
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: default_fetch_timeout_ms(),
            subscriber_buffer: default_subscriber_buffer(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}
