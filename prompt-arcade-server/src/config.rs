//! Server configuration from environment variables.

use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STORE_CAPACITY: usize = 256;
pub const DEFAULT_LLM_MODEL: &str = "llama3.2";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LLM_MAX_RETRIES: u32 = 2;

/// Default `RUST_LOG` filter when none is set.
pub const DEFAULT_LOG_FILTER: &str = "prompt_arcade=info,prompt_arcade_server=debug,tower_http=debug";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Catalog directory merged over the built-in data. `None` serves the
    /// built-in catalog alone.
    pub catalog_dir: Option<PathBuf>,
    pub store_capacity: usize,
    /// `None` disables intro embellishment.
    pub llm: Option<LlmConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Unparseable numbers fall back to
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = non_empty("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.into());
        let port = non_empty("SERVER_PORT")
            .or_else(|| non_empty("PORT"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let catalog_dir = non_empty("CATALOG_DIR").map(PathBuf::from);
        let store_capacity = non_empty("GAME_STORE_CAPACITY")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_STORE_CAPACITY);

        let llm = non_empty("LLM_BASE_URL").map(|base_url| LlmConfig {
            base_url,
            model: non_empty("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.into()),
            timeout_secs: non_empty("LLM_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_LLM_TIMEOUT_SECS),
            max_retries: non_empty("LLM_MAX_RETRIES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_LLM_MAX_RETRIES),
        });

        Self {
            host,
            port,
            catalog_dir,
            store_capacity,
            llm,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
