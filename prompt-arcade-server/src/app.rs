//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use prompt_arcade::core::pipeline::{GameForge, PipelineError};

use crate::config::ServerConfig;
use crate::llm::{LlmPort, OllamaClient, ResilientLlm, RetryConfig};
use crate::store::GameStore;

/// Everything a request handler needs. Shared as `Arc<App>`.
pub struct App {
    pub forge: GameForge,
    pub store: GameStore,
    pub llm: Option<Arc<dyn LlmPort>>,
}

impl App {
    pub fn new(forge: GameForge, store: GameStore, llm: Option<Arc<dyn LlmPort>>) -> Self {
        Self { forge, store, llm }
    }

    /// Build the catalog, store and (optional) LLM client from configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self, PipelineError> {
        let mut builder = GameForge::builder();
        if let Some(dir) = &config.catalog_dir {
            tracing::info!(dir = %dir.display(), "Loading catalog overlay");
            builder = builder.catalog_dir(dir);
        }
        let forge = builder.build()?;

        let llm = config.llm.as_ref().map(|llm| {
            tracing::info!(
                base_url = %llm.base_url,
                model = %llm.model,
                max_retries = llm.max_retries,
                "LLM embellishment enabled"
            );
            let client = Arc::new(OllamaClient::new(
                &llm.base_url,
                &llm.model,
                Duration::from_secs(llm.timeout_secs),
            ));
            let retry = RetryConfig {
                max_retries: llm.max_retries,
                ..RetryConfig::default()
            };
            Arc::new(ResilientLlm::new(client, retry)) as Arc<dyn LlmPort>
        });

        Ok(Self::new(forge, GameStore::new(config.store_capacity), llm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_default_config() {
        let app = App::from_config(&ServerConfig::default()).unwrap();
        assert!(app.llm.is_none());
        assert_eq!(app.store.capacity(), crate::config::DEFAULT_STORE_CAPACITY);
        assert!(!app.forge.catalog().categories().is_empty());
    }

    #[test]
    fn absent_catalog_dir_serves_builtin() {
        let config = ServerConfig {
            catalog_dir: Some("/nonexistent/catalog".into()),
            ..ServerConfig::default()
        };
        let app = App::from_config(&config).unwrap();
        assert_eq!(
            app.forge.catalog().categories().len(),
            prompt_arcade::core::catalog::Catalog::builtin()
                .unwrap()
                .categories()
                .len()
        );
    }
}
