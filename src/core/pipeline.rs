/// The main generation pipeline: Prompt → HTML game orchestration.
///
/// Wires together classification, template selection and rendering. Each
/// call is a straight `classify → select → render`; the first error stops it.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

use crate::core::catalog::{Catalog, CatalogError, CatalogSource};
use crate::core::classifier::{self, ClassificationResult};
use crate::core::renderer::{self, RenderError, RenderedGame};
use crate::core::selector::{self, SelectError, TemplateChoice};

/// Longest prompt accepted, in characters.
pub const MAX_PROMPT_CHARS: usize = 2000;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid prompt: {0}")]
    InvalidPrompt(String),
    #[error("selection error: {0}")]
    Select(#[from] SelectError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Coarse error classes callers map to user-facing responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidPrompt,
    UnknownCategory,
    Render,
    Configuration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidPrompt => "invalid_prompt",
            Self::UnknownCategory => "unknown_category",
            Self::Render => "render_error",
            Self::Configuration => "configuration",
        }
    }
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPrompt(_) => ErrorKind::InvalidPrompt,
            Self::Select(SelectError::UnknownCategory(_)) => ErrorKind::UnknownCategory,
            Self::Select(SelectError::NoVariants { .. }) => ErrorKind::Configuration,
            Self::Render(_) => ErrorKind::Render,
            Self::Catalog(_) => ErrorKind::Configuration,
        }
    }
}

/// Classification and selection for one prompt, before rendering.
///
/// Callers may adjust `choice` (e.g. swap in a different intro) before
/// handing the plan to `GameForge::complete`.
#[derive(Debug, Clone)]
pub struct Plan {
    pub seed: u64,
    pub classification: ClassificationResult,
    pub choice: TemplateChoice,
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone)]
pub struct Generation {
    /// The seed that reproduces this generation.
    pub seed: u64,
    pub classification: ClassificationResult,
    pub choice: TemplateChoice,
    pub game: RenderedGame,
}

/// The top-level generator. Built via `GameForge::builder()`.
///
/// Holds the immutable catalog; every method takes `&self`, so one forge
/// can serve concurrent requests.
#[derive(Debug)]
pub struct GameForge {
    catalog: Catalog,
    seed: Option<u64>,
    generation_count: AtomicU64,
}

/// Builder for constructing a `GameForge`.
#[derive(Debug, Default)]
pub struct GameForgeBuilder {
    catalog_dir: Option<PathBuf>,
    seed: Option<u64>,
    /// Directly provided catalog (for testing without files).
    catalog: Option<Catalog>,
}

impl GameForge {
    pub fn builder() -> GameForgeBuilder {
        GameForgeBuilder::default()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Reject prompts that must not reach the classifier.
    pub fn validate_prompt(prompt: &str) -> Result<(), PipelineError> {
        if prompt.trim().is_empty() {
            return Err(PipelineError::InvalidPrompt("prompt is empty".to_string()));
        }
        if prompt.chars().count() > MAX_PROMPT_CHARS {
            return Err(PipelineError::InvalidPrompt(format!(
                "prompt is longer than {} characters",
                MAX_PROMPT_CHARS
            )));
        }
        Ok(())
    }

    pub fn classify(&self, prompt: &str) -> ClassificationResult {
        classifier::classify(&self.catalog, prompt)
    }

    pub fn select(
        &self,
        result: &ClassificationResult,
        rng: &mut StdRng,
    ) -> Result<TemplateChoice, PipelineError> {
        Ok(selector::select(&self.catalog, result, rng)?)
    }

    pub fn render(&self, choice: &TemplateChoice, prompt: &str) -> Result<RenderedGame, PipelineError> {
        Ok(renderer::render(&self.catalog, choice, prompt)?)
    }

    /// Validate, classify and select. `seed` overrides the forge's seeding.
    pub fn plan(&self, prompt: &str, seed: Option<u64>) -> Result<Plan, PipelineError> {
        Self::validate_prompt(prompt)?;
        let seed = self.resolve_seed(seed);
        let mut rng = StdRng::seed_from_u64(seed);

        let classification = self.classify(prompt);
        let choice = self.select(&classification, &mut rng)?;

        Ok(Plan {
            seed,
            classification,
            choice,
        })
    }

    /// Render a plan.
    pub fn complete(&self, plan: Plan, prompt: &str) -> Result<Generation, PipelineError> {
        let game = self.render(&plan.choice, prompt)?;
        tracing::info!(
            category = %game.category,
            confidence = plan.classification.confidence,
            seed = plan.seed,
            bytes = game.document.len(),
            "generated game"
        );
        Ok(Generation {
            seed: plan.seed,
            classification: plan.classification,
            choice: plan.choice,
            game,
        })
    }

    /// Run the whole pipeline for one prompt.
    pub fn generate(&self, prompt: &str, seed: Option<u64>) -> Result<Generation, PipelineError> {
        let plan = self.plan(prompt, seed)?;
        self.complete(plan, prompt)
    }

    /// Generate several variants of the same prompt.
    pub fn generate_variants(
        &self,
        prompt: &str,
        count: usize,
    ) -> Result<Vec<Generation>, PipelineError> {
        let base = self.resolve_seed(None);
        let mut results = Vec::with_capacity(count);
        for i in 0..count {
            // Use different seed offsets for each variant
            let seed = base.wrapping_add(i as u64 * 1000);
            results.push(self.generate(prompt, Some(seed))?);
        }
        Ok(results)
    }

    /// An explicit seed wins; a forge seed gives a reproducible sequence per
    /// call; otherwise draw fresh entropy.
    fn resolve_seed(&self, explicit: Option<u64>) -> u64 {
        if let Some(seed) = explicit {
            return seed;
        }
        match self.seed {
            Some(base) => base.wrapping_add(self.generation_count.fetch_add(1, Ordering::Relaxed)),
            None => rand::random(),
        }
    }
}

impl GameForgeBuilder {
    /// Overlay a catalog directory on the built-in catalog.
    pub fn catalog_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.catalog_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Provide a catalog directly (for testing without files).
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn build(self) -> Result<GameForge, PipelineError> {
        let catalog = match (self.catalog, self.catalog_dir) {
            (Some(catalog), _) => catalog,
            (None, Some(dir)) => {
                // Game-specific data overrides the built-in catalog
                let mut source = CatalogSource::builtin()?;
                source.merge(CatalogSource::load_from_dir(&dir)?);
                source.build()?
            }
            (None, None) => Catalog::builtin()?,
        };

        tracing::debug!(
            categories = catalog.categories().len(),
            fallback = %catalog.fallback(),
            "game forge ready"
        );

        Ok(GameForge {
            catalog,
            seed: self.seed,
            generation_count: AtomicU64::new(0),
        })
    }
}
