use crate::corpus::load_raw_articles;
use crate::error::RankError;
use crate::model::Model;
use crate::persist::ModelStore;
use crate::ranker::{HybridRanker, Method, RankedResult, DEFAULT_TOP_K};
use crate::tokenizer::{Language, Normalizer, TextNormalizer};
use anyhow::{Context, Result};
use parking_lot::{Mutex, RwLock};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Raw article source (JSON/JSONL file or directory).
    pub source: PathBuf,
    pub snapshot: PathBuf,
    pub language: Language,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("articles.json"),
            snapshot: PathBuf::from("model/snapshot.bin"),
            language: Language::default(),
        }
    }
}

/// Owns the active model. Constructing an `Engine` is the readiness barrier:
/// once `open` returns, every query sees a complete model.
pub struct Engine {
    config: EngineConfig,
    store: ModelStore,
    normalizer: Arc<dyn TextNormalizer>,
    active: RwLock<Arc<Model>>,
    rebuild_guard: Mutex<()>,
}

impl Engine {
    pub fn open(config: EngineConfig) -> Result<Self> {
        let normalizer = Arc::new(Normalizer::new(config.language));
        Self::with_normalizer(config, normalizer)
    }

    /// Loads the snapshot, or builds from the raw source and saves one.
    /// A snapshot tagged with a language other than `config.language` is
    /// treated as absent.
    pub fn with_normalizer(config: EngineConfig, normalizer: Arc<dyn TextNormalizer>) -> Result<Self> {
        let store = ModelStore::new(&config.snapshot).with_language(config.language);
        let model = match store.load() {
            Some(model) => model,
            None => {
                let model = build_from_source(&config, normalizer.as_ref())?;
                store.save(&model)?;
                model
            }
        };
        Ok(Self { config, store, normalizer, active: RwLock::new(Arc::new(model)), rebuild_guard: Mutex::new(()) })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// The current model. Holders keep it alive across a rebuild.
    pub fn model(&self) -> Arc<Model> {
        self.active.read().clone()
    }

    pub fn rank(&self, query: &str, alpha: f32, method: Method) -> Result<Vec<RankedResult>, RankError> {
        self.rank_top(query, alpha, method, DEFAULT_TOP_K)
    }

    pub fn rank_top(&self, query: &str, alpha: f32, method: Method, k: usize) -> Result<Vec<RankedResult>, RankError> {
        let model = self.model();
        HybridRanker::new(&model, self.normalizer.as_ref()).rank_top(query, alpha, method, k)
    }

    /// Discards the snapshot and builds a fresh model from the raw source.
    /// The active model is replaced only after the new one is built and
    /// saved; on error the previous model stays active.
    pub fn rebuild(&self) -> Result<Arc<Model>> {
        let _guard = self.rebuild_guard.lock();
        tracing::info!(source = %self.config.source.display(), "rebuilding model");
        self.store.discard()?;
        let model = Arc::new(build_from_source(&self.config, self.normalizer.as_ref())?);
        self.store.save(&model)?;
        *self.active.write() = model.clone();
        tracing::info!(num_docs = model.num_docs(), "model swapped");
        Ok(model)
    }
}

fn build_from_source(config: &EngineConfig, normalizer: &dyn TextNormalizer) -> Result<Model> {
    let raw = load_raw_articles(&config.source)
        .with_context(|| format!("reading article source {}", config.source.display()))?;
    Ok(Model::build(raw, normalizer))
}
