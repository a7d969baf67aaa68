//! End-to-end orchestration of a diversity scoring request.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DiversityConfig;
use crate::embeddings::Embedder;
use crate::error::{ConfigError, DiversityError, EmbeddingError};
use crate::history::HistoryStore;
use crate::scoring::{binarize, SimilarityScorer};

/// Diversity reward for a single completion.
///
/// Created fresh per request, immutable once produced, owned by the caller.
/// The historic component is `None` (absent, not zero) when the history
/// store was insufficiently populated at scoring time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardRecord {
    /// Combined reward: the batch component, multiplied by the historic
    /// component when one was produced.
    pub reward: f64,

    /// Diversity of this completion within its own batch.
    pub batch: f64,

    /// Diversity of this completion against the history window, if the
    /// store held enough entries.
    pub historic: Option<f64>,
}

/// Computes diversity rewards for batches of completions.
///
/// Owns the embedding provider, the similarity scorer and the rolling
/// history of previously scored embeddings. Scoring mutates the history, so
/// [`score`](Self::score) takes `&mut self`: concurrent use of one engine
/// requires external locking around the whole call.
///
/// # Example
///
/// ```
/// use diversity_reward::{DiversityEngine, HashEmbedder};
///
/// let mut engine = DiversityEngine::with_defaults(HashEmbedder::default())
///     .expect("default config is valid");
/// let completions = vec!["a cat".to_string(), "a dog".to_string()];
/// let records = engine.score("name an animal", &completions).expect("scoring");
/// assert_eq!(records.len(), 2);
/// ```
#[derive(Debug)]
pub struct DiversityEngine<E: Embedder> {
    embedder: E,
    scorer: SimilarityScorer,
    history: HistoryStore,
    config: DiversityConfig,
}

impl<E: Embedder> DiversityEngine<E> {
    /// Creates an engine with the given embedder and configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is malformed; nothing
    /// is deferred to scoring time.
    pub fn new(embedder: E, config: DiversityConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            embedder,
            scorer: SimilarityScorer::new(&config),
            history: HistoryStore::new(config.history_capacity),
            config,
        })
    }

    /// Creates an engine with the default configuration.
    pub fn with_defaults(embedder: E) -> Result<Self, ConfigError> {
        Self::new(embedder, DiversityConfig::default())
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &DiversityConfig {
        &self.config
    }

    /// Returns the number of embeddings currently retained in history.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Scores a batch of completions for diversity.
    ///
    /// Embeds every completion, scores the batch against itself and against
    /// the history window, then appends the batch to history. The append
    /// happens after scoring, so a batch never sees itself in its own
    /// historic comparison.
    ///
    /// Returns one [`RewardRecord`] per completion, in input order. An empty
    /// `completions` slice short-circuits to an empty result with no
    /// embedding call and no history mutation.
    ///
    /// `prompt` does not participate in the scoring math; it identifies the
    /// request for logging and keeps the signature aligned with other reward
    /// signals in the pipeline.
    ///
    /// # Errors
    ///
    /// An embedding failure is fatal to the whole request: no partial
    /// results, no retries at this layer.
    pub fn score(
        &mut self,
        prompt: &str,
        completions: &[String],
    ) -> Result<Vec<RewardRecord>, DiversityError> {
        if completions.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self.embedder.embed(completions)?;
        if embeddings.nrows() != completions.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: completions.len(),
                actual: embeddings.nrows(),
            }
            .into());
        }

        let batch_rewards = self.scorer.batch_rewards(&embeddings);
        let historic_rewards = self.scorer.historic_rewards(&embeddings, &self.history);

        self.history.append(&embeddings);

        debug!(
            prompt_len = prompt.len(),
            batch_size = completions.len(),
            history_len = self.history.len(),
            historic_scored = historic_rewards.is_some(),
            "Scored completion batch for diversity"
        );

        let records = match historic_rewards {
            Some(historic) => batch_rewards
                .iter()
                .zip(historic.iter())
                .map(|(&b, &h)| RewardRecord {
                    reward: b * h,
                    batch: b,
                    historic: Some(h),
                })
                .collect(),
            None => batch_rewards
                .iter()
                .map(|&b| RewardRecord {
                    reward: b,
                    batch: b,
                    historic: None,
                })
                .collect(),
        };

        Ok(records)
    }

    /// Applies the configured classification boundary to a set of rewards:
    /// strictly above the boundary maps to 1.0, everything else to 0.0.
    pub fn binarize(&self, rewards: &Array1<f64>) -> Array1<f64> {
        binarize(rewards, self.config.boundary)
    }
}
