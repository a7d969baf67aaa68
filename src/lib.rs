//! diversity-reward: a diversity reward signal for generated text completions.
//!
//! Part of a reward-aggregation pipeline that scores model outputs. This
//! crate rewards completions that are distinct from each other within the
//! same batch and distinct from a rolling window of historical completions,
//! discouraging repetitive or mode-collapsed generation.
//!
//! # Overview
//!
//! Three pieces cooperate per scoring request:
//!
//! 1. **Embeddings** - an [`Embedder`] maps completions to unit-normalized
//!    vectors; [`HashEmbedder`] is a model-free default
//! 2. **History** - a [`HistoryStore`] retains a bounded trail of previously
//!    scored embeddings
//! 3. **Scoring** - a [`SimilarityScorer`] turns pairwise cosine similarity
//!    into bounded rewards via bottom-k rank selection and logistic squashing
//!
//! The [`DiversityEngine`] ties them together and emits one [`RewardRecord`]
//! per completion.
//!
//! # Usage
//!
//! ```
//! use diversity_reward::{DiversityConfig, DiversityEngine, HashEmbedder};
//!
//! let config = DiversityConfig::default();
//! let mut engine = DiversityEngine::new(HashEmbedder::default(), config)?;
//!
//! let completions = vec![
//!     "The capital of France is Paris.".to_string(),
//!     "Paris is the capital of France.".to_string(),
//!     "I prefer to talk about cheese.".to_string(),
//! ];
//! for record in engine.score("What is the capital of France?", &completions)? {
//!     println!("reward={:.3} batch={:.3}", record.reward, record.batch);
//! }
//! # Ok::<(), diversity_reward::DiversityError>(())
//! ```
//!
//! Scoring is synchronous and single-threaded: [`DiversityEngine::score`]
//! takes `&mut self` because it appends to the history store. Wrap the
//! engine in a mutex if requests arrive concurrently.

pub mod config;
pub mod embeddings;
pub mod engine;
pub mod error;
pub mod history;
pub mod scoring;

// Re-export the main types for convenience
pub use config::DiversityConfig;
pub use embeddings::{
    cosine_similarity, cross_cosine_similarity, pairwise_cosine_similarity, Embedder, HashEmbedder,
};
pub use engine::{DiversityEngine, RewardRecord};
pub use error::{ConfigError, DiversityError, EmbeddingError};
pub use history::HistoryStore;
pub use scoring::{binarize, bottom_k_dissimilarity, SimilarityScorer};
