//! Error types for diversity reward computation.
//!
//! Defines error types for the major subsystems:
//! - Engine configuration validation
//! - Embedding providers
//! - End-to-end scoring

use thiserror::Error;

/// Errors detected when validating a [`DiversityConfig`](crate::config::DiversityConfig).
///
/// Configuration problems are rejected at engine construction time rather
/// than discovered mid-scoring.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Bottom-k rank '{name}' must be at least 1, got {value}")]
    NonPositiveBottomK { name: &'static str, value: usize },

    #[error("History capacity must be at least 1")]
    ZeroCapacity,

    #[error("History capacity ({capacity}) is smaller than the minimum history size ({min_size})")]
    CapacityBelowMinSize { capacity: usize, min_size: usize },

    #[error("Binarization boundary must be a finite value in [0, 1], got {0}")]
    InvalidBoundary(f64),
}

/// Errors that can occur while producing embeddings.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding provider failed: {0}")]
    Provider(String),

    #[error("Provider returned {actual} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Provider returned dimension {actual}, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Errors surfaced by [`DiversityEngine::score`](crate::engine::DiversityEngine::score).
///
/// Embedding failures are fatal to the whole request: no partial results,
/// no retries at this layer.
#[derive(Debug, Error)]
pub enum DiversityError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
