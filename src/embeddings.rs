//! Embedding provider interface and similarity primitives.
//!
//! The scoring core is agnostic to how embeddings are produced: any type
//! implementing [`Embedder`] can back a
//! [`DiversityEngine`](crate::engine::DiversityEngine). The only contract is
//! one L2-normalized vector per input sentence, in input order.
//!
//! This module ships [`HashEmbedder`], a hash-based text embedder usable
//! without an external ML model. For production accuracy, implement
//! [`Embedder`] on top of an actual sentence-embedding model.

use ndarray::{Array1, Array2, ArrayView1};
use sha2::{Digest, Sha256};

use crate::error::EmbeddingError;

/// Default embedding dimension for the hash embedder.
const DEFAULT_DIMENSION: usize = 128;

/// An embedding provider: maps sentences to fixed-dimension, L2-normalized
/// vectors.
///
/// Implementations must be deterministic given fixed internal state and must
/// return exactly one row per input sentence, in input order. Failures
/// (malformed input, resource exhaustion in a model-backed provider) are
/// reported as [`EmbeddingError`] and treated as fatal by the engine.
pub trait Embedder {
    /// Returns the dimension of the produced vectors.
    fn dimension(&self) -> usize;

    /// Embeds a batch of sentences into a matrix with one row per sentence.
    fn embed(&self, sentences: &[String]) -> Result<Array2<f64>, EmbeddingError>;
}

/// Deterministic hash-based sentence embedder.
///
/// Uses SHA-256 feature hashing to build a fixed-dimensional representation:
///
/// - Word occurrences are hashed into the first half of the vector
/// - Character trigrams are hashed into the next quarter
/// - Length statistics fill the remaining positions
///
/// The result is L2-normalized, so cosine similarity between outputs is a
/// plain dot product. Identical strings always embed identically; the empty
/// string embeds to the zero vector.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    /// Dimension of the generated embeddings.
    dimension: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl HashEmbedder {
    /// Creates a new hash embedder with the specified dimension.
    ///
    /// # Example
    ///
    /// ```
    /// use diversity_reward::HashEmbedder;
    ///
    /// let embedder = HashEmbedder::new(64);
    /// ```
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Embeds a single sentence.
    pub fn embed_sentence(&self, text: &str) -> Array1<f64> {
        let mut embedding = Array1::zeros(self.dimension);

        if text.is_empty() {
            return embedding;
        }

        let text_lower = text.to_lowercase();

        // Feature 1: word-level features
        let words: Vec<&str> = text_lower.split_whitespace().collect();
        let word_dim = self.dimension / 2;
        for word in &words {
            let pos = self.hash_to_index(word, word_dim);
            embedding[pos] += 1.0 / words.len().max(1) as f64;
        }

        // Feature 2: character trigram features
        let offset = word_dim;
        let trigram_dim = self.dimension / 4;
        let chars: Vec<char> = text_lower.chars().collect();
        for window in chars.windows(3) {
            let trigram: String = window.iter().collect();
            let pos = offset + self.hash_to_index(&trigram, trigram_dim);
            embedding[pos] += 1.0;
        }

        // Feature 3: text statistics
        let stats_offset = offset + trigram_dim;
        let remaining = self.dimension - stats_offset;
        if remaining > 0 {
            embedding[stats_offset] = (text.len() as f64 / 1000.0).min(1.0);
        }
        if remaining > 1 {
            embedding[stats_offset + 1] = (words.len() as f64 / 200.0).min(1.0);
        }
        if remaining > 2 {
            let avg_word_len = if words.is_empty() {
                0.0
            } else {
                words.iter().map(|w| w.len()).sum::<usize>() as f64 / words.len() as f64
            };
            embedding[stats_offset + 2] = avg_word_len / 10.0;
        }

        normalize(&mut embedding);
        embedding
    }

    /// Hashes a string to an index in [0, max_index).
    fn hash_to_index(&self, input: &str, max_index: usize) -> usize {
        if max_index == 0 {
            return 0;
        }
        let mut hasher = Sha256::new();
        hasher.update(input.as_bytes());
        let hash_bytes = hasher.finalize();
        let hash_val = ((hash_bytes[0] as u32) << 24
            | (hash_bytes[1] as u32) << 16
            | (hash_bytes[2] as u32) << 8
            | hash_bytes[3] as u32) as usize;
        hash_val % max_index
    }
}

impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, sentences: &[String]) -> Result<Array2<f64>, EmbeddingError> {
        let mut result = Array2::zeros((sentences.len(), self.dimension));
        for (i, sentence) in sentences.iter().enumerate() {
            result.row_mut(i).assign(&self.embed_sentence(sentence));
        }
        Ok(result)
    }
}

/// Normalizes a vector to unit length (L2 norm). Zero vectors are left as-is.
fn normalize(v: &mut Array1<f64>) {
    let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 1e-10 {
        v.mapv_inplace(|x| x / norm);
    }
}

/// Computes cosine similarity between two vectors.
///
/// Ranges from -1 (opposite) to 1 (identical direction). Returns 0.0 if
/// either vector has (near-)zero norm.
///
/// # Panics
///
/// Panics if vectors have different lengths.
pub fn cosine_similarity(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    assert_eq!(
        a.len(),
        b.len(),
        "Vectors must have the same length for cosine similarity"
    );

    let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a < 1e-10 || norm_b < 1e-10 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Computes the pairwise cosine-similarity matrix of a batch against itself.
///
/// The result is symmetric with a unit diagonal (self-similarity).
pub fn pairwise_cosine_similarity(embeddings: &Array2<f64>) -> Array2<f64> {
    let n = embeddings.nrows();
    let mut similarity_matrix = Array2::zeros((n, n));

    for i in 0..n {
        similarity_matrix[[i, i]] = 1.0;

        for j in (i + 1)..n {
            let sim = cosine_similarity(embeddings.row(i), embeddings.row(j));
            similarity_matrix[[i, j]] = sim;
            similarity_matrix[[j, i]] = sim;
        }
    }

    similarity_matrix
}

/// Computes the cosine-similarity matrix between a batch and a second set of
/// vectors: entry `[i, j]` is the similarity of batch row `i` to `others[j]`.
pub fn cross_cosine_similarity(embeddings: &Array2<f64>, others: &[Array1<f64>]) -> Array2<f64> {
    let n = embeddings.nrows();
    let m = others.len();
    let mut similarity_matrix = Array2::zeros((n, m));

    for i in 0..n {
        for (j, other) in others.iter().enumerate() {
            similarity_matrix[[i, j]] = cosine_similarity(embeddings.row(i), other.view());
        }
    }

    similarity_matrix
}
