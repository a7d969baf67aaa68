//! Reward scoring from pairwise similarity.
//!
//! Converts cosine-similarity matrices into bounded, monotonic rewards per
//! item. Each item is rewarded for its k-th smallest dissimilarity to its
//! peers (bottom-k rank selection), then the raw score is squashed into
//! (0, 1) with a logistic regularizer. Rewarding the k-th rather than the
//! 1st smallest dissimilarity requires an item to be simultaneously
//! dissimilar from at least k others, so a single lucky outlier pairing is
//! not enough.

use ndarray::{Array1, Array2};
use tracing::debug;

use crate::config::DiversityConfig;
use crate::embeddings::{cross_cosine_similarity, pairwise_cosine_similarity};
use crate::history::HistoryStore;

/// Batch regularizer: 1 / (1 + exp(-40x + 4)).
/// Maps raw dissimilarity 0.07 -> ~0.23, 0.1 -> 0.5, 0.2 -> ~0.98.
const BATCH_SIGMOID_SLOPE: f64 = 40.0;
const BATCH_SIGMOID_OFFSET: f64 = 4.0;

/// Historic regularizer: 1 / (1 + exp(-1000x + 50)).
/// Sharper transition, centered so raw dissimilarity 0.05 -> 0.5; reward
/// collapses once similarity to history exceeds ~0.95.
const HISTORY_SIGMOID_SLOPE: f64 = 1000.0;
const HISTORY_SIGMOID_OFFSET: f64 = 50.0;

/// Selects, per row, the k-th smallest value of `1 - |similarity|`.
///
/// `k` is clamped to the number of columns, so a rank larger than the
/// available comparisons falls back to the worst available rather than
/// failing. Similarity is folded by the absolute value first: near-opposite
/// vectors count as similar, only orientation-agnostic closeness matters.
///
/// A matrix with zero columns yields zero dissimilarity for every row;
/// callers gate empty comparison sets before scoring.
pub fn bottom_k_dissimilarity(similarity: &Array2<f64>, k: usize) -> Array1<f64> {
    let ncols = similarity.ncols();
    if ncols == 0 {
        return Array1::zeros(similarity.nrows());
    }
    let rank = k.clamp(1, ncols);

    let mut result = Array1::zeros(similarity.nrows());
    for (i, row) in similarity.rows().into_iter().enumerate() {
        let mut dissimilarities: Vec<f64> = row.iter().map(|s| 1.0 - s.abs()).collect();
        dissimilarities.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        result[i] = dissimilarities[rank - 1];
    }
    result
}

/// Maps each reward to 1.0 if strictly greater than `boundary`, else 0.0.
///
/// Auxiliary thresholding utility; not part of the main scoring path.
pub fn binarize(rewards: &Array1<f64>, boundary: f64) -> Array1<f64> {
    rewards.mapv(|r| if r > boundary { 1.0 } else { 0.0 })
}

/// Scores batches of embeddings for diversity, within the batch and against
/// a history store.
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    batch_bottom_k: usize,
    history_bottom_k: usize,
    history_min_size: usize,
    history_skip: usize,
}

impl SimilarityScorer {
    /// Creates a scorer from a validated configuration.
    pub fn new(config: &DiversityConfig) -> Self {
        Self {
            batch_bottom_k: config.batch_bottom_k,
            history_bottom_k: config.history_bottom_k,
            history_min_size: config.history_min_size,
            history_skip: config.history_skip,
        }
    }

    /// Scores each batch item against the rest of the batch.
    ///
    /// The similarity matrix includes the unit self-similarity diagonal,
    /// which yields zero self-dissimilarity; the default rank of 2 skips it,
    /// comparing each item against its most-similar-but-one neighbor.
    /// Output values lie strictly inside (0, 1) for finite input.
    pub fn batch_rewards(&self, embeddings: &Array2<f64>) -> Array1<f64> {
        let similarity = pairwise_cosine_similarity(embeddings);
        bottom_k_dissimilarity(&similarity, self.batch_bottom_k).mapv(Self::regularize_batch)
    }

    /// Scores each batch item against the history window, or `None` when
    /// history cannot support a historic signal.
    ///
    /// The component is absent (not zero) when the store holds fewer than
    /// `history_min_size + history_bottom_k` entries. The comparison window
    /// is `history[history_skip..]`, a fixed index into the bounded store:
    /// the just-appended tail is excluded at the default configuration, and
    /// a store smaller than the offset leaves an empty window, which also
    /// yields `None`.
    pub fn historic_rewards(
        &self,
        embeddings: &Array2<f64>,
        history: &HistoryStore,
    ) -> Option<Array1<f64>> {
        if history.len() < self.history_min_size + self.history_bottom_k {
            return None;
        }

        let window = history.snapshot().get(self.history_skip..).unwrap_or(&[]);
        if window.is_empty() {
            debug!(
                history_len = history.len(),
                history_skip = self.history_skip,
                "History passed the size gate but the comparison window is empty"
            );
            return None;
        }

        let similarity = cross_cosine_similarity(embeddings, window);
        Some(
            bottom_k_dissimilarity(&similarity, self.history_bottom_k)
                .mapv(Self::regularize_historic),
        )
    }

    fn regularize_batch(raw: f64) -> f64 {
        logistic(BATCH_SIGMOID_SLOPE * raw - BATCH_SIGMOID_OFFSET)
    }

    fn regularize_historic(raw: f64) -> f64 {
        logistic(HISTORY_SIGMOID_SLOPE * raw - HISTORY_SIGMOID_OFFSET)
    }
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn scorer_with(config: &DiversityConfig) -> SimilarityScorer {
        SimilarityScorer::new(config)
    }

    fn default_scorer() -> SimilarityScorer {
        scorer_with(&DiversityConfig::default())
    }

    #[test]
    fn test_bottom_k_skips_self_similarity() {
        // Two identical items and one orthogonal one.
        let similarity = arr2(&[
            [1.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ]);

        let raw = bottom_k_dissimilarity(&similarity, 2);
        // Duplicated rows: dissimilarities [0, 0, 1], rank 2 -> 0.
        assert!(raw[0].abs() < 1e-12);
        assert!(raw[1].abs() < 1e-12);
        // Distinct row: dissimilarities [0, 1, 1], rank 2 -> 1.
        assert!((raw[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bottom_k_rank_clamped_to_columns() {
        let similarity = arr2(&[[1.0, 0.5]]);
        // k=10 > 2 columns: falls back to the worst available rank.
        let raw = bottom_k_dissimilarity(&similarity, 10);
        assert!((raw[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_bottom_k_folds_negative_similarity() {
        // Near-opposite vectors count as similar: |-0.9| -> dissimilarity 0.1.
        let similarity = arr2(&[[-0.9, 0.3]]);
        let raw = bottom_k_dissimilarity(&similarity, 1);
        assert!((raw[0] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_bottom_k_empty_matrix() {
        let similarity = Array2::zeros((3, 0));
        let raw = bottom_k_dissimilarity(&similarity, 2);
        assert_eq!(raw.len(), 3);
        assert!(raw.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_batch_regularizer_midpoint() {
        // Raw dissimilarity 0.1 sits at the sigmoid midpoint.
        assert!((SimilarityScorer::regularize_batch(0.1) - 0.5).abs() < 1e-9);
        assert!(SimilarityScorer::regularize_batch(0.2) > 0.97);
        assert!(SimilarityScorer::regularize_batch(0.07) < 0.3);
    }

    #[test]
    fn test_historic_regularizer_midpoint() {
        assert!((SimilarityScorer::regularize_historic(0.05) - 0.5).abs() < 1e-9);
        assert!(SimilarityScorer::regularize_historic(0.04) < 0.01);
        assert!(SimilarityScorer::regularize_historic(0.06) > 0.99);
    }

    #[test]
    fn test_batch_rewards_bounded_open_interval() {
        // Identical items and orthogonal items cover both extremes of raw
        // dissimilarity; the logistic keeps rewards strictly inside (0, 1).
        let embeddings = arr2(&[
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ]);

        let rewards = default_scorer().batch_rewards(&embeddings);
        assert_eq!(rewards.len(), 4);
        for &r in rewards.iter() {
            assert!(r > 0.0 && r < 1.0, "Reward {r} must lie in (0, 1)");
        }
    }

    #[test]
    fn test_batch_rewards_duplicates_score_lower() {
        let embeddings = arr2(&[
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
        ]);

        let rewards = default_scorer().batch_rewards(&embeddings);
        assert!(
            rewards[0] < rewards[2] && rewards[1] < rewards[2],
            "Duplicated items must score below the distinct item: {rewards:?}"
        );
    }

    #[test]
    fn test_historic_rewards_absent_below_size_gate() {
        let config = DiversityConfig {
            history_min_size: 4,
            history_skip: 0,
            history_capacity: 100,
            ..DiversityConfig::default()
        };
        let scorer = scorer_with(&config);

        let mut history = HistoryStore::new(config.history_capacity);
        history.append(&arr2(&[[1.0, 0.0], [0.0, 1.0]]));

        let batch = arr2(&[[1.0, 0.0]]);
        assert!(
            scorer.historic_rewards(&batch, &history).is_none(),
            "Fewer than min_size + bottom_k entries must yield an absent component"
        );
    }

    #[test]
    fn test_historic_rewards_present_above_size_gate() {
        let config = DiversityConfig {
            history_min_size: 2,
            history_skip: 0,
            history_capacity: 100,
            ..DiversityConfig::default()
        };
        let scorer = scorer_with(&config);

        let mut history = HistoryStore::new(config.history_capacity);
        history.append(&arr2(&[
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]));

        let batch = arr2(&[[1.0, 0.0, 0.0, 0.0]]);
        let rewards = scorer
            .historic_rewards(&batch, &history)
            .expect("history is large enough");
        assert_eq!(rewards.len(), 1);
        // The batch item matches a history entry exactly, but its rank-2
        // dissimilarity is 1.0, well past the sharp sigmoid midpoint.
        assert!(rewards[0] > 0.99);
    }

    #[test]
    fn test_historic_rewards_absent_when_window_empty() {
        // Size gate passes (min 1 + k 2 = 3 <= 4) but every stored entry
        // falls inside the skipped prefix.
        let config = DiversityConfig {
            history_min_size: 1,
            history_skip: 10,
            history_capacity: 100,
            ..DiversityConfig::default()
        };
        let scorer = scorer_with(&config);

        let mut history = HistoryStore::new(config.history_capacity);
        history.append(&arr2(&[
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]));

        let batch = arr2(&[[1.0, 0.0, 0.0, 0.0]]);
        assert!(scorer.historic_rewards(&batch, &history).is_none());
    }

    #[test]
    fn test_historic_rewards_window_skips_prefix() {
        // With skip = 2, only the last two entries are compared. The batch
        // item equals history[0], which is skipped, so the window holds only
        // orthogonal vectors and the reward saturates high.
        let config = DiversityConfig {
            history_min_size: 2,
            history_skip: 2,
            history_capacity: 100,
            ..DiversityConfig::default()
        };
        let scorer = scorer_with(&config);

        let mut history = HistoryStore::new(config.history_capacity);
        history.append(&arr2(&[
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]));

        let batch = arr2(&[[1.0, 0.0, 0.0, 0.0]]);
        let rewards = scorer.historic_rewards(&batch, &history).expect("present");
        assert!(rewards[0] > 0.99);
    }

    #[test]
    fn test_binarize_strict_greater_than() {
        let rewards = Array1::from_vec(vec![0.3, 0.6, 0.5]);
        let binary = binarize(&rewards, 0.5);
        assert_eq!(binary.to_vec(), vec![0.0, 1.0, 0.0]);
    }
}
