//! Engine configuration.
//!
//! All scoring parameters are fixed per engine instance. Malformed values
//! are rejected at construction time via [`DiversityConfig::validate`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default bottom-k rank for batch scoring. Rank 2 skips the zero
/// self-dissimilarity that every item has against itself.
pub const DEFAULT_BATCH_BOTTOM_K: usize = 2;

/// Default bottom-k rank for historic scoring.
pub const DEFAULT_HISTORY_BOTTOM_K: usize = 2;

/// Default number of history entries required before historic scoring kicks in.
pub const DEFAULT_HISTORY_MIN_SIZE: usize = 500;

/// Default number of leading history entries excluded from the comparison window.
pub const DEFAULT_HISTORY_SKIP: usize = 500;

/// Default capacity bound on the history store.
pub const DEFAULT_HISTORY_CAPACITY: usize = 15_500;

/// Default classification boundary for reward binarization.
pub const DEFAULT_BOUNDARY: f64 = 0.5;

/// Configuration for a [`DiversityEngine`](crate::engine::DiversityEngine).
///
/// # Example
///
/// ```
/// use diversity_reward::DiversityConfig;
///
/// let config = DiversityConfig {
///     history_capacity: 1_000,
///     history_min_size: 100,
///     history_skip: 100,
///     ..DiversityConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiversityConfig {
    /// Bottom-k rank used when scoring a batch against itself.
    pub batch_bottom_k: usize,

    /// Bottom-k rank used when scoring a batch against history.
    pub history_bottom_k: usize,

    /// Minimum history size before the historic component is produced.
    pub history_min_size: usize,

    /// Offset into the history store where the comparison window starts.
    pub history_skip: usize,

    /// Maximum number of embeddings retained in the history store.
    pub history_capacity: usize,

    /// Boundary for [`binarize`](crate::scoring::binarize): rewards strictly
    /// above it map to 1.0, all others to 0.0.
    pub boundary: f64,
}

impl Default for DiversityConfig {
    fn default() -> Self {
        Self {
            batch_bottom_k: DEFAULT_BATCH_BOTTOM_K,
            history_bottom_k: DEFAULT_HISTORY_BOTTOM_K,
            history_min_size: DEFAULT_HISTORY_MIN_SIZE,
            history_skip: DEFAULT_HISTORY_SKIP,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            boundary: DEFAULT_BOUNDARY,
        }
    }
}

impl DiversityConfig {
    /// Checks the configuration for values that would break scoring.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for non-positive bottom-k ranks, a zero
    /// capacity, a capacity smaller than the minimum history size, or a
    /// non-finite / out-of-range binarization boundary.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_bottom_k == 0 {
            return Err(ConfigError::NonPositiveBottomK {
                name: "batch_bottom_k",
                value: self.batch_bottom_k,
            });
        }
        if self.history_bottom_k == 0 {
            return Err(ConfigError::NonPositiveBottomK {
                name: "history_bottom_k",
                value: self.history_bottom_k,
            });
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.history_capacity < self.history_min_size {
            return Err(ConfigError::CapacityBelowMinSize {
                capacity: self.history_capacity,
                min_size: self.history_min_size,
            });
        }
        if !self.boundary.is_finite() || !(0.0..=1.0).contains(&self.boundary) {
            return Err(ConfigError::InvalidBoundary(self.boundary));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(DiversityConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_values() {
        let config = DiversityConfig::default();
        assert_eq!(config.batch_bottom_k, 2);
        assert_eq!(config.history_bottom_k, 2);
        assert_eq!(config.history_min_size, 500);
        assert_eq!(config.history_skip, 500);
        assert_eq!(config.history_capacity, 15_500);
        assert_eq!(config.boundary, 0.5);
    }

    #[test]
    fn test_zero_batch_bottom_k_rejected() {
        let config = DiversityConfig {
            batch_bottom_k: 0,
            ..DiversityConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveBottomK {
                name: "batch_bottom_k",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_history_bottom_k_rejected() {
        let config = DiversityConfig {
            history_bottom_k: 0,
            ..DiversityConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveBottomK {
                name: "history_bottom_k",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = DiversityConfig {
            history_capacity: 0,
            history_min_size: 0,
            ..DiversityConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroCapacity)));
    }

    #[test]
    fn test_capacity_below_min_size_rejected() {
        let config = DiversityConfig {
            history_capacity: 100,
            history_min_size: 500,
            ..DiversityConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CapacityBelowMinSize {
                capacity: 100,
                min_size: 500,
            })
        ));
    }

    #[test]
    fn test_invalid_boundary_rejected() {
        for boundary in [f64::NAN, f64::INFINITY, -0.1, 1.5] {
            let config = DiversityConfig {
                boundary,
                ..DiversityConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidBoundary(_))),
                "Boundary {boundary} should be rejected"
            );
        }
    }
}
