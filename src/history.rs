//! Rolling history of embedding vectors.
//!
//! The engine measures novelty against recent generation history: every
//! scored batch is appended here, and later batches are compared against a
//! window of the retained trail.

use ndarray::{Array1, Array2};

/// Bounded, append-only trail of embedding vectors.
///
/// Invariants:
/// - length never exceeds the configured capacity; once full, the oldest
///   entries are dropped first (FIFO truncation)
/// - consecutive duplicate vectors within a single appended batch are
///   collapsed to the first of each run; duplicates across batch boundaries
///   are NOT collapsed
/// - entries are only ever appended, never reordered or cleared
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: Vec<Array1<f64>>,
    capacity: usize,
}

impl HistoryStore {
    /// Creates an empty store with the given capacity bound.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Returns the number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the capacity bound.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Read-only view of the retained entries, oldest first.
    ///
    /// Reflects state strictly before any in-flight append; calling this
    /// repeatedly without an intervening [`append`](Self::append) yields
    /// identical results.
    pub fn snapshot(&self) -> &[Array1<f64>] {
        &self.entries
    }

    /// Appends a batch of embeddings, one matrix row per vector.
    ///
    /// Runs of exactly-equal consecutive rows within `batch` are collapsed
    /// to their first element before appending; the first row is always
    /// retained. After appending, the store is truncated from the front to
    /// the most recent `capacity` entries.
    ///
    /// Callers guarantee a non-empty batch; an empty batch is a no-op.
    pub fn append(&mut self, batch: &Array2<f64>) {
        if batch.nrows() == 0 {
            return;
        }

        let mut last: Option<Array1<f64>> = None;
        for row in batch.rows() {
            let row = row.to_owned();
            let duplicate = last.as_ref().is_some_and(|prev| *prev == row);
            if !duplicate {
                self.entries.push(row.clone());
            }
            last = Some(row);
        }

        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
        }
    }
}
