//! Memo table with key-level single flight.
//!
//! Each key owns a shared `OnceLock` cell: the first caller computes, later
//! callers (including concurrent ones) wait for and clone that value.
//! Entries remember the last build generation that asked for them so stale
//! keys can be swept after a build.

use std::hash::Hash;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

struct Slot<V> {
    cell: Arc<OnceLock<V>>,
    generation: u64,
}

pub struct Memo<K, V> {
    entries: DashMap<K, Slot<V>>,
}

impl<K, V> Memo<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Cached value for `key`, computing it at most once.
    ///
    /// Returns the value and whether this call ran `compute`.
    pub fn get_or_compute(&self, key: K, generation: u64, compute: impl FnOnce() -> V) -> (V, bool) {
        self.get_or_compute_if(key, generation, |_| true, compute)
    }

    /// Like [`Self::get_or_compute`], but a cached value for which `is_fresh`
    /// returns false is dropped and recomputed.
    pub fn get_or_compute_if(
        &self,
        key: K,
        generation: u64,
        is_fresh: impl Fn(&V) -> bool,
        compute: impl FnOnce() -> V,
    ) -> (V, bool) {
        let cell = self.slot(key.clone(), generation);
        if let Some(value) = cell.get() {
            if is_fresh(value) {
                return (value.clone(), false);
            }
            // Only drop the slot we looked at; a concurrent caller may
            // already have replaced it.
            self.entries
                .remove_if(&key, |_, slot| Arc::ptr_eq(&slot.cell, &cell));
            let cell = self.slot(key, generation);
            return Self::init(&cell, compute);
        }
        Self::init(&cell, compute)
    }

    /// Drop every entry not touched by `generation`. Returns the count.
    pub fn sweep(&self, generation: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, slot| slot.generation == generation);
        before - self.entries.len()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn slot(&self, key: K, generation: u64) -> Arc<OnceLock<V>> {
        let mut slot = self.entries.entry(key).or_insert_with(|| Slot {
            cell: Arc::new(OnceLock::new()),
            generation,
        });
        slot.generation = generation;
        Arc::clone(&slot.cell)
    }

    fn init(cell: &OnceLock<V>, compute: impl FnOnce() -> V) -> (V, bool) {
        let mut computed = false;
        let value = cell.get_or_init(|| {
            computed = true;
            compute()
        });
        (value.clone(), computed)
    }
}

impl<K, V> Default for Memo<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_computes_once() {
        let memo: Memo<&str, u32> = Memo::new();
        assert_eq!(memo.get_or_compute("a", 1, || 7), (7, true));
        assert_eq!(memo.get_or_compute("a", 1, || 8), (7, false));
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_concurrent_single_flight() {
        let memo: Memo<u8, usize> = Memo::new();
        let runs = AtomicUsize::new(0);

        let values: Vec<usize> = (0..64)
            .into_par_iter()
            .map(|_| {
                memo.get_or_compute(1, 1, || {
                    runs.fetch_add(1, Ordering::SeqCst);
                    42
                })
                .0
            })
            .collect();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(values.iter().all(|&v| v == 42));
    }

    #[test]
    fn test_stale_value_recomputed() {
        let memo: Memo<&str, u32> = Memo::new();
        memo.get_or_compute("a", 1, || 1);

        let (value, computed) = memo.get_or_compute_if("a", 2, |v| *v > 1, || 2);
        assert_eq!((value, computed), (2, true));

        let (value, computed) = memo.get_or_compute_if("a", 3, |v| *v > 1, || 3);
        assert_eq!((value, computed), (2, false));
    }

    #[test]
    fn test_sweep_drops_untouched() {
        let memo: Memo<&str, u32> = Memo::new();
        memo.get_or_compute("old", 1, || 1);
        memo.get_or_compute("kept", 1, || 2);
        memo.get_or_compute("kept", 2, || 3);

        assert_eq!(memo.sweep(2), 1);
        assert_eq!(memo.len(), 1);
        assert_eq!(memo.get_or_compute("kept", 3, || 4), (2, false));
    }
}
