//! Bounded memo cache for cost computations
//!
//! Keys are the raw bits of the `f64` input, so two inputs share an entry
//! only if they are the same number (`0.0` and `-0.0` are folded together).
//! Each [`CostModel`](super::CostModel) owns its caches; entries never outlive
//! the formula parameters they were computed with.

use moka::sync::Cache;

pub struct MemoCache {
    /// `None` when capacity is 0 (memoization disabled)
    inner: Option<Cache<u64, f64>>,
}

impl MemoCache {
    pub fn new(capacity: u64) -> Self {
        let inner = (capacity > 0).then(|| Cache::builder().max_capacity(capacity).build());
        Self { inner }
    }

    /// Return the cached result for `input`, computing and storing it on miss
    pub fn get_or_compute(&self, input: f64, compute: impl FnOnce(f64) -> f64) -> f64 {
        match &self.inner {
            Some(cache) => cache.get_with(cache_key(input), || compute(input)),
            None => compute(input),
        }
    }

    pub fn entry_count(&self) -> u64 {
        match &self.inner {
            Some(cache) => {
                cache.run_pending_tasks();
                cache.entry_count()
            }
            None => 0,
        }
    }

    pub fn clear(&self) {
        if let Some(cache) = &self.inner {
            cache.invalidate_all();
            cache.run_pending_tasks();
        }
    }
}

fn cache_key(input: f64) -> u64 {
    if input == 0.0 {
        0.0f64.to_bits()
    } else {
        input.to_bits()
    }
}
