//! Event cost model
//!
//! Converts a stage size into the total cost of an event and the coordinator's
//! share of it:
//!
//! - **Total cost**: `base_cost + stage_size × rate`, where the rate is the
//!   small-stage rate up to and including the threshold (70 m²) and the
//!   large-stage rate above it
//! - **Coordinator share**: `total_cost × coordinator_percentage`
//! - **Certification fee**: fixed per event
//!
//! Total cost and coordinator share are rounded to the nearest multiple of the
//! rounding quantum (10). Ties go to the even multiple: `x / 10 = 6.5` gives 60,
//! `x / 10 = 7.5` gives 80.
//!
//! # Examples
//!
//! ```
//! use stageledger_core::cost::{coordinator_share, event_cost};
//!
//! assert_eq!(event_cost(50.0), 400.0); // 100 + 50 × 6
//! assert_eq!(coordinator_share(400.0), 40.0);
//!
//! // 100 + 100 × 5.5 = 650, 10% = 65 → tie, rounds to even (60)
//! assert_eq!(event_cost(100.0), 650.0);
//! assert_eq!(coordinator_share(650.0), 60.0);
//! ```

pub mod cache;

use once_cell::sync::Lazy;
use stageledger_types::{CostBreakdown, EventCostResult};

use crate::config::EngineConfig;
use cache::MemoCache;

/// Model built from the default formula parameters
static DEFAULT_MODEL: Lazy<CostModel> = Lazy::new(CostModel::default);

/// Round `value` to the nearest multiple of `quantum`, ties to even
pub fn quantize(value: f64, quantum: f64) -> f64 {
    (value / quantum).round_ties_even() * quantum
}

/// Cost formula with per-instance memoization
///
/// Parameters are fixed at construction. Results are bit-identical to a fresh
/// computation; the caches only save work.
pub struct CostModel {
    config: EngineConfig,
    cost_cache: MemoCache,
    share_cache: MemoCache,
}

impl Default for CostModel {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for CostModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostModel")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CostModel {
    pub fn new(config: EngineConfig) -> Self {
        let cost_cache = MemoCache::new(config.cache_capacity);
        let share_cache = MemoCache::new(config.cache_capacity);
        Self {
            config,
            cost_cache,
            share_cache,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rate per m² applied to a stage of this size
    pub fn rate_for(&self, stage_size: f64) -> f64 {
        if stage_size <= self.config.rate_threshold_sqm {
            self.config.small_stage_rate
        } else {
            self.config.large_stage_rate
        }
    }

    /// Total event cost for a stage size (m²). Callers guarantee `stage_size >= 0`.
    pub fn event_cost(&self, stage_size: f64) -> f64 {
        self.cost_cache
            .get_or_compute(stage_size, |size| self.compute_event_cost(size))
    }

    /// Coordinator share of a total cost
    pub fn coordinator_share(&self, total_cost: f64) -> f64 {
        self.share_cache
            .get_or_compute(total_cost, |cost| self.compute_coordinator_share(cost))
    }

    pub fn certification_fee(&self) -> f64 {
        self.config.certification_fee
    }

    /// Total cost, coordinator share and fee for one event
    pub fn compute(&self, stage_size: f64) -> EventCostResult {
        let total_cost = self.event_cost(stage_size);
        EventCostResult {
            total_cost,
            coordinator_share: self.coordinator_share(total_cost),
            certification_fee: self.certification_fee(),
        }
    }

    /// Cost result plus the formula parameters that produced it
    pub fn breakdown(&self, stage_size: f64) -> CostBreakdown {
        let cost = self.compute(stage_size);
        CostBreakdown {
            stage_size,
            total_cost: cost.total_cost,
            coordinator_share: cost.coordinator_share,
            certification_fee: cost.certification_fee,
            available_for_associations: cost.available_for_associations(),
            rate_per_sqm: self.rate_for(stage_size),
            base_cost: self.config.base_cost,
            coordinator_percentage: self.config.coordinator_percentage,
        }
    }

    /// Entries held by the (cost, share) caches
    pub fn cached_entries(&self) -> (u64, u64) {
        (self.cost_cache.entry_count(), self.share_cache.entry_count())
    }

    pub fn clear_cache(&self) {
        self.cost_cache.clear();
        self.share_cache.clear();
    }

    fn compute_event_cost(&self, stage_size: f64) -> f64 {
        let total = self.config.base_cost + stage_size * self.rate_for(stage_size);
        quantize(total, self.config.rounding_quantum)
    }

    fn compute_coordinator_share(&self, total_cost: f64) -> f64 {
        quantize(
            total_cost * self.config.coordinator_percentage,
            self.config.rounding_quantum,
        )
    }
}

/// Shared model with the default parameters
pub fn default_model() -> &'static CostModel {
    &DEFAULT_MODEL
}

/// Total event cost using the default parameters
pub fn event_cost(stage_size: f64) -> f64 {
    DEFAULT_MODEL.event_cost(stage_size)
}

/// Coordinator share using the default parameters
pub fn coordinator_share(total_cost: f64) -> f64 {
    DEFAULT_MODEL.coordinator_share(total_cost)
}

/// Fixed certification fee using the default parameters
pub fn certification_fee() -> f64 {
    DEFAULT_MODEL.certification_fee()
}
