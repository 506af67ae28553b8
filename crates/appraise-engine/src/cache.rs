//! In-memory result cache with a fixed expiry.
//!
//! Every calculation is deterministic, so identical parameters can be
//! served from memory. Entries are keyed by a bit-pattern hash of the
//! parameters and expire after a fixed TTL; nothing is ever persisted.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use appraise_core::{CalculationOutput, CalculationParameters};

/// Hit/miss counters and current size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups served from memory.
    pub hits: u64,
    /// Lookups that fell through to a dispatch.
    pub misses: u64,
    /// Entries currently cached (stale entries included until swept).
    pub entries: usize,
}

struct CachedResult {
    output: CalculationOutput,
    stored_at: Instant,
}

/// Calculation result cache with a fixed expiry.
pub struct CalculationCache {
    entries: DashMap<u64, CachedResult>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CalculationCache {
    /// Creates a cache whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Looks up a fresh result for these parameters.
    ///
    /// A stale entry is evicted on the spot and counts as a miss.
    pub fn get(&self, params: &CalculationParameters) -> Option<CalculationOutput> {
        let key = cache_key(params);
        if let Some(entry) = self.entries.get(&key) {
            if entry.stored_at.elapsed() <= self.ttl {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.output.clone());
            }
        }
        // Either absent or expired; drop the stale entry if present
        self.entries
            .remove_if(&key, |_, v| v.stored_at.elapsed() > self.ttl);
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Stores a result for these parameters.
    pub fn insert(&self, params: &CalculationParameters, output: CalculationOutput) {
        self.entries.insert(
            cache_key(params),
            CachedResult {
                output,
                stored_at: Instant::now(),
            },
        );
    }

    /// Removes every expired entry.
    pub fn cleanup_stale(&self) {
        self.entries
            .retain(|_, v| v.stored_at.elapsed() <= self.ttl);
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Returns the counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

impl Default for CalculationCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(300)) // 5 minutes
    }
}

/// Stable key over the parameter bit patterns.
///
/// f64 fields are hashed via `to_bits`, which distinguishes every distinct
/// finite value (non-finite values never construct in the first place).
fn cache_key(params: &CalculationParameters) -> u64 {
    let mut hasher = DefaultHasher::new();
    params.kind().hash(&mut hasher);
    match params {
        CalculationParameters::Npv(p) => {
            hash_flows(&mut hasher, p.cash_flows.as_slice());
            p.discount_rate.to_bits().hash(&mut hasher);
            p.initial_investment.to_bits().hash(&mut hasher);
        }
        CalculationParameters::Irr(p) => {
            hash_flows(&mut hasher, p.cash_flows.as_slice());
            p.guess.map(f64::to_bits).hash(&mut hasher);
        }
        CalculationParameters::PaybackPeriod(p) => {
            hash_flows(&mut hasher, p.cash_flows.as_slice());
            p.initial_investment.to_bits().hash(&mut hasher);
        }
        CalculationParameters::BreakEven(p) => {
            p.fixed_costs.to_bits().hash(&mut hasher);
            p.variable_cost_per_unit.to_bits().hash(&mut hasher);
            p.price_per_unit.to_bits().hash(&mut hasher);
        }
        CalculationParameters::Projection(p) => {
            p.base_cash_flow.to_bits().hash(&mut hasher);
            p.growth_rate.to_bits().hash(&mut hasher);
            p.periods.hash(&mut hasher);
            p.discount_rate.to_bits().hash(&mut hasher);
        }
    }
    hasher.finish()
}

fn hash_flows(hasher: &mut DefaultHasher, flows: &[f64]) {
    flows.len().hash(hasher);
    for value in flows {
        value.to_bits().hash(hasher);
    }
}
