use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use volarix_core::{Bar, BrokenLevel, Level, LevelKind};

/// Per-symbol memory of broken support/resistance levels, each under
/// cooldown until `cooldown_until` elapses. Sharded by `DashMap` the way
/// `api-server::brute_force::BruteForceGuard` shards its per-IP failure
/// records, so concurrent pipelines on different symbols never contend
/// on the same lock.
pub struct BrokenLevelStore {
    entries: DashMap<String, Vec<BrokenLevel>>,
}

impl Default for BrokenLevelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BrokenLevelStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Drops any surviving `Level` that sits within `cluster_tolerance` of
    /// an active (not yet expired) broken price of the same kind.
    pub fn filter_active(
        &self,
        symbol: &str,
        levels: Vec<Level>,
        decision_time: DateTime<Utc>,
        cluster_tolerance: Decimal,
    ) -> Vec<Level> {
        let active = self.active_broken(symbol, decision_time);
        levels
            .into_iter()
            .filter(|level| {
                !active.iter().any(|broken| {
                    broken.kind == level.kind
                        && (broken.price - level.price).abs() <= cluster_tolerance
                })
            })
            .collect()
    }

    /// For every surviving level, scans bars strictly after its
    /// `last_touch_index` for a break event and records/refreshes a
    /// `BrokenLevel` entry when one is found. Two broken prices of the
    /// same kind are the same record if they fall within
    /// `cluster_tolerance` of each other -- the clustering tolerance from
    /// §4.5, not `break_threshold`, since "same level" for break-tracking
    /// purposes is a clustering question, not a break-magnitude one.
    pub fn update(
        &self,
        symbol: &str,
        bars: &[Bar],
        levels: &[Level],
        break_threshold: Decimal,
        cluster_tolerance: Decimal,
        cooldown_hours: f64,
    ) {
        let cooldown = Duration::milliseconds((cooldown_hours * 3_600_000.0) as i64);

        for level in levels {
            let scan_start = level.last_touch_index + 1;
            if scan_start >= bars.len() {
                continue;
            }
            for bar in &bars[scan_start..] {
                let broken = match level.kind {
                    LevelKind::Support => bar.low < level.price - break_threshold,
                    LevelKind::Resistance => bar.high > level.price + break_threshold,
                };
                if broken {
                    let broken_at = bar.time;
                    tracing::warn!(
                        symbol,
                        price = %level.price,
                        kind = level.kind.label(),
                        "S/R level broken"
                    );
                    let mut entry = self.entries.entry(symbol.to_string()).or_default();
                    match entry
                        .iter_mut()
                        .find(|b| b.kind == level.kind && (b.price - level.price).abs() <= cluster_tolerance)
                    {
                        Some(existing) => {
                            existing.broken_at = broken_at;
                            existing.cooldown_until = broken_at + cooldown;
                        }
                        None => entry.push(BrokenLevel {
                            price: level.price,
                            kind: level.kind,
                            broken_at,
                            cooldown_until: broken_at + cooldown,
                        }),
                    }
                    break;
                }
            }
        }
    }

    /// Active broken prices for `symbol` as of `decision_time`, lazily
    /// dropping expired entries on read instead of running a background
    /// sweep.
    pub fn active_broken(&self, symbol: &str, decision_time: DateTime<Utc>) -> Vec<BrokenLevel> {
        match self.entries.get_mut(symbol) {
            Some(mut entry) => {
                entry.retain(|b| decision_time < b.cooldown_until);
                entry.clone()
            }
            None => Vec::new(),
        }
    }

    /// Count of currently-active broken levels for `symbol`.
    pub fn active_count(&self, symbol: &str, now: DateTime<Utc>) -> usize {
        self.active_broken(symbol, now).len()
    }

    /// Clears all state. Used by tests only.
    pub fn clear_all(&self) {
        self.entries.clear();
    }
}
