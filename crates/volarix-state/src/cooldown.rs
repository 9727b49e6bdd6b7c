use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// Per-symbol last-accepted-signal time, gating re-entry within
/// `cooldown_hours` of bar time. The clock source is always the
/// decision-bar time passed in by the caller; this store never reads
/// `Utc::now()`, which keeps live evaluation and replay deterministic.
pub struct CooldownStore {
    last_signal: DashMap<String, DateTime<Utc>>,
}

impl Default for CooldownStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CooldownStore {
    pub fn new() -> Self {
        Self {
            last_signal: DashMap::new(),
        }
    }

    /// Rejects if a prior accepted signal for `symbol` is within
    /// `cooldown_hours` of `decision_time`. Returns the ISO-8601 time of
    /// the next allowed signal on rejection.
    pub fn check(
        &self,
        symbol: &str,
        decision_time: DateTime<Utc>,
        cooldown_hours: f64,
    ) -> Result<(), DateTime<Utc>> {
        if let Some(last) = self.last_signal.get(symbol) {
            let cooldown = Duration::milliseconds((cooldown_hours * 3_600_000.0) as i64);
            let next_allowed = *last + cooldown;
            if decision_time < next_allowed {
                return Err(next_allowed);
            }
        }
        Ok(())
    }

    /// Records `decision_time` as the symbol's last accepted signal.
    /// Called only after a signal is emitted, never speculatively.
    pub fn record(&self, symbol: &str, decision_time: DateTime<Utc>) {
        self.last_signal.insert(symbol.to_string(), decision_time);
    }

    /// Next-allowed-signal time for `symbol`, if any prior signal exists.
    pub fn next_allowed(&self, symbol: &str, cooldown_hours: f64) -> Option<DateTime<Utc>> {
        self.last_signal
            .get(symbol)
            .map(|last| *last + Duration::milliseconds((cooldown_hours * 3_600_000.0) as i64))
    }

    /// Clears all state. Used by tests only.
    pub fn clear_all(&self) {
        self.last_signal.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_within_cooldown_window() {
        let store = CooldownStore::new();
        let t = Utc.with_ymd_and_hms(2025, 2, 10, 15, 0, 0).unwrap();
        store.record("EURUSD", t);

        let next = t + Duration::seconds(5400); // 1.5h later, cooldown is 2h
        let err = store.check("EURUSD", next, 2.0).unwrap_err();
        assert_eq!(err, t + Duration::hours(2));
    }

    #[test]
    fn accepts_after_cooldown_elapses() {
        let store = CooldownStore::new();
        let t = Utc.with_ymd_and_hms(2025, 2, 10, 15, 0, 0).unwrap();
        store.record("EURUSD", t);

        let next = t + Duration::hours(2);
        assert!(store.check("EURUSD", next, 2.0).is_ok());
    }

    #[test]
    fn distinct_symbols_are_independent() {
        let store = CooldownStore::new();
        let t = Utc.with_ymd_and_hms(2025, 2, 10, 15, 0, 0).unwrap();
        store.record("EURUSD", t);
        assert!(store.check("GBPUSD", t, 2.0).is_ok());
    }
}
