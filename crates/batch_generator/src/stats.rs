//! In-process stats bookkeeping

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use contracts::{StatValue, StatsRecorder, StatsUpdate};
use tracing::warn;

/// Stats table kept in memory
///
/// Increments add onto stored integers (missing names start at 0);
/// replacements overwrite whatever was stored.
#[derive(Debug, Default)]
pub struct MemoryStats {
    values: Mutex<BTreeMap<String, StatValue>>,
    updates: AtomicU64,
}

impl MemoryStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<StatValue> {
        self.values().get(name).cloned()
    }

    /// Integer value of `name`, 0 when unset
    pub fn get_int(&self, name: &str) -> i64 {
        self.get(name).and_then(|v| v.as_int()).unwrap_or(0)
    }

    /// Copy of the whole table
    pub fn snapshot(&self) -> BTreeMap<String, StatValue> {
        self.values().clone()
    }

    /// Number of updates applied so far
    pub fn update_count(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    fn values(&self) -> MutexGuard<'_, BTreeMap<String, StatValue>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StatsRecorder for MemoryStats {
    fn update(&self, update: StatsUpdate) {
        let mut values = self.values();

        for (name, delta) in update.increments {
            let slot = values.entry(name).or_insert(StatValue::Int(0));
            match slot {
                StatValue::Int(current) => *current += delta,
                other => {
                    warn!(value = %other, "Incrementing non-integer stat, resetting");
                    *other = StatValue::Int(delta);
                }
            }
        }

        values.extend(update.replacements);
        drop(values);

        self.updates.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contracts::{BATCHES_AFTER_START, LAST_BATCH_GENERATED, LAST_BATCH_SIZE, PUSHED_SINCE_START};

    #[test]
    fn test_increments_accumulate() {
        let stats = MemoryStats::new();
        stats.update(StatsUpdate::new().increment(PUSHED_SINCE_START, 8));
        stats.update(StatsUpdate::new().increment(PUSHED_SINCE_START, 5));
        assert_eq!(stats.get_int(PUSHED_SINCE_START), 13);
        assert_eq!(stats.get_int("never_set"), 0);
        assert_eq!(stats.update_count(), 2);
    }

    #[test]
    fn test_replacements_overwrite() {
        let stats = MemoryStats::new();
        stats.update(StatsUpdate::new().replace(LAST_BATCH_SIZE, 10));
        stats.update(StatsUpdate::new().replace(LAST_BATCH_SIZE, 3));
        assert_eq!(stats.get(LAST_BATCH_SIZE), Some(StatValue::Int(3)));
    }

    #[test]
    fn test_mixed_update() {
        let stats = MemoryStats::new();
        let now = Utc::now();
        stats.update(
            StatsUpdate::new()
                .increment(PUSHED_SINCE_START, 4)
                .increment(BATCHES_AFTER_START, 1)
                .replace(LAST_BATCH_SIZE, 4)
                .replace(LAST_BATCH_GENERATED, now),
        );

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.len(), 4);
        assert_eq!(snapshot[LAST_BATCH_GENERATED], StatValue::Timestamp(now));
        assert_eq!(snapshot[BATCHES_AFTER_START], StatValue::Int(1));
    }

    #[test]
    fn test_increment_over_text_resets() {
        let stats = MemoryStats::new();
        stats.update(StatsUpdate::new().replace("mode", "warming"));
        stats.update(StatsUpdate::new().increment("mode", 2));
        assert_eq!(stats.get_int("mode"), 2);
    }
}
