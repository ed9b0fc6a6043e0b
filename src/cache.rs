use crate::aggregator::Analysis;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub analysis: Analysis,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(analysis: Analysis, stored_at: DateTime<Utc>) -> Self {
        Self {
            analysis,
            stored_at,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.stored_at
    }
}

/// Recent analyses keyed by host.
///
/// A hit is only served while the entry is younger than `freshness`;
/// older entries linger until `sweep` drops everything past `max_age`.
/// Callers pass the clock in so expiry can be tested without sleeping.
#[derive(Debug)]
pub struct AnalysisCache {
    entries: HashMap<String, CacheEntry>,
    freshness: Duration,
    max_age: Duration,
}

impl AnalysisCache {
    pub fn new(freshness_seconds: u64, max_age_seconds: u64) -> Self {
        Self {
            entries: HashMap::new(),
            freshness: seconds(freshness_seconds),
            max_age: seconds(max_age_seconds),
        }
    }

    pub fn get(&self, domain: &str, now: DateTime<Utc>) -> Option<&Analysis> {
        let entry = self.entries.get(domain)?;
        if entry.age(now) < self.freshness {
            Some(&entry.analysis)
        } else {
            None
        }
    }

    pub fn insert(&mut self, domain: &str, analysis: Analysis, now: DateTime<Utc>) {
        self.entries
            .insert(domain.to_string(), CacheEntry::new(analysis, now));
    }

    /// Drop entries older than the max age; returns how many were removed
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let max_age = self.max_age;
        self.entries.retain(|_, entry| entry.age(now) <= max_age);
        let removed = before - self.entries.len();
        if removed > 0 {
            log::debug!("Swept {} stale cache entries", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn seconds(value: u64) -> Duration {
    // chrono caps durations at i64::MAX milliseconds
    let secs = i64::try_from(value).unwrap_or(i64::MAX).min(i64::MAX / 1000);
    Duration::seconds(secs)
}
