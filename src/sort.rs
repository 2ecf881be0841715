//! Header-key sort index for seismic trace stores
//!
//! For every registered key the index keeps the key's unique header values in
//! ascending order and, per unique value, the trace indexes carrying it. A
//! value's position in that list is its bucket. Indexes live in a per-root
//! cache keyed by the owning seismic object's path and are rebuilt lazily
//! from the trace headers once a header write makes them stale.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// Unique values of one header key and the traces grouped under each
#[derive(Debug, Clone, PartialEq)]
pub struct KeyIndex {
    unique: Vec<f64>,
    groups: Vec<Vec<usize>>,
}

impl KeyIndex {
    /// Group trace indexes `0..values.len()` by value. NaN headers are left out.
    pub fn build(values: &[f64]) -> Self {
        let mut order: Vec<usize> = (0..values.len()).filter(|&i| !values[i].is_nan()).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]).then(a.cmp(&b)));

        let mut unique = Vec::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for i in order {
            match unique.last() {
                Some(&last) if last == values[i] => {
                    if let Some(g) = groups.last_mut() {
                        g.push(i);
                    }
                }
                _ => {
                    unique.push(values[i]);
                    groups.push(vec![i]);
                }
            }
        }
        Self { unique, groups }
    }

    pub fn unique_values(&self) -> &[f64] {
        &self.unique
    }

    /// Number of buckets
    pub fn size(&self) -> usize {
        self.unique.len()
    }

    fn selected(&self, min: f64, max: f64) -> impl Iterator<Item = &Vec<usize>> {
        self.unique
            .iter()
            .zip(self.groups.iter())
            .filter(move |(v, _)| **v >= min && **v <= max)
            .map(|(_, g)| g)
    }

    /// Traces whose value lies in `[min, max]`, bucket by bucket
    pub fn indexes(&self, min: f64, max: f64) -> Vec<usize> {
        self.selected(min, max).flatten().copied().collect()
    }

    pub fn trace_count(&self, min: f64, max: f64) -> usize {
        self.selected(min, max).map(Vec::len).sum()
    }
}

/// Key indexes of one seismic object, valid for one header revision
#[derive(Debug)]
struct Entry {
    revision: DateTime<Utc>,
    keys: HashMap<String, Arc<KeyIndex>>,
}

/// Cached key indexes of every seismic object under one storage root.
///
/// Entries are tagged with the modification time of the header dataset they
/// were built from; a lookup with another revision misses.
#[derive(Debug, Default)]
pub struct SortCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl SortCache {
    pub fn get(&self, seis_path: &str, key: &str, revision: DateTime<Utc>) -> Option<Arc<KeyIndex>> {
        let entries = self.entries.read();
        let entry = entries.get(seis_path)?;
        if entry.revision != revision {
            return None;
        }
        entry.keys.get(key).cloned()
    }

    pub fn insert(
        &self,
        seis_path: &str,
        key: &str,
        revision: DateTime<Utc>,
        index: KeyIndex,
    ) -> Arc<KeyIndex> {
        let index = Arc::new(index);
        let mut entries = self.entries.write();
        let entry = entries.entry(seis_path.to_string()).or_insert_with(|| Entry {
            revision,
            keys: HashMap::new(),
        });
        if entry.revision != revision {
            entry.revision = revision;
            entry.keys.clear();
        }
        entry.keys.insert(key.to_string(), index.clone());
        index
    }

    pub fn remove(&self, seis_path: &str, key: &str) {
        if let Some(entry) = self.entries.write().get_mut(seis_path) {
            entry.keys.remove(key);
        }
    }

    /// Drop every index of `seis_path`
    pub fn invalidate(&self, seis_path: &str) {
        if self.entries.write().remove(seis_path).is_some() {
            tracing::debug!("sort indexes of {} invalidated", seis_path);
        }
    }
}

/// Lexicographic order of `rows` (each one key tuple), ties kept in input order
pub fn sort_rows(rows: &[Vec<f64>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        rows[a]
            .iter()
            .zip(rows[b].iter())
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    order
}
