//! Bounded top-N tracking with recency tie-breaking.

use std::collections::HashMap;

use cs_model::TopEntry;

/// Tracks the N highest-count keys observed so far.
///
/// When the table exceeds capacity the entry with the smallest
/// `(count, last_seen)` pair is evicted, so among equal counts the oldest
/// entry goes first — recent bursts survive. Memory is bounded by the
/// capacity, never by the number of distinct keys observed.
#[derive(Debug, Clone)]
pub struct TopTracker {
    cap: usize,
    seq: u64,
    entries: HashMap<String, Slot>,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    count: u64,
    last_seen: u64,
}

impl TopTracker {
    pub fn new(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            seq: 0,
            entries: HashMap::new(),
        }
    }

    /// Record one occurrence of `key`.
    pub fn observe(&mut self, key: &str) {
        self.seq += 1;
        if let Some(slot) = self.entries.get_mut(key) {
            slot.count += 1;
            slot.last_seen = self.seq;
            return;
        }

        self.entries.insert(
            key.to_string(),
            Slot {
                count: 1,
                last_seen: self.seq,
            },
        );
        if self.entries.len() > self.cap {
            let victim = self
                .entries
                .iter()
                .min_by_key(|(_, slot)| (slot.count, slot.last_seen))
                .map(|(key, _)| key.clone());
            if let Some(victim) = victim {
                self.entries.remove(&victim);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted rows: count descending, most-recently-seen first among
    /// equal counts.
    pub fn to_entries(&self) -> Vec<TopEntry> {
        let mut rows: Vec<(&String, &Slot)> = self.entries.iter().collect();
        rows.sort_by(|(_, a), (_, b)| {
            b.count.cmp(&a.count).then(b.last_seen.cmp(&a.last_seen))
        });
        rows.into_iter()
            .map(|(key, slot)| TopEntry {
                key: key.clone(),
                count: slot.count,
            })
            .collect()
    }
}
