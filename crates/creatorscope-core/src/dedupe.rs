//! Identity-based deduplication of canonical records.
//!
//! [`dedupe`] collapses records sharing an [`IdentityKey`] to the best
//! variant; [`merge_first_seen`] appends a new page onto an accumulated list
//! without ever replacing an entry already shown.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::influencer::{CanonicalInfluencer, IdentityKey};

/// Collapses records that share an identity key, keeping the best variant.
///
/// Records with no derivable key are dropped. Output preserves the position
/// of each key's first occurrence. Applying `dedupe` twice is a no-op.
#[must_use]
pub fn dedupe(records: Vec<CanonicalInfluencer>) -> Vec<CanonicalInfluencer> {
    let mut slots: HashMap<IdentityKey, usize> = HashMap::with_capacity(records.len());
    let mut kept: Vec<CanonicalInfluencer> = Vec::with_capacity(records.len());

    for record in records {
        let Some(key) = record.identity_key() else {
            continue;
        };
        match slots.get(&key) {
            Some(&idx) => {
                if compare_quality(&record, &kept[idx]) == Ordering::Greater {
                    kept[idx] = record;
                }
            }
            None => {
                slots.insert(key, kept.len());
                kept.push(record);
            }
        }
    }

    kept
}

/// Appends `batch` onto `existing`, deduplicating the batch first and then
/// skipping any record whose key is already present in `existing`.
///
/// Entries already in `existing` are never evicted by a later duplicate.
pub fn merge_first_seen(existing: &mut Vec<CanonicalInfluencer>, batch: Vec<CanonicalInfluencer>) {
    let mut seen: HashSet<IdentityKey> = existing
        .iter()
        .filter_map(CanonicalInfluencer::identity_key)
        .collect();

    for record in dedupe(batch) {
        if let Some(key) = record.identity_key() {
            if seen.insert(key) {
                existing.push(record);
            }
        }
    }
}

/// Orders two variants of the same identity. The first differing criterion
/// decides; `Equal` means the incumbent stays.
fn compare_quality(a: &CanonicalInfluencer, b: &CanonicalInfluencer) -> Ordering {
    a.is_verified
        .cmp(&b.is_verified)
        .then_with(|| a.followers.total_cmp(&b.followers))
        .then_with(|| a.engagement_rate.total_cmp(&b.engagement_rate))
        .then_with(|| {
            a.engagements
                .unwrap_or(0.0)
                .total_cmp(&b.engagements.unwrap_or(0.0))
        })
        .then_with(|| has_text(a.url.as_deref()).cmp(&has_text(b.url.as_deref())))
        .then_with(|| has_text(a.picture.as_deref()).cmp(&has_text(b.picture.as_deref())))
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|s| !s.trim().is_empty())
}

#[cfg(test)]
#[path = "dedupe_test.rs"]
mod tests;
