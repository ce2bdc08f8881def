use std::collections::HashMap;

use tracing::{debug, warn};

use crate::feed::classify::data_source_of;
use crate::feed::record::RawTransaction;
use crate::feed::signature::Signature;

/// How two API records with the same signature are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// The later record replaces the earlier one in place.
    #[default]
    LastWins,
    /// Records with distinct, non-empty ids are both kept; otherwise last wins.
    KeepDistinctIds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionResolution {
    Replaced,
    Retained,
}

impl CollisionResolution {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Replaced => "replaced",
            Self::Retained => "retained",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthoritativeCollision {
    pub signature: Signature,
    pub earlier_id: String,
    pub later_id: String,
    pub resolution: CollisionResolution,
}

#[derive(Debug, Clone)]
pub struct DuplicateMatch {
    pub dropped: RawTransaction,
    pub source_row_index: i64,
    pub matched_id: String,
    pub signature: Signature,
}

#[derive(Debug, Clone, Default)]
pub struct DedupeOutcome {
    pub records: Vec<RawTransaction>,
    pub authoritative_count: usize,
    pub secondary_count: usize,
    pub duplicates: Vec<DuplicateMatch>,
    pub collisions: Vec<AuthoritativeCollision>,
}

impl DedupeOutcome {
    pub fn retained_secondary_count(&self) -> usize {
        self.secondary_count - self.duplicates.len()
    }
}

/// Drops imported records that restate an API record, newest first.
///
/// Partitioning happens here from the records themselves, so callers pass
/// the full in-scope list. Only API-versus-imported collisions are resolved;
/// repeats inside the imported set survive untouched.
pub fn deduplicate(records: Vec<RawTransaction>, policy: CollisionPolicy) -> DedupeOutcome {
    let mut authoritative_slots: Vec<RawTransaction> = Vec::new();
    let mut slot_by_signature: HashMap<Signature, usize> = HashMap::new();
    let mut secondary: Vec<(i64, RawTransaction)> = Vec::new();
    let mut collisions = Vec::new();
    let mut authoritative_count = 0;

    for (index, record) in records.into_iter().enumerate() {
        let source_row_index = (index as i64) + 1;
        if !data_source_of(&record).is_authoritative() {
            secondary.push((source_row_index, record));
            continue;
        }

        authoritative_count += 1;
        let signature = Signature::of(&record);
        let Some(&slot) = slot_by_signature.get(&signature) else {
            slot_by_signature.insert(signature, authoritative_slots.len());
            authoritative_slots.push(record);
            continue;
        };

        let earlier_id = authoritative_slots[slot].id.clone();
        let resolution = match policy {
            CollisionPolicy::KeepDistinctIds
                if !earlier_id.is_empty() && !record.id.is_empty() && earlier_id != record.id =>
            {
                CollisionResolution::Retained
            }
            _ => CollisionResolution::Replaced,
        };
        warn!(
            earlier_id = earlier_id.as_str(),
            later_id = record.id.as_str(),
            resolution = resolution.as_str(),
            "api records share a dedupe signature"
        );
        collisions.push(AuthoritativeCollision {
            signature,
            earlier_id,
            later_id: record.id.clone(),
            resolution,
        });
        match resolution {
            CollisionResolution::Replaced => authoritative_slots[slot] = record,
            CollisionResolution::Retained => authoritative_slots.push(record),
        }
    }

    let secondary_count = secondary.len();
    let mut retained = Vec::new();
    let mut duplicates = Vec::new();
    for (source_row_index, record) in secondary {
        let signature = Signature::of(&record);
        if let Some(&slot) = slot_by_signature.get(&signature) {
            debug!(
                dropped_id = record.id.as_str(),
                matched_id = authoritative_slots[slot].id.as_str(),
                "dropping imported duplicate"
            );
            duplicates.push(DuplicateMatch {
                matched_id: authoritative_slots[slot].id.clone(),
                dropped: record,
                source_row_index,
                signature,
            });
            continue;
        }
        retained.push(record);
    }

    let mut combined = authoritative_slots;
    combined.append(&mut retained);
    sort_newest_first(&mut combined);

    DedupeOutcome {
        records: combined,
        authoritative_count,
        secondary_count,
        duplicates,
        collisions,
    }
}

/// Stable descending sort on the ISO-8601 text; the fixed-width format
/// makes lexicographic order chronological.
pub fn sort_newest_first(records: &mut [RawTransaction]) {
    records.sort_by(|left, right| right.occurred_at.cmp(&left.occurred_at));
}
