//! Mastery-first item ranking
//!
//! Scores each candidate item by the learner's mastery of its skill
//! and returns the lowest-mastery items first, ties broken by item id
//! ascending. Ranking is fully deterministic; there is no random
//! tie-break.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::ItemRecord;

/// Read-only mastery query capability.
///
/// One method, one contract: an estimate in [0, 1], never failing.
pub trait MasteryProvider {
    fn mastery(&self, learner_id: &str, skill_id: &str) -> f64;
}

/// One entry of a candidate set.
///
/// Candidates arrive either as a bare item id (resolved through the
/// catalog) or as a full JSON row carrying at least `itemId` and
/// `skillId`. Rows that fit neither shape are dropped during pooling,
/// never surfaced as errors.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Candidate {
    BareId(String),
    Record(Value),
}

/// Deterministic top-k ranker over a read-only item catalog.
///
/// Holds no mastery state of its own; every ranking call borrows a
/// [`MasteryProvider`] and performs read-only queries against it.
#[derive(Clone, Debug, Default)]
pub struct Recommender {
    catalog: HashMap<String, ItemRecord>,
}

impl Recommender {
    /// Build a ranker over a catalog. Items with duplicate ids keep
    /// the first occurrence.
    pub fn new(catalog: impl IntoIterator<Item = ItemRecord>) -> Self {
        let mut map = HashMap::new();
        for item in catalog {
            map.entry(item.item_id.clone()).or_insert(item);
        }
        Self { catalog: map }
    }

    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }

    /// Rank candidates for a learner and return at most `k` items,
    /// lowest mastery first, ties broken by item id ascending.
    ///
    /// `candidates = None` means "use the full catalog". Malformed
    /// rows and duplicates are dropped during pooling; an empty pool
    /// or `k = 0` yields an empty list. Returned records are copies:
    /// neither the catalog nor the mastery provider is mutated.
    pub fn next_items(
        &self,
        mastery: &impl MasteryProvider,
        learner_id: &str,
        candidates: Option<&[Candidate]>,
        k: usize,
    ) -> Vec<ItemRecord> {
        let pool = match candidates {
            None => self.full_catalog_pool(),
            Some(rows) => self.candidate_pool(rows),
        };
        if pool.is_empty() || k == 0 {
            return Vec::new();
        }

        // One mastery lookup per distinct skill: items sharing a skill
        // must see one consistent score within a call.
        let mut skill_scores: HashMap<String, f64> = HashMap::new();
        let mut scored: Vec<(f64, ItemRecord)> = pool
            .into_iter()
            .map(|item| {
                let score = *skill_scores
                    .entry(item.skill_id.clone())
                    .or_insert_with(|| mastery.mastery(learner_id, &item.skill_id));
                (score, item)
            })
            .collect();

        scored.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then_with(|| a.1.item_id.cmp(&b.1.item_id))
        });
        scored.truncate(k);
        scored.into_iter().map(|(_, item)| item).collect()
    }

    fn full_catalog_pool(&self) -> Vec<ItemRecord> {
        let mut pool: Vec<ItemRecord> = self.catalog.values().cloned().collect();
        pool.sort_by(|a, b| a.item_id.cmp(&b.item_id));
        pool
    }

    /// Validate, resolve, and deduplicate one candidate set.
    ///
    /// Bare ids resolve through the catalog; an unknown bare id has no
    /// skill association and is dropped. Record rows merge on top of
    /// their catalog entry (row fields win). Duplicate item ids
    /// collapse to the first occurrence.
    fn candidate_pool(&self, rows: &[Candidate]) -> Vec<ItemRecord> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut pool: Vec<ItemRecord> = Vec::with_capacity(rows.len());

        for row in rows {
            let resolved = match row {
                Candidate::BareId(id) => self.catalog.get(id.as_str()).cloned(),
                Candidate::Record(value) => self.resolve_record(value),
            };
            let Some(item) = resolved else {
                continue;
            };
            if seen.insert(item.item_id.clone()) {
                pool.push(item);
            }
        }
        pool
    }

    fn resolve_record(&self, value: &Value) -> Option<ItemRecord> {
        let row = ItemRecord::from_value(value)?;
        let Some(base) = self.catalog.get(&row.item_id) else {
            return Some(row);
        };

        let mut merged = base.clone();
        merged.skill_id = row.skill_id;
        for (key, val) in row.metadata {
            merged.metadata.insert(key, val);
        }
        Some(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bkt::BktModel;
    use crate::types::BktParams;
    use serde_json::json;

    fn sample_catalog() -> Vec<ItemRecord> {
        vec![
            ItemRecord::new("i1", "add").with_metadata("difficulty", json!(0.4)),
            ItemRecord::new("i2", "add").with_metadata("difficulty", json!(0.6)),
            ItemRecord::new("i3", "sub").with_metadata("difficulty", json!(0.7)),
        ]
    }

    fn record(value: Value) -> Candidate {
        Candidate::Record(value)
    }

    #[test]
    fn ranks_low_mastery_first_and_tiebreaks_by_id() {
        let mut model = BktModel::new(BktParams::default());
        model.update("u1", "sub", true); // sub rises to ~0.6, add stays at the 0.2 prior

        let recommender = Recommender::new(sample_catalog());
        let out = recommender.next_items(&model, "u1", None, 3);
        let ids: Vec<&str> = out.iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(ids, ["i1", "i2", "i3"]);
    }

    #[test]
    fn candidate_rows_override_catalog_order() {
        let mut model = BktModel::new(BktParams::default());
        model.update("u1", "sub", true);

        let recommender = Recommender::new(Vec::new());
        let rows = vec![
            record(json!({"itemId": "i2", "skillId": "add"})),
            record(json!({"itemId": "i1", "skillId": "add"})),
            record(json!({"itemId": "i3", "skillId": "sub"})),
        ];
        let out = recommender.next_items(&model, "u1", Some(&rows), 2);
        let ids: Vec<&str> = out.iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(ids, ["i1", "i2"]);
    }

    #[test]
    fn malformed_rows_are_dropped_silently() {
        let model = BktModel::new(BktParams::default());
        let recommender = Recommender::new(Vec::new());
        let rows = vec![
            record(json!({"skillId": "add"})),
            record(json!({"itemId": "i1"})),
            record(json!(null)),
        ];
        assert!(recommender.next_items(&model, "uX", Some(&rows), 5).is_empty());
    }

    #[test]
    fn empty_candidates_and_zero_k_yield_empty_lists() {
        let model = BktModel::new(BktParams::default());
        let recommender = Recommender::new(sample_catalog());
        assert!(recommender.next_items(&model, "uX", Some(&[]), 5).is_empty());
        assert!(recommender.next_items(&model, "uX", None, 0).is_empty());
    }

    #[test]
    fn bare_ids_resolve_through_the_catalog() {
        let model = BktModel::new(BktParams::default());
        let recommender = Recommender::new(sample_catalog());
        let rows = vec![
            Candidate::BareId("i3".to_string()),
            Candidate::BareId("unknown".to_string()),
            Candidate::BareId("i1".to_string()),
        ];
        let out = recommender.next_items(&model, "uX", Some(&rows), 5);
        let ids: Vec<&str> = out.iter().map(|i| i.item_id.as_str()).collect();
        // unknown id carries no skill and is dropped; survivors share the
        // prior score so the id tie-break orders them
        assert_eq!(ids, ["i1", "i3"]);
        assert_eq!(out[0].metadata.get("difficulty"), Some(&json!(0.4)));
    }

    #[test]
    fn duplicate_ids_collapse_to_the_first_occurrence() {
        let model = BktModel::new(BktParams::default());
        let recommender = Recommender::new(Vec::new());
        let rows = vec![
            record(json!({"itemId": "i1", "skillId": "add", "difficulty": 0.3})),
            record(json!({"itemId": "i1", "skillId": "sub", "difficulty": 0.9})),
        ];
        let out = recommender.next_items(&model, "uX", Some(&rows), 5);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].skill_id, "add");
        assert_eq!(out[0].metadata.get("difficulty"), Some(&json!(0.3)));
    }

    #[test]
    fn record_rows_merge_catalog_metadata_with_row_fields_winning() {
        let model = BktModel::new(BktParams::default());
        let recommender = Recommender::new(vec![ItemRecord::new("i1", "add")
            .with_metadata("difficulty", json!(0.4))
            .with_metadata("topic", json!("arithmetic"))]);
        let rows = vec![record(json!({"itemId": "i1", "skillId": "add", "difficulty": 0.9}))];
        let out = recommender.next_items(&model, "uX", Some(&rows), 1);
        assert_eq!(out[0].metadata.get("difficulty"), Some(&json!(0.9)));
        assert_eq!(out[0].metadata.get("topic"), Some(&json!("arithmetic")));
    }

    #[test]
    fn ranking_is_idempotent_within_a_call_window() {
        let mut model = BktModel::new(BktParams::default());
        model.update("u1", "sub", true);
        let recommender = Recommender::new(sample_catalog());

        let first = recommender.next_items(&model, "u1", None, 3);
        let second = recommender.next_items(&model, "u1", None, 3);
        assert_eq!(first, second);
    }

    #[test]
    fn mixed_bare_ids_and_records_pool_together() {
        let model = BktModel::new(BktParams::default());
        let recommender = Recommender::new(sample_catalog());
        let rows = vec![
            Candidate::BareId("i3".to_string()),
            record(json!({"itemId": "i9", "skillId": "mul"})),
        ];
        let out = recommender.next_items(&model, "uX", Some(&rows), 5);
        let ids: Vec<&str> = out.iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(ids, ["i3", "i9"]);
    }

    #[test]
    fn items_sharing_a_skill_see_one_score_per_call() {
        // A provider that changes its answer between lookups would
        // reorder same-skill items; the per-call cache prevents that.
        struct Flapping(std::cell::Cell<u32>);
        impl MasteryProvider for Flapping {
            fn mastery(&self, _: &str, _: &str) -> f64 {
                let n = self.0.get();
                self.0.set(n + 1);
                if n % 2 == 0 {
                    0.1
                } else {
                    0.9
                }
            }
        }

        let recommender = Recommender::new(Vec::new());
        let rows = vec![
            record(json!({"itemId": "a", "skillId": "add"})),
            record(json!({"itemId": "b", "skillId": "add"})),
            record(json!({"itemId": "c", "skillId": "sub"})),
        ];
        let out = recommender.next_items(&Flapping(std::cell::Cell::new(0)), "u", Some(&rows), 3);
        let ids: Vec<&str> = out.iter().map(|i| i.item_id.as_str()).collect();
        // add scored once (0.1), sub once (0.9)
        assert_eq!(ids, ["a", "b", "c"]);
    }
}
