//! In-process mastery engine.
//!
//! Wraps the pure BKT model behind one async `RwLock` so concurrent
//! requests are serialized per the shared-state contract: updates take
//! the write lock, queries and ranking take the read lock. Ranking
//! therefore always observes a consistent snapshot of mastery state.

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use learntwin_algo::{BktModel, BktParams, Candidate, ItemRecord, Recommender};

pub struct MasteryService {
    model: RwLock<BktModel>,
    recommender: Recommender,
}

impl MasteryService {
    pub fn new(params: BktParams, catalog: Vec<ItemRecord>) -> Self {
        Self {
            model: RwLock::new(BktModel::new(params)),
            recommender: Recommender::new(catalog),
        }
    }

    pub fn catalog_len(&self) -> usize {
        self.recommender.catalog_len()
    }

    pub async fn params(&self) -> BktParams {
        *self.model.read().await.params()
    }

    pub async fn get_mastery(&self, learner_id: &str, skill_id: &str) -> f64 {
        self.model.read().await.get_mastery(learner_id, skill_id)
    }

    pub async fn learner_snapshot(&self, learner_id: &str) -> BTreeMap<String, f64> {
        self.model.read().await.learner_snapshot(learner_id)
    }

    /// Apply one observation and return the new estimate.
    pub async fn record_observation(
        &self,
        learner_id: &str,
        skill_id: &str,
        correct: bool,
    ) -> f64 {
        self.model.write().await.update(learner_id, skill_id, correct)
    }

    pub async fn next_items(
        &self,
        learner_id: &str,
        candidates: Option<&[Candidate]>,
        k: usize,
    ) -> Vec<ItemRecord> {
        let model = self.model.read().await;
        self.recommender
            .next_items(&*model, learner_id, candidates, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service_with_catalog() -> MasteryService {
        MasteryService::new(
            BktParams::default(),
            vec![
                ItemRecord::new("i1", "add").with_metadata("difficulty", json!(0.4)),
                ItemRecord::new("i2", "add").with_metadata("difficulty", json!(0.6)),
                ItemRecord::new("i3", "sub").with_metadata("difficulty", json!(0.7)),
            ],
        )
    }

    #[tokio::test]
    async fn observations_move_the_estimate_and_the_ranking() {
        let service = service_with_catalog();
        assert_eq!(service.get_mastery("u1", "sub").await, 0.2);

        let after = service.record_observation("u1", "sub", true).await;
        assert!((after - 0.6).abs() < 1e-9);

        let items = service.next_items("u1", None, 3).await;
        let ids: Vec<&str> = items.iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(ids, ["i1", "i2", "i3"]);
    }

    #[tokio::test]
    async fn snapshot_lists_only_tracked_skills() {
        let service = service_with_catalog();
        service.record_observation("u1", "add", false).await;
        service.record_observation("u1", "sub", true).await;
        service.record_observation("u2", "mul", true).await;

        let snapshot = service.learner_snapshot("u1").await;
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains_key("add"));
        assert!(snapshot.contains_key("sub"));
    }
}
