//! Common Types and Constants
//!
//! Shared data structures used across the algorithm modules.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ==================== Constants ====================

/// Numerical stability epsilon for probability clamping
pub const EPSILON: f64 = 1e-12;

/// Clamp a probability into `[EPSILON, 1 - EPSILON]`.
///
/// NaN collapses to the lower bound so a poisoned value can never
/// propagate through an update.
pub fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        EPSILON
    } else {
        p.clamp(EPSILON, 1.0 - EPSILON)
    }
}

// ==================== BKT Types ====================

/// Bayesian Knowledge Tracing model parameters.
///
/// Immutable after construction and shared by every (learner, skill)
/// pair tracked by one model instance. All four values are
/// probabilities in [0, 1]; degenerate values are clamped at use.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BktParams {
    /// Initial mastery assumed before any observation
    pub prior: f64,
    /// Probability of transitioning to mastered after an observation
    pub learn_rate: f64,
    /// Probability of an incorrect response despite mastery
    pub slip: f64,
    /// Probability of a correct response despite non-mastery
    pub guess: f64,
}

impl Default for BktParams {
    fn default() -> Self {
        Self {
            prior: 0.2,
            learn_rate: 0.15,
            slip: 0.1,
            guess: 0.2,
        }
    }
}

// ==================== Item Types ====================

/// A rankable learning item: a required id, a required skill
/// association, and arbitrary passthrough metadata (difficulty,
/// display fields, ...) that the ranker never interprets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub item_id: String,
    pub skill_id: String,
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, Value>,
}

impl ItemRecord {
    pub fn new(item_id: impl Into<String>, skill_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            skill_id: skill_id.into(),
            metadata: serde_json::Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Parse a loose JSON row into an item record.
    ///
    /// Returns `None` when the row is not an object or lacks a
    /// non-empty `itemId` or `skillId`; callers drop such rows.
    pub fn from_value(value: &Value) -> Option<Self> {
        let record: Self = serde_json::from_value(value.clone()).ok()?;
        if record.item_id.is_empty() || record.skill_id.is_empty() {
            return None;
        }
        Some(record)
    }
}
