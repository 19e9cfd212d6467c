//! Bayesian Knowledge Tracing
//!
//! Two-step update: Bayes rule on the observation likelihood, then a
//! fixed-probability learning transition. No smoothing, decay, or
//! regularization beyond the numeric clamps.

use std::collections::{BTreeMap, HashMap};

use crate::recommender::MasteryProvider;
use crate::types::{clamp_probability, BktParams};

/// Per-(learner, skill) mastery state machine.
///
/// State is created lazily on first update and never deleted; an
/// unseen pair reads back the configured prior exactly. The model is
/// the sole owner of the state map — callers mutate it only through
/// [`BktModel::update`].
#[derive(Clone, Debug)]
pub struct BktModel {
    params: BktParams,
    state: HashMap<(String, String), f64>,
}

impl BktModel {
    pub fn new(params: BktParams) -> Self {
        Self {
            params,
            state: HashMap::new(),
        }
    }

    pub fn params(&self) -> &BktParams {
        &self.params
    }

    /// Current mastery estimate for one (learner, skill) pair.
    ///
    /// Pure read: returns the prior for pairs that have never been
    /// observed and never creates state.
    pub fn get_mastery(&self, learner_id: &str, skill_id: &str) -> f64 {
        self.state
            .get(&(learner_id.to_string(), skill_id.to_string()))
            .copied()
            .unwrap_or(self.params.prior)
    }

    /// Apply one observation and return the new mastery estimate.
    ///
    /// Only the single (learner, skill) entry is touched. The result
    /// always lies in `[EPSILON, 1 - EPSILON]`.
    pub fn update(&mut self, learner_id: &str, skill_id: &str, correct: bool) -> f64 {
        let p = clamp_probability(self.get_mastery(learner_id, skill_id));
        let slip = clamp_probability(self.params.slip);
        let guess = clamp_probability(self.params.guess);
        let learn = clamp_probability(self.params.learn_rate);

        // Bayes rule on the observation likelihood. num <= den by
        // construction, so clamping den keeps the quotient in [0, 1]
        // and a zero denominator yields 0.
        let (num, den) = if correct {
            let num = p * (1.0 - slip);
            (num, num + (1.0 - p) * guess)
        } else {
            let num = p * slip;
            (num, num + (1.0 - p) * (1.0 - guess))
        };
        let posterior = num / clamp_probability(den);

        // Learning transition.
        let next = clamp_probability(posterior + (1.0 - posterior) * learn);
        self.state
            .insert((learner_id.to_string(), skill_id.to_string()), next);
        next
    }

    /// Every tracked skill for one learner, with its current estimate.
    ///
    /// Sorted by skill id so snapshots serialize deterministically.
    pub fn learner_snapshot(&self, learner_id: &str) -> BTreeMap<String, f64> {
        self.state
            .iter()
            .filter(|((learner, _), _)| learner == learner_id)
            .map(|((_, skill), mastery)| (skill.clone(), *mastery))
            .collect()
    }

    /// Number of (learner, skill) pairs with materialized state.
    pub fn tracked_pairs(&self) -> usize {
        self.state.len()
    }
}

impl MasteryProvider for BktModel {
    fn mastery(&self, learner_id: &str, skill_id: &str) -> f64 {
        self.get_mastery(learner_id, skill_id)
    }
}
