//! # learntwin-algo - learner modeling core
//!
//! Pure Rust implementations of the two algorithms behind the learntwin
//! service:
//!
//! - **Bayesian Knowledge Tracing** - per-(learner, skill) mastery
//!   estimation from a stream of correct/incorrect observations
//! - **Mastery-first ranking** - deterministic top-k item selection,
//!   weakest skills surfaced first
//!
//! The crate is synchronous and does no I/O; persistence and transport
//! belong to the service layer that embeds it.
//!
//! ## Modules
//!
//! - [`types`] - model parameters, item records, numeric constants
//! - [`bkt`] - the BKT state machine ([`BktModel`])
//! - [`recommender`] - candidate parsing and ranking ([`Recommender`])
//!
//! ## Example
//!
//! ```rust
//! use learntwin_algo::{BktModel, BktParams, Recommender};
//!
//! let mut model = BktModel::new(BktParams::default());
//! let mastery = model.update("u1", "add", true);
//! assert!(mastery > model.params().prior);
//!
//! let recommender = Recommender::new([]);
//! let items = recommender.next_items(&model, "u1", None, 5);
//! assert!(items.is_empty());
//! ```

pub mod bkt;
pub mod recommender;
pub mod types;

pub use bkt::BktModel;
pub use recommender::{Candidate, MasteryProvider, Recommender};
pub use types::{clamp_probability, BktParams, ItemRecord, EPSILON};
