// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Enforcement Evaluator and Improvement Loop.
//!
//! The [`Evaluator`] is a pure, stateless classifier: sample + thresholds in,
//! [`umcc_core::Verdict`] out. The [`ImprovementLoop`] is the only component
//! that mutates the active threshold set, applying the tighten/relax/reset
//! rules and persisting the result through `umcc_storage::StateStore`.
//! [`ReactionPolicy`] closes the loop back to the Supervisor through the
//! narrow [`umcc_supervisor::ProcessController`] trait rather than a direct
//! dependency, so the evaluator crate stays decoupled from supervisor
//! internals.

mod evaluator;
mod improvement;
mod reaction;

pub use evaluator::Evaluator;
pub use improvement::{ImprovementLoop, ThresholdChange};
pub use reaction::ReactionPolicy;
