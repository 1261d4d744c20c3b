// SPDX-License-Identifier: MIT

//! Narrow capability trait the Enforcement Evaluator depends on instead of
//! the full `Supervisor` type, breaking the Supervisor↔Evaluator cycle.

use async_trait::async_trait;
use umcc_core::ProcessName;

#[async_trait]
pub trait ProcessController: Send + Sync {
    async fn restart(&self, name: &ProcessName) -> bool;
    async fn quarantine(&self, name: &ProcessName) -> bool;
}
