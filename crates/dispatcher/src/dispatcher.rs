// SPDX-License-Identifier: MIT

//! Entry point for the closed-world NL Command Dispatcher.
//! [`Dispatcher::classify`] is a pure function of its input string — the
//! same utterance always yields the same `intent_tag` and resolved
//! [`Operation`], since neither scoring nor entity
//! extraction consult any mutable state.

use crate::entities::{self, Entities};
use crate::intent::Intent;
use crate::operation::{self, Operation};
use crate::scoring::{self, MATCH_THRESHOLD, MAX_TABLE_SCORE};
use serde::{Deserialize, Serialize};

/// The token required inline in the utterance before a dissolution-class
/// operation resolves.
pub const CONFIRM_TOKEN: &str = "--confirm";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub utterance: String,
    pub intent: Intent,
    pub confidence: f64,
    pub entities: Entities,
    /// `None` for `unknown` intents, or a dissolution-class intent missing
    /// its confirmation token.
    pub operation: Option<Operation>,
}

impl DispatchResult {
    pub fn intent_tag(&self) -> &'static str {
        self.intent.as_str()
    }
}

fn tokenize(utterance: &str) -> Vec<String> {
    utterance
    .to_lowercase()
    .split(|c: char| !c.is_alphanumeric() && c != '-')
    .filter(|t| !t.is_empty())
    .map(|t| t.to_string())
    .collect()
}

/// Blend of top score, entity count, matched-keyword-group richness, and a
/// penalty for single-word utterances, normalized into `[0.0, 1.0]`.
/// `matched_groups` (how many of the winning intent's primary/secondary/
/// context groups matched) is a distinct signal from `entity_count` (named
/// services/environments/components/resources extracted) — an utterance
/// can read as a confident, specific match against its intent's table
/// without naming any concrete entity at all, e.g. "build everything".
fn confidence(top_score: f64, matched_groups: usize, entity_count: usize, token_count: usize) -> f64 {
    let base = (top_score / MAX_TABLE_SCORE).min(1.0);
    let richness_bonus = if matched_groups >= 2 { 0.1 } else { 0.0 };
    let entity_bonus = (entity_count as f64 * 0.1).min(0.3);
    let mut blended = (base + richness_bonus + entity_bonus).min(1.0);
    if token_count <= 1 {
        blended *= 0.5;
    }
    blended
}

#[derive(Default)]
pub struct Dispatcher;

impl Dispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Tokenizes the utterance, scores every intent in the closed taxonomy,
    /// extracts entities, picks a winner (or `unknown` on a tie or a
    /// below-threshold top score), resolves to an `Operation`, and gates
    /// dissolution-class operations on the `--confirm` token.
    pub fn classify(&self, utterance: &str) -> DispatchResult {
        let owned_tokens = tokenize(utterance);
        let tokens: Vec<&str> = owned_tokens.iter().map(String::as_str).collect();
        let scores = scoring::score_all(&tokens);
        let entities = entities::extract(utterance);

        let intent = winning_intent(&scores);
        let top_score = scores
        .iter()
        .find(|(i, _)| *i == intent)
        .map(|(_, s)| *s)
        .unwrap_or(0.0);
        let matched_groups = scoring::matched_group_count(intent, &tokens);

        let mut operation = operation::resolve(intent, &entities);
        if let Some(op) = &operation {
            if op.kind.requires_confirmation() && !utterance.contains(CONFIRM_TOKEN) {
                operation = None;
            }
        }

        DispatchResult {
            utterance: utterance.to_string(),
            intent,
            confidence: confidence(top_score, matched_groups, entities.count(), tokens.len()),
            entities,
            operation,
        }
    }
}

/// Highest-scoring intent, or `unknown` if the top score is below
/// [`MATCH_THRESHOLD`] or more than one intent ties for first.
fn winning_intent(scores: &[(Intent, f64)]) -> Intent {
    let top = scores.iter().map(|(_, s)| *s).fold(f64::MIN, f64::max);
    if top < MATCH_THRESHOLD {
        return Intent::Unknown;
    }
    let winners: Vec<Intent> = scores
    .iter()
    .filter(|(_, s)| *s == top)
    .map(|(i, _)| *i)
    .collect();
    match winners.as_slice() {
        [only] => *only,
        _ => Intent::Unknown,
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
