// SPDX-License-Identifier: MIT

//! Regex-based entity extraction over the same token stream the scoring
//! pass sees. Kept deliberately small and closed: the
//! dispatcher never learns new entity kinds at runtime.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    pub services: Vec<String>,
    pub environments: Vec<String>,
    pub components: Vec<String>,
    pub resources: Vec<String>,
}

impl Entities {
    pub fn count(&self) -> usize {
        self.services.len() + self.environments.len() + self.components.len() + self.resources.len()
    }
}

#[allow(clippy::expect_used)]
fn service_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
            Regex::new(r"(?i)\b(backend|frontend|proxy|database|db|cache)\b")
            .expect("constant regex pattern is valid")
    })
}

#[allow(clippy::expect_used)]
fn environment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
            Regex::new(r"(?i)\b(production|prod|staging|development|dev|test)\b")
            .expect("constant regex pattern is valid")
    })
}

#[allow(clippy::expect_used)]
fn component_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
            Regex::new(r"(?i)\b(scheduler|supervisor|evaluator|dispatcher|probe)\b")
            .expect("constant regex pattern is valid")
    })
}

/// Matches a file-like path (`foo.rs`, `config/app.toml`) — not the generic
/// quantifiers "everything"/"all", which score as `Build`/`StartServers`/…
/// context keywords (see `scoring::TABLES`) but name no concrete resource.
#[allow(clippy::expect_used)]
fn resource_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
            Regex::new(r"(?i)\b([\w./-]+\.[a-z0-9]{1,6})\b")
            .expect("constant regex pattern is valid")
    })
}

fn dedup_lowercase_matches(re: &Regex, utterance: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for m in re.find_iter(utterance) {
        let value = m.as_str().to_lowercase();
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

/// Extracts entities from the raw utterance (not the lowercased token list
/// used for scoring, so file paths keep their original case).
pub fn extract(utterance: &str) -> Entities {
    Entities {
        services: dedup_lowercase_matches(service_re(), utterance),
        environments: dedup_lowercase_matches(environment_re(), utterance),
        components: dedup_lowercase_matches(component_re(), utterance),
        resources: dedup_lowercase_matches(resource_re(), utterance),
    }
}
