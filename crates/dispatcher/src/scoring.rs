// SPDX-License-Identifier: MIT

//! Weighted keyword scoring: each intent is scored
//! against a fixed table of primary/secondary/context keyword groups,
//! weighted 3.0 / 2.0 / 1.0.

use crate::intent::Intent;

pub const PRIMARY_WEIGHT: f64 = 3.0;
pub const SECONDARY_WEIGHT: f64 = 2.0;
pub const CONTEXT_WEIGHT: f64 = 1.0;

/// Highest score an utterance can reach against a single intent's table —
/// used to normalize raw scores into the confidence blend.
pub const MAX_TABLE_SCORE: f64 = PRIMARY_WEIGHT + SECONDARY_WEIGHT + CONTEXT_WEIGHT;

/// Below this raw score, a top match is not considered a real match at all.
pub const MATCH_THRESHOLD: f64 = 2.0;

struct Table {
    intent: Intent,
    primary: &'static [&'static str],
    secondary: &'static [&'static str],
    context: &'static [&'static str],
}

const TABLES: &[Table] = &[
    Table {
        intent: Intent::MakeExecutable,
        primary: &["chmod", "executable"],
        secondary: &["permissions", "perms"],
        context: &["run", "script"],
    },
    Table {
        intent: Intent::CreateSymlink,
        primary: &["symlink", "symlinks"],
        secondary: &["link", "linked"],
        context: &["shortcut", "alias"],
    },
    Table {
        intent: Intent::CreateFile,
        primary: &["create", "touch"],
        secondary: &["new", "add"],
        context: &["file", "files"],
    },
    Table {
        intent: Intent::EditFile,
        primary: &["edit", "modify"],
        secondary: &["update", "change"],
        context: &["file", "files"],
    },
    Table {
        intent: Intent::Build,
        primary: &["build", "compile"],
        secondary: &["make", "assemble"],
        context: &["everything", "all", "project"],
    },
    Table {
        intent: Intent::InstallDependencies,
        primary: &["install", "dependencies"],
        secondary: &["deps", "packages"],
        context: &["everything", "all", "requirements"],
    },
    Table {
        intent: Intent::StartServers,
        primary: &["start", "launch"],
        secondary: &["boot", "up"],
        context: &["server", "servers", "everything", "all"],
    },
    Table {
        intent: Intent::StopServers,
        primary: &["stop", "shutdown"],
        secondary: &["halt", "down"],
        context: &["server", "servers", "everything", "all"],
    },
    Table {
        intent: Intent::SystemStatus,
        primary: &["status"],
        secondary: &["check", "health"],
        context: &["system"],
    },
    Table {
        intent: Intent::Cleanup,
        primary: &["cleanup", "clean"],
        secondary: &["purge", "prune"],
        context: &["everything", "all", "tmp", "cache"],
    },
    Table {
        intent: Intent::Deploy,
        primary: &["deploy", "deployment"],
        secondary: &["release", "ship"],
        context: &["production", "prod", "staging"],
    },
    Table {
        intent: Intent::Configure,
        primary: &["configure", "config"],
        secondary: &["set", "setting"],
        context: &["option", "options"],
    },
    Table {
        intent: Intent::Help,
        primary: &["help"],
        secondary: &["usage", "commands"],
        context: &["how", "what"],
    },
];

fn group_score(tokens: &[&str], words: &[&str], weight: f64) -> f64 {
    if tokens.iter().any(|t| words.contains(t)) {
        weight
    } else {
        0.0
    }
}

fn group_matched(tokens: &[&str], words: &[&str]) -> bool {
    tokens.iter().any(|t| words.contains(t))
}

/// Raw score for a single intent against the tokenized utterance.
pub fn score(intent: Intent, tokens: &[&str]) -> f64 {
    let Some(table) = TABLES.iter().find(|t| t.intent == intent) else {
        return 0.0;
    };
    group_score(tokens, table.primary, PRIMARY_WEIGHT)
    + group_score(tokens, table.secondary, SECONDARY_WEIGHT)
    + group_score(tokens, table.context, CONTEXT_WEIGHT)
}

/// How many of the intent's three keyword groups (primary/secondary/context)
/// the utterance matched — independent of named-entity extraction, this is
/// the scoring pass's own signal of how specific a match is.
pub fn matched_group_count(intent: Intent, tokens: &[&str]) -> usize {
    let Some(table) = TABLES.iter().find(|t| t.intent == intent) else {
        return 0;
    };
    [table.primary, table.secondary, table.context]
    .iter()
    .filter(|words| group_matched(tokens, words))
    .count()
}

/// Scores every intent in the closed taxonomy, returning `(intent, score)`
/// pairs in table-declaration order.
pub fn score_all(tokens: &[&str]) -> Vec<(Intent, f64)> {
    Intent::ALL.iter().map(|&intent| (intent, score(intent, tokens))).collect()
}
