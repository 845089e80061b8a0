// SPDX-License-Identifier: MIT

//! Completeness: how many of the key terms in the user's request does the
//! final answer address?

use crate::adk::run::Run;
use crate::adk::scorer::{Analyze, PipelineScorer, Stages};
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

pub const NAME: &str = "Completeness";

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be",
        "been", "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has",
        "have", "how", "i", "if", "in", "into", "is", "it", "its", "just", "last", "me", "my",
        "of", "on", "or", "our", "please", "show", "so", "some", "than", "that", "the", "their",
        "them", "then", "there", "these", "they", "this", "to", "us", "was", "we", "were",
        "what", "when", "which", "who", "will", "with", "would", "you", "your",
    ]
    .into_iter()
    .collect()
});

/// Lowercased alphanumeric words (keeping `-` inside ids like `promo-1`)
/// minus stopwords, with a trailing plural `s` dropped.
pub fn key_terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .map(|w| w.trim_matches('-').to_lowercase())
        .filter(|w| w.chars().count() > 1 && !STOPWORDS.contains(w.as_str()))
        .map(|w| normalize(&w))
        .collect()
}

fn normalize(word: &str) -> String {
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessFacts {
    pub input_terms: BTreeSet<String>,
    pub output_terms: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompletenessJudgment {
    pub covered: Vec<String>,
    pub missing: Vec<String>,
}

pub fn preprocess(run: &Run) -> CompletenessFacts {
    CompletenessFacts {
        input_terms: key_terms(&run.input),
        output_terms: key_terms(run.final_response()),
    }
}

pub fn analyze(facts: &CompletenessFacts) -> CompletenessJudgment {
    let (covered, missing) = facts
        .input_terms
        .iter()
        .cloned()
        .partition(|term| facts.output_terms.contains(term));
    CompletenessJudgment { covered, missing }
}

/// Coverage ratio; a request with no key terms is trivially complete.
pub fn generate_score(judgment: &CompletenessJudgment) -> f64 {
    let total = judgment.covered.len() + judgment.missing.len();
    if total == 0 {
        return 1.0;
    }
    judgment.covered.len() as f64 / total as f64
}

pub fn generate_reason(judgment: &CompletenessJudgment, score: f64) -> String {
    let total = judgment.covered.len() + judgment.missing.len();
    if total == 0 {
        return format!("The input has no key terms to cover. Score={}.", score);
    }
    let mut reason = format!(
        "The response covers {} of {} key terms from the input. Score={:.2}.",
        judgment.covered.len(),
        total,
        score
    );
    if !judgment.missing.is_empty() {
        reason.push_str(&format!(" Missing: {}.", judgment.missing.join(", ")));
    }
    reason
}

pub fn completeness_scorer() -> PipelineScorer<CompletenessFacts, CompletenessJudgment> {
    PipelineScorer::new(
        NAME,
        "Measures how many key terms of the user input the final response addresses.",
        Stages {
            preprocess: Box::new(preprocess),
            analyze: Analyze::Code(Box::new(analyze)),
            generate_score,
            generate_reason,
        },
    )
}
