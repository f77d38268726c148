use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::domain::curriculum::{CurriculumField, CurriculumOutcome};

pub const MAX_TOPICS: usize = 10;

/// Tokens need strictly more than this many characters.
const MIN_TOKEN_EXCLUSIVE: usize = 3;

const STOP_WORDS: &[&str] = &[
    "that", "this", "with", "from", "they", "have", "been", "were", "said", "each", "which",
    "their", "time", "will", "about", "would", "there", "could", "other",
];

/// Free-text fields scanned for keywords, in scan order.
const KEYWORD_SOURCES: [CurriculumField; 9] = [
    CurriculumField::ContentDescription,
    CurriculumField::Elaboration,
    CurriculumField::AchievementStandard,
    CurriculumField::Description,
    CurriculumField::LearningArea,
    CurriculumField::Subject,
    CurriculumField::Level,
    CurriculumField::Strand,
    CurriculumField::SubStrand,
];

static NON_WORD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s]").unwrap());

/// The keyword source fields joined by single spaces; missing fields
/// contribute an empty string.
pub fn keyword_text(outcome: &CurriculumOutcome) -> String {
    KEYWORD_SOURCES
        .iter()
        .map(|field| outcome.get(*field).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(" ")
}

/// First `limit` distinct qualifying tokens in document order. No stemming
/// and no frequency ranking.
pub fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = NON_WORD_PATTERN.replace_all(&lowered, " ");

    let mut seen = HashSet::new();
    cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() > MIN_TOKEN_EXCLUSIVE)
        .filter(|token| !STOP_WORDS.contains(token))
        // Repeated tokens count once, at their first position
        .filter(|token| seen.insert(*token))
        .take(limit)
        .map(str::to_string)
        .collect()
}

/// Author-supplied topics first, then extracted keywords, cut to
/// `MAX_TOPICS`. Keywords are not checked against author topics.
pub fn merge_topics(author_topics: Vec<String>, keywords: Vec<String>) -> Vec<String> {
    let mut topics = author_topics;
    topics.extend(keywords);
    topics.truncate(MAX_TOPICS);
    topics
}
