// src/services/matcher.rs

//! Fuzzy course matching.
//!
//! Resolves a user-supplied course name against the discovered catalog.
//! Matching never errors: an unmatched query yields an empty result and
//! the caller decides how to report it.

use std::cmp::Ordering;
use std::collections::HashSet;

use unicode_segmentation::UnicodeSegmentation;

use crate::models::{Course, MatcherConfig};

/// Find courses matching `query`, best match first.
///
/// Three tiers, each tried only when the previous finds nothing:
/// 1. exact name match (case-insensitive) short-circuits to a singleton;
/// 2. substring containment, shortest name first;
/// 3. token overlap above the configured threshold, best score first.
pub fn find_courses<'a>(
    courses: &'a [Course],
    query: &str,
    config: &MatcherConfig,
) -> Vec<&'a Course> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    let query_lower = query.to_lowercase();

    if let Some(course) = courses
        .iter()
        .find(|c| c.name.to_lowercase() == query_lower)
    {
        return vec![course];
    }

    let mut contained: Vec<&Course> = courses
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&query_lower))
        .collect();
    if !contained.is_empty() {
        contained.sort_by(|a, b| {
            a.name
                .len()
                .cmp(&b.name.len())
                .then_with(|| a.name.cmp(&b.name))
        });
        return contained;
    }

    let query_tokens = tokens(&query_lower);
    if query_tokens.is_empty() {
        return Vec::new();
    }
    let mut scored: Vec<(f64, &Course)> = courses
        .iter()
        .filter_map(|course| {
            let score = token_overlap(&query_tokens, &course.name.to_lowercase());
            (score >= config.min_token_overlap).then_some((score, course))
        })
        .collect();
    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.name.cmp(&b.1.name))
    });
    scored.into_iter().map(|(_, course)| course).collect()
}

/// Closest course names for a "not found" hint, best first.
pub fn suggest<'a>(courses: &'a [Course], query: &str, limit: usize) -> Vec<&'a Course> {
    let query_lower = query.trim().to_lowercase();
    if query_lower.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(f64, &Course)> = courses
        .iter()
        .map(|course| (match_score(&query_lower, &course.name.to_lowercase()), course))
        .filter(|(score, _)| *score > 0.0)
        .collect();
    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.name.cmp(&b.1.name))
    });
    scored
        .into_iter()
        .take(limit)
        .map(|(_, course)| course)
        .collect()
}

/// Loose similarity used only for suggestions: exact > containment >
/// shared tokens > shared characters.
fn match_score(query: &str, target: &str) -> f64 {
    if query == target {
        return 1.0;
    }
    if target.contains(query) || query.contains(target) {
        return 0.8;
    }

    let query_tokens: HashSet<&str> = query.unicode_words().collect();
    let target_tokens: HashSet<&str> = target.unicode_words().collect();
    if query_tokens.intersection(&target_tokens).next().is_some() {
        return 0.6;
    }

    let common = query.chars().filter(|c| target.contains(*c)).count();
    common as f64 / query.chars().count().max(target.chars().count()) as f64 * 0.4
}

fn tokens(text: &str) -> Vec<String> {
    text.unicode_words().map(str::to_string).collect()
}

/// Fraction of query tokens present in the candidate name.
fn token_overlap(query_tokens: &[String], name: &str) -> f64 {
    let name_tokens: HashSet<&str> = name.unicode_words().collect();
    let hits = query_tokens
        .iter()
        .filter(|t| name_tokens.contains(t.as_str()))
        .count();
    hits as f64 / query_tokens.len() as f64
}
