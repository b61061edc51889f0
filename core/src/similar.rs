//! "Did you mean" ranking for key names.

use std::collections::HashSet;

const CONTAINMENT_BONUS: usize = 100;
const PREFIX_BONUS: usize = 50;
const PER_CHARACTER: usize = 2;

/// Ranks `candidates` against `query` and returns at most `max_results`
/// distinct names, best first. Equal scores keep candidate order.
pub fn find_similar<S>(query: &str, candidates: &[S], max_results: usize) -> Vec<String>
where
    S: AsRef<str>,
{
    let query = query.trim().to_lowercase();
    if query.is_empty() || max_results == 0 {
        return Vec::new();
    }
    let threshold = PER_CHARACTER * query.chars().count();

    let mut scored: Vec<(usize, &str)> = candidates
        .iter()
        .map(S::as_ref)
        .filter_map(|candidate| {
            let score = similarity_score(&query, &candidate.to_lowercase());
            (score >= threshold).then_some((score, candidate))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut seen = HashSet::new();
    scored
        .into_iter()
        .filter(|(_, candidate)| seen.insert(*candidate))
        .take(max_results)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}

/// Score of an already lowercased `candidate` against a lowercased `query`.
pub fn similarity_score(query: &str, candidate: &str) -> usize {
    let mut score = 0;
    if candidate.contains(query) || query.contains(candidate) {
        score += CONTAINMENT_BONUS;
    }
    score += PER_CHARACTER * aligned_characters(query, candidate);
    if shares_prefix(query, candidate) {
        score += PREFIX_BONUS;
    }
    score
}

/// Greedy one-to-one alignment: each query character is matched against the
/// first unused candidate character at or after the previous match.
fn aligned_characters(query: &str, candidate: &str) -> usize {
    let candidate = candidate.chars().collect::<Vec<_>>();
    let mut cursor = 0;
    let mut matched = 0;
    for ch in query.chars() {
        if let Some(offset) = candidate[cursor..].iter().position(|c| *c == ch) {
            matched += 1;
            cursor += offset + 1;
        }
    }
    matched
}

fn shares_prefix(query: &str, candidate: &str) -> bool {
    let len = query.chars().count().min(candidate.chars().count());
    query.chars().take(len).eq(candidate.chars().take(len))
}
