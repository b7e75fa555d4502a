//! Normalize free-text classifier answers onto the vocabulary

use tally_core::{Vocabulary, UNCATEGORIZED};

/// Strip a leading enumeration marker such as `"2. "`, `"10) "` or `"3: "`.
///
/// Only applies when the line starts with a digit.
pub fn clean_enumerated_line(line: &str) -> &str {
    let line = line.trim();
    if line.starts_with(|c: char| c.is_ascii_digit()) {
        line.trim_start_matches(|c: char| c.is_ascii_digit() || ".-): ".contains(c))
            .trim()
    } else {
        line
    }
}

/// Match a classifier response to a vocabulary entry.
///
/// Exact, then case-insensitive, then substring containment in either
/// direction. Anything else, including an empty answer, is the sentinel.
pub fn match_category(response: &str, vocabulary: &Vocabulary) -> String {
    let response = response.trim();
    if response.is_empty() {
        return UNCATEGORIZED.to_string();
    }

    if vocabulary.contains(response) {
        return response.to_string();
    }

    let lower = response.to_lowercase();
    if let Some(hit) = vocabulary.iter().find(|v| v.to_lowercase() == lower) {
        return hit.to_string();
    }

    vocabulary
        .iter()
        .find(|v| {
            let v = v.to_lowercase();
            lower.contains(&v) || v.contains(&lower)
        })
        .unwrap_or(UNCATEGORIZED)
        .to_string()
}
