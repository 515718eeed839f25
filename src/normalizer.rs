use std::collections::HashSet;

/// Strips a leading numeric label prefix such as `"1. "` from a provider field
/// name: `"4. close"` becomes `"close"`, `"close"` stays as is.
pub fn normalize_label(label: &str) -> &str {
    let label = label.trim();
    match label.split_once(". ") {
        Some((prefix, rest))
            if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) =>
        {
            rest.trim()
        }
        _ => label,
    }
}

/// Splits a comma-separated symbol list, trimming and upper-casing each entry.
/// Blank entries and repeats are dropped; first-seen order is kept.
pub fn normalize_symbols(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    input
        .split(',')
        .map(|token| token.trim().to_uppercase())
        .filter(|symbol| !symbol.is_empty())
        .filter(|symbol| seen.insert(symbol.clone()))
        .collect()
}
