/// Trim, lowercase, and collapse internal whitespace. Stored alongside the
/// raw description/counterparty/account columns for future matching; also
/// embedded in reconciliation notes.
pub fn normalize_text(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Take the first `n` characters of `s`. Descriptions are Thai text, so this
/// must count chars, not bytes.
pub fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
