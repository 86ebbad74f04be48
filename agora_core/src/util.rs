//! Small text helpers shared by prompt building and the CLI.

/// Cut `text` to at most `max_chars` characters, appending `...` when
/// something was dropped. Counts `char`s, never splits a code point.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Mask a secret for display, keeping four characters on each side.
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return "(not set)".to_string();
    }
    if count <= 8 {
        return "***".to_string();
    }
    let head: String = secret.chars().take(4).collect();
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{head}...{tail}")
}
