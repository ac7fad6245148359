// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Surfaces routinely pad their content with a trailing line break or a leading
/// zero-width placeholder, so convergence is judged on trimmed text.
#[must_use]
pub fn trimmed_eq(lhs: &str, rhs: &str) -> bool { normalize(lhs) == normalize(rhs) }

/// `true` when the trimmed text is empty.
#[must_use]
pub fn is_blank(text: &str) -> bool { normalize(text).is_empty() }

fn normalize(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\u{200B}' || c == '\u{FEFF}')
}
