// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::sync::LazyLock;

use regex::Regex;

use super::EditingSurface;

/// A `<br>` that closes a block is the placeholder of an empty line, so it and the block
/// end count as one break.
static BLOCK_BREAK: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>\s*</(p|div|li|h[1-6])>|<br\s*/?>|</(p|div|li|h[1-6])>").ok()
});
static ANY_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^>]*>").ok());

/// Best effort flattened text of `surface`. Falls back from the direct text property, to
/// the rendered text, to stripping the markup, and finally to an empty string. Never
/// panics.
///
/// A strategy that yields an empty string falls through to the next one, since some
/// surfaces keep the direct text property empty while content lives in nested nodes. When
/// the direct text property is present but empty, markup holding nothing but line breaks
/// reads as empty.
pub fn read_text(surface: &dyn EditingSurface) -> String {
    let direct = surface.text_content();
    if let Some(it) = direct.as_ref().filter(|it| !it.is_empty()) {
        return it.clone();
    }
    if let Some(it) = surface.rendered_text().filter(|it| !it.is_empty()) {
        return it;
    }
    let from_markup = surface
        .markup()
        .map(|it| strip_markup(&it))
        .unwrap_or_default();
    if direct.is_some() && from_markup.chars().all(|ch| ch == '\n') {
        return String::new();
    }
    from_markup
}

/// Convert markup to plain text: block ends and `<br>` become line breaks, other tags are
/// dropped, and the common entities are decoded.
#[must_use]
pub fn strip_markup(markup: &str) -> String {
    let with_breaks = match BLOCK_BREAK.as_ref() {
        Some(re) => re.replace_all(markup, "\n").into_owned(),
        None => markup.to_string(),
    };
    let without_tags = match ANY_TAG.as_ref() {
        Some(re) => re.replace_all(&with_breaks, "").into_owned(),
        None => with_breaks,
    };
    let decoded = decode_entities(&without_tags);
    decoded.strip_suffix('\n').unwrap_or(&decoded).to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
