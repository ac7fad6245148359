// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::time::Duration;

use strum_macros::Display;

use super::{KeystrokePath, SyncTimings, synthesize_keypress};
use crate::{DEBUG_EDITOR_SYNC_MOD, EditCommand, EditingSurface, InputType, SpecialKey,
            SurfaceEvent, keypress, pause, read_text};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum TypingMode {
    /// One synthesized keypress per character. Slow, but every host listener sees every
    /// character.
    CharByChar,
    /// One insert for the whole string. Falls back to [`TypingMode::CharByChar`] if the
    /// surface rejects it.
    Bulk,
}

/// Passed into each typing call, so a bulk replacement on one surface never changes the
/// pacing of a concurrent replacement on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingOptions {
    pub mode: TypingMode,
    pub char_delay: Duration,
}

impl Default for TypingOptions {
    fn default() -> Self {
        Self {
            mode: TypingMode::CharByChar,
            char_delay: SyncTimings::default().typing_delay,
        }
    }
}

impl TypingOptions {
    #[must_use]
    pub fn bulk() -> Self {
        Self {
            mode: TypingMode::Bulk,
            char_delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn char_by_char(char_delay: Duration) -> Self {
        Self {
            mode: TypingMode::CharByChar,
            char_delay,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingOutcome {
    /// The mode that actually produced the text.
    pub mode_used: TypingMode,
    pub chars_typed: usize,
    /// Keystrokes that needed a direct mutation.
    pub direct_fallbacks: usize,
    pub aborted: bool,
}

/// Type `text` into `surface` at the caret, then move the caret to the end and emit the
/// change notifications the host resyncs on. `should_abort` is checked before every
/// character.
pub async fn run_typing_cascade(
    surface: &dyn EditingSurface,
    text: &str,
    options: &TypingOptions,
    timings: &SyncTimings,
    should_abort: &(dyn Fn() -> bool + Send + Sync),
) -> TypingOutcome {
    let mut outcome = TypingOutcome {
        mode_used: TypingMode::CharByChar,
        chars_typed: 0,
        direct_fallbacks: 0,
        aborted: false,
    };

    let bulk_applied =
        options.mode == TypingMode::Bulk && !text.is_empty() && try_bulk_insert(surface, text);

    if bulk_applied {
        outcome.mode_used = TypingMode::Bulk;
        outcome.chars_typed = text.chars().count();
    } else {
        if options.mode == TypingMode::Bulk && !text.is_empty() {
            DEBUG_EDITOR_SYNC_MOD.then(|| {
                tracing::debug!(message = "Bulk insert rejected, typing char by char");
            });
        }
        for ch in text.chars() {
            if should_abort() {
                outcome.aborted = true;
                return outcome;
            }
            let keypress = match ch {
                '\r' => continue,
                '\n' => keypress!(@special SpecialKey::Enter),
                _ => keypress!(@char ch),
            };
            let report = synthesize_keypress(surface, keypress, timings).await;
            if report.path == KeystrokePath::DirectFallback {
                outcome.direct_fallbacks += 1;
            }
            outcome.chars_typed += 1;
            pause(options.char_delay).await;
        }
    }

    if should_abort() {
        outcome.aborted = true;
        return outcome;
    }

    finalize(surface, timings).await;
    outcome
}

/// Returns `false` if the surface refused the insert or left its content untouched.
fn try_bulk_insert(surface: &dyn EditingSurface, text: &str) -> bool {
    let before = read_text(surface);
    let data = Some(text.to_string());

    let before_input = surface.dispatch_event(&SurfaceEvent::BeforeInput {
        input_type: InputType::InsertText,
        data: data.clone(),
    });
    if before_input.is_prevented()
        || !surface.exec_command(&EditCommand::InsertText(text.to_string()))
    {
        return false;
    }
    surface.dispatch_event(&SurfaceEvent::Input {
        input_type: InputType::InsertText,
        data,
    });

    read_text(surface) != before
}

/// Caret to the end, focus, then the generic content-changed pair.
async fn finalize(surface: &dyn EditingSurface, timings: &SyncTimings) {
    surface.select_all_content();
    surface.collapse_selection_to_end();
    surface.dispatch_event(&SurfaceEvent::SelectionChange);
    surface.focus();
    pause(timings.selection_delay).await;
    surface.dispatch_event(&SurfaceEvent::Input {
        input_type: InputType::InsertText,
        data: None,
    });
    surface.dispatch_event(&SurfaceEvent::Change);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{BufferSurface, HostQuirk, MockHostSurface};

    fn never() -> bool { false }

    #[tokio::test]
    async fn test_char_by_char_with_line_breaks() {
        let surface = BufferSurface::new("");
        let outcome = run_typing_cascade(
            &surface,
            "ab\ncd\r\n",
            &TypingOptions::char_by_char(Duration::ZERO),
            &SyncTimings::no_delay(),
            &never,
        )
        .await;

        assert_eq!(surface.text(), "ab\ncd\n");
        assert_eq!(outcome.mode_used, TypingMode::CharByChar);
        assert_eq!(outcome.chars_typed, 6);
        assert_eq!(outcome.direct_fallbacks, 0);
        assert!(
            surface
                .events()
                .contains(&SurfaceEvent::KeyDown(keypress!(@special SpecialKey::Enter)))
        );
    }

    #[tokio::test]
    async fn test_finalize_moves_caret_to_end_and_notifies() {
        let surface = BufferSurface::new("");
        run_typing_cascade(
            &surface,
            "hi",
            &TypingOptions::bulk(),
            &SyncTimings::no_delay(),
            &never,
        )
        .await;

        assert_eq!(surface.selection(), 2..2);
        assert!(surface.has_focus());
        let events = surface.events();
        assert_eq!(events.last(), Some(&SurfaceEvent::Change));
    }

    #[tokio::test]
    async fn test_bulk_mode() {
        let surface = BufferSurface::new("");
        let outcome = run_typing_cascade(
            &surface,
            "Hello world.",
            &TypingOptions::bulk(),
            &SyncTimings::no_delay(),
            &never,
        )
        .await;
        assert_eq!(outcome.mode_used, TypingMode::Bulk);
        assert_eq!(surface.text(), "Hello world.");
        assert!(
            !surface
                .events()
                .iter()
                .any(|it| matches!(it, SurfaceEvent::KeyDown(_)))
        );
    }

    #[tokio::test]
    async fn test_rejected_bulk_falls_back_to_char_by_char() {
        let surface = MockHostSurface::new("", &[HostQuirk::RejectBulkInsert]);
        let outcome = run_typing_cascade(
            &surface,
            "abc",
            &TypingOptions::bulk(),
            &SyncTimings::no_delay(),
            &never,
        )
        .await;
        assert_eq!(outcome.mode_used, TypingMode::CharByChar);
        assert_eq!(surface.text(), "abc");
    }

    #[tokio::test]
    async fn test_direct_fallback_is_counted() {
        let surface = MockHostSurface::new("", &[HostQuirk::PreventKeyDefaults]);
        let outcome = run_typing_cascade(
            &surface,
            "xy",
            &TypingOptions::char_by_char(Duration::ZERO),
            &SyncTimings::no_delay(),
            &never,
        )
        .await;
        assert_eq!(surface.text(), "xy");
        assert_eq!(outcome.direct_fallbacks, 2);
    }

    #[tokio::test]
    async fn test_abort_stops_typing() {
        let surface = BufferSurface::new("");
        let outcome = run_typing_cascade(
            &surface,
            "abc",
            &TypingOptions::default(),
            &SyncTimings::no_delay(),
            &|| true,
        )
        .await;
        assert!(outcome.aborted);
        assert_eq!(outcome.chars_typed, 0);
        assert_eq!(surface.text(), "");
    }
}
