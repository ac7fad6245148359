// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Dispatches one logical keypress against a surface the way a real keyboard would:
//!
//! ```text
//! key-down ─▶ (yield) ─▶ [composition] ─▶ before-input ─▶ edit command ─▶ input
//!          ─▶ (key press delay) ─▶ key-up ─▶ verify net effect ─▶ [direct mutation]
//! ```
//!
//! The contract is "the visible text changes as requested", not "a specific event
//! fired". If the host prevents the default action, refuses the command, or silently
//! drops the edit, the net effect is achieved with a [`DirectMutation`] instead.

use std::time::Duration;

use strum_macros::Display;

use super::SyncTimings;
use crate::{DEBUG_EDITOR_SYNC_MOD, DirectMutation, EditCommand, EditingSurface, InputType,
            KeyIntent, KeyPress, SurfaceEvent, pause, read_text};

/// How the net effect of a keystroke was achieved.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum KeystrokePath {
    /// Through the surface's own editing machinery.
    Native,
    /// The surface did not apply the edit, so it was written structurally.
    DirectFallback,
    /// Nothing changed, even after the fallback. Eg: backspace at the start of content.
    NoEffect,
    /// The key has no text effect to verify (select-all, navigation).
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeystrokeReport {
    pub keypress: KeyPress,
    pub path: KeystrokePath,
    pub key_down_prevented: bool,
}

impl KeystrokeReport {
    #[must_use]
    pub fn changed_text(&self) -> bool {
        matches!(
            self.path,
            KeystrokePath::Native | KeystrokePath::DirectFallback
        )
    }
}

/// Synthesize `keypress` against `surface`. See the [module docs](self) for the event
/// sequence.
pub async fn synthesize_keypress(
    surface: &dyn EditingSurface,
    keypress: KeyPress,
    timings: &SyncTimings,
) -> KeystrokeReport {
    let intent = keypress.intent();
    let before = read_text(surface);

    let key_down = surface.dispatch_event(&SurfaceEvent::KeyDown(keypress));
    let key_down_prevented = key_down.is_prevented();

    // Let the host's key-down listeners run before the default action.
    pause(Duration::ZERO).await;

    if !key_down_prevented {
        perform_default_action(surface, intent);
    }

    pause(timings.key_press_delay).await;

    if !key_down_prevented {
        surface.dispatch_event(&SurfaceEvent::KeyUp(keypress));
    }

    let path = if intent.mutates_text() {
        verify_or_fall_back(surface, intent, &before)
    } else {
        KeystrokePath::NotApplicable
    };

    DEBUG_EDITOR_SYNC_MOD.then(|| {
        // % is Display, ? is Debug.
        tracing::trace!(
            message = "synthesize_keypress",
            keypress = ?keypress,
            key_down_prevented = %key_down_prevented,
            path = %path
        );
    });

    KeystrokeReport {
        keypress,
        path,
        key_down_prevented,
    }
}

/// The edit a browser would perform for an un-prevented key-down.
fn perform_default_action(surface: &dyn EditingSurface, intent: KeyIntent) {
    let Some((input_type, data, command)) = edit_for_intent(intent) else {
        if intent == KeyIntent::SelectAll {
            surface.exec_command(&EditCommand::SelectAll);
            surface.dispatch_event(&SurfaceEvent::SelectionChange);
        }
        return;
    };

    let composed = data.as_deref().is_some_and(|it| !it.is_ascii());
    if composed {
        surface.dispatch_event(&SurfaceEvent::CompositionStart);
        surface.dispatch_event(&SurfaceEvent::CompositionUpdate(
            data.clone().unwrap_or_default(),
        ));
    }

    let before_input = surface.dispatch_event(&SurfaceEvent::BeforeInput {
        input_type,
        data: data.clone(),
    });
    if !before_input.is_prevented() && surface.exec_command(&command) {
        surface.dispatch_event(&SurfaceEvent::Input {
            input_type,
            data: data.clone(),
        });
    }

    if composed {
        surface.dispatch_event(&SurfaceEvent::CompositionEnd(data.unwrap_or_default()));
    }
}

fn edit_for_intent(intent: KeyIntent) -> Option<(InputType, Option<String>, EditCommand)> {
    match intent {
        KeyIntent::InsertChar(ch) => {
            let input_type = if ch.is_ascii() {
                InputType::InsertText
            } else {
                InputType::InsertCompositionText
            };
            Some((
                input_type,
                Some(ch.to_string()),
                EditCommand::InsertText(ch.to_string()),
            ))
        }
        KeyIntent::InsertLineBreak => {
            Some((InputType::InsertLineBreak, None, EditCommand::InsertLineBreak))
        }
        KeyIntent::DeleteBackward => Some((
            InputType::DeleteContentBackward,
            None,
            EditCommand::DeleteBackward,
        )),
        KeyIntent::DeleteForward => Some((
            InputType::DeleteContentForward,
            None,
            EditCommand::DeleteForward,
        )),
        KeyIntent::SelectAll | KeyIntent::NoMutation => None,
    }
}

fn verify_or_fall_back(
    surface: &dyn EditingSurface,
    intent: KeyIntent,
    before: &str,
) -> KeystrokePath {
    if net_effect_achieved(intent, before, &read_text(surface)) {
        return KeystrokePath::Native;
    }

    let (mutation, input_type) = match intent {
        KeyIntent::InsertChar(ch) => (
            DirectMutation::InsertTextNode(ch.to_string()),
            InputType::InsertText,
        ),
        KeyIntent::InsertLineBreak => {
            (DirectMutation::InsertLineBreakNode, InputType::InsertLineBreak)
        }
        KeyIntent::DeleteBackward => (
            DirectMutation::RemoveCharBefore,
            InputType::DeleteContentBackward,
        ),
        KeyIntent::DeleteForward => (
            DirectMutation::RemoveCharAfter,
            InputType::DeleteContentForward,
        ),
        KeyIntent::SelectAll | KeyIntent::NoMutation => return KeystrokePath::NotApplicable,
    };

    surface.mutate_directly(&mutation);
    surface.dispatch_event(&SurfaceEvent::Input {
        input_type,
        data: match intent {
            KeyIntent::InsertChar(ch) => Some(ch.to_string()),
            _ => None,
        },
    });

    if net_effect_achieved(intent, before, &read_text(surface)) {
        KeystrokePath::DirectFallback
    } else {
        KeystrokePath::NoEffect
    }
}

/// Insertions must change the text. Deletions must shrink it, unless there was nothing
/// to delete in the first place.
fn net_effect_achieved(intent: KeyIntent, before: &str, after: &str) -> bool {
    match intent {
        KeyIntent::InsertChar(_) | KeyIntent::InsertLineBreak => before != after,
        KeyIntent::DeleteBackward | KeyIntent::DeleteForward => {
            before.is_empty() || after.chars().count() < before.chars().count()
        }
        KeyIntent::SelectAll | KeyIntent::NoMutation => true,
    }
}
