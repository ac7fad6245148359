// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::collections::BTreeMap;

use strum_macros::{Display, EnumString};

use super::KeyPress;

/// The event vocabulary a surface accepts. What a host does with each event is its own
/// business; the only contract is that it accepts these kinds and may prevent the default
/// action of the cancelable ones (key-down and before-input).
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SurfaceEvent {
    KeyDown(KeyPress),
    KeyUp(KeyPress),
    BeforeInput {
        input_type: InputType,
        data: Option<String>,
    },
    Input {
        input_type: InputType,
        data: Option<String>,
    },
    Change,
    SelectStart,
    SelectionChange,
    Focus,
    Blur,
    CompositionStart,
    CompositionUpdate(String),
    CompositionEnd(String),
}

impl SurfaceEvent {
    /// Only these events may have their default action prevented by the host.
    #[must_use]
    pub fn is_cancelable(&self) -> bool {
        matches!(self, SurfaceEvent::KeyDown(_) | SurfaceEvent::BeforeInput { .. })
    }
}

/// Mirrors the `inputType` strings from W3C Input Events.
#[derive(Debug, Display, EnumString, Copy, Clone, PartialEq, Eq)]
#[strum(serialize_all = "camelCase")]
pub enum InputType {
    InsertText,
    InsertLineBreak,
    InsertCompositionText,
    DeleteContentBackward,
    DeleteContentForward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Accepted,
    DefaultPrevented,
}

impl DispatchOutcome {
    #[must_use]
    pub fn is_prevented(self) -> bool { self == DispatchOutcome::DefaultPrevented }
}

/// Editing commands that go through the surface's own editing machinery, so that its
/// undo stack and internal model see them. The host may refuse any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    InsertText(String),
    InsertLineBreak,
    DeleteBackward,
    DeleteForward,
    SelectAll,
}

/// Structural writes that bypass the surface's editing machinery. These can't be
/// refused, but the host may later reassert its own model on top of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectMutation {
    InsertTextNode(String),
    InsertLineBreakNode,
    RemoveCharBefore,
    RemoveCharAfter,
}

/// Non-content attributes of a surface, eg: `aria-label`, `role`, `class`. The host uses
/// these to recognize the surface as its active input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SurfaceAttributes {
    pub editable: bool,
    pub entries: BTreeMap<String, String>,
}

impl SurfaceAttributes {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> { self.entries.get(name).map(String::as_str) }
}
