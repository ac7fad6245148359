// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{DirectMutation, DispatchOutcome, EditCommand, SurfaceAttributes, SurfaceEvent};

/// Capability contract for an externally owned rich text editing surface.
///
/// The surface is not a passive text box. It keeps its own model of its content, handles
/// the events dispatched to it with its own listeners, and may reassert stale content
/// after a write. Nothing here promises that a write sticks; callers read back via
/// [`crate::read_text`] and escalate.
///
/// All methods take `&self`. Implementations use interior mutability, since the host
/// itself mutates the surface concurrently with the caller.
pub trait EditingSurface: Send + Sync {
    /// Direct text property of the content root, if the surface exposes one.
    fn text_content(&self) -> Option<String>;

    /// Text as rendered (layout aware, eg: line breaks for block elements).
    fn rendered_text(&self) -> Option<String>;

    /// Raw markup of the content root.
    fn markup(&self) -> Option<String>;

    /// Deliver one event to the surface's listeners.
    fn dispatch_event(&self, event: &SurfaceEvent) -> DispatchOutcome;

    /// Run an editing command through the surface's editing machinery. Returns `false`
    /// if the surface refused it.
    fn exec_command(&self, command: &EditCommand) -> bool;

    /// Select the full content range structurally, without keyboard emulation.
    fn select_all_content(&self) -> bool;

    fn collapse_selection_to_end(&self);

    /// Delete whatever is selected. Returns `false` if the selection was empty or the
    /// deletion did not happen.
    fn delete_selection(&self) -> bool;

    fn mutate_directly(&self, mutation: &DirectMutation);

    /// Remove every content node, leaving an empty content root.
    fn wipe_content(&self);

    fn snapshot_attributes(&self) -> SurfaceAttributes;

    fn set_attribute(&self, name: &str, value: &str);

    fn set_editable(&self, editable: bool);

    fn focus(&self);

    fn blur(&self);
}
