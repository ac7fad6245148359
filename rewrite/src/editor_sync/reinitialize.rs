// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use strum_macros::Display;

use super::SyncTimings;
use crate::{DEBUG_EDITOR_SYNC_MOD, DirectMutation, EditingSurface, InputType,
            SurfaceEvent, pause, read_text, trimmed_eq};

/// The step of a reinitialization attempt that made the content match.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ReinitializeOutcome {
    /// Kicking the host (editable toggle plus focus cycle) was enough.
    Resynced,
    /// The content had to be rebuilt node by node.
    Rebuilt,
    /// Still mismatched after the rebuild.
    StillDrifting,
}

/// One reinitialization attempt, for when the host reasserted stale content after a
/// write.
///
/// 1. Toggle the editable flag off and on.
/// 2. Blur and refocus, with a broad set of focus and selection signals.
/// 3. If the content still mismatches, wipe it and rebuild it node by node from `target`
///    (one text node per line, line break nodes in between), then re-emit the change
///    notifications.
pub async fn reinitialize_surface(
    surface: &dyn EditingSurface,
    target: &str,
    timings: &SyncTimings,
) -> ReinitializeOutcome {
    surface.set_editable(false);
    pause(timings.settle_delay).await;
    surface.set_editable(true);

    surface.blur();
    surface.dispatch_event(&SurfaceEvent::Blur);
    pause(timings.focus_delay).await;
    surface.focus();
    for event in [
        SurfaceEvent::Focus,
        SurfaceEvent::SelectStart,
        SurfaceEvent::SelectionChange,
    ] {
        surface.dispatch_event(&event);
    }

    pause(timings.settle_delay).await;
    if trimmed_eq(&read_text(surface), target) {
        return ReinitializeOutcome::Resynced;
    }

    rebuild_content(surface, target);
    surface.dispatch_event(&SurfaceEvent::Input {
        input_type: InputType::InsertText,
        data: None,
    });
    surface.dispatch_event(&SurfaceEvent::Change);
    pause(timings.settle_delay).await;

    let actual = read_text(surface);
    let outcome = if trimmed_eq(&actual, target) {
        ReinitializeOutcome::Rebuilt
    } else {
        ReinitializeOutcome::StillDrifting
    };

    DEBUG_EDITOR_SYNC_MOD.then(|| {
        // % is Display, ? is Debug.
        tracing::debug!(
            message = "reinitialize_surface",
            outcome = %outcome,
            actual = ?actual
        );
    });

    outcome
}

fn rebuild_content(surface: &dyn EditingSurface, target: &str) {
    surface.wipe_content();
    for (index, line) in target.split('\n').enumerate() {
        if index > 0 {
            surface.mutate_directly(&DirectMutation::InsertLineBreakNode);
        }
        if !line.is_empty() {
            surface.mutate_directly(&DirectMutation::InsertTextNode(line.to_string()));
        }
    }
    surface.collapse_selection_to_end();
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::BufferSurface;

    #[tokio::test]
    async fn test_already_matching_is_resynced() {
        let surface = BufferSurface::new("same");
        let outcome =
            reinitialize_surface(&surface, "same\n", &SyncTimings::no_delay()).await;
        assert_eq!(outcome, ReinitializeOutcome::Resynced);
        assert!(surface.is_editable());
        assert!(surface.has_focus());
    }

    #[tokio::test]
    async fn test_rebuild_from_target() {
        let surface = BufferSurface::new("stale content");
        let outcome =
            reinitialize_surface(&surface, "line 1\n\nline 3", &SyncTimings::no_delay())
                .await;
        assert_eq!(outcome, ReinitializeOutcome::Rebuilt);
        assert_eq!(surface.text(), "line 1\n\nline 3");
        assert_eq!(surface.events().last(), Some(&SurfaceEvent::Change));
    }
}
