// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::sync::Arc;

use r3bl_rewrite::{BufferSurface, EditingSurface, EditorSyncEngine, HostQuirk,
                   MockHostSurface, TypingOptions};

use super::{CommandRunDetails, ReplaceDetails, SurfaceKind};

#[must_use]
pub fn create_demo_surface(kind: SurfaceKind, initial_text: &str) -> Arc<dyn EditingSurface> {
    match kind {
        SurfaceKind::WellBehaved => Arc::new(BufferSurface::new(initial_text)),
        SurfaceKind::Adversarial => Arc::new(MockHostSurface::new(
            initial_text,
            &[
                HostQuirk::PreventKeyDefaults,
                HostQuirk::RevertOnChange { times: 1 },
            ],
        )),
    }
}

/// Run the editor sync engine against an in-memory surface. Uses the engine's real
/// timings, so the run takes roughly as long as it would against a live editor.
pub async fn run_replace_demo(
    surface_text: &str,
    kind: SurfaceKind,
    bulk: bool,
    new_text: &str,
) -> CommandRunDetails {
    let surface = create_demo_surface(kind, surface_text);
    let typing_options = if bulk {
        TypingOptions::bulk()
    } else {
        TypingOptions::default()
    };
    let engine = EditorSyncEngine::new(surface).with_typing_options(typing_options);

    let report = engine.replace(new_text).await;

    CommandRunDetails::Replace(ReplaceDetails { report })
}
