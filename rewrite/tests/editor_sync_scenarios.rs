// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! End to end runs of [`EditorSyncEngine::replace`] against well behaved and adversarial
//! hosts.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use r3bl_rewrite::{BufferSurface, EditingSurface, EditorSyncEngine, HostQuirk,
                   MockHostSurface, ReplaceOutcome, SurfaceEvent, SyncState, SyncTimings,
                   TypingOptions, read_text};
use test_case::test_case;

fn engine_for(surface: Arc<dyn EditingSurface>) -> EditorSyncEngine {
    EditorSyncEngine::new(surface).with_timings(SyncTimings::no_delay())
}

#[test_case("plain words"; "single line")]
#[test_case("line one\nline two\n\nline four"; "embedded line breaks")]
#[test_case("tabs\tand   spaces!"; "whitespace runs")]
#[test_case("café, naïve, 日本語"; "non ascii")]
#[test_case("\nleading"; "leading line break")]
#[test_case("trailing\n"; "trailing line break")]
#[test_case("\n\nx"; "empty lines at start")]
#[test_case("a\n\n\nb"; "two blank lines")]
#[tokio::test]
async fn test_replace_twice_converges(text: &str) {
    let surface = Arc::new(BufferSurface::new("something else entirely"));
    let engine = engine_for(surface.clone());

    let first = engine.replace(text).await;
    let second = engine.replace(text).await;

    assert_eq!(first.outcome, ReplaceOutcome::Converged);
    assert_eq!(second.outcome, ReplaceOutcome::Converged);
    assert_eq!(surface.text(), text);
    assert_eq!(second.final_text, text);
    assert_eq!(read_text(surface.as_ref()), text);
}

#[tokio::test]
async fn test_bulk_mode_converges() {
    let surface = Arc::new(BufferSurface::new("old"));
    let engine = engine_for(surface.clone()).with_typing_options(TypingOptions::bulk());

    let report = engine.replace("new text\nwith a break").await;

    assert_eq!(report.outcome, ReplaceOutcome::Converged);
    assert_eq!(surface.text(), "new text\nwith a break");
}

#[tokio::test]
async fn test_host_reverting_once_is_reinitialized() {
    let surface = Arc::new(MockHostSurface::new(
        "helo wrold",
        &[
            HostQuirk::RevertOnChange { times: 1 },
            HostQuirk::PreventKeyDefaults,
        ],
    ));
    let engine = engine_for(surface.clone());

    let report = engine.replace("Hello world.").await;

    assert_eq!(report.outcome, ReplaceOutcome::Converged);
    assert!(report.visited(SyncState::VerifyingType));
    assert!(report.visited(SyncState::Reinitializing));
    assert!((1..=2).contains(&report.reinit_attempts));
    assert_eq!(surface.reverts_done(), 1);
    assert_eq!(surface.text(), "Hello world.");
}

#[tokio::test]
async fn test_rejected_commands_still_converge() {
    let surface = Arc::new(MockHostSurface::new(
        "remove me",
        &[HostQuirk::RejectExecCommand, HostQuirk::RejectBulkInsert],
    ));
    let engine = engine_for(surface.clone()).with_typing_options(TypingOptions::bulk());

    let report = engine.replace("typed anyway").await;

    assert_eq!(report.outcome, ReplaceOutcome::Converged);
    assert_eq!(surface.text(), "typed anyway");
    assert!(report.typing.is_some_and(|it| it.direct_fallbacks > 0));
}

#[tokio::test]
async fn test_empty_text_clears_and_notifies_host() {
    let surface = Arc::new(MockHostSurface::new("to be cleared", &[]));
    let engine = engine_for(surface.clone());

    let report = engine.replace("").await;

    assert_eq!(report.outcome, ReplaceOutcome::Converged);
    assert_eq!(surface.text(), "");
    assert!(surface.events().contains(&SurfaceEvent::Change));
}

#[tokio::test]
async fn test_immovable_host_degrades_without_error() {
    let surface = Arc::new(MockHostSurface::new(
        "stuck",
        &[
            HostQuirk::Immovable,
            HostQuirk::RevertOnChange { times: usize::MAX },
        ],
    ));
    let engine = engine_for(surface.clone()).with_max_reinit_attempts(2);

    let report = engine.replace("fresh").await;

    assert_eq!(report.outcome, ReplaceOutcome::Degraded);
    assert!(!report.clearing.cleared);
    assert_eq!(report.reinit_attempts, 2);
    assert_eq!(engine.state(), SyncState::Idle);
}
