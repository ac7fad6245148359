// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Batch level behavior of the [`GenerationManager`] against a scripted transport.

use std::{sync::Arc, time::Duration};

use pretty_assertions::assert_eq;
use r3bl_rewrite::{ApiKey, BufferSurface, BuiltInAction, EditorSyncEngine,
                   GenerationManager, MockTransport, ProviderEndpoint, ReplaceOutcome,
                   RewriteConfig, ScriptedResponse, SessionState, SlotUpdate, SyncTimings,
                   sse_delta_lines};
use tokio::sync::mpsc::UnboundedReceiver;

fn endpoint() -> ProviderEndpoint {
    ProviderEndpoint {
        url: "http://localhost/v1/chat/completions".into(),
        api_key: ApiKey::new("test"),
    }
}

fn config_without_stagger() -> RewriteConfig {
    RewriteConfig {
        stagger_ms: 0,
        ..Default::default()
    }
}

fn drain(receiver: &mut UnboundedReceiver<SlotUpdate>) -> Vec<SlotUpdate> {
    let mut acc = vec![];
    while let Ok(it) = receiver.try_recv() {
        acc.push(it);
    }
    acc
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    while !condition() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_happy_path_streams_then_replaces_surface() {
    let transport = MockTransport::new(vec![ScriptedResponse::chunks(sse_delta_lines(
        &["Hel", "lo world", "."],
        true,
    ))]);
    let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
    let manager =
        GenerationManager::new(Arc::new(transport), endpoint(), config_without_stagger())
            .with_observer(sender);

    let generation = manager
        .start_batch(BuiltInAction::SpellFix.into(), "helo wrold")
        .unwrap();
    let board = manager.settled().await;

    assert_eq!(board.slot(0).unwrap().state, SessionState::Completed);
    assert_eq!(board.slot(0).unwrap().display_text(), "Hello world.");

    let slot_zero_texts: Vec<String> = drain(&mut receiver)
        .into_iter()
        .filter_map(|it| match it {
            SlotUpdate::Chunk {
                generation: g,
                index: 0,
                accumulated,
                ..
            } if g == generation => Some(accumulated),
            _ => None,
        })
        .collect();
    assert_eq!(slot_zero_texts, vec!["Hel", "Hello world", "Hello world."]);

    let surface = Arc::new(BufferSurface::new("helo wrold"));
    let engine = EditorSyncEngine::new(surface.clone()).with_timings(SyncTimings::no_delay());
    let report = manager.accept_candidate(0, &engine).await.unwrap();

    assert_eq!(report.outcome, ReplaceOutcome::Converged);
    assert_eq!(surface.text(), "Hello world.");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cancelling_one_session_leaves_siblings_intact() {
    let transport = MockTransport::new(vec![
        ScriptedResponse::chunks(sse_delta_lines(&["a", "b", "c", "d", "e"], true))
            .with_delay(Duration::from_millis(10)),
    ]);
    let manager =
        GenerationManager::new(Arc::new(transport), endpoint(), config_without_stagger());

    manager
        .start_batch(BuiltInAction::Reword.into(), "some text")
        .unwrap();
    wait_until(|| {
        manager
            .slots()
            .slot(1)
            .is_some_and(|it| it.state == SessionState::Streaming)
    })
    .await;

    assert!(manager.cancel_slot(1));
    let frozen = manager.sessions()[1].accumulated_text();
    let board = manager.settled().await;

    let states: Vec<_> = board.slots().iter().map(|it| it.state).collect();
    assert_eq!(
        states,
        vec![
            SessionState::Completed,
            SessionState::Cancelled,
            SessionState::Completed
        ]
    );
    assert_eq!(board.slot(0).unwrap().text, "abcde");
    assert_eq!(board.slot(2).unwrap().text, "abcde");
    assert_eq!(board.slot(1).unwrap().error, None);
    assert_eq!(manager.sessions()[1].accumulated_text(), frozen);
    assert!(frozen.len() < "abcde".len());
    assert!(!manager.cancel_slot(1));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_new_batch_supersedes_streaming_batch() {
    let transport = MockTransport::with_responder(Arc::new(|_, request| {
        if request.prompt().contains("first draft") {
            ScriptedResponse::chunks(sse_delta_lines(&["1"; 20], true))
                .with_delay(Duration::from_millis(15))
        } else {
            ScriptedResponse::chunks(sse_delta_lines(&["second"], true))
        }
    }));
    let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
    let manager =
        GenerationManager::new(Arc::new(transport), endpoint(), config_without_stagger())
            .with_observer(sender);

    let first = manager
        .start_batch(BuiltInAction::Formal.into(), "first draft")
        .unwrap();
    wait_until(|| {
        manager
            .slots()
            .slots()
            .iter()
            .any(|it| it.state == SessionState::Streaming)
    })
    .await;
    let first_sessions = manager.sessions();

    let second = manager
        .start_batch(BuiltInAction::Formal.into(), "second draft")
        .unwrap();
    assert!(
        first_sessions
            .iter()
            .all(|it| it.state() == SessionState::Cancelled)
    );
    let frozen: Vec<String> = first_sessions
        .iter()
        .map(|it| it.accumulated_text())
        .collect();

    let board = manager.settled().await;
    // Give any straggling first batch task a chance to misbehave.
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(board.generation(), second);
    assert!(
        board
            .slots()
            .iter()
            .all(|it| it.state == SessionState::Completed && it.text == "second")
    );
    assert_eq!(
        first_sessions
            .iter()
            .map(|it| it.accumulated_text())
            .collect::<Vec<_>>(),
        frozen
    );

    let updates = drain(&mut receiver);
    let second_started_at = updates
        .iter()
        .position(|it| {
            *it == SlotUpdate::BatchStarted {
                generation: second,
                slot_count: 3,
            }
        })
        .unwrap();
    assert!(updates[..second_started_at].iter().any(|it| matches!(
        it,
        SlotUpdate::Chunk { generation, .. } if *generation == first
    )));
    assert!(
        updates[second_started_at..]
            .iter()
            .all(|it| it.generation() == second)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_staggered_start_and_transport_failure() {
    let transport = MockTransport::with_responder(Arc::new(|index, _| {
        if index == 0 {
            ScriptedResponse::chunks(sse_delta_lines(&["partial"], false))
                .then_fail(r3bl_rewrite::StreamError::Transport("connection reset".into()))
        } else {
            ScriptedResponse::chunks(sse_delta_lines(&["ok"], true))
        }
    }));
    let config = RewriteConfig {
        stagger_ms: 20,
        ..Default::default()
    };
    let manager = GenerationManager::new(Arc::new(transport), endpoint(), config);

    let start_time = std::time::Instant::now();
    manager
        .start_batch(BuiltInAction::Casual.into(), "hello there")
        .unwrap();
    let board = manager.settled().await;

    assert!(start_time.elapsed() >= Duration::from_millis(40));
    let failed = board.slot(0).unwrap();
    assert_eq!(failed.state, SessionState::Failed);
    assert_eq!(
        failed.display_text(),
        "Failed to generate suggestion. Please try again."
    );
    assert_eq!(board.slot(1).unwrap().text, "ok");
    assert_eq!(board.slot(2).unwrap().text, "ok");
}
