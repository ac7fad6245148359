// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::{Debug, Formatter},
          sync::{Arc, Mutex as StdMutex}};

use smallvec::SmallVec;
use strum_macros::Display;

use super::{ClearingOutcome, SyncTimings, TypingOptions, TypingOutcome,
            reinitialize_surface, run_clearing_cascade, run_typing_cascade};
use crate::{DEBUG_EDITOR_SYNC_MOD, EditingSurface, GenerationClock, SurfaceEvent,
            is_blank, lock_or_recover, pause, read_text, trimmed_eq};

pub const DEFAULT_MAX_REINIT_ATTEMPTS: usize = 3;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Focusing,
    Clearing,
    VerifyingClear,
    Typing,
    VerifyingType,
    Reinitializing,
    Finalizing,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// Trimmed surface text equals the requested text.
    Converged,
    /// Reinitialization attempts ran out. The surface holds its best achieved state.
    Degraded,
    /// A newer `replace()` on the same surface took over.
    Superseded,
}

pub type StatesVisited = SmallVec<[SyncState; 16]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceReport {
    pub generation: u64,
    pub outcome: ReplaceOutcome,
    pub clearing: ClearingOutcome,
    pub typing: Option<TypingOutcome>,
    pub reinit_attempts: usize,
    pub final_text: String,
    pub states_visited: StatesVisited,
}

impl ReplaceReport {
    fn new(generation: u64) -> Self {
        Self {
            generation,
            outcome: ReplaceOutcome::Superseded,
            clearing: ClearingOutcome::default(),
            typing: None,
            reinit_attempts: 0,
            final_text: String::new(),
            states_visited: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn visited(&self, state: SyncState) -> bool { self.states_visited.contains(&state) }
}

/// Replaces the content of one [`EditingSurface`]. Create one engine per surface and
/// share it (eg: in an [`Arc`]) between everything that writes to that surface.
///
/// Only one replacement runs at a time. A newer call to [`replace`] supersedes an older
/// one: the older call stops at its next checkpoint (between states, and between typed
/// characters) and returns [`ReplaceOutcome::Superseded`], then the newer call runs.
///
/// [`replace`]: Self::replace
pub struct EditorSyncEngine {
    surface: Arc<dyn EditingSurface>,
    timings: SyncTimings,
    typing_options: TypingOptions,
    max_reinit_attempts: usize,
    clock: GenerationClock,
    gate: tokio::sync::Mutex<()>,
    state: StdMutex<SyncState>,
}

impl Debug for EditorSyncEngine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSyncEngine")
            .field("timings", &self.timings)
            .field("typing_options", &self.typing_options)
            .field("max_reinit_attempts", &self.max_reinit_attempts)
            .field("generation", &self.clock.current())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl EditorSyncEngine {
    #[must_use]
    pub fn new(surface: Arc<dyn EditingSurface>) -> Self {
        Self {
            surface,
            timings: SyncTimings::default(),
            typing_options: TypingOptions::default(),
            max_reinit_attempts: DEFAULT_MAX_REINIT_ATTEMPTS,
            clock: GenerationClock::new(),
            gate: tokio::sync::Mutex::new(()),
            state: StdMutex::new(SyncState::Idle),
        }
    }

    #[must_use]
    pub fn with_timings(mut self, timings: SyncTimings) -> Self {
        self.timings = timings;
        self
    }

    #[must_use]
    pub fn with_typing_options(mut self, typing_options: TypingOptions) -> Self {
        self.typing_options = typing_options;
        self
    }

    #[must_use]
    pub fn with_max_reinit_attempts(mut self, max_reinit_attempts: usize) -> Self {
        self.max_reinit_attempts = max_reinit_attempts;
        self
    }

    #[must_use]
    pub fn surface(&self) -> &Arc<dyn EditingSurface> { &self.surface }

    #[must_use]
    pub fn state(&self) -> SyncState { *lock_or_recover!(self.state) }

    /// Make the surface read `new_text`. An empty `new_text` clears the surface.
    ///
    /// Never fails. Everything that went wrong along the way is recorded in the returned
    /// [`ReplaceReport`] and logged.
    pub async fn replace(&self, new_text: &str) -> ReplaceReport {
        let generation = self.clock.next();
        let _gate = self.gate.lock().await;

        let report = self.run_state_machine(generation, new_text).await;
        self.set_state(SyncState::Idle);

        match report.outcome {
            ReplaceOutcome::Converged => {
                DEBUG_EDITOR_SYNC_MOD.then(|| {
                    // % is Display, ? is Debug.
                    tracing::debug!(
                        message = "replace converged",
                        generation = %generation,
                        reinit_attempts = %report.reinit_attempts
                    );
                });
            }
            ReplaceOutcome::Degraded => {
                // % is Display, ? is Debug.
                tracing::warn!(
                    message = "replace degraded, surface left in best achieved state",
                    generation = %generation,
                    expected = ?new_text,
                    actual = ?report.final_text
                );
            }
            ReplaceOutcome::Superseded => {
                DEBUG_EDITOR_SYNC_MOD.then(|| {
                    // % is Display, ? is Debug.
                    tracing::debug!(message = "replace superseded", generation = %generation);
                });
            }
        }

        report
    }

    async fn run_state_machine(&self, generation: u64, new_text: &str) -> ReplaceReport {
        let surface = self.surface.as_ref();
        let clock = self.clock.clone();
        let is_superseded = move || !clock.is_current(generation);
        let mut report = ReplaceReport::new(generation);

        if is_superseded() {
            return self.superseded(report);
        }

        self.enter(SyncState::Focusing, &mut report);
        surface.focus();
        surface.dispatch_event(&SurfaceEvent::Focus);
        pause(self.timings.focus_delay).await;

        self.enter(SyncState::Clearing, &mut report);
        report.clearing = run_clearing_cascade(surface, &self.timings, &is_superseded).await;
        if report.clearing.aborted {
            return self.superseded(report);
        }

        self.enter(SyncState::VerifyingClear, &mut report);
        pause(self.timings.clear_delay).await;
        let leftover = read_text(surface);
        if !is_blank(&leftover) {
            DEBUG_EDITOR_SYNC_MOD.then(|| {
                // % is Display, ? is Debug.
                tracing::debug!(message = "typing over leftover content", leftover = ?leftover);
            });
        }

        if is_superseded() {
            return self.superseded(report);
        }

        self.enter(SyncState::Typing, &mut report);
        let typing = run_typing_cascade(
            surface,
            new_text,
            &self.typing_options,
            &self.timings,
            &is_superseded,
        )
        .await;
        report.typing = Some(typing);
        if typing.aborted {
            return self.superseded(report);
        }

        loop {
            self.enter(SyncState::VerifyingType, &mut report);
            pause(self.timings.settle_delay).await;

            if trimmed_eq(&read_text(surface), new_text) {
                report.outcome = ReplaceOutcome::Converged;
                break;
            }
            if is_superseded() {
                return self.superseded(report);
            }
            if report.reinit_attempts >= self.max_reinit_attempts {
                report.outcome = ReplaceOutcome::Degraded;
                break;
            }

            self.enter(SyncState::Reinitializing, &mut report);
            report.reinit_attempts += 1;
            reinitialize_surface(surface, new_text, &self.timings).await;
        }

        self.enter(SyncState::Finalizing, &mut report);
        surface.collapse_selection_to_end();
        report.final_text = read_text(surface);
        report
    }

    fn superseded(&self, mut report: ReplaceReport) -> ReplaceReport {
        report.outcome = ReplaceOutcome::Superseded;
        report.final_text = read_text(self.surface.as_ref());
        report
    }

    fn enter(&self, state: SyncState, report: &mut ReplaceReport) {
        self.set_state(state);
        report.states_visited.push(state);
    }

    fn set_state(&self, state: SyncState) { *lock_or_recover!(self.state) = state; }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{BufferSurface, HostQuirk, MockHostSurface};

    fn engine_for(surface: Arc<dyn EditingSurface>) -> EditorSyncEngine {
        EditorSyncEngine::new(surface).with_timings(SyncTimings::no_delay())
    }

    #[tokio::test]
    async fn test_happy_path_visits_states_in_order() {
        let surface = Arc::new(BufferSurface::new("helo wrold"));
        let engine = engine_for(surface.clone());

        let report = engine.replace("Hello world.").await;

        assert_eq!(report.outcome, ReplaceOutcome::Converged);
        assert_eq!(surface.text(), "Hello world.");
        assert_eq!(report.final_text, "Hello world.");
        assert_eq!(
            report.states_visited.as_slice(),
            &[
                SyncState::Focusing,
                SyncState::Clearing,
                SyncState::VerifyingClear,
                SyncState::Typing,
                SyncState::VerifyingType,
                SyncState::Finalizing,
            ]
        );
        assert_eq!(engine.state(), SyncState::Idle);
    }

    #[tokio::test]
    async fn test_replace_twice_is_idempotent() {
        let surface = Arc::new(BufferSurface::new("original"));
        let engine = engine_for(surface.clone());
        let text = "first line\nsecond line\n\nfourth: 100% done!";

        engine.replace(text).await;
        let report = engine.replace(text).await;

        assert_eq!(report.outcome, ReplaceOutcome::Converged);
        assert_eq!(surface.text(), text);
    }

    #[tokio::test]
    async fn test_empty_text_clears_surface() {
        let surface = Arc::new(BufferSurface::new("something"));
        let engine = engine_for(surface.clone());
        let report = engine.replace("").await;
        assert_eq!(report.outcome, ReplaceOutcome::Converged);
        assert_eq!(report.final_text, "");
        assert_eq!(surface.text(), "");
    }

    #[tokio::test]
    async fn test_leading_line_break_is_typed_once() {
        let surface = Arc::new(BufferSurface::new(""));
        let engine = engine_for(surface.clone());

        engine.replace("\nhello").await;
        let report = engine.replace("\nhello").await;

        assert_eq!(report.outcome, ReplaceOutcome::Converged);
        assert_eq!(report.final_text, "\nhello");
        assert_eq!(surface.text(), "\nhello");
    }

    #[tokio::test]
    async fn test_host_reassertion_triggers_reinitializing() {
        let surface = Arc::new(MockHostSurface::new(
            "helo wrold",
            &[HostQuirk::RevertOnChange { times: 1 }],
        ));
        let engine = engine_for(surface.clone());

        let report = engine.replace("Hello world.").await;

        assert_eq!(report.outcome, ReplaceOutcome::Converged);
        assert!(report.visited(SyncState::Reinitializing));
        assert_eq!(report.reinit_attempts, 1);
        assert_eq!(surface.text(), "Hello world.");
    }

    #[tokio::test]
    async fn test_exhausted_reinitialization_is_degraded_not_an_error() {
        let surface = Arc::new(MockHostSurface::new(
            "stale",
            &[HostQuirk::RevertOnChange { times: usize::MAX }],
        ));
        let engine = engine_for(surface.clone()).with_max_reinit_attempts(2);

        let report = engine.replace("fresh").await;

        assert_eq!(report.outcome, ReplaceOutcome::Degraded);
        assert_eq!(report.reinit_attempts, 2);
        assert_eq!(report.final_text, "stale");
    }

    #[tokio::test]
    async fn test_newer_replace_supersedes_in_flight_one() {
        let surface = Arc::new(BufferSurface::new("start"));
        let engine = Arc::new(engine_for(surface.clone()));

        let first = {
            let engine = engine.clone();
            tokio::spawn(async move {
                engine
                    .replace("a fairly long replacement that takes many keystrokes to type")
                    .await
            })
        };
        while engine.state() != SyncState::Typing {
            tokio::task::yield_now().await;
        }

        let second = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.replace("winner").await })
        };

        let first = first.await.unwrap();
        let second = second.await.unwrap();

        assert_eq!(first.outcome, ReplaceOutcome::Superseded);
        assert_eq!(second.outcome, ReplaceOutcome::Converged);
        assert!(second.generation > first.generation);
        assert_eq!(surface.text(), "winner");
    }
}
