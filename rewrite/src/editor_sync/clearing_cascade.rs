// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Empties a surface by escalating through [`ClearStrategy`] variants, cheapest first.
//! Each strategy is tried only if the previous one left non-blank content, and content is
//! re-read after a settle delay before escalating.
//!
//! The cascade never fails. If every strategy leaves content behind, that is logged as a
//! degraded condition and the caller carries on.

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use super::{SyncTimings, synthesize_keypress};
use crate::{DEBUG_EDITOR_SYNC_MOD, EditingSurface, InputType, ModifierKeysMask,
            SpecialKey, SurfaceEvent, is_blank, keypress, pause, read_text};

#[derive(Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq)]
pub enum ClearStrategy {
    /// Ctrl+A, Delete, Backspace through the synthesizer. Matches the native gesture.
    SelectAllDelete,
    /// Select the full range structurally and delete it, no keyboard emulation.
    SelectionRangeDelete,
    /// Backspace from the end, bounded by the content length plus a margin.
    RepeatedBackspace,
    /// Wipe every content node, then restore the non-content attributes the host needs
    /// to keep recognizing the surface.
    NuclearReset,
}

/// The outcome of one strategy. Only used to decide whether to escalate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearAttempt {
    pub strategy: ClearStrategy,
    pub succeeded: bool,
    pub remaining_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClearingOutcome {
    pub attempts: Vec<ClearAttempt>,
    pub cleared: bool,
    /// The caller's abort check fired between strategies.
    pub aborted: bool,
}

impl ClearStrategy {
    pub async fn attempt(
        self,
        surface: &dyn EditingSurface,
        timings: &SyncTimings,
    ) -> ClearAttempt {
        match self {
            ClearStrategy::SelectAllDelete => select_all_delete(surface, timings).await,
            ClearStrategy::SelectionRangeDelete => selection_range_delete(surface, timings).await,
            ClearStrategy::RepeatedBackspace => repeated_backspace(surface, timings).await,
            ClearStrategy::NuclearReset => nuclear_reset(surface, timings).await,
        }

        pause(timings.settle_delay).await;
        let remaining_text = read_text(surface);
        ClearAttempt {
            strategy: self,
            succeeded: is_blank(&remaining_text),
            remaining_text,
        }
    }
}

/// Run the strategies in order until the surface reads blank. `should_abort` is checked
/// before each strategy.
pub async fn run_clearing_cascade(
    surface: &dyn EditingSurface,
    timings: &SyncTimings,
    should_abort: &(dyn Fn() -> bool + Send + Sync),
) -> ClearingOutcome {
    let mut outcome = ClearingOutcome::default();

    if is_blank(&read_text(surface)) {
        outcome.cleared = true;
        return outcome;
    }

    for strategy in ClearStrategy::iter() {
        if should_abort() {
            outcome.aborted = true;
            return outcome;
        }

        let attempt = strategy.attempt(surface, timings).await;

        DEBUG_EDITOR_SYNC_MOD.then(|| {
            // % is Display, ? is Debug.
            tracing::debug!(
                message = "clearing cascade attempt",
                strategy = %attempt.strategy,
                succeeded = %attempt.succeeded,
                remaining_chars = %attempt.remaining_text.chars().count()
            );
        });

        let succeeded = attempt.succeeded;
        outcome.attempts.push(attempt);
        if succeeded {
            outcome.cleared = true;
            return outcome;
        }
    }

    // % is Display, ? is Debug.
    tracing::warn!(
        message = "Clearing cascade exhausted, typing into remaining content",
        remaining_text = ?outcome.attempts.last().map(|it| it.remaining_text.as_str())
    );
    outcome
}

async fn select_all_delete(surface: &dyn EditingSurface, timings: &SyncTimings) {
    let select_all = keypress!(@char ModifierKeysMask::new().with_ctrl(), 'a');
    synthesize_keypress(surface, select_all, timings).await;
    pause(timings.selection_delay).await;
    synthesize_keypress(surface, keypress!(@special SpecialKey::Delete), timings).await;
    synthesize_keypress(surface, keypress!(@special SpecialKey::Backspace), timings).await;
}

async fn selection_range_delete(surface: &dyn EditingSurface, timings: &SyncTimings) {
    if surface.select_all_content() {
        surface.dispatch_event(&SurfaceEvent::SelectionChange);
        pause(timings.selection_delay).await;
        if surface.delete_selection() {
            surface.dispatch_event(&SurfaceEvent::Input {
                input_type: InputType::DeleteContentBackward,
                data: None,
            });
        }
    }
}

async fn repeated_backspace(surface: &dyn EditingSurface, timings: &SyncTimings) {
    surface.collapse_selection_to_end();
    let bound = read_text(surface).chars().count() + timings.backspace_margin;
    let check_interval = timings.backspace_check_interval.max(1);

    for press in 1..=bound {
        synthesize_keypress(surface, keypress!(@special SpecialKey::Backspace), timings)
            .await;
        pause(timings.delete_delay).await;
        if press.is_multiple_of(check_interval) && is_blank(&read_text(surface)) {
            break;
        }
    }
}

/// Only attributes the host dropped during the wipe are restored. An attribute the host
/// regenerated with a new value is left alone, since restoring the snapshotted value
/// would apply stale state on top of the host's fresh state.
async fn nuclear_reset(surface: &dyn EditingSurface, timings: &SyncTimings) {
    let snapshot = surface.snapshot_attributes();
    surface.wipe_content();
    pause(timings.settle_delay).await;

    let current = surface.snapshot_attributes();
    let mut restored = vec![];
    for (name, value) in &snapshot.entries {
        if !current.entries.contains_key(name) {
            surface.set_attribute(name, value);
            restored.push(name.as_str());
        }
    }
    if snapshot.editable && !current.editable {
        surface.set_editable(true);
        restored.push("editable");
    }

    surface.dispatch_event(&SurfaceEvent::Input {
        input_type: InputType::DeleteContentBackward,
        data: None,
    });

    DEBUG_EDITOR_SYNC_MOD.then(|| {
        // % is Display, ? is Debug.
        tracing::debug!(message = "nuclear reset", restored_attributes = ?restored);
    });
}
