// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::Path;

use miette::Report;
use r3bl_rewrite::{PromptListing, ReplaceOutcome, ReplaceReport, SlotView,
                   SuggestionSlots};

use super::PromptEdit;
use crate::common::fmt;

/// Generate error message for unrecoverable errors
#[must_use]
pub fn unrecoverable_error_msg(report: &Report) -> String {
    format!(
        "{a}{b}\n{c:?}",
        a = fmt::error("❌ Could not run rw due to the following problem"),
        b = fmt::colon(),
        c = report
    )
}

/// One line per slot update while streaming, eg: `[2] Hello wor`.
#[must_use]
pub fn live_slot_msg(index: usize, text: &str) -> String {
    format!(
        "{a} {b}",
        a = fmt::label(format!("[{}]", index + 1)),
        b = fmt::dim(text.replace('\n', " ⏎ "))
    )
}

#[must_use]
pub fn slot_msg(slot: &SlotView) -> String {
    let text = slot.display_text();
    let body = match slot.candidate() {
        Some(_) => fmt::normal(text),
        None if slot.error.is_some() => fmt::error(text),
        None => fmt::dim(text),
    };
    format!(
        "{a}{b} {body}",
        a = fmt::label(format!("Suggestion {}", slot.index + 1)),
        b = fmt::colon()
    )
}

#[must_use]
pub fn final_board_msg(board: &SuggestionSlots) -> String {
    if board.is_empty() {
        return fmt::dim("No suggestions.");
    }
    board
        .slots()
        .iter()
        .map(slot_msg)
        .collect::<Vec<_>>()
        .join("\n")
}

#[must_use]
pub fn interrupted_msg() -> String { fmt::dim("Interrupted, remaining suggestions cancelled.") }

#[must_use]
pub fn replace_report_msg(report: &ReplaceReport) -> String {
    let outcome = match report.outcome {
        ReplaceOutcome::Converged => fmt::emphasis("✅ Converged"),
        ReplaceOutcome::Degraded => fmt::error("⚠️ Degraded"),
        ReplaceOutcome::Superseded => fmt::dim("Superseded"),
    };
    let strategies = report
        .clearing
        .attempts
        .iter()
        .map(|it| it.strategy.to_string())
        .collect::<Vec<_>>()
        .join(" → ");
    let states = report
        .states_visited
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" → ");
    format!(
        "{outcome}\n{a}{c} {strategies}\n{b}{c} {states}\n{d}{c} {reinit}\n{e}{c} {text:?}",
        a = fmt::label("Clearing"),
        b = fmt::label("States"),
        c = fmt::colon(),
        d = fmt::label("Reinitializations"),
        e = fmt::label("Surface text"),
        reinit = report.reinit_attempts,
        text = report.final_text,
    )
}

#[must_use]
pub fn config_created_msg(path: &Path) -> String {
    format!(
        "{a}{b} {c}",
        a = fmt::emphasis("✅ Wrote default config"),
        b = fmt::colon(),
        c = fmt::normal(path.display())
    )
}

#[must_use]
pub fn config_reset_msg(path: &Path) -> String {
    format!(
        "{a}{b} {c}",
        a = fmt::emphasis("✅ Reset config to defaults"),
        b = fmt::colon(),
        c = fmt::normal(path.display())
    )
}

fn prompt_listing_msg(listing: &PromptListing) -> String {
    let kind = if listing.is_built_in { "built-in" } else { "custom" };
    format!(
        "{a} {b}{c} {d}",
        a = fmt::label(&listing.id),
        b = fmt::dim(format!("({}, {kind})", listing.name)),
        c = fmt::colon(),
        d = fmt::normal(&listing.prompt)
    )
}

#[must_use]
pub fn prompt_edit_msg(edit: &PromptEdit, path: &Path) -> String {
    match edit {
        PromptEdit::Listed(listing) => listing
            .iter()
            .map(prompt_listing_msg)
            .collect::<Vec<_>>()
            .join("\n"),
        PromptEdit::Saved { id } => format!(
            "{a} {b}",
            a = fmt::emphasis(format!("✅ Saved prompt {id:?} to")),
            b = fmt::normal(path.display())
        ),
        PromptEdit::Removed { id } => format!(
            "{a} {b}",
            a = fmt::emphasis(format!("✅ Removed prompt {id:?} from")),
            b = fmt::normal(path.display())
        ),
        PromptEdit::Missing { id } => {
            fmt::error(format!("No custom prompt {id:?}, nothing changed."))
        }
    }
}
