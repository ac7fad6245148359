// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # r3bl_rewrite
//!
//! AI assisted rewriting for message composition surfaces that this crate does not own.
//!
//! There are two halves to this crate.
//!
//! 1. [`EditorSyncEngine`] replaces the content of an [`EditingSurface`]. The surface is
//!    adversarial: it keeps its own model of the content and may silently reassert stale
//!    state after a programmatic write. So a replacement is a verify-then-escalate state
//!    machine and not a setter.
//!
//!    ```text
//!    Idle ─▶ Focusing ─▶ Clearing ─▶ VerifyingClear ─▶ Typing ─▶ VerifyingType ─┐
//!                                                                               │
//!      ┌───────────────────── drift detected ◀──────────────────────────────────┤
//!      ▼                                                                        │
//!    Reinitializing ─▶ VerifyingType (bounded attempts) ───────────▶ Finalizing ─┴─▶ Idle
//!    ```
//!
//!    [`EditorSyncEngine::replace`] never fails. It returns a [`ReplaceReport`] that says
//!    whether the surface converged or was left in its best achieved state.
//!
//! 2. [`GenerationManager`] runs several [`StreamSession`]s at once, each one a
//!    cancellable server-sent-events completion stream. Their output is multiplexed into
//!    independent [`SuggestionSlots`]. Starting a new batch cancels the previous one, and a
//!    cancelled session can never touch a slot again.
//!
//! A chosen candidate goes back through the engine via
//! [`GenerationManager::accept_candidate`].
//!
//! # Logging
//!
//! Call [`try_initialize_logging_global`] once from the binary. Each module has a
//! `DEBUG_*` const that gates its debug output.

// Enforce strict error handling in production library code only. Tests are allowed to
// use .unwrap() (workspace `Cargo.toml` config allows it).
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Debug log gates, one per module group.
pub const DEBUG_CONFIG_MOD: bool = true;
pub const DEBUG_EDITOR_SYNC_MOD: bool = true;
pub const DEBUG_GENERATION_MOD: bool = true;

// Attach modules.
pub mod core;
pub mod editor_sync;
pub mod generation;
pub mod surface;

// Re-export.
pub use core::*;
pub use editor_sync::*;
pub use generation::*;
pub use surface::*;
