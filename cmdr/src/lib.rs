// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # rw
//!
//! Command line front end for [`r3bl_rewrite`].
//!
//! ```text
//! rw suggest --action spell-fix "helo wrold"    # stream 3 candidates in parallel
//! rw replace --surface-text "old text" "new"    # run the sync engine on a demo surface
//! rw config init                                # write the default config file
//! ```
//!
//! The API key is read from `OPENAI_API_KEY`, `R3BL_REWRITE_API_KEY`, or `AI_API_KEY`
//! (first one set wins). Pass `-l` to any command to log to `rewrite.log` in the current
//! folder.

// Enable strict error handling in production code only.
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach sources.
pub mod common;
pub mod rw;

// Re-export.
pub use common::*;
