// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod clearing_cascade;
pub mod editor_sync_engine;
pub mod key_input_synthesizer;
pub mod reinitialize;
pub mod sync_timings;
pub mod typing_cascade;

// Re-export.
pub use clearing_cascade::*;
pub use editor_sync_engine::*;
pub use key_input_synthesizer::*;
pub use reinitialize::*;
pub use sync_timings::*;
pub use typing_cascade::*;
