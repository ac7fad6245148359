// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod completion_transport;
pub mod generation_manager;
pub mod prompt_variants;
pub mod sse_frame_decoder;
pub mod stream_session;
pub mod suggestion_slots;

// Re-export.
pub use completion_transport::*;
pub use generation_manager::*;
pub use prompt_variants::*;
pub use sse_frame_decoder::*;
pub use stream_session::*;
pub use suggestion_slots::*;
