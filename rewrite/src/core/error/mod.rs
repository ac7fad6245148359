// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod batch_error;
pub mod config_error;
pub mod stream_error;

// Re-export.
pub use batch_error::*;
pub use config_error::*;
pub use stream_error::*;
