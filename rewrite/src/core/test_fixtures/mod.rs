// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Fixtures shared by unit tests, integration tests, and the `rw` binary's demo mode.

// Attach sources.
pub mod chunk_stream_fixtures;
pub mod mock_host_surface;
pub mod mock_transport;

// Re-export.
pub use chunk_stream_fixtures::*;
pub use mock_host_surface::*;
pub use mock_transport::*;
