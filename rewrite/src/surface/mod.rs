// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod buffer_surface;
pub mod editing_surface;
pub mod keypress;
pub mod modifier_keys_mask;
pub mod surface_event;
pub mod surface_reader;

// Re-export.
pub use buffer_surface::*;
pub use editing_surface::*;
pub use keypress::*;
pub use modifier_keys_mask::*;
pub use surface_event::*;
pub use surface_reader::*;
