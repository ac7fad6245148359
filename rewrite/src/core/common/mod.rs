// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod decl_macros;
pub mod generation_token;
pub mod pause;
pub mod text_compare;

// Re-export.
pub use generation_token::*;
pub use pause::*;
pub use text_compare::*;
