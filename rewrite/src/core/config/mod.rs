// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod config_folder;
pub mod credentials;
pub mod rewrite_action;
pub mod rewrite_config;

// Re-export.
pub use config_folder::*;
pub use credentials::*;
pub use rewrite_action::*;
pub use rewrite_config::*;
