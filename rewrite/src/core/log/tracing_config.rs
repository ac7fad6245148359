// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use tracing_core::LevelFilter;

/// Default log file, created in the current working directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "rewrite.log";

/// Configure where tracing output goes and how verbose it is. Pass it to
/// [`crate::init_tracing`].
///
/// Stdout is the CLI's own output channel, so a binary that prints suggestions should
/// pick [`DisplayPreference::Stderr`] or a file.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub writer_config: WriterConfig,
    pub level_filter: LevelFilter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterConfig {
    None,
    Display(DisplayPreference),
    File(String /* log file path */),
    DisplayAndFile(DisplayPreference, String /* log file path */),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPreference {
    Stdout,
    Stderr,
}

impl TracingConfig {
    #[must_use]
    pub fn new_file(file_path: Option<String>, level_filter: LevelFilter) -> Self {
        Self {
            writer_config: WriterConfig::File(
                file_path.unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_string()),
            ),
            level_filter,
        }
    }

    #[must_use]
    pub fn new_display(display: DisplayPreference, level_filter: LevelFilter) -> Self {
        Self {
            writer_config: WriterConfig::Display(display),
            level_filter,
        }
    }

    #[must_use]
    pub fn new_file_and_display(
        file_path: Option<String>,
        display: DisplayPreference,
        level_filter: LevelFilter,
    ) -> Self {
        Self {
            writer_config: WriterConfig::DisplayAndFile(
                display,
                file_path.unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_string()),
            ),
            level_filter,
        }
    }
}

impl WriterConfig {
    #[must_use]
    pub fn display(&self) -> Option<DisplayPreference> {
        match self {
            WriterConfig::Display(it) | WriterConfig::DisplayAndFile(it, _) => Some(*it),
            WriterConfig::None | WriterConfig::File(_) => None,
        }
    }

    #[must_use]
    pub fn file_path(&self) -> Option<&str> {
        match self {
            WriterConfig::File(it) | WriterConfig::DisplayAndFile(_, it) => Some(it),
            WriterConfig::None | WriterConfig::Display(_) => None,
        }
    }
}
