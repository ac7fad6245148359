// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::PathBuf;

use r3bl_rewrite::{PromptListing, ReplaceReport, SuggestionSlots};

use super::ui_str;

/// Outcome of `rw suggest`.
#[derive(Debug)]
pub struct SuggestDetails {
    pub board: SuggestionSlots,
    pub interrupted: bool,
}

/// Outcome of `rw replace`.
#[derive(Debug)]
pub struct ReplaceDetails {
    pub report: ReplaceReport,
}

/// Outcome of `rw config`.
#[derive(Debug)]
pub enum ConfigDetails {
    Shown { json: String },
    Created { path: PathBuf },
    Reset { path: PathBuf },
    Located { path: PathBuf },
    Prompt { edit: PromptEdit, path: PathBuf },
}

/// Outcome of `rw config prompt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEdit {
    Listed(Vec<PromptListing>),
    Saved { id: String },
    Removed { id: String },
    Missing { id: String },
}

impl PromptEdit {
    /// Whether the config file has to be written.
    #[must_use]
    pub fn is_change(&self) -> bool {
        matches!(self, PromptEdit::Saved { .. } | PromptEdit::Removed { .. })
    }
}

/// Command run details for the rw binary.
#[derive(Debug)]
pub enum CommandRunDetails {
    Suggest(SuggestDetails),
    Replace(ReplaceDetails),
    Config(ConfigDetails),
}

impl std::fmt::Display for CommandRunDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandRunDetails::Suggest(details) => {
                write!(f, "{}", ui_str::final_board_msg(&details.board))?;
                if details.interrupted {
                    write!(f, "\n{}", ui_str::interrupted_msg())?;
                }
                Ok(())
            }
            CommandRunDetails::Replace(details) => {
                write!(f, "{}", ui_str::replace_report_msg(&details.report))
            }
            CommandRunDetails::Config(ConfigDetails::Shown { json }) => write!(f, "{json}"),
            CommandRunDetails::Config(ConfigDetails::Created { path }) => {
                write!(f, "{}", ui_str::config_created_msg(path))
            }
            CommandRunDetails::Config(ConfigDetails::Reset { path }) => {
                write!(f, "{}", ui_str::config_reset_msg(path))
            }
            CommandRunDetails::Config(ConfigDetails::Located { path }) => {
                write!(f, "{}", path.display())
            }
            CommandRunDetails::Config(ConfigDetails::Prompt { edit, path }) => {
                write!(f, "{}", ui_str::prompt_edit_msg(edit, path))
            }
        }
    }
}
