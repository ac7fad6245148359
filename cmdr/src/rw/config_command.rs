// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::PathBuf;

use miette::IntoDiagnostic;
use r3bl_rewrite::{ConfigError, RewriteConfig, create_config_folder, get_config_file_path,
                   try_get_config_folder_path};

use super::{CommandRunDetails, ConfigDetails, ConfigSubcommand, PromptEdit,
            PromptSubcommand};

/// # Errors
///
/// Returns an error if the config folder can't be found or the file can't be read or
/// written. Prompt edits refuse to touch a malformed file.
pub fn try_run_config_command(
    subcommand: Option<ConfigSubcommand>,
) -> miette::Result<CommandRunDetails> {
    let details = match subcommand.unwrap_or(ConfigSubcommand::Show) {
        ConfigSubcommand::Show => {
            let config = RewriteConfig::try_load()?;
            ConfigDetails::Shown {
                json: serde_json::to_string_pretty(&config).into_diagnostic()?,
            }
        }
        ConfigSubcommand::Init => ConfigDetails::Created {
            path: RewriteConfig::default().try_save()?,
        },
        ConfigSubcommand::Reset => ConfigDetails::Reset {
            path: RewriteConfig::default().try_save()?,
        },
        ConfigSubcommand::Path => ConfigDetails::Located {
            path: try_get_config_file_path()?,
        },
        ConfigSubcommand::Prompt { action } => {
            let path = try_get_config_file_path()?;
            // The file on disk, without environment overrides, so they aren't persisted.
            let mut config = RewriteConfig::try_load_from(&path)?;
            let edit = edit_prompts(&mut config, action);
            if edit.is_change() {
                create_config_folder()?;
                config.try_save_to(&path)?;
            }
            ConfigDetails::Prompt { edit, path }
        }
    };
    Ok(CommandRunDetails::Config(details))
}

fn try_get_config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(get_config_file_path(
        try_get_config_folder_path().ok_or(ConfigError::ConfigFolder)?,
    ))
}

/// Apply `action` to `config` in memory.
fn edit_prompts(config: &mut RewriteConfig, action: PromptSubcommand) -> PromptEdit {
    match action {
        PromptSubcommand::List => PromptEdit::Listed(config.all_prompts()),
        PromptSubcommand::Add { id, prompt, name } => {
            config.add_custom_prompt(&id, name.as_deref().unwrap_or(&id), &prompt);
            PromptEdit::Saved { id }
        }
        PromptSubcommand::Update { id, prompt, name } => {
            if config.update_custom_prompt(&id, name.as_deref().unwrap_or(&id), &prompt) {
                PromptEdit::Saved { id }
            } else {
                PromptEdit::Missing { id }
            }
        }
        PromptSubcommand::Remove { id } => {
            if config.remove_custom_prompt(&id) {
                PromptEdit::Removed { id }
            } else {
                PromptEdit::Missing { id }
            }
        }
    }
}
