// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fs, path::PathBuf};

use dirs::config_dir;
use strum_macros::Display;

use crate::{ConfigError, DEBUG_CONFIG_MOD};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPaths {
    #[strum(serialize = "r3bl-rewrite")]
    TopLevelFolderName,
    #[strum(serialize = "config.json")]
    ConfigFile,
}

/// This is where the config folder is.
#[must_use]
pub fn try_get_config_folder_path() -> Option<PathBuf> {
    let home_config_folder_path = config_dir()?;
    Some(home_config_folder_path.join(ConfigPaths::TopLevelFolderName.to_string()))
}

/// This is where the config file is stored, inside `config_folder_path`.
#[must_use]
pub fn get_config_file_path(config_folder_path: PathBuf) -> PathBuf {
    config_folder_path.join(ConfigPaths::ConfigFile.to_string())
}

/// Create the config folder if it doesn't already exist.
///
/// # Errors
///
/// Returns an error if the OS has no config folder, or it can't be created.
pub fn create_config_folder() -> Result<PathBuf, ConfigError> {
    let Some(config_folder_path) = try_get_config_folder_path() else {
        // % is Display, ? is Debug.
        tracing::error!(message = "Could not access config folder.", error = "None");
        return Err(ConfigError::ConfigFolder);
    };

    match fs::create_dir_all(&config_folder_path) {
        Ok(()) => {
            DEBUG_CONFIG_MOD.then(|| {
                // % is Display, ? is Debug.
                tracing::debug!(
                    message = "Successfully created config folder.",
                    config_folder = ?config_folder_path
                );
            });
            Ok(config_folder_path)
        }
        Err(error) => {
            // % is Display, ? is Debug.
            tracing::error!(
                message = "Could not create config folder.",
                error = ?error
            );
            Err(ConfigError::Io {
                path: config_folder_path,
                source: error,
            })
        }
    }
}
