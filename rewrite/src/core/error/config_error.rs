// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    #[error("No API key found in the environment, checked: {candidates}")]
    #[diagnostic(
        code(r3bl_rewrite::config::missing_credentials),
        help("Export one of the listed environment variables and try again.")
    )]
    MissingCredentials { candidates: String },

    #[error("Could not determine the config folder for this OS")]
    #[diagnostic(code(r3bl_rewrite::config::config_folder))]
    ConfigFolder,

    #[error("Could not access config file {path:?}")]
    #[diagnostic(code(r3bl_rewrite::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file {path:?} is not valid JSON")]
    #[diagnostic(
        code(r3bl_rewrite::config::parse),
        help("Fix the file, or delete it to fall back to the defaults.")
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
