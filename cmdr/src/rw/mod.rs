// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod cli_arg;
pub mod config_command;
pub mod replace_command;
pub mod suggest_command;
pub mod types;
pub mod ui_str;

// Re-export.
pub use cli_arg::*;
pub use config_command::*;
pub use replace_command::*;
pub use suggest_command::*;
pub use types::*;

/// Run the command named by `cli_arg`.
///
/// # Errors
///
/// Returns an error for config, credential, or input problems. Failures of individual
/// suggestion slots are part of the returned details instead.
pub async fn handle_rw_command(cli_arg: CLIArg) -> miette::Result<CommandRunDetails> {
    match cli_arg.command {
        CLICommand::Suggest {
            action,
            slots,
            model,
            text,
        } => try_suggest(action, &text, SuggestOverrides { slots, model }).await,
        CLICommand::Replace {
            surface_text,
            surface,
            bulk,
            new_text,
        } => Ok(run_replace_demo(&surface_text, surface, bulk, &new_text).await),
        CLICommand::Config { subcommand } => try_run_config_command(subcommand),
    }
}
