// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use clap::{Args, Parser, Subcommand, ValueEnum};
use r3bl_rewrite::{KnownModel, RewriteAction};

/// More info: <https://docs.rs/clap/latest/clap/_derive/_tutorial/chapter_2/index.html>
#[derive(Debug, Parser)]
#[command(bin_name = "rw")]
#[command(about = "✍️ Rewrite text with AI, several candidates at a time")]
#[command(version)]
#[command(next_line_help = true)]
#[command(arg_required_else_help(true))]
/// More info: <https://docs.rs/clap/latest/clap/struct.Command.html#method.help_template>
#[command(
    help_template = "{about}\nVersion: {bin} {version} 💻\n\nUSAGE 📓:\n  rw [\x1b[32mCommand\x1b[0m] [\x1b[34mOptions\x1b[0m]\n\n{all-args}\n",
    subcommand_help_heading("Command")
)]
pub struct CLIArg {
    #[command(subcommand)]
    pub command: CLICommand,

    #[command(flatten)]
    pub global_options: GlobalOption,
}

#[derive(Debug, Args)]
pub struct GlobalOption {
    #[arg(
        global = true,
        long,
        short = 'l',
        help = "Log app output to a file named `rewrite.log` for debugging"
    )]
    pub enable_logging: bool,
}

#[derive(Debug, Subcommand)]
pub enum CLICommand {
    #[clap(
        about = "🌱 Stream several rewrite candidates for the given text\n💡 Eg: `rw suggest --action formal \"hey, send me the file\"`"
    )]
    Suggest {
        #[arg(
            long,
            short = 'a',
            default_value = "spell-fix",
            help = "spell-fix, reword, formal, casual, summarize, expand, or the id of a custom prompt"
        )]
        action: RewriteAction,

        #[arg(
            long,
            short = 's',
            help = format!(
                "Number of parallel candidates, at most {} (config default: 3)",
                r3bl_rewrite::MAX_SLOT_COUNT
            )
        )]
        slots: Option<usize>,

        #[arg(
            long,
            short = 'm',
            help = format!(
                "Model identifier, one of: {}, or any id your provider serves",
                KnownModel::list()
            )
        )]
        model: Option<String>,

        #[arg(help = "The text to rewrite")]
        text: String,
    },

    #[clap(
        about = "🔁 Replace the content of an in-memory editing surface and report what it took\n💡 Eg: `rw replace --surface-text \"helo wrold\" \"Hello world.\"`"
    )]
    Replace {
        #[arg(long, help = "Initial content of the surface")]
        surface_text: String,

        #[arg(
            long,
            value_enum,
            default_value_t = SurfaceKind::WellBehaved,
            help = "How the demo surface behaves"
        )]
        surface: SurfaceKind,

        #[arg(long, help = "Insert the whole text at once instead of char by char")]
        bulk: bool,

        #[arg(help = "Text the surface should end up with")]
        new_text: String,
    },

    #[clap(
        about = "⚙️ Show, create, reset, or locate the config file, and manage custom prompts\n💡 Eg: `rw config prompt add pirate \"Rewrite like a pirate:\"`"
    )]
    Config {
        /// Defaults to `show`.
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SurfaceKind {
    #[clap(help = "Accepts every synthetic event")]
    WellBehaved,
    #[clap(help = "Prevents key defaults and reverts the first write once")]
    Adversarial,
}

#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
pub enum ConfigSubcommand {
    #[clap(about = "Print the effective config")]
    Show,
    #[clap(about = "Write the default config file")]
    Init,
    #[clap(about = "Overwrite the config file with the defaults, dropping custom prompts")]
    Reset,
    #[clap(about = "Print the path of the config file")]
    Path,
    #[clap(about = "List, add, update, or remove custom prompts")]
    Prompt {
        #[command(subcommand)]
        action: PromptSubcommand,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
pub enum PromptSubcommand {
    #[clap(about = "List built-in and custom prompts")]
    List,
    #[clap(about = "Add a custom prompt, or overwrite one with the same id")]
    Add {
        #[arg(help = "Id to pass to `rw suggest --action`")]
        id: String,
        #[arg(help = "Instruction placed before the text to rewrite")]
        prompt: String,
        #[arg(long, help = "Display name (default: the id)")]
        name: Option<String>,
    },
    #[clap(about = "Change an existing custom prompt")]
    Update {
        id: String,
        prompt: String,
        #[arg(long, help = "Display name (default: the id)")]
        name: Option<String>,
    },
    #[clap(about = "Remove a custom prompt")]
    Remove { id: String },
}
