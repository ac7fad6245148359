// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! For more information on how to use CLAP, here are some resources:
//! 1. [Tutorial](https://developerlife.com/2023/09/17/tuify-clap/)
//! 2. [Video](https://youtu.be/lzMYDA6St0s)

use clap::Parser;
use mimalloc::MiMalloc;
use r3bl_rewrite::{ok, try_initialize_logging_global};
use r3bl_rewrite_cmdr::rw::{CLIArg, CommandRunDetails, handle_rw_command, ui_str};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
#[allow(clippy::needless_return)]
async fn main() -> miette::Result<()> {
    // If no args are passed, the following line will fail, and help will be printed
    // thanks to `arg_required_else_help(true)` in the `CliArgs` struct.
    let cli_arg = CLIArg::parse();

    let should_log = cli_arg.global_options.enable_logging;

    should_log.then(|| {
        try_initialize_logging_global(tracing_core::LevelFilter::DEBUG).ok();
        // % is Display, ? is Debug.
        tracing::debug!(message = "Start logging...", cli_arg = ?cli_arg);
    });

    launch_rw(cli_arg).await;

    should_log.then(|| {
        tracing::debug!(message = "Stop logging...");
    });

    ok!()
}

pub async fn launch_rw(cli_arg: CLIArg) {
    match handle_rw_command(cli_arg).await {
        Ok(details) => display_rw_result(&details),
        // This branch is for config, credential, and input problems.
        Err(error) => report_unrecoverable_errors(&error),
    }
}

/// Unknown and unrecoverable errors: missing API key, unreadable config, blank input.
pub fn report_unrecoverable_errors(report: &miette::Report) {
    // % is Display, ? is Debug.
    tracing::error!(
        message = "Could not run rw due to the following problem",
        error = ?report
    );

    eprintln!("{}", ui_str::unrecoverable_error_msg(report));
}

pub fn display_rw_result(details: &CommandRunDetails) {
    println!("{details}");
}
