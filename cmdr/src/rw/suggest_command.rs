// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use miette::IntoDiagnostic;
use r3bl_rewrite::{GenerationManager, KnownModel, RewriteAction, RewriteConfig,
                   SlotUpdate};
use tokio::sync::mpsc::UnboundedReceiver;

use super::{CommandRunDetails, SuggestDetails, ui_str};

/// Overrides from the command line, applied on top of the config file.
#[derive(Debug, Default)]
pub struct SuggestOverrides {
    pub slots: Option<usize>,
    pub model: Option<String>,
}

/// Start one batch, print slot updates as they arrive, and return the final board.
/// Ctrl+C cancels the batch instead of killing the process.
///
/// # Errors
///
/// Returns an error if no API key is set or the batch is rejected. An unusable config
/// file is logged and replaced by the defaults.
pub async fn try_suggest(
    action: RewriteAction,
    text: &str,
    overrides: SuggestOverrides,
) -> miette::Result<CommandRunDetails> {
    let config = apply_overrides(RewriteConfig::load_or_default(), overrides);
    if !KnownModel::is_known(&config.model) {
        // % is Display, ? is Debug.
        tracing::warn!(
            message = "Model is not one of the known models",
            model = %config.model
        );
    }

    let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
    let manager = GenerationManager::try_from_config(config)?.with_observer(sender);

    manager.start_batch(action, text)?;
    let printer = tokio::spawn(print_live_updates(receiver));

    let interrupted = tokio::select! {
        _ = manager.settled() => false,
        _ = tokio::signal::ctrl_c() => {
            manager.cancel_batch();
            true
        }
    };
    let board = manager.settled().await;

    // Closing the channel ends the printer task.
    drop(manager);
    printer.await.into_diagnostic()?;

    Ok(CommandRunDetails::Suggest(SuggestDetails { board, interrupted }))
}

fn apply_overrides(mut config: RewriteConfig, overrides: SuggestOverrides) -> RewriteConfig {
    if let Some(slots) = overrides.slots {
        config.slot_count = slots;
    }
    if let Some(model) = overrides.model {
        config.model = model;
    }
    config
}

async fn print_live_updates(mut receiver: UnboundedReceiver<SlotUpdate>) {
    while let Some(update) = receiver.recv().await {
        if let SlotUpdate::Chunk {
            index, accumulated, ..
        } = update
        {
            println!("{}", ui_str::live_slot_msg(index, &accumulated));
        }
    }
}
