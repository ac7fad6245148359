// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use miette::IntoDiagnostic;
use tracing_core::LevelFilter;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

use super::{DisplayPreference, TracingConfig, rolling_file_appender_impl};

pub type DynLayer<S> = dyn Layer<S> + Send + Sync + 'static;

/// Log to the default file (see [`crate::DEFAULT_LOG_FILE_NAME`]) at the given level.
/// This is what the `rw` binary calls when logging is enabled.
///
/// # Errors
///
/// Returns an error if the log file can't be set up or a global subscriber is already
/// installed.
pub fn try_initialize_logging_global(level_filter: LevelFilter) -> miette::Result<()> {
    init_tracing(TracingConfig::new_file(None, level_filter))
}

/// Install a global subscriber built from `tracing_config`. A [`LevelFilter::OFF`] level
/// or [`crate::WriterConfig::None`] installs nothing.
///
/// # Errors
///
/// Returns an error if the layers can't be created or a global subscriber is already
/// installed.
pub fn init_tracing(tracing_config: TracingConfig) -> miette::Result<()> {
    match try_create_layers(&tracing_config)? {
        Some(layers) => tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .into_diagnostic(),
        None => Ok(()),
    }
}

/// Returns the layers without installing them. Useful for tests that want a scoped
/// subscriber via [`tracing::subscriber::with_default`].
///
/// # Errors
///
/// Returns an error if the log file can't be created.
pub fn try_create_layers(
    tracing_config: &TracingConfig,
) -> miette::Result<Option<Vec<Box<DynLayer<tracing_subscriber::Registry>>>>> {
    let level_filter = tracing_config.level_filter;
    if level_filter == LevelFilter::OFF {
        return Ok(None);
    }

    let mut layers: Vec<Box<DynLayer<tracing_subscriber::Registry>>> = vec![];

    if let Some(display) = tracing_config.writer_config.display() {
        layers.push(create_display_layer(display, level_filter));
    }

    if let Some(file_path) = tracing_config.writer_config.file_path() {
        let file_appender = rolling_file_appender_impl::try_create(file_path)?;
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_appender)
                .with_filter(level_filter)
                .boxed(),
        );
    }

    if layers.is_empty() {
        return Ok(None);
    }

    Ok(Some(layers))
}

fn create_display_layer(
    display: DisplayPreference,
    level_filter: LevelFilter,
) -> Box<DynLayer<tracing_subscriber::Registry>> {
    match display {
        DisplayPreference::Stdout => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .with_filter(level_filter)
            .boxed(),
        DisplayPreference::Stderr => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(level_filter)
            .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WriterConfig;

    #[test]
    fn test_no_layers_when_off() {
        let config = TracingConfig::new_display(DisplayPreference::Stderr, LevelFilter::OFF);
        assert!(try_create_layers(&config).unwrap().is_none());
    }

    #[test]
    fn test_no_layers_when_no_writer() {
        let config = TracingConfig {
            writer_config: WriterConfig::None,
            level_filter: LevelFilter::DEBUG,
        };
        assert!(try_create_layers(&config).unwrap().is_none());
    }

    #[test]
    fn test_display_layer_created() {
        let config = TracingConfig::new_display(DisplayPreference::Stderr, LevelFilter::INFO);
        let layers = try_create_layers(&config).unwrap().unwrap();
        assert_eq!(layers.len(), 1);
    }
}
