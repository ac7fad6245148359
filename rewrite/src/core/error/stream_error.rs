// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Everything that can end a [`StreamSession`] without it reaching `Completed`.
///
/// Only [`Cancelled`] is an expected outcome. It is kept in this enum so that the
/// transport can report an aborted transfer with the same type, but sessions translate it
/// into the `Cancelled` state and never forward it to an error callback. See
/// [`StreamError::is_cancellation`].
///
/// [`Cancelled`]: StreamError::Cancelled
/// [`StreamSession`]: crate::StreamSession
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum StreamError {
    #[error("Completion provider responded with HTTP status {status}")]
    #[diagnostic(
        code(r3bl_rewrite::stream::http_status),
        help("Check the API key and the model name in the config file.")
    )]
    Http { status: u16 },

    #[error("Transport failure: {0}")]
    #[diagnostic(
        code(r3bl_rewrite::stream::transport),
        help("Check the network connection and the configured endpoint.")
    )]
    Transport(String),

    /// The provider sent an `error` object inside the event stream.
    #[error("Completion provider reported an error: {0}")]
    #[diagnostic(code(r3bl_rewrite::stream::provider))]
    Provider(String),

    /// The stream ended without yielding a single content delta.
    #[error("The completion stream finished without any content")]
    #[diagnostic(code(r3bl_rewrite::stream::empty_completion))]
    EmptyCompletion,

    #[error("The completion stream was cancelled")]
    #[diagnostic(code(r3bl_rewrite::stream::cancelled))]
    Cancelled,
}

impl StreamError {
    #[must_use]
    pub fn is_cancellation(&self) -> bool { matches!(self, StreamError::Cancelled) }
}

impl From<reqwest::Error> for StreamError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => StreamError::Http {
                status: status.as_u16(),
            },
            None => StreamError::Transport(error.to_string()),
        }
    }
}
