// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Rejections of a batch request at the caller boundary. Once a batch is running, all
/// failures are encoded in slot state instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum BatchError {
    #[error("Source text is empty or whitespace only")]
    #[diagnostic(
        code(r3bl_rewrite::batch::empty_source),
        help("Select or type some text before asking for suggestions.")
    )]
    EmptySourceText,

    #[error("A batch needs at least one slot")]
    #[diagnostic(code(r3bl_rewrite::batch::zero_slots))]
    ZeroSlots,

    #[error("{requested} slots is more than the limit of {max}")]
    #[diagnostic(
        code(r3bl_rewrite::batch::too_many_slots),
        help("Ask for fewer parallel candidates.")
    )]
    TooManySlots { requested: usize, max: usize },

    #[error("There is no previous batch to refresh")]
    #[diagnostic(code(r3bl_rewrite::batch::nothing_to_refresh))]
    NothingToRefresh,
}
