// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::sync::{Arc,
                atomic::{AtomicU64, Ordering}};

use tokio_util::sync::CancellationToken;

/// Monotonic generation counter shared by every clone. Generation `0` means "nothing
/// issued yet", the first call to [`next`] returns `1`.
///
/// Two things in this crate are last-writer-wins and use this clock:
/// - suggestion batches, where a newer batch invalidates all slot updates of older ones.
/// - surface replacements, where a newer `replace()` call supersedes an in-flight one.
///
/// [`next`]: Self::next
#[derive(Debug, Default, Clone)]
pub struct GenerationClock {
    latest: Arc<AtomicU64>,
}

impl GenerationClock {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Issue the next generation, which immediately becomes the current one.
    #[must_use]
    pub fn next(&self) -> u64 { self.latest.fetch_add(1, Ordering::AcqRel).wrapping_add(1) }

    /// The most recently issued generation.
    #[must_use]
    pub fn current(&self) -> u64 { self.latest.load(Ordering::Acquire) }

    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool { self.current() == generation }

    /// Issue the next generation along with a fresh root cancellation token.
    #[must_use]
    pub fn next_token(&self) -> GenerationToken {
        GenerationToken::new(self.next(), CancellationToken::new())
    }
}

/// Generation scoped cancellation token. Cancelling a token cancels all of its
/// [`child`](Self::child) tokens, but not its parent or siblings.
#[derive(Debug, Clone)]
pub struct GenerationToken {
    generation: u64,
    cancel: CancellationToken,
}

impl GenerationToken {
    #[must_use]
    pub fn new(generation: u64, cancel: CancellationToken) -> Self {
        Self { generation, cancel }
    }

    #[must_use]
    pub const fn generation(&self) -> u64 { self.generation }

    #[must_use]
    pub fn is_cancelled(&self) -> bool { self.cancel.is_cancelled() }

    pub fn cancel(&self) { self.cancel.cancel(); }

    /// Resolves once cancellation is requested on this token or any ancestor.
    pub async fn cancelled(&self) { self.cancel.cancelled().await; }

    /// Creates a child token in the same generation.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            generation: self.generation,
            cancel: self.cancel.child_token(),
        }
    }
}
