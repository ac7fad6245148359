// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::time::Duration;

/// Delays that give the host's listeners a chance to run between synthetic events, plus
/// the bounds that guarantee the cascades terminate.
///
/// Passed explicitly into every call so that concurrent replacements (on different
/// surfaces) never share mutable timing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTimings {
    /// Between key-down and key-up.
    pub key_press_delay: Duration,
    /// Between characters in char-by-char typing.
    pub typing_delay: Duration,
    /// After focusing the surface.
    pub focus_delay: Duration,
    /// After the clearing cascade, before typing.
    pub clear_delay: Duration,
    /// Before every verification read.
    pub settle_delay: Duration,
    /// Between presses in the repeated backspace strategy.
    pub delete_delay: Duration,
    /// After a structural selection change.
    pub selection_delay: Duration,
    /// Extra presses beyond the content length in the repeated backspace strategy.
    pub backspace_margin: usize,
    /// Check for early exit every this many backspace presses.
    pub backspace_check_interval: usize,
}

impl Default for SyncTimings {
    fn default() -> Self {
        Self {
            key_press_delay: Duration::from_millis(5),
            typing_delay: Duration::from_millis(5),
            focus_delay: Duration::from_millis(50),
            clear_delay: Duration::from_millis(100),
            settle_delay: Duration::from_millis(50),
            delete_delay: Duration::from_millis(20),
            selection_delay: Duration::from_millis(30),
            backspace_margin: 5,
            backspace_check_interval: 10,
        }
    }
}

impl SyncTimings {
    /// Same bounds, no delays. Every pause still yields to the scheduler.
    #[must_use]
    pub fn no_delay() -> Self {
        Self {
            key_press_delay: Duration::ZERO,
            typing_delay: Duration::ZERO,
            focus_delay: Duration::ZERO,
            clear_delay: Duration::ZERO,
            settle_delay: Duration::ZERO,
            delete_delay: Duration::ZERO,
            selection_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}
