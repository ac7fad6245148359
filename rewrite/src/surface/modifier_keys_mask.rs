// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierKeysMask {
    pub shift_key_state: KeyState,
    pub ctrl_key_state: KeyState,
    pub alt_key_state: KeyState,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyState {
    Pressed,
    #[default]
    NotPressed,
}

impl ModifierKeysMask {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.shift_key_state = KeyState::Pressed;
        self
    }

    #[must_use]
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl_key_state = KeyState::Pressed;
        self
    }

    #[must_use]
    pub fn with_alt(mut self) -> Self {
        self.alt_key_state = KeyState::Pressed;
        self
    }

    #[must_use]
    pub fn is_ctrl_only(&self) -> bool {
        self.ctrl_key_state == KeyState::Pressed
            && self.shift_key_state == KeyState::NotPressed
            && self.alt_key_state == KeyState::NotPressed
    }

    #[must_use]
    pub fn is_empty(&self) -> bool { *self == Self::default() }
}
