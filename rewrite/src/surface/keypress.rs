// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

use super::ModifierKeysMask;

/// Examples.
///
/// ```rust
/// use r3bl_rewrite::*;
///
/// let a = keypress!(@char 'a');
/// assert_eq!(a, KeyPress::Plain { key: Key::Character('a') });
///
/// let select_all = keypress!(@char ModifierKeysMask::new().with_ctrl(), 'a');
/// assert_eq!(select_all.intent(), KeyIntent::SelectAll);
///
/// let enter = keypress!(@special SpecialKey::Enter);
/// assert_eq!(enter.intent(), KeyIntent::InsertLineBreak);
/// ```
#[macro_export]
macro_rules! keypress {
    // @char
    (@char $arg_char : expr) => {
        $crate::KeyPress::Plain {
            key: $crate::Key::Character($arg_char),
        }
    };

    (@char $arg_modifiers : expr, $arg_char : expr) => {
        $crate::KeyPress::WithModifiers {
            mask: $arg_modifiers,
            key: $crate::Key::Character($arg_char),
        }
    };

    // @special
    (@special $arg_special : expr) => {
        $crate::KeyPress::Plain {
            key: $crate::Key::SpecialKey($arg_special),
        }
    };

    (@special $arg_modifiers : expr, $arg_special : expr) => {
        $crate::KeyPress::WithModifiers {
            mask: $arg_modifiers,
            key: $crate::Key::SpecialKey($arg_special),
        }
    };
}

/// A logical keypress to synthesize against a surface. Please use the [`keypress!`]
/// macro instead of directly constructing this enum.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Copy)]
pub enum KeyPress {
    Plain { key: Key },
    WithModifiers { key: Key, mask: ModifierKeysMask },
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Copy)]
pub enum Key {
    Character(char),
    SpecialKey(SpecialKey),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Copy)]
pub enum SpecialKey {
    Backspace,
    Delete,
    Enter,
    Home,
    End,
    Tab,
}

/// The content mutation a real keyboard would cause for a [`KeyPress`].
#[derive(Clone, Debug, Eq, PartialEq, Copy)]
pub enum KeyIntent {
    InsertChar(char),
    InsertLineBreak,
    DeleteBackward,
    DeleteForward,
    SelectAll,
    /// Navigation and unmapped chords.
    NoMutation,
}

impl KeyIntent {
    /// `true` for intents whose net effect shows up in the surface's text.
    #[must_use]
    pub fn mutates_text(self) -> bool {
        matches!(
            self,
            KeyIntent::InsertChar(_)
                | KeyIntent::InsertLineBreak
                | KeyIntent::DeleteBackward
                | KeyIntent::DeleteForward
        )
    }
}

impl KeyPress {
    #[must_use]
    pub fn key(&self) -> Key {
        match self {
            KeyPress::Plain { key } | KeyPress::WithModifiers { key, .. } => *key,
        }
    }

    #[must_use]
    pub fn mask(&self) -> ModifierKeysMask {
        match self {
            KeyPress::Plain { .. } => ModifierKeysMask::default(),
            KeyPress::WithModifiers { mask, .. } => *mask,
        }
    }

    /// Name of the key as a browser style `key` attribute, eg: `a`, `Enter`.
    #[must_use]
    pub fn key_name(&self) -> String {
        match self.key() {
            Key::Character(ch) => ch.to_string(),
            Key::SpecialKey(special) => format!("{special:?}"),
        }
    }

    #[must_use]
    pub fn intent(&self) -> KeyIntent {
        let mask = self.mask();
        match self.key() {
            Key::Character(ch) if mask.is_ctrl_only() && ch.eq_ignore_ascii_case(&'a') => {
                KeyIntent::SelectAll
            }
            Key::Character(ch) if mask.is_empty() || mask == ModifierKeysMask::new().with_shift() => {
                KeyIntent::InsertChar(ch)
            }
            Key::Character(_) => KeyIntent::NoMutation,
            Key::SpecialKey(SpecialKey::Backspace) => KeyIntent::DeleteBackward,
            Key::SpecialKey(SpecialKey::Delete) => KeyIntent::DeleteForward,
            Key::SpecialKey(SpecialKey::Enter) => KeyIntent::InsertLineBreak,
            Key::SpecialKey(SpecialKey::Tab) => KeyIntent::InsertChar('\t'),
            Key::SpecialKey(SpecialKey::Home | SpecialKey::End) => KeyIntent::NoMutation,
        }
    }
}
