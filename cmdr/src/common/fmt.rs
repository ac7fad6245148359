// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::Display;

use crossterm::style::{Color, Stylize};

mod palette {
    use crossterm::style::Color;

    pub const SILVER_METALLIC: Color = Color::Rgb { r: 213, g: 217, b: 220 };
    pub const SOFT_PINK: Color = Color::Rgb { r: 255, g: 181, b: 234 };
    pub const LIZARD_GREEN: Color = Color::Rgb { r: 20, g: 244, b: 0 };
    pub const SLATE_GRAY: Color = Color::Rgb { r: 94, g: 103, b: 111 };
    pub const FROZEN_BLUE: Color = Color::Rgb { r: 171, g: 204, b: 242 };
}

fn paint(arg_text: impl Display, color: Color) -> String {
    arg_text.to_string().with(color).to_string()
}

#[must_use]
pub fn colon() -> String { dim(":") }

/// Normal or default text style.
pub fn normal(arg_text: impl Display) -> String { paint(arg_text, palette::SILVER_METALLIC) }

/// Error text style.
pub fn error(arg_text: impl Display) -> String { paint(arg_text, palette::SOFT_PINK) }

/// Emphasis text style to highlight.
pub fn emphasis(arg_text: impl Display) -> String { paint(arg_text, palette::LIZARD_GREEN) }

/// De-emphasize (dim) text.
pub fn dim(arg_text: impl Display) -> String { paint(arg_text, palette::SLATE_GRAY) }

/// Slot numbers and other labels.
pub fn label(arg_text: impl Display) -> String { paint(arg_text, palette::FROZEN_BLUE) }
