// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{convert::Infallible, str::FromStr};

use strum_macros::{Display, EnumIter, EnumString};

/// Used for [`BuiltInAction::Custom`] and for custom prompt ids that can't be resolved.
pub const FALLBACK_PROMPT: &str = "Improve the following text:";

/// The actions offered in the suggestion menu. Parsed from and displayed as kebab-case,
/// eg: `spell-fix`.
#[derive(Debug, Display, EnumString, EnumIter, Copy, Clone, PartialEq, Eq, Hash)]
#[strum(serialize_all = "kebab-case")]
pub enum BuiltInAction {
    SpellFix,
    Reword,
    Formal,
    Casual,
    Summarize,
    Expand,
    Custom,
}

impl BuiltInAction {
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            BuiltInAction::SpellFix => "Fix Spelling",
            BuiltInAction::Reword => "Reword",
            BuiltInAction::Formal => "Make Formal",
            BuiltInAction::Casual => "Make Casual",
            BuiltInAction::Summarize => "Summarize",
            BuiltInAction::Expand => "Expand",
            BuiltInAction::Custom => "Custom",
        }
    }

    #[must_use]
    pub fn base_prompt(self) -> &'static str {
        match self {
            BuiltInAction::SpellFix => {
                "Fix any spelling and grammar errors in the following text. \
                 Return only the corrected text:"
            }
            BuiltInAction::Reword => {
                "Rewrite the following text to improve clarity and flow while \
                 maintaining the same meaning:"
            }
            BuiltInAction::Formal => {
                "Rewrite the following text in a formal, professional tone:"
            }
            BuiltInAction::Casual => {
                "Rewrite the following text in a casual, friendly tone:"
            }
            BuiltInAction::Summarize => "Summarize the following text concisely:",
            BuiltInAction::Expand => {
                "Expand on the following text with more detail and explanation:"
            }
            BuiltInAction::Custom => FALLBACK_PROMPT,
        }
    }
}

/// What a batch is asked to do with the source text. Anything that doesn't parse as a
/// [`BuiltInAction`] is treated as the id of a user defined prompt in
/// [`crate::RewriteConfig::custom_prompts`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RewriteAction {
    BuiltIn(BuiltInAction),
    Custom(String),
}

impl FromStr for RewriteAction {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match BuiltInAction::from_str(value) {
            Ok(it) => RewriteAction::BuiltIn(it),
            Err(_) => RewriteAction::Custom(value.to_string()),
        })
    }
}

impl From<BuiltInAction> for RewriteAction {
    fn from(value: BuiltInAction) -> Self { RewriteAction::BuiltIn(value) }
}

impl std::fmt::Display for RewriteAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RewriteAction::BuiltIn(it) => write!(f, "{it}"),
            RewriteAction::Custom(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;
    use test_case::test_case;

    use super::*;

    #[test_case("spell-fix", BuiltInAction::SpellFix)]
    #[test_case("reword", BuiltInAction::Reword)]
    #[test_case("formal", BuiltInAction::Formal)]
    #[test_case("casual", BuiltInAction::Casual)]
    #[test_case("summarize", BuiltInAction::Summarize)]
    #[test_case("expand", BuiltInAction::Expand)]
    #[test_case("custom", BuiltInAction::Custom)]
    fn test_parse_built_in(input: &str, expected: BuiltInAction) {
        assert_eq!(
            input.parse::<RewriteAction>().unwrap(),
            RewriteAction::BuiltIn(expected)
        );
        assert_eq!(expected.to_string(), input);
    }

    #[test]
    fn test_parse_custom_id() {
        assert_eq!(
            "pirate-speak".parse::<RewriteAction>().unwrap(),
            RewriteAction::Custom("pirate-speak".into())
        );
    }

    #[test]
    fn test_every_action_has_a_prompt_ending_in_colon() {
        for action in BuiltInAction::iter() {
            assert!(action.base_prompt().ends_with(':'), "{action}");
            assert!(!action.display_name().is_empty());
        }
    }
}
