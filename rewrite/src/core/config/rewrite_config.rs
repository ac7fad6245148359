// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{collections::BTreeMap, fs, path::Path, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use super::{BuiltInAction, FALLBACK_PROMPT, RewriteAction, create_config_folder,
            get_config_file_path, try_get_config_folder_path, try_get_endpoint_override};
use crate::{ConfigError, DEBUG_CONFIG_MOD};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Models offered by the CLI. Any other string in the config file is passed through to
/// the provider as is.
#[derive(Debug, Display, EnumString, EnumIter, Copy, Clone, PartialEq, Eq)]
pub enum KnownModel {
    #[strum(serialize = "gpt-4.1")]
    Gpt41,
    #[strum(serialize = "gpt-4.1-mini")]
    Gpt41Mini,
    #[strum(serialize = "gpt-4o-mini")]
    Gpt4oMini,
}

impl KnownModel {
    /// Comma separated ids, eg: for help text.
    #[must_use]
    pub fn list() -> String {
        Self::iter()
            .map(|it| it.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[must_use]
    pub fn is_known(model: &str) -> bool { Self::from_str(model).is_ok() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPrompt {
    pub name: String,
    pub prompt: String,
}

/// One row of [`RewriteConfig::all_prompts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptListing {
    pub id: String,
    pub name: String,
    pub prompt: String,
    pub is_built_in: bool,
}

/// Read-only settings for generation. Every field falls back to its default when absent
/// from the JSON file, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_temperature: f32,
    pub temperature_step: f32,
    pub stagger_ms: u64,
    pub slot_count: usize,
    pub endpoint: String,
    pub custom_prompts: BTreeMap<String, CustomPrompt>,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            model: KnownModel::Gpt41Mini.to_string(),
            max_tokens: 500,
            temperature: 0.7,
            max_temperature: 1.0,
            temperature_step: 0.1,
            stagger_ms: 150,
            slot_count: 3,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            custom_prompts: BTreeMap::new(),
        }
    }
}

impl RewriteConfig {
    #[must_use]
    pub fn stagger(&self) -> Duration { Duration::from_millis(self.stagger_ms) }

    /// Custom prompts are looked up before built-in ones, so a user can override a
    /// built-in action by defining a custom prompt with the same id.
    #[must_use]
    pub fn resolve_prompt(&self, action: &RewriteAction) -> String {
        let id = action.to_string();
        if let Some(custom) = self.custom_prompts.get(&id) {
            return custom.prompt.clone();
        }
        match action {
            RewriteAction::BuiltIn(it) => it.base_prompt().to_string(),
            RewriteAction::Custom(_) => FALLBACK_PROMPT.to_string(),
        }
    }

    /// Add or overwrite the custom prompt `id`.
    pub fn add_custom_prompt(&mut self, id: &str, name: &str, prompt: &str) {
        self.custom_prompts.insert(
            id.to_string(),
            CustomPrompt {
                name: name.to_string(),
                prompt: prompt.to_string(),
            },
        );
    }

    /// Change an existing custom prompt. Returns `false` if there is no prompt `id`.
    pub fn update_custom_prompt(&mut self, id: &str, name: &str, prompt: &str) -> bool {
        match self.custom_prompts.get_mut(id) {
            Some(it) => {
                *it = CustomPrompt {
                    name: name.to_string(),
                    prompt: prompt.to_string(),
                };
                true
            }
            None => false,
        }
    }

    /// Returns `false` if there is no prompt `id`.
    pub fn remove_custom_prompt(&mut self, id: &str) -> bool {
        self.custom_prompts.remove(id).is_some()
    }

    /// Built-in prompts first, in menu order, then custom prompts sorted by id. A custom
    /// prompt that shadows a built-in id shows its own text in the built-in row.
    #[must_use]
    pub fn all_prompts(&self) -> Vec<PromptListing> {
        let built_in = BuiltInAction::iter()
            .filter(|it| *it != BuiltInAction::Custom)
            .map(|it| PromptListing {
                id: it.to_string(),
                name: it.display_name().to_string(),
                prompt: self.resolve_prompt(&it.into()),
                is_built_in: true,
            });
        let custom = self
            .custom_prompts
            .iter()
            .filter(|(id, _)| BuiltInAction::from_str(id).is_err())
            .map(|(id, it)| PromptListing {
                id: id.clone(),
                name: it.name.clone(),
                prompt: it.prompt.clone(),
                is_built_in: false,
            });
        built_in.chain(custom).collect()
    }

    /// Apply the environment endpoint override, if any.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(endpoint) = try_get_endpoint_override() {
            self.endpoint = endpoint;
        }
        self
    }

    /// Load from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but can't be read or parsed.
    pub fn try_load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            DEBUG_CONFIG_MOD.then(|| {
                // % is Display, ? is Debug.
                tracing::debug!(message = "No config file, using defaults", path = ?path);
            });
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the default location in the OS config folder, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but is unreadable or malformed.
    pub fn try_load() -> Result<Self, ConfigError> {
        let Some(config_folder_path) = try_get_config_folder_path() else {
            return Ok(Self::default().with_env_overrides());
        };
        let config = Self::try_load_from(&get_config_file_path(config_folder_path))?;
        Ok(config.with_env_overrides())
    }

    /// Like [`try_load_from`](Self::try_load_from), except that an unreadable or malformed
    /// file is logged and replaced by the defaults.
    #[must_use]
    pub fn load_from_or_default(path: &Path) -> Self {
        Self::try_load_from(path).unwrap_or_else(|error| {
            // % is Display, ? is Debug.
            tracing::warn!(
                message = "Unusable config file, using defaults",
                path = ?path,
                error = %error
            );
            Self::default()
        })
    }

    /// Like [`try_load`](Self::try_load), but never fails. See
    /// [`load_from_or_default`](Self::load_from_or_default).
    #[must_use]
    pub fn load_or_default() -> Self {
        let config = match try_get_config_folder_path() {
            Some(config_folder_path) => {
                Self::load_from_or_default(&get_config_file_path(config_folder_path))
            }
            None => Self::default(),
        };
        config.with_env_overrides()
    }

    /// Write `self` as pretty JSON to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be written.
    pub fn try_save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Create the config folder and write `self` into its config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder or file can't be created.
    pub fn try_save(&self) -> Result<std::path::PathBuf, ConfigError> {
        let config_file_path = get_config_file_path(create_config_folder()?);
        self.try_save_to(&config_file_path)?;
        Ok(config_file_path)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::BuiltInAction;

    fn temp_file_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("r3bl_rewrite_{}_{name}", std::process::id()))
    }

    #[test]
    fn test_defaults() {
        let config = RewriteConfig::default();
        assert_eq!(config.model, "gpt-4.1-mini");
        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.slot_count, 3);
        assert_eq!(config.stagger(), Duration::from_millis(150));
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RewriteConfig =
            serde_json::from_str(r#"{ "model": "gpt-4.1", "slot_count": 2 }"#).unwrap();
        assert_eq!(config.model, "gpt-4.1");
        assert_eq!(config.slot_count, 2);
        assert_eq!(config.max_tokens, 500);
    }

    #[test]
    fn test_resolve_prompt() {
        let mut config = RewriteConfig::default();
        config.custom_prompts.insert(
            "pirate".into(),
            CustomPrompt {
                name: "Pirate".into(),
                prompt: "Rewrite like a pirate:".into(),
            },
        );

        assert_eq!(
            config.resolve_prompt(&RewriteAction::Custom("pirate".into())),
            "Rewrite like a pirate:"
        );
        assert_eq!(
            config.resolve_prompt(&RewriteAction::Custom("unknown".into())),
            FALLBACK_PROMPT
        );
        assert_eq!(
            config.resolve_prompt(&BuiltInAction::Summarize.into()),
            "Summarize the following text concisely:"
        );
    }

    #[test]
    fn test_custom_prompt_overrides_built_in() {
        let mut config = RewriteConfig::default();
        config.custom_prompts.insert(
            "reword".into(),
            CustomPrompt {
                name: "Reword".into(),
                prompt: "Say it differently:".into(),
            },
        );
        assert_eq!(
            config.resolve_prompt(&BuiltInAction::Reword.into()),
            "Say it differently:"
        );
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = temp_file_path("missing.json");
        assert_eq!(
            RewriteConfig::try_load_from(&path).unwrap(),
            RewriteConfig::default()
        );
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_file_path("saved.json");
        let config = RewriteConfig {
            model: "gpt-4o-mini".into(),
            ..Default::default()
        };
        config.try_save_to(&path).unwrap();
        assert_eq!(RewriteConfig::try_load_from(&path).unwrap(), config);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let path = temp_file_path("malformed.json");
        fs::write(&path, "{ not json").unwrap();
        let result = RewriteConfig::try_load_from(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let path = temp_file_path("malformed_fallback.json");
        fs::write(&path, r#"{ "slot_count": "three" "#).unwrap();
        assert_eq!(
            RewriteConfig::load_from_or_default(&path),
            RewriteConfig::default()
        );
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_known_models() {
        assert_eq!(KnownModel::list(), "gpt-4.1, gpt-4.1-mini, gpt-4o-mini");
        assert!(KnownModel::is_known("gpt-4o-mini"));
        assert!(KnownModel::is_known(&RewriteConfig::default().model));
        assert!(!KnownModel::is_known("my-local-llama"));
    }

    #[test]
    fn test_custom_prompt_add_update_remove() {
        let mut config = RewriteConfig::default();

        assert!(!config.update_custom_prompt("pirate", "Pirate", "Arr:"));
        config.add_custom_prompt("pirate", "Pirate", "Rewrite like a pirate:");
        assert!(config.update_custom_prompt("pirate", "Pirate", "Arr, rewrite this:"));
        assert_eq!(
            config.resolve_prompt(&RewriteAction::Custom("pirate".into())),
            "Arr, rewrite this:"
        );

        assert!(config.remove_custom_prompt("pirate"));
        assert!(!config.remove_custom_prompt("pirate"));
        assert_eq!(
            config.resolve_prompt(&RewriteAction::Custom("pirate".into())),
            FALLBACK_PROMPT
        );
    }

    #[test]
    fn test_all_prompts_lists_built_in_then_custom() {
        let mut config = RewriteConfig::default();
        config.add_custom_prompt("pirate", "Pirate", "Rewrite like a pirate:");
        config.add_custom_prompt("reword", "Reword", "Say it differently:");

        let listing = config.all_prompts();
        let ids = listing.iter().map(|it| it.id.as_str()).collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec![
                "spell-fix",
                "reword",
                "formal",
                "casual",
                "summarize",
                "expand",
                "pirate"
            ]
        );
        assert_eq!(listing[1].prompt, "Say it differently:");
        assert!(listing[1].is_built_in);
        assert_eq!(listing[0].name, "Fix Spelling");
        assert!(!listing[6].is_built_in);
    }
}
