// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::env;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{ConfigError, DEBUG_CONFIG_MOD};

/// API key variables, in lookup priority order.
#[derive(Debug, Display, EnumString, EnumIter, Copy, Clone, PartialEq, Eq)]
pub enum ApiKeyEnvKeys {
    #[strum(serialize = "OPENAI_API_KEY")]
    OpenAi,
    #[strum(serialize = "R3BL_REWRITE_API_KEY")]
    Rewrite,
    #[strum(serialize = "AI_API_KEY")]
    Generic,
}

/// Overrides the completion endpoint from the config file.
pub const ENDPOINT_ENV_KEY: &str = "R3BL_REWRITE_ENDPOINT";

/// A bearer token. [`std::fmt::Debug`] never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }

    #[must_use]
    pub fn expose(&self) -> &str { &self.0 }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(***)")
    }
}

/// Returns the first non-empty API key from [`ApiKeyEnvKeys`].
///
/// # Errors
///
/// Returns [`ConfigError::MissingCredentials`] if none of them are set.
pub fn try_get_api_key() -> Result<ApiKey, ConfigError> {
    for key in ApiKeyEnvKeys::iter() {
        if let Ok(value) = env::var(key.to_string())
            && !value.trim().is_empty()
        {
            DEBUG_CONFIG_MOD.then(|| {
                // % is Display, ? is Debug.
                tracing::debug!(message = "Found API key", env_key = %key);
            });
            return Ok(ApiKey::new(value.trim()));
        }
    }

    Err(ConfigError::MissingCredentials {
        candidates: ApiKeyEnvKeys::iter()
            .map(|it| it.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Returns the endpoint override, if one is set.
#[must_use]
pub fn try_get_endpoint_override() -> Option<String> {
    env::var(ENDPOINT_ENV_KEY)
        .ok()
        .filter(|it| !it.trim().is_empty())
}
