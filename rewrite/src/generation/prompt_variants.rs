// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::time::Duration;

use crate::RewriteConfig;

/// Appended to the base prompt, cycling by slot index, so parallel candidates differ.
pub const VARIANT_SUFFIXES: [&str; 3] = [
    "",
    " Be concise and clear.",
    " Use a different style or approach.",
];

/// Knobs for one batch, derived from [`RewriteConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub max_tokens: u32,
    pub base_temperature: f32,
    pub max_temperature: f32,
    pub temperature_step: f32,
    pub stagger: Duration,
    pub slot_count: usize,
}

impl From<&RewriteConfig> for GenerationSettings {
    fn from(config: &RewriteConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            base_temperature: config.temperature,
            max_temperature: config.max_temperature,
            temperature_step: config.temperature_step,
            stagger: config.stagger(),
            slot_count: config.slot_count,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self { Self::from(&RewriteConfig::default()) }
}

/// What one slot of a batch sends to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotPlan {
    pub index: usize,
    pub prompt_variant: String,
    pub temperature: f32,
    pub temperature_offset: f32,
    pub start_delay: Duration,
}

#[must_use]
pub fn prompt_variant(base_prompt: &str, index: usize) -> String {
    format!(
        "{base_prompt}{}",
        VARIANT_SUFFIXES[index % VARIANT_SUFFIXES.len()]
    )
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn slot_temperature(settings: &GenerationSettings, index: usize) -> f32 {
    let raised = settings.base_temperature + index as f32 * settings.temperature_step;
    raised.min(settings.max_temperature)
}

/// The user message: the prompt variant, a blank line, then the quoted source text.
#[must_use]
pub fn build_user_prompt(prompt_variant: &str, source_text: &str) -> String {
    format!("{prompt_variant}\n\n\"{source_text}\"")
}

#[must_use]
pub fn plan_slots(base_prompt: &str, settings: &GenerationSettings) -> Vec<SlotPlan> {
    (0..settings.slot_count)
        .map(|index| {
            let temperature = slot_temperature(settings, index);
            SlotPlan {
                index,
                prompt_variant: prompt_variant(base_prompt, index),
                temperature,
                temperature_offset: temperature - settings.base_temperature,
                start_delay: settings
                    .stagger
                    .saturating_mul(u32::try_from(index).unwrap_or(u32::MAX)),
            }
        })
        .collect()
}
