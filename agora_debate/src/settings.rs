use std::time::Duration;

use agora_core::GenerationParams;
use serde::{Deserialize, Serialize};

/// How a round is generated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationMode {
    /// One completion holding all three contributions, split on markers.
    #[default]
    Combined,
    /// Three calls per round (pro, con, moderator) with a pause in between.
    PerRole,
}

impl std::fmt::Display for OrchestrationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Combined => f.write_str("combined"),
            Self::PerRole => f.write_str("per_role"),
        }
    }
}

impl std::str::FromStr for OrchestrationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "combined" => Ok(Self::Combined),
            "per_role" | "per-role" => Ok(Self::PerRole),
            _ => Err(anyhow::anyhow!("Invalid orchestration mode: {s}")),
        }
    }
}

/// Advisory word range written into a prompt. Never enforced on the output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordBudget {
    pub min: u32,
    pub max: u32,
}

impl WordBudget {
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

impl std::fmt::Display for WordBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{} words", self.min, self.max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptSettings {
    #[serde(default = "PromptSettings::default_opening_words")]
    pub opening_words: WordBudget,
    #[serde(default = "PromptSettings::default_continuation_words")]
    pub continuation_words: WordBudget,
    #[serde(default = "PromptSettings::default_moderator_words")]
    pub moderator_words: WordBudget,
    /// Characters of the opposing argument quoted in a rebuttal prompt.
    #[serde(default = "PromptSettings::default_quote_chars")]
    pub quote_chars: usize,
    /// Characters of each argument quoted in a moderator prompt.
    #[serde(default = "PromptSettings::default_moderator_quote_chars")]
    pub moderator_quote_chars: usize,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            opening_words: Self::default_opening_words(),
            continuation_words: Self::default_continuation_words(),
            moderator_words: Self::default_moderator_words(),
            quote_chars: Self::default_quote_chars(),
            moderator_quote_chars: Self::default_moderator_quote_chars(),
        }
    }
}

impl PromptSettings {
    const fn default_opening_words() -> WordBudget {
        WordBudget::new(200, 250)
    }

    const fn default_continuation_words() -> WordBudget {
        WordBudget::new(150, 200)
    }

    const fn default_moderator_words() -> WordBudget {
        WordBudget::new(150, 200)
    }

    const fn default_quote_chars() -> usize {
        300
    }

    const fn default_moderator_quote_chars() -> usize {
        400
    }
}

/// Sampling parameters per participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SamplingSettings {
    #[serde(default = "SamplingSettings::default_debater")]
    pub pro: GenerationParams,
    #[serde(default = "SamplingSettings::default_debater")]
    pub con: GenerationParams,
    #[serde(default = "SamplingSettings::default_moderator")]
    pub moderator: GenerationParams,
    /// Used for the single call of the combined mode.
    #[serde(default = "SamplingSettings::default_combined")]
    pub combined: GenerationParams,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            pro: Self::default_debater(),
            con: Self::default_debater(),
            moderator: Self::default_moderator(),
            combined: Self::default_combined(),
        }
    }
}

impl SamplingSettings {
    fn default_debater() -> GenerationParams {
        GenerationParams::default()
            .with_max_tokens(1500)
            .with_temperature(0.8)
    }

    fn default_moderator() -> GenerationParams {
        GenerationParams::default()
            .with_max_tokens(1500)
            .with_temperature(0.7)
    }

    fn default_combined() -> GenerationParams {
        GenerationParams::default()
            .with_max_tokens(4000)
            .with_temperature(0.8)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebateSettings {
    #[serde(default)]
    pub mode: OrchestrationMode,
    /// Upper bound accepted for a debate's total rounds.
    #[serde(default = "DebateSettings::default_max_rounds")]
    pub max_rounds: u32,
    /// Pause between model calls of one round in per-role mode.
    #[serde(default = "DebateSettings::default_inter_call_delay_secs")]
    pub inter_call_delay_secs: u64,
    #[serde(flatten)]
    pub prompts: PromptSettings,
    #[serde(default)]
    pub sampling: SamplingSettings,
}

impl Default for DebateSettings {
    fn default() -> Self {
        Self {
            mode: OrchestrationMode::default(),
            max_rounds: Self::default_max_rounds(),
            inter_call_delay_secs: Self::default_inter_call_delay_secs(),
            prompts: PromptSettings::default(),
            sampling: SamplingSettings::default(),
        }
    }
}

impl DebateSettings {
    const fn default_max_rounds() -> u32 {
        10
    }

    const fn default_inter_call_delay_secs() -> u64 {
        5
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: OrchestrationMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn inter_call_delay(&self) -> Duration {
        Duration::from_secs(self.inter_call_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_both_spellings() {
        assert_eq!("per-role".parse::<OrchestrationMode>().ok(), Some(OrchestrationMode::PerRole));
        assert_eq!("per_role".parse::<OrchestrationMode>().ok(), Some(OrchestrationMode::PerRole));
        assert_eq!("combined".parse::<OrchestrationMode>().ok(), Some(OrchestrationMode::Combined));
        assert!("parallel".parse::<OrchestrationMode>().is_err());
    }

    #[test]
    fn prompt_settings_are_read_from_the_top_level() {
        let settings: DebateSettings =
            serde_json::from_str(r#"{"mode": "per_role", "quote_chars": 50}"#)
                .unwrap_or_default();
        assert_eq!(settings.mode, OrchestrationMode::PerRole);
        assert_eq!(settings.prompts.quote_chars, 50);
        assert_eq!(settings.prompts.moderator_quote_chars, 400);
        assert_eq!(settings.max_rounds, 10);
    }

    #[test]
    fn continuation_budget_is_tighter_than_opening() {
        let prompts = PromptSettings::default();
        assert!(prompts.continuation_words.max < prompts.opening_words.max);
        assert_eq!(prompts.opening_words.to_string(), "200-250 words");
    }
}
