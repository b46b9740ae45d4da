/// Generator configuration: tunables with defaults, loadable from RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables for one generation session. Every field has a default, so a
/// RON file only needs to name the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Sentences per poem when the caller does not ask for a count.
    pub num_sentences: usize,
    /// Probability of picking any word with the right tag, ignoring the
    /// dependency context.
    pub any_word_probability: f64,
    /// Upper bound on the number of words in a poem name.
    pub max_name_words: usize,
    /// Name draws before falling back to a numbered name.
    pub max_name_attempts: u32,
    /// Upper bound on sentiment revision rounds.
    pub sentiment_rounds: u32,
    /// Random token positions tried before a sentiment tweak gives up.
    pub max_tag_retries: u32,
    /// Sentiment goal per axis is `(average + goal_offset) * goal_scale`.
    pub goal_offset: f64,
    pub goal_scale: f64,
    /// Maximum number of themes accepted from a theme source.
    pub max_themes: usize,
    /// Number of corpus texts sampled per session (0 = all).
    pub corpus_sample: usize,
    pub hyphen_tag: String,
    pub left_bracket_tag: String,
    /// Tag of whitespace tokens, which are never substituted.
    pub whitespace_tag: String,
    /// Tags whose words attach to the preceding word when reformatting.
    pub trailing_punct_tags: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_sentences: 5,
            any_word_probability: 0.2,
            max_name_words: 8,
            max_name_attempts: 64,
            sentiment_rounds: 10,
            max_tag_retries: 32,
            goal_offset: 0.01,
            goal_scale: 1.05,
            max_themes: 5,
            corpus_sample: 10,
            hyphen_tag: "HYPH".to_string(),
            left_bracket_tag: "-LRB-".to_string(),
            whitespace_tag: "_SP".to_string(),
            trailing_punct_tags: [".", ",", "-RRB-", "''", "\"\"", ":"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl GeneratorConfig {
    pub fn load_from_ron(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.any_word_probability) {
            return Err(ConfigError::Invalid(format!(
                "any_word_probability must be within [0, 1], got {}",
                self.any_word_probability
            )));
        }
        if self.max_name_words == 0 {
            return Err(ConfigError::Invalid(
                "max_name_words must be at least 1".to_string(),
            ));
        }
        if self.max_tag_retries == 0 {
            return Err(ConfigError::Invalid(
                "max_tag_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
