//! Count and limit policy: per-kind caps, the reveal gate, association tuning.

mod counts;

pub use counts::*;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cards::CardKind;
use crate::error::ConfigError;

/// Rules of a run. Every field has a default, so a partial TOML file is fine.
///
/// ```toml
/// min_cards_before_reveal = 4
/// association_threshold = 0.75
///
/// [max_card_counts]
/// evidence = 8
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Cards that must exist before the Reveal card may be drawn.
    pub min_cards_before_reveal: usize,

    /// Maximum instances of each investigable kind.
    pub max_card_counts: CardLimits,

    /// Minimum rating (inclusive, 0.0-1.0) for a strong connection.
    pub association_threshold: f32,

    /// Associations allowed over the whole run.
    pub max_associations_per_run: u32,

    /// Earlier cards rated per new card.
    pub candidate_sample_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_cards_before_reveal: 4,
            max_card_counts: CardLimits::default(),
            association_threshold: 0.75,
            max_associations_per_run: 3,
            candidate_sample_size: 3,
        }
    }
}

impl GameConfig {
    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check that the values describe a playable run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.association_threshold) {
            return Err(ConfigError::Invalid(format!(
                "association_threshold must be within 0.0..=1.0, got {}",
                self.association_threshold
            )));
        }
        if self.candidate_sample_size == 0 {
            return Err(ConfigError::Invalid(
                "candidate_sample_size must be at least 1".to_string(),
            ));
        }
        if self.min_cards_before_reveal == 0 {
            return Err(ConfigError::Invalid(
                "min_cards_before_reveal must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The cap for a kind, `None` for kinds that are not counted.
    pub fn max_for(&self, kind: CardKind) -> Option<u32> {
        self.max_card_counts.get(kind)
    }
}
