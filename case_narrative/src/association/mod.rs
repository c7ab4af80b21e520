//! Association Engine - finds a strong connection between a new card and an
//! earlier one.
//!
//! The engine works in two steps so no lock is held across a collaborator call:
//! 1. **Sampling**: draw up to `sample_size` candidates from the pool, without replacement
//! 2. **Rating**: ask the text generator to rate each sampled candidate in
//!    turn; the first one at or above the threshold wins

mod sampling;

pub use sampling::*;

use tracing::{debug, warn};

use case_rules::{AssociationRecord, GameConfig};

use crate::collaborator::TextGenerator;
use crate::parse::{parse_rating, RatingReply};
use crate::prompts;

/// An earlier card offered for rating.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub text: String,
}

/// Tuning for the association engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssociationEngine {
    threshold: f32,
    sample_size: usize,
}

impl AssociationEngine {
    pub fn new(threshold: f32, sample_size: usize) -> Self {
        Self {
            threshold,
            sample_size,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.association_threshold, config.candidate_sample_size)
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Whether a score counts as a strong connection. Inclusive.
    pub fn qualifies(&self, score: f32) -> bool {
        score >= self.threshold
    }

    /// Pick the candidates to rate.
    pub fn sample(&self, pool: &[usize], source: &mut dyn RandomSource) -> Vec<usize> {
        sample_without_replacement(pool, self.sample_size, source)
    }

    /// Rate `candidates` in order against the new card.
    ///
    /// A failed rating call counts as "no connection" for that candidate only.
    pub async fn find_connection(
        &self,
        generator: &dyn TextGenerator,
        new_index: usize,
        new_text: &str,
        candidates: &[Candidate],
    ) -> Option<AssociationRecord> {
        for candidate in candidates {
            let reply = match generator
                .generate(prompts::rating(&candidate.text, new_text))
                .await
            {
                Ok(reply) => parse_rating(&reply).unwrap_or(RatingReply::NoConnection),
                Err(e) => {
                    warn!(
                        "Rating card {} against card {} failed: {}",
                        candidate.index, new_index, e
                    );
                    RatingReply::NoConnection
                }
            };

            debug!(
                candidate = candidate.index,
                new_card = new_index,
                score = reply.score(),
                "Rated connection"
            );

            if self.qualifies(reply.score()) {
                return Some(AssociationRecord {
                    source_index: new_index,
                    target_index: candidate.index,
                    reason: reply.reason().to_string(),
                });
            }
        }
        None
    }
}

impl Default for AssociationEngine {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}
