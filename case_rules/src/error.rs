use std::path::PathBuf;

use thiserror::Error;

use crate::cards::CardKind;

/// An action requested out of turn. The run is never mutated when one is returned.
///
/// The `Display` text is meant for the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    /// Nothing can be drawn before the mystery exists.
    #[error("You need to create a Mystery card first.")]
    MysteryRequired,

    /// The run has reached its conclusion.
    #[error("This mystery is solved. Reset the run to start a new one.")]
    CaseClosed,

    /// The player is looking at an earlier card.
    #[error("Navigate to the end before adding new content.")]
    NotAtLatestCard,

    /// The per-kind limit is exhausted.
    #[error("The {kind} limit of {max} cards is reached. Try another kind of card.")]
    LimitReached { kind: CardKind, max: u32 },

    /// Not enough cards before the reveal.
    #[error("Need more investigation before the reveal. Add at least {needed} more cards.")]
    RevealTooEarly { needed: usize },

    /// The theory card was already drawn this run.
    #[error("The theories are already on the table.")]
    RevealAlreadyDrawn,

    /// The kind cannot be requested directly.
    #[error("{0} cards cannot be drawn directly.")]
    NotDrawable(CardKind),

    /// Theory submission outside the reveal phase.
    #[error("There are no theories to judge right now.")]
    NotInReveal,

    /// Theory number outside 1..=5.
    #[error("Pick a theory between 1 and 5 (got {0}).")]
    InvalidTheory(u8),

    /// Navigation on an empty run.
    #[error("No cards yet. Start a mystery first.")]
    NoCards,

    #[error("Already at the first card.")]
    AtFirstCard,

    #[error("Already at the last card. Add more content to continue.")]
    AtLastCard,

    /// History jump to a position that does not exist.
    #[error("There is no card {index} (the run has {len}).")]
    NoSuchCard { index: usize, len: usize },
}

/// Why an association could not be recorded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssociationRefused {
    #[error("another association is still pending")]
    AlreadyPending,

    #[error("the association limit for this run is reached")]
    CapReached,

    #[error("card {target_index} cannot be re-derived from card {source_index}")]
    InvalidTarget {
        source_index: usize,
        target_index: usize,
    },
}

/// Failure to load or validate a [`GameConfig`](crate::GameConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_messages() {
        let err = RuleViolation::RevealTooEarly { needed: 1 };
        assert_eq!(
            err.to_string(),
            "Need more investigation before the reveal. Add at least 1 more cards."
        );

        let err = RuleViolation::LimitReached {
            kind: CardKind::Evidence,
            max: 6,
        };
        assert!(err.to_string().contains("Evidence limit of 6"));
    }

    #[test]
    fn test_invalid_target_message() {
        let err = AssociationRefused::InvalidTarget {
            source_index: 4,
            target_index: 2,
        };
        assert_eq!(err.to_string(), "card 2 cannot be re-derived from card 4");
        assert!(std::error::Error::source(&err).is_none());
    }
}
