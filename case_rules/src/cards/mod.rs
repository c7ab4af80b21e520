//! Card definitions for a run.

mod card;

pub use card::*;

use serde::{Deserialize, Serialize};

/// The kind of a card. Fixed when the card is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    /// The opening card. Always first, never counted, never re-derived.
    Mystery,

    // Investigable kinds, limited per run
    Evidence,
    Character,
    Location,
    Action,

    /// The five-theory card that opens the reveal phase.
    Reveal,
    /// Produced by theory submission only.
    Conclusion,
}

impl CardKind {
    /// Kinds the player may draw repeatedly during the investigation.
    pub const INVESTIGABLE: [CardKind; 4] = [
        CardKind::Evidence,
        CardKind::Character,
        CardKind::Location,
        CardKind::Action,
    ];

    /// Check whether this kind is subject to per-kind limits.
    pub fn is_investigable(&self) -> bool {
        Self::INVESTIGABLE.contains(self)
    }

    /// Display label, as used in prompts and the history list.
    pub fn label(&self) -> &'static str {
        match self {
            CardKind::Mystery => "Mystery",
            CardKind::Evidence => "Evidence",
            CardKind::Character => "Character",
            CardKind::Location => "Location",
            CardKind::Action => "Action",
            CardKind::Reveal => "Reveal",
            CardKind::Conclusion => "Conclusion",
        }
    }
}

impl std::fmt::Display for CardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_investigable_kinds() {
        assert!(CardKind::Evidence.is_investigable());
        assert!(CardKind::Action.is_investigable());
        assert!(!CardKind::Mystery.is_investigable());
        assert!(!CardKind::Reveal.is_investigable());
        assert!(!CardKind::Conclusion.is_investigable());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(CardKind::Location.to_string(), "Location");
        assert_eq!(format!("{} Card:", CardKind::Reveal), "Reveal Card:");
    }
}
