//! Per-kind limits and tallies for the four investigable kinds.

use serde::{Deserialize, Serialize};

use crate::cards::CardKind;

/// Maximum number of cards of each investigable kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardLimits {
    pub evidence: u32,
    pub character: u32,
    pub location: u32,
    pub action: u32,
}

impl Default for CardLimits {
    fn default() -> Self {
        Self {
            evidence: 6,
            character: 5,
            location: 4,
            action: 6,
        }
    }
}

impl CardLimits {
    /// The limit for a kind. Uncounted kinds have none.
    pub fn get(&self, kind: CardKind) -> Option<u32> {
        match kind {
            CardKind::Evidence => Some(self.evidence),
            CardKind::Character => Some(self.character),
            CardKind::Location => Some(self.location),
            CardKind::Action => Some(self.action),
            CardKind::Mystery | CardKind::Reveal | CardKind::Conclusion => None,
        }
    }
}

/// Cards drawn so far, per investigable kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeCounts {
    evidence: u32,
    character: u32,
    location: u32,
    action: u32,
}

impl TypeCounts {
    fn slot_mut(&mut self, kind: CardKind) -> Option<&mut u32> {
        match kind {
            CardKind::Evidence => Some(&mut self.evidence),
            CardKind::Character => Some(&mut self.character),
            CardKind::Location => Some(&mut self.location),
            CardKind::Action => Some(&mut self.action),
            CardKind::Mystery | CardKind::Reveal | CardKind::Conclusion => None,
        }
    }

    /// Count for a kind; zero for uncounted kinds.
    pub fn get(&self, kind: CardKind) -> u32 {
        match kind {
            CardKind::Evidence => self.evidence,
            CardKind::Character => self.character,
            CardKind::Location => self.location,
            CardKind::Action => self.action,
            CardKind::Mystery | CardKind::Reveal | CardKind::Conclusion => 0,
        }
    }

    /// Bump the tally. Uncounted kinds are ignored.
    pub fn increment(&mut self, kind: CardKind) {
        if let Some(slot) = self.slot_mut(kind) {
            *slot += 1;
        }
    }

    /// Cards of `kind` still drawable under `limits`.
    pub fn remaining(&self, kind: CardKind, limits: &CardLimits) -> Option<u32> {
        limits
            .get(kind)
            .map(|max| max.saturating_sub(self.get(kind)))
    }
}
