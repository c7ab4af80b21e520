//! Commands accepted from the presentation layer and their outcomes.

use serde::{Deserialize, Serialize};

use case_rules::{AssociationRecord, CardKind, Direction};

/// A player command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    CreateCard(CardKind),
    Navigate(Direction),
    /// Quick navigation from the history list.
    JumpTo(usize),
    SubmitTheory(u8),
    ResetRun,
}

/// A card was appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardCreated {
    pub index: usize,
    pub kind: CardKind,
    /// The association found for the new card, if any.
    pub association: Option<AssociationRecord>,
}

/// Result of a re-derivation triggered by arriving at a pending target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regeneration {
    pub target_index: usize,
    pub source_index: usize,
    /// `false` when the original text was restored after a failed call.
    pub rewritten: bool,
}

/// The player moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    pub position: usize,
    /// Present when this move landed on the pending target.
    pub regeneration: Option<Regeneration>,
}

/// Outcome of a theory guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub chosen: u8,
    pub correct_false_theory: u8,
    pub is_correct: bool,
    pub conclusion_index: usize,
}

/// What a dispatched command did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    CardCreated(CardCreated),
    Navigated(Navigation),
    Concluded(Verdict),
    Reset,
}
