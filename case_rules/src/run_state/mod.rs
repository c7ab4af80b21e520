//! Run state management - the central structure holding one playthrough.

mod snapshot;

pub use snapshot::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cards::{Card, CardKind};
use crate::error::{AssociationRefused, RuleViolation};
use crate::policy::{GameConfig, TypeCounts};

/// Number of theories on the Reveal card.
pub const THEORY_COUNT: u8 = 5;

/// Unique identifier for a run. Only used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Game phase. Only ever moves forward within a run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Phase {
    #[default]
    Initial,
    Investigating,
    Reveal,
    Conclusion,
}

/// Single-step navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Back,
}

/// A strong connection between a new card and an earlier one.
///
/// The earlier card (`target_index`) is re-derived once the player lands on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationRecord {
    pub source_index: usize,
    pub target_index: usize,
    /// One-sentence justification from the rating reply.
    pub reason: String,
}

/// Get the identifier used to keep later mysteries from repeating this one:
/// the first sentence, or the first 50 characters if there is no sentence end.
pub fn mystery_identifier(text: &str) -> String {
    let text = text.trim_start();
    match text.find(['.', '!', '?']) {
        Some(end) if end > 0 => text[..=end].trim().to_string(),
        _ => text.chars().take(50).collect::<String>().trim().to_string(),
    }
}

/// The complete state of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    id: RunId,
    config: GameConfig,
    cards: Vec<Card>,
    /// `None` iff `cards` is empty.
    position: Option<usize>,
    phase: Phase,
    type_counts: TypeCounts,
    correct_false_theory: Option<u8>,
    /// Every association created this run, in creation order.
    associations: Vec<AssociationRecord>,
    /// The association waiting for the player to reach its target.
    pending: Option<AssociationRecord>,
    /// Identifiers of earlier mysteries. Survives resets.
    previous_mysteries: Vec<String>,
}

impl Default for Run {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl Run {
    /// Create an empty run.
    pub fn new(config: GameConfig) -> Self {
        Self {
            id: RunId::new(),
            config,
            cards: Vec::new(),
            position: None,
            phase: Phase::Initial,
            type_counts: TypeCounts::default(),
            correct_false_theory: None,
            associations: Vec::new(),
            pending: None,
            previous_mysteries: Vec::new(),
        }
    }

    /// Replace this run with a fresh one, keeping the config and the mystery memory.
    pub fn reset(&mut self) {
        let previous_mysteries = std::mem::take(&mut self.previous_mysteries);
        *self = Self {
            previous_mysteries,
            ..Self::new(self.config.clone())
        };
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.position.and_then(|i| self.cards.get(i))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn type_counts(&self) -> &TypeCounts {
        &self.type_counts
    }

    pub fn correct_false_theory(&self) -> Option<u8> {
        self.correct_false_theory
    }

    pub fn associations(&self) -> &[AssociationRecord] {
        &self.associations
    }

    pub fn association_count(&self) -> u32 {
        self.associations.len() as u32
    }

    pub fn pending(&self) -> Option<&AssociationRecord> {
        self.pending.as_ref()
    }

    pub fn previous_mysteries(&self) -> &[String] {
        &self.previous_mysteries
    }

    fn last_index(&self) -> Option<usize> {
        self.cards.len().checked_sub(1)
    }

    fn advance_phase(&mut self, next: Phase) {
        debug_assert!(next >= self.phase, "phase moved backwards");
        if next > self.phase {
            self.phase = next;
        }
    }

    /// Cards still drawable for a kind; `None` for uncounted kinds.
    pub fn remaining(&self, kind: CardKind) -> Option<u32> {
        self.type_counts.remaining(kind, &self.config.max_card_counts)
    }

    /// Cards still missing before the Reveal card is allowed.
    pub fn cards_needed_before_reveal(&self) -> usize {
        self.config
            .min_cards_before_reveal
            .saturating_sub(self.cards.len())
    }

    /// Check whether a card of `kind` may be appended now. Never mutates.
    pub fn check_draw(&self, kind: CardKind) -> Result<(), RuleViolation> {
        match kind {
            // A new mystery replaces whatever run is open.
            CardKind::Mystery => return Ok(()),
            CardKind::Conclusion => return Err(RuleViolation::NotDrawable(kind)),
            _ => {}
        }

        if self.cards.is_empty() {
            return Err(RuleViolation::MysteryRequired);
        }

        if self.phase == Phase::Conclusion {
            return Err(RuleViolation::CaseClosed);
        }

        if self.position != self.last_index() {
            return Err(RuleViolation::NotAtLatestCard);
        }

        if let Some(max) = self.config.max_for(kind) {
            if self.type_counts.get(kind) >= max {
                return Err(RuleViolation::LimitReached { kind, max });
            }
        }

        if kind == CardKind::Reveal {
            if self.correct_false_theory.is_some() {
                return Err(RuleViolation::RevealAlreadyDrawn);
            }
            let needed = self.cards_needed_before_reveal();
            if needed > 0 {
                return Err(RuleViolation::RevealTooEarly { needed });
            }
        }

        Ok(())
    }

    fn push_card(&mut self, kind: CardKind, text: String) -> usize {
        let index = self.cards.len();
        self.cards.push(Card::new(index, kind, text));
        self.position = Some(index);
        index
    }

    /// Append a Mystery or investigable card after its text was generated.
    ///
    /// A Mystery on a non-empty run resets it first, keeping the mystery
    /// memory. Reveal cards go through [`Run::commit_reveal`] so the false
    /// theory is recorded together with the card.
    pub fn commit_card(
        &mut self,
        kind: CardKind,
        text: impl Into<String>,
    ) -> Result<usize, RuleViolation> {
        if kind == CardKind::Reveal {
            return Err(RuleViolation::NotDrawable(kind));
        }
        self.check_draw(kind)?;
        if kind == CardKind::Mystery && !self.cards.is_empty() {
            self.reset();
        }

        let index = self.push_card(kind, text.into());
        self.type_counts.increment(kind);
        if kind == CardKind::Mystery {
            self.advance_phase(Phase::Investigating);
        }
        Ok(index)
    }

    /// Append the Reveal card and fix the false theory for the rest of the run.
    pub fn commit_reveal(
        &mut self,
        text: impl Into<String>,
        false_theory: u8,
    ) -> Result<usize, RuleViolation> {
        if !(1..=THEORY_COUNT).contains(&false_theory) {
            return Err(RuleViolation::InvalidTheory(false_theory));
        }
        self.check_draw(CardKind::Reveal)?;

        let index = self.push_card(CardKind::Reveal, text.into());
        self.correct_false_theory = Some(false_theory);
        self.advance_phase(Phase::Reveal);
        Ok(index)
    }

    /// Remember a mystery so later openings avoid it.
    pub fn remember_mystery(&mut self, identifier: impl Into<String>) {
        self.previous_mysteries.push(identifier.into());
    }

    /// Check a theory guess. Returns whether `theory` is the false one.
    pub fn judge(&self, theory: u8) -> Result<bool, RuleViolation> {
        if self.phase != Phase::Reveal {
            return Err(RuleViolation::NotInReveal);
        }
        if !(1..=THEORY_COUNT).contains(&theory) {
            return Err(RuleViolation::InvalidTheory(theory));
        }
        match self.correct_false_theory {
            Some(correct) => Ok(theory == correct),
            None => Err(RuleViolation::NotInReveal),
        }
    }

    /// Append the Conclusion card and close the run.
    pub fn conclude(&mut self, text: impl Into<String>) -> Result<usize, RuleViolation> {
        if self.phase != Phase::Reveal {
            return Err(RuleViolation::NotInReveal);
        }
        let index = self.push_card(CardKind::Conclusion, text.into());
        self.advance_phase(Phase::Conclusion);
        Ok(index)
    }

    /// Whether the association engine may run at all right now.
    pub fn can_associate(&self) -> bool {
        self.pending.is_none() && self.association_count() < self.config.max_associations_per_run
    }

    /// Earlier cards that may be re-derived because of `new_index`.
    ///
    /// Only unmodified investigable cards qualify. The Mystery, Reveal and
    /// Conclusion cards are never rewritten.
    pub fn candidate_pool(&self, new_index: usize) -> Vec<usize> {
        self.cards
            .iter()
            .take(new_index)
            .filter(|card| card.kind().is_investigable() && !card.is_modified())
            .map(Card::index)
            .collect()
    }

    /// Record an association and make its target pending.
    pub fn record_association(
        &mut self,
        record: AssociationRecord,
    ) -> Result<(), AssociationRefused> {
        if self.pending.is_some() {
            return Err(AssociationRefused::AlreadyPending);
        }
        if self.association_count() >= self.config.max_associations_per_run {
            return Err(AssociationRefused::CapReached);
        }
        let source_investigable = self
            .cards
            .get(record.source_index)
            .is_some_and(|card| card.kind().is_investigable());
        if !source_investigable
            || !self.candidate_pool(record.source_index).contains(&record.target_index)
        {
            return Err(AssociationRefused::InvalidTarget {
                source_index: record.source_index,
                target_index: record.target_index,
            });
        }

        self.associations.push(record.clone());
        self.pending = Some(record);
        Ok(())
    }

    /// Move one step. The pending association is not consumed here.
    pub fn step(&mut self, direction: Direction) -> Result<usize, RuleViolation> {
        let current = self.position.ok_or(RuleViolation::NoCards)?;
        let next = match direction {
            Direction::Back => current.checked_sub(1).ok_or(RuleViolation::AtFirstCard)?,
            Direction::Forward if current + 1 < self.cards.len() => current + 1,
            Direction::Forward => return Err(RuleViolation::AtLastCard),
        };
        self.position = Some(next);
        Ok(next)
    }

    /// Jump straight to a card from the history list.
    pub fn jump_to(&mut self, index: usize) -> Result<usize, RuleViolation> {
        if self.cards.is_empty() {
            return Err(RuleViolation::NoCards);
        }
        if index >= self.cards.len() {
            return Err(RuleViolation::NoSuchCard {
                index,
                len: self.cards.len(),
            });
        }
        self.position = Some(index);
        Ok(index)
    }

    /// Take the pending association if the player now stands exactly on its target.
    pub fn take_arrival(&mut self) -> Option<AssociationRecord> {
        match (&self.pending, self.position) {
            (Some(pending), Some(position)) if pending.target_index == position => {
                self.pending.take()
            }
            _ => None,
        }
    }

    /// Store the outcome of a re-derivation: new text on success,
    /// the original text back on failure.
    pub fn apply_regeneration(&mut self, target: usize, rewritten: Option<String>) {
        if let Some(card) = self.cards.get_mut(target) {
            match rewritten {
                Some(text) => card.rewrite(text),
                None => card.restore_original(),
            }
        }
    }

    /// Attach an image reference to a card.
    pub fn attach_image(&mut self, index: usize, image: impl Into<String>) {
        if let Some(card) = self.cards.get_mut(index) {
            card.set_image(image);
        }
    }
}
