//! Read-only view of a run for the presentation layer.

use serde::{Deserialize, Serialize};

use super::{Phase, Run};
use crate::cards::CardKind;

/// The card on display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardView {
    pub index: usize,
    pub kind: CardKind,
    pub text: String,
    pub modified: bool,
    pub image: Option<String>,
}

/// One line of the quick-navigation history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub index: usize,
    pub kind: CardKind,
    pub modified: bool,
}

/// Everything a renderer needs, detached from the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub current: Option<CardView>,
    pub position: Option<usize>,
    pub total: usize,
    pub phase: Phase,
    /// The "strong connection found" signal.
    pub pending_signal: bool,
    /// Remaining draws for each investigable kind.
    pub remaining: Vec<(CardKind, u32)>,
    pub cards_needed_before_reveal: usize,
    pub history: Vec<HistoryEntry>,
}

impl RunSnapshot {
    /// Serialize for a web or terminal front end.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Run {
    /// Take a snapshot of the current state.
    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            current: self.current_card().map(|card| CardView {
                index: card.index(),
                kind: card.kind(),
                text: card.current_text().to_string(),
                modified: card.is_modified(),
                image: card.image().map(str::to_string),
            }),
            position: self.position(),
            total: self.len(),
            phase: self.phase(),
            pending_signal: self.pending().is_some(),
            remaining: CardKind::INVESTIGABLE
                .iter()
                .filter_map(|kind| self.remaining(*kind).map(|left| (*kind, left)))
                .collect(),
            cards_needed_before_reveal: self.cards_needed_before_reveal(),
            history: self
                .cards()
                .iter()
                .map(|card| HistoryEntry {
                    index: card.index(),
                    kind: card.kind(),
                    modified: card.is_modified(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_state::AssociationRecord;

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Run::default().snapshot();
        assert!(snapshot.current.is_none());
        assert_eq!(snapshot.total, 0);
        assert_eq!(snapshot.phase, Phase::Initial);
        assert_eq!(snapshot.cards_needed_before_reveal, 4);
        assert_eq!(snapshot.remaining.len(), 4);
        assert!(!snapshot.pending_signal);
    }

    #[test]
    fn test_snapshot_tracks_signal_and_history() {
        let mut run = Run::default();
        run.commit_card(CardKind::Mystery, "The case.").unwrap();
        run.commit_card(CardKind::Evidence, "A glove.").unwrap();
        run.commit_card(CardKind::Action, "Test the glove.").unwrap();
        run.record_association(AssociationRecord {
            source_index: 2,
            target_index: 1,
            reason: "Same fabric.".to_string(),
        })
        .unwrap();

        let snapshot = run.snapshot();
        assert!(snapshot.pending_signal);
        assert_eq!(snapshot.position, Some(2));
        assert_eq!(snapshot.current.as_ref().unwrap().kind, CardKind::Action);
        assert_eq!(snapshot.history.len(), 3);
        assert!(snapshot.remaining.contains(&(CardKind::Evidence, 5)));
        assert_eq!(snapshot.cards_needed_before_reveal, 1);
    }

    #[test]
    fn test_snapshot_json() {
        let mut run = Run::default();
        run.commit_card(CardKind::Mystery, "The case.").unwrap();

        let json = run.snapshot().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["phase"], "Investigating");
        assert_eq!(value["current"]["kind"], "Mystery");
        assert_eq!(value["total"], 1);
    }
}
