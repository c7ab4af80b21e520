//! The card itself.

use serde::{Deserialize, Serialize};

use super::CardKind;

/// One generated card at a fixed position in the run.
///
/// Only the displayed text, the `modified` flag and the image reference
/// change after creation. The original text is kept so that re-derivation
/// always starts from what the player first saw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    index: usize,
    kind: CardKind,
    original_text: String,
    current_text: String,
    modified: bool,
    /// Reference returned by the image collaborator, if any.
    #[serde(default)]
    image: Option<String>,
}

impl Card {
    /// Create a new card. Current text starts equal to the original.
    pub fn new(index: usize, kind: CardKind, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            index,
            kind,
            current_text: text.clone(),
            original_text: text,
            modified: false,
            image: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> CardKind {
        self.kind
    }

    /// Text as first generated. Never changes.
    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    /// Text currently displayed to the player.
    pub fn current_text(&self) -> &str {
        &self.current_text
    }

    /// Whether the card has been re-derived from a later discovery.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Replace the displayed text with a re-derived version.
    ///
    /// Marks the card modified for the rest of the run.
    pub fn rewrite(&mut self, text: impl Into<String>) {
        self.current_text = text.into();
        self.modified = true;
    }

    /// Put the original text back on display. The `modified` flag is untouched.
    pub fn restore_original(&mut self) {
        self.current_text.clone_from(&self.original_text);
    }

    /// Attach an image reference.
    pub fn set_image(&mut self, image: impl Into<String>) {
        self.image = Some(image.into());
    }
}
