use thiserror::Error;

use case_rules::{CardKind, RuleViolation};

/// A collaborator call that did not produce usable output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The backend reported an error (network, API, model).
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend answered with nothing but whitespace.
    #[error("The generator returned an empty reply")]
    EmptyReply,
}

/// Load-bearing steps of a turn. A failure in any of them aborts the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Mystery,
    Card(CardKind),
    Theories,
    FalseTheory,
    Conclusion,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Mystery => f.write_str("Mystery"),
            Stage::Card(kind) => write!(f, "{kind} card"),
            Stage::Theories => f.write_str("Theory"),
            Stage::FalseTheory => f.write_str("False-theory lookup"),
            Stage::Conclusion => f.write_str("Conclusion"),
        }
    }
}

/// Error type for session commands.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Another request is in flight. The command was dropped, not queued.
    #[error("Another request is still in progress.")]
    Busy,

    /// The command broke a game rule. Nothing changed.
    #[error(transparent)]
    Rejected(#[from] RuleViolation),

    /// A load-bearing generation call failed. Nothing was committed.
    #[error("{stage} generation failed: {source}")]
    Generation {
        stage: Stage,
        #[source]
        source: GenerationError,
    },

    /// The false-theory reply held no number between 1 and 5.
    #[error("Could not tell which theory is false from the reply {reply:?}")]
    UnparsableFalseTheory { reply: String },
}

impl SessionError {
    /// The rule violation behind this error, if that is what it is.
    pub fn violation(&self) -> Option<&RuleViolation> {
        match self {
            SessionError::Rejected(violation) => Some(violation),
            _ => None,
        }
    }
}
