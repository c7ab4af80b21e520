//! # Case Rules
//!
//! The "case ledger" crate - cards, per-kind limits, phases and association
//! bookkeeping for one run of the slide-card mystery game.
//! This crate is the single source of truth for run state and does not contain any AI logic.

pub mod cards;
pub mod error;
pub mod policy;
pub mod run_state;

pub use cards::*;
pub use error::*;
pub use policy::*;
pub use run_state::*;
