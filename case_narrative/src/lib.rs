//! # Case Narrative (The Narrator)
//!
//! Drives a run of the slide-card mystery game against a text generator and
//! an optional image generator. Run state and game rules live in `case_rules`;
//! this crate decides what to ask the collaborators and when.
//!
//! ## Core Components
//!
//! - **session**: The turn controller: card creation, navigation, theory submission, busy flag
//! - **association**: Finds a strong connection between a new card and an earlier one
//! - **prompts**: Builds role-tagged requests from run state
//! - **parse**: Reads ratings and false-theory numbers out of free-form replies
//! - **imagery**: Turns a scene summary into a safe, bounded image prompt
//! - **collaborator**: Service traits for the text and image backends
//!
//! ## Design Philosophy
//!
//! - **Commit after success**: A card exists only once its text was generated
//! - **Best-effort extras**: Images and associations never fail a turn
//! - **One command at a time**: Overlapping commands are rejected, not queued

pub mod association;
pub mod collaborator;
pub mod error;
pub mod imagery;
pub mod parse;
pub mod prompts;
pub mod session;

pub use association::*;
pub use collaborator::*;
pub use error::*;
pub use imagery::*;
pub use parse::*;
pub use session::*;
