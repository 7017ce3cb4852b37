//! Core data models for Podium.
//!
//! This crate provides the types shared by every layer of the presenter
//! bot: the presentation state machine, the closed action vocabulary with
//! its per-action parameter schema, classified intents, execution results
//! and the shape of a completed turn.

pub mod action;
pub mod ids;
pub mod intent;
pub mod params;
pub mod result;
pub mod state;

// Re-export main types
pub use action::{ActionName, ParseActionError};
pub use ids::UserId;
pub use intent::ActionIntent;
pub use params::{ActionParams, ParamValue};
pub use result::{ExecutionResult, IntentOutcome, TurnResult};
pub use state::{PresentationSnapshot, PresentationState};
