//! Turn pipeline for Podium.
//!
//! This crate turns one inbound message into a [`TurnResult`](podium_models::TurnResult):
//! - `StateTracker` - derives the presentation state from the backend
//! - `ActionValidator` - decides which actions are legal in which state
//! - `CommandExecutor` - runs capabilities with a timeout, never fails
//! - `MultiIntentCoordinator` - runs an ordered sequence of intents
//! - `CommandRouter` - the entry point combining all of the above with
//!   per-user dialog sessions
//!
//! # Example
//!
//! ```ignore
//! use podium_keynote::SimulatedBackend;
//! use podium_models::UserId;
//! use podium_runtime::CommandRouter;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = CommandRouter::builder(Arc::new(SimulatedBackend::demo())).build()?;
//!
//!     let turn = router.handle_command(UserId::LOCAL, "начать презентацию").await;
//!     println!("{}", turn.display_text());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Key Concepts
//!
//! ## Confidence bands
//!
//! A single intent at or above the execution threshold runs directly.
//! Between the clarification floor and the threshold the bot asks
//! "did you mean ...?" and remembers the candidate; a "да" on the next
//! turn runs it. Below the floor nothing happens.
//!
//! ## Capabilities
//!
//! Every executable action maps to one [`Capability`] in a
//! [`CapabilityRegistry`]. Capabilities declare the parameters they accept;
//! registration rejects parameters the action does not define.

pub mod capabilities;
pub mod capability;
pub mod config;
pub mod coordinator;
pub mod cursor;
pub mod error;
pub mod executor;
pub mod router;
pub mod session;
pub mod tracker;
pub mod validator;

pub use capabilities::PresenterServices;
pub use capability::{Capability, CapabilityRegistry};
pub use config::RuntimeConfig;
pub use coordinator::MultiIntentCoordinator;
pub use cursor::{SpokenBlock, SpokenTextCursor};
pub use error::{Result, RuntimeError};
pub use executor::CommandExecutor;
pub use router::{confirmation_of, CommandRouter, RouterBuilder};
pub use session::{DialogSession, DialogSessionStore, HistoryEntry, SessionHandle, DEFAULT_VOICE_RATE};
pub use tracker::StateTracker;
pub use validator::{ActionValidator, Validation};
