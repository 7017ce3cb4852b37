//! Podium Keynote - presentation control backend.
//!
//! The runtime drives presentations through the [`PresentationBackend`]
//! trait. Two implementations ship here:
//!
//! - [`KeynoteBackend`] scripts Keynote on macOS through `osascript`
//! - [`SimulatedBackend`] keeps an in-memory deck for demos and tests
//!
//! # Example
//!
//! ```ignore
//! use podium_keynote::{KeynoteBackend, PresentationBackend};
//!
//! let keynote = KeynoteBackend::new()?;
//! if keynote.is_host_running().await? {
//!     keynote.next().await?;
//! }
//! ```

pub mod backend;
pub mod error;
pub mod keynote;
pub mod script;
pub mod simulated;

pub use backend::{PlaybackMode, PlaybackStatus, PresentationBackend, SlideContent};
pub use error::{BackendError, Result};
pub use keynote::KeynoteBackend;
pub use script::ScriptRunner;
pub use simulated::SimulatedBackend;
