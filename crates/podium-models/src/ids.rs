//! Identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the person talking to the bot.
///
/// Telegram user ids fit in an `i64`; local front-ends use [`UserId::LOCAL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// The single user of a local REPL session.
    pub const LOCAL: UserId = UserId(0);
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
