//! Podium terminal front-end.
//!
//! Runs the same turn pipeline as the Telegram bot from a terminal, either
//! as a REPL or one command at a time. Handy for rehearsing with
//! `--simulate`, which swaps Keynote for an in-memory demo deck.

pub mod cli;
pub mod commands;
pub mod repl;

pub use commands::{format_turn, Console};
