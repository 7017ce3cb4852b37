//! Podium Intent - maps free-form text to presentation actions.
//!
//! Classification runs as an ordered list of layers:
//!
//! 1. **sequence**: utterances joined by "и потом", "then", ... become
//!    several intents when every part is recognised with confidence
//! 2. **patterns**: a bilingual regex table, best confidence wins
//! 3. **fallback**: a language-model call, only when the pattern layer is
//!    below the execution threshold
//!
//! Parameters (slide number, search query, speech rate, ...) are extracted
//! from the text for whichever action wins.

pub mod classifier;
pub mod fallback;
pub mod params;
pub mod patterns;

pub use classifier::{Classification, IntentClassifier, DEFAULT_CONFIDENCE_THRESHOLD};
pub use fallback::{FallbackConfig, LlmFallback};
pub use params::extract_params;
pub use patterns::{best_match, command_table, normalize, ActionPatterns, Pattern, PatternMatch};
