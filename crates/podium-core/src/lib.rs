//! Podium Core - configuration and external collaborators.
//!
//! - **config**: state directory, env files and [`PodiumConfig`]
//! - **completion**: language-model completions ([`CompletionService`], OpenRouter)
//! - **search**: web search ([`SearchService`], Tavily)
//! - **speech**: speech-to-text and text-to-speech (OpenAI audio endpoints)
//! - **speakable**: turning display text into something worth saying aloud

pub mod completion;
pub mod config;
pub mod error;
pub mod search;
pub mod speakable;
pub mod speech;

pub use completion::{CompletionService, ModelTier, OpenRouterClient};
pub use config::{env_file, ensure_state_dir, load_env_files, logs_dir, state_dir, PodiumConfig};
pub use error::{Result, ServiceError};
pub use search::{SearchHit, SearchResponse, SearchService, TavilyClient};
pub use speakable::{split_paragraphs, to_speakable, truncate_for_speech};
pub use speech::{OpenAiSpeech, Synthesizer, Transcriber};
