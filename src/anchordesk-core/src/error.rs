//! Error types for the collaborator boundaries.
//!
//! The director, selector and assembler never fail; these errors only come
//! from loading configuration, feeds and state, and from line rendering.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("State store error: {0}")]
    State(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] async_openai::error::OpenAIError),

    #[error("Line producer error: {0}")]
    Producer(String),

    #[error("Line producer timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// A draft line could not be written for an entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("No template for {entry} lines")]
    NoTemplate { entry: &'static str },

    #[error("Writer unavailable: {0}")]
    Unavailable(String),
}
