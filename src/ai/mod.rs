//! Generative-language integration: a thin Gemini client and the prompt /
//! response contract of the matchmaking assistant.

pub mod gemini;
pub mod matchmaker;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("language model api key is not configured")]
    MissingApiKey,
    #[error("request to language model failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("language model returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("language model returned no text")]
    EmptyResponse,
}
