//! Error types for submission and lookup.

use thiserror::Error;

/// Why a submission was rejected before any lookup was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Please enter an item")]
    Empty,
    #[error("A lookup is already in progress")]
    InFlight,
}

/// Lookup failures. The worker collapses all of these into "no year".
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("lookup service returned {status}: {detail}")]
    Status {
        status: reqwest::StatusCode,
        detail: String,
    },

    #[error("could not decode lookup response: {0}")]
    Decode(String),

    #[error("no reliable year for {0:?}")]
    Unknown(String),

    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
}
