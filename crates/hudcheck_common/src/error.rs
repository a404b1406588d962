//! Error types for hudcheck.
//!
//! Probe failures are never errors here: they are captured as
//! `ProbeOutcome::Error` and handed to the classifier. These variants cover
//! what can go wrong before a run starts (input, URLs, config, client setup).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HudcheckError {
    #[error("API key is empty. Paste a key and try again.")]
    EmptyApiKey,

    #[error("Probe '{probe}' needs an API key but none was supplied")]
    MissingSecret { probe: String },

    #[error("Probe '{probe}' has an invalid URL: {message}")]
    InvalidUrl { probe: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Config error in {path:?}: {message}")]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, HudcheckError>;

impl HudcheckError {
    /// Short stable code for log lines and `--json` output
    pub fn code(&self) -> &'static str {
        match self {
            HudcheckError::EmptyApiKey => "empty_api_key",
            HudcheckError::MissingSecret { .. } => "missing_secret",
            HudcheckError::InvalidUrl { .. } => "invalid_url",
            HudcheckError::HttpClient(_) => "http_client",
            HudcheckError::Config { .. } => "config",
        }
    }
}
