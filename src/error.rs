// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.

use crate::config::ConfigError;

/// Application error type shared by the library and the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Strava API error: {0}")]
    StravaApi(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Message carried by `StravaApi` when Strava answers 429.
    pub const STRAVA_RATE_LIMIT: &'static str = "Rate limit exceeded";

    /// Message carried by `StravaApi` when the access token was rejected.
    pub const STRAVA_TOKEN_ERROR: &'static str = "Access token expired or invalid";

    /// Whether Strava rejected the access token (a 401).
    pub fn is_strava_token_error(&self) -> bool {
        matches!(self, AppError::StravaApi(msg) if msg == Self::STRAVA_TOKEN_ERROR)
    }

    /// Whether this error is a Strava 429.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AppError::StravaApi(msg) if msg == Self::STRAVA_RATE_LIMIT)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
