// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development.

use std::env;
use std::path::PathBuf;

const DEFAULT_API_BASE_URL: &str = "https://www.strava.com/api/v3";
const DEFAULT_TOKEN_URL: &str = "https://www.strava.com/oauth/token";
const DEFAULT_DATA_FILE: &str = "data/leaderboard.json";

/// Strava's published short-term quota.
pub const DEFAULT_RATE_LIMIT_PER_15_MIN: u32 = 100;

/// Max heart rate assumed when an athlete has not recorded one.
pub const DEFAULT_MAX_HEARTRATE: u32 = 190;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strava OAuth client ID
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Coach's long-lived refresh token; all API calls act on its behalf
    pub strava_refresh_token: String,
    /// REST API base, overridable for tests
    pub strava_api_base_url: String,
    /// OAuth token endpoint
    pub strava_token_url: String,
    /// Athletes synced into the leaderboard
    pub team_member_ids: Vec<u64>,
    /// Strava club whose members and feed can be listed
    pub strava_club_id: Option<u64>,
    /// Requests allowed per 15-minute window
    pub rate_limit_per_15_min: u32,
    /// Fallback max HR for zone estimation
    pub default_max_heartrate: u32,
    /// JSON snapshot of stored athletes and activities
    pub data_file: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            strava_client_id: required("STRAVA_CLIENT_ID")?,
            strava_client_secret: required("STRAVA_CLIENT_SECRET")?,
            strava_refresh_token: required("STRAVA_REFRESH_TOKEN")?,
            strava_api_base_url: env::var("STRAVA_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            strava_token_url: env::var("STRAVA_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
            team_member_ids: parse_team_member_ids(&required("TEAM_MEMBER_IDS")?)?,
            strava_club_id: parse_optional_id("STRAVA_CLUB_ID", env::var("STRAVA_CLUB_ID").ok())?,
            rate_limit_per_15_min: parse_or(
                "STRAVA_RATE_LIMIT_PER_15_MIN",
                DEFAULT_RATE_LIMIT_PER_15_MIN,
            )?,
            default_max_heartrate: parse_or("DEFAULT_MAX_HEARTRATE", DEFAULT_MAX_HEARTRATE)?,
            data_file: env::var("LEADERBOARD_DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_FILE)),
        })
    }

    /// Offline config for tests.
    pub fn test_default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            strava_refresh_token: "test_refresh_token".to_string(),
            strava_api_base_url: "http://127.0.0.1:9/api/v3".to_string(),
            strava_token_url: "http://127.0.0.1:9/oauth/token".to_string(),
            team_member_ids: vec![1001, 1002],
            strava_club_id: None,
            rate_limit_per_15_min: DEFAULT_RATE_LIMIT_PER_15_MIN,
            default_max_heartrate: DEFAULT_MAX_HEARTRATE,
            data_file: env::temp_dir().join("uwh-leaderboard-test.json"),
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

fn parse_or(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Blank or unset means no id.
fn parse_optional_id(
    name: &'static str,
    raw: Option<String>,
) -> Result<Option<u64>, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(name, v.to_string())),
    }
}

/// Parse a comma-separated list of athlete IDs, ignoring blanks.
pub fn parse_team_member_ids(raw: &str) -> Result<Vec<u64>, ConfigError> {
    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id = part
            .parse::<u64>()
            .map_err(|_| ConfigError::Invalid("TEAM_MEMBER_IDS", part.to_string()))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
