// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for fetching team activities.
//!
//! Handles:
//! - Athlete and activity fetching
//! - Club member and club activity listings
//! - Access token refresh from the coach's refresh token
//! - Token caching with invalidation on 401
//! - Rate limiting through the shared FIFO limiter

use crate::cache::{keys, ttl, CacheClient};
use crate::error::AppError;
use crate::models::{Activity, Athlete};
use crate::services::rate_limit::RateLimiter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Page size used when listing activities.
pub const DEFAULT_PER_PAGE: u32 = 30;

/// Largest page Strava serves for club listings.
pub const CLUB_PER_PAGE: u32 = 200;

/// Pages fetched at most when collecting recent club activities.
pub const MAX_CLUB_PAGES: u32 = 5;

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(
        client_id: String,
        client_secret: String,
        base_url: String,
        token_url: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token_url,
            client_id,
            client_secret,
        }
    }

    /// Get a detailed activity by ID.
    pub async fn get_activity(
        &self,
        access_token: &str,
        activity_id: u64,
    ) -> Result<StravaActivity, AppError> {
        let url = format!("{}/activities/{}", self.base_url, activity_id);
        self.get_json(&url, access_token, &[]).await
    }

    /// List the authenticated athlete's activities.
    pub async fn list_activities(
        &self,
        access_token: &str,
        query: &ActivityQuery,
    ) -> Result<Vec<StravaActivity>, AppError> {
        let url = format!("{}/athlete/activities", self.base_url);
        self.get_json(&url, access_token, &query.params()).await
    }

    /// List activities for a specific athlete.
    pub async fn list_athlete_activities(
        &self,
        access_token: &str,
        athlete_id: u64,
        query: &ActivityQuery,
    ) -> Result<Vec<StravaActivity>, AppError> {
        let url = format!("{}/athletes/{}/activities", self.base_url, athlete_id);
        self.get_json(&url, access_token, &query.params()).await
    }

    /// List members of a club (one page of up to 200).
    pub async fn list_club_members(
        &self,
        access_token: &str,
        club_id: u64,
    ) -> Result<Vec<StravaClubMember>, AppError> {
        let url = format!("{}/clubs/{}/members", self.base_url, club_id);
        let params = [("per_page", CLUB_PER_PAGE.to_string())];
        self.get_json(&url, access_token, &params).await
    }

    /// List one page of a club's activity feed, newest first.
    pub async fn list_club_activities(
        &self,
        access_token: &str,
        club_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<StravaClubActivity>, AppError> {
        let url = format!("{}/clubs/{}/activities", self.base_url, club_id);
        let params = [("page", page.to_string()), ("per_page", per_page.to_string())];
        self.get_json(&url, access_token, &params).await
    }

    /// Refresh an access token.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenRefreshResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Strava token refresh failed");
            return Err(AppError::StravaApi(format!(
                "Token refresh failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("Failed to parse token response: {}", e)))
    }

    /// Get authenticated athlete profile.
    pub async fn get_athlete(&self, access_token: &str) -> Result<StravaAthlete, AppError> {
        let url = format!("{}/athlete", self.base_url);
        self.get_json(&url, access_token, &[]).await
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Strava rate limit hit (429)");
                return Err(AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string()));
            }

            // Unauthorized - token may be expired
            if status.as_u16() == 401 {
                return Err(AppError::StravaApi(
                    AppError::STRAVA_TOKEN_ERROR.to_string(),
                ));
            }

            return Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

/// Query parameters for the activity list endpoints.
#[derive(Debug, Clone)]
pub struct ActivityQuery {
    /// Only activities that started after this time
    pub after: Option<DateTime<Utc>>,
    /// Only activities that started before this time
    pub before: Option<DateTime<Utc>>,
    pub page: u32,
    pub per_page: u32,
}

impl ActivityQuery {
    /// First page of activities since `after`.
    pub fn since(after: DateTime<Utc>) -> Self {
        Self {
            after: Some(after),
            before: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);
        if let Some(after) = self.after {
            params.push(("after", after.timestamp().to_string()));
        }
        if let Some(before) = self.before {
            params.push(("before", before.timestamp().to_string()));
        }
        params.push(("page", self.page.to_string()));
        params.push(("per_page", self.per_page.to_string()));
        params
    }
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_at: i64,
}

/// Athlete reference embedded in activity payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaAthleteRef {
    pub id: u64,
}

/// Strava athlete profile.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaAthlete {
    pub id: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub profile: Option<String>,
}

impl StravaAthlete {
    pub fn into_athlete(self) -> Athlete {
        Athlete {
            id: self.id,
            username: self.username.unwrap_or_default(),
            firstname: self.firstname,
            lastname: self.lastname,
            profile_picture_url: self.profile.filter(|p| !p.is_empty()),
            max_heartrate: None,
        }
    }
}

/// Strava activity as returned by the list and detail endpoints.
///
/// Manual submissions use the same shape, so everything except `id` and
/// `start_date` is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaActivity {
    pub id: u64,
    #[serde(default)]
    pub athlete: Option<StravaAthleteRef>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub activity_type: String,
    #[serde(default)]
    pub sport_type: Option<String>,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub moving_time: Option<u32>,
    #[serde(default)]
    pub elapsed_time: Option<u32>,
    #[serde(default)]
    pub total_elevation_gain: Option<f64>,
    #[serde(default)]
    pub has_heartrate: Option<bool>,
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    #[serde(default)]
    pub max_heartrate: Option<f64>,
}

impl StravaActivity {
    /// Convert to a stored activity, filling gaps.
    ///
    /// `athlete_id` is used when the payload carries no athlete reference.
    pub fn into_activity(self, athlete_id: u64) -> Activity {
        let moving_time = self.moving_time.unwrap_or(0);
        let sport_type = self
            .sport_type
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.activity_type.clone());
        let hr_recorded = self.has_heartrate != Some(false);
        let positive = |hr: Option<f64>| hr.filter(|v| hr_recorded && *v > 0.0);

        Activity {
            id: self.id,
            athlete_id: self.athlete.map(|a| a.id).unwrap_or(athlete_id),
            name: self.name,
            activity_type: self.activity_type,
            sport_type,
            start_date: self.start_date,
            distance_meters: self.distance.unwrap_or(0.0).max(0.0),
            moving_time_secs: moving_time,
            elapsed_time_secs: self.elapsed_time.unwrap_or(moving_time),
            total_elevation_gain: self.total_elevation_gain.unwrap_or(0.0),
            average_heartrate: positive(self.average_heartrate),
            max_heartrate: positive(self.max_heartrate),
        }
    }
}

/// Name-only athlete reference in club payloads.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StravaClubAthlete {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
}

/// Club member as listed by `/clubs/{id}/members`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StravaClubMember {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub membership: Option<String>,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub owner: bool,
}

/// Club feed entry.
///
/// Strava only serves summaries here: there is no activity id, no start
/// date and no athlete id, so these cannot be stored or scored.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StravaClubActivity {
    pub athlete: StravaClubAthlete,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub activity_type: String,
    #[serde(default)]
    pub sport_type: String,
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub moving_time: u32,
    #[serde(default)]
    pub elapsed_time: u32,
    #[serde(default)]
    pub total_elevation_gain: f64,
    #[serde(default)]
    pub workout_type: Option<u32>,
}

// ─────────────────────────────────────────────────────────────────────────────
// StravaService - High-level service with token management
// ─────────────────────────────────────────────────────────────────────────────

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// High-level Strava service that manages the coach token and rate limits.
///
/// Every API call is admitted through the shared [`RateLimiter`]. The access
/// token lives in the cache; a 401 drops it so the next call refreshes.
#[derive(Clone)]
pub struct StravaService {
    client: StravaClient,
    cache: CacheClient,
    limiter: Arc<RateLimiter>,
    /// Current refresh token. The lock also serializes refreshes.
    refresh_token: Arc<Mutex<String>>,
}

impl StravaService {
    pub fn new(
        client: StravaClient,
        refresh_token: String,
        cache: CacheClient,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            client,
            cache,
            limiter,
            refresh_token: Arc::new(Mutex::new(refresh_token)),
        }
    }

    // ─── Token Management ────────────────────────────────────────────────────

    /// Get a usable access token, refreshing if none is cached.
    pub async fn get_access_token(&self) -> Result<String, AppError> {
        if let Some(token) = self.cache.get_json::<String>(keys::ACCESS_TOKEN) {
            return Ok(token);
        }

        let mut refresh_token = self.refresh_token.lock().await;

        // Another task may have refreshed while we were waiting.
        if let Some(token) = self.cache.get_json::<String>(keys::ACCESS_TOKEN) {
            return Ok(token);
        }

        tracing::info!("No cached Strava access token, refreshing");
        let tokens = self.client.refresh_token(&refresh_token).await?;

        if let Some(rotated) = tokens.refresh_token.filter(|t| *t != *refresh_token) {
            tracing::info!("Strava rotated the refresh token");
            *refresh_token = rotated;
        }

        let token_ttl = token_ttl(tokens.expires_at, Utc::now());
        self.cache
            .set_json(keys::ACCESS_TOKEN, &tokens.access_token, token_ttl);

        tracing::info!(ttl_secs = token_ttl.as_secs(), "Access token refreshed and cached");
        Ok(tokens.access_token)
    }

    /// Drop the cached access token.
    pub fn invalidate_access_token(&self) {
        self.cache.delete(keys::ACCESS_TOKEN);
    }

    /// Run one authenticated call inside the limiter.
    async fn request<T, F, Fut>(&self, call: F) -> Result<T, AppError>
    where
        F: FnOnce(StravaClient, String) -> Fut,
        Fut: std::future::Future<Output = Result<T, AppError>>,
    {
        self.limiter
            .execute(async {
                let token = self.get_access_token().await?;
                let result = call(self.client.clone(), token).await;
                if let Err(ref e) = result {
                    if e.is_strava_token_error() {
                        tracing::warn!(error = %e, "Strava rejected access token, invalidating");
                        self.invalidate_access_token();
                    }
                }
                result
            })
            .await
    }

    // ─── API Wrappers ────────────────────────────────────────────────────────

    /// Get the coach's own profile.
    pub async fn get_athlete(&self) -> Result<StravaAthlete, AppError> {
        self.request(|client, token| async move { client.get_athlete(&token).await })
            .await
    }

    /// Get a detailed activity by ID.
    pub async fn get_activity(&self, activity_id: u64) -> Result<StravaActivity, AppError> {
        self.request(
            |client, token| async move { client.get_activity(&token, activity_id).await },
        )
        .await
    }

    /// List the coach's own activities.
    pub async fn list_activities(
        &self,
        query: &ActivityQuery,
    ) -> Result<Vec<StravaActivity>, AppError> {
        self.request(|client, token| async move { client.list_activities(&token, query).await })
            .await
    }

    /// List a team member's activities.
    pub async fn list_athlete_activities(
        &self,
        athlete_id: u64,
        query: &ActivityQuery,
    ) -> Result<Vec<StravaActivity>, AppError> {
        self.request(|client, token| async move {
            client
                .list_athlete_activities(&token, athlete_id, query)
                .await
        })
        .await
    }

    /// List a club's members.
    pub async fn list_club_members(
        &self,
        club_id: u64,
    ) -> Result<Vec<StravaClubMember>, AppError> {
        self.request(
            |client, token| async move { client.list_club_members(&token, club_id).await },
        )
        .await
    }

    /// List one page of a club's activity feed.
    pub async fn list_club_activities(
        &self,
        club_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<StravaClubActivity>, AppError> {
        self.request(|client, token| async move {
            client
                .list_club_activities(&token, club_id, page, per_page)
                .await
        })
        .await
    }

    /// Collect the club feed page by page.
    ///
    /// Stops at an empty or short page, or after [`MAX_CLUB_PAGES`] pages.
    pub async fn list_recent_club_activities(
        &self,
        club_id: u64,
    ) -> Result<Vec<StravaClubActivity>, AppError> {
        let mut all = Vec::new();
        for page in 1..=MAX_CLUB_PAGES {
            let batch = self
                .list_club_activities(club_id, page, CLUB_PER_PAGE)
                .await?;
            let fetched = batch.len();
            all.extend(batch);
            tracing::debug!(club_id, page, fetched, "Fetched club activity page");
            if fetched < CLUB_PER_PAGE as usize {
                break;
            }
        }
        Ok(all)
    }
}

/// Cache lifetime for a fresh token: expiry minus the refresh margin, capped.
fn token_ttl(expires_at: i64, now: DateTime<Utc>) -> std::time::Duration {
    let remaining = expires_at - now.timestamp() - TOKEN_REFRESH_MARGIN_SECS;
    let remaining = std::time::Duration::from_secs(remaining.max(0) as u64);
    remaining.min(ttl::ACCESS_TOKEN)
}
