// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! UWH Leaderboard: weekly training leaderboard for an underwater hockey team
//!
//! This crate syncs team members' Strava activities, scores them (swims
//! included by classification), and ranks athletes with streaks and
//! heart-rate zone estimates.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

use cache::CacheClient;
use config::Config;
use db::LeaderboardDb;
use services::{LeaderboardService, RateLimiter, StravaClient, StravaService, SyncService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: LeaderboardDb,
    pub cache: CacheClient,
    pub strava_service: StravaService,
    pub sync_service: SyncService,
    pub leaderboard_service: LeaderboardService,
}

impl AppState {
    /// Wire services over a store and cache.
    pub fn new(config: Config, db: LeaderboardDb, cache: CacheClient) -> Self {
        let client = StravaClient::new(
            config.strava_client_id.clone(),
            config.strava_client_secret.clone(),
            config.strava_api_base_url.clone(),
            config.strava_token_url.clone(),
        );
        let limiter = Arc::new(RateLimiter::strava(config.rate_limit_per_15_min));
        let strava_service = StravaService::new(
            client,
            config.strava_refresh_token.clone(),
            cache.clone(),
            limiter,
        );

        let sync_service = SyncService::new(
            strava_service.clone(),
            db.clone(),
            cache.clone(),
            config.team_member_ids.clone(),
        );
        let leaderboard_service =
            LeaderboardService::new(db.clone(), cache.clone(), config.default_max_heartrate);

        Self {
            config,
            db,
            cache,
            strava_service,
            sync_service,
            leaderboard_service,
        }
    }
}
