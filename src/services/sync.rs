// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Batch sync of team activities.
//!
//! Handles the core workflow:
//! 1. Skip if a sync ran within the cooldown (unless forced)
//! 2. Fetch each team member's recent activities through the rate limiter
//! 3. Score and store activities, creating athlete records as needed
//! 4. Refresh the weekly leaderboard and drop stale caches
//!
//! Manual submissions go through the same score/store/refresh path.

use crate::cache::{keys, ttl, CacheClient};
use crate::db::{LeaderboardDb, LEADERBOARD_WINDOW_DAYS};
use crate::error::{AppError, Result};
use crate::models::{Athlete, ScoredActivity};
use crate::services::scoring::score_activities;
use crate::services::strava::{ActivityQuery, StravaActivity, StravaAthlete, StravaService};
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Duration, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};

/// Summary of one sync or import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    /// True when the cooldown was active and nothing was fetched
    pub cached: bool,
    pub team_members: usize,
    pub athletes_with_activities: usize,
    pub activities: usize,
    pub swimming_activities: usize,
    /// Sum of weighted scores, rounded
    pub total_weighted_score: f64,
    pub synced_at: DateTime<Utc>,
}

impl SyncReport {
    fn cooldown(team_members: usize, now: DateTime<Utc>) -> Self {
        Self {
            cached: true,
            team_members,
            athletes_with_activities: 0,
            activities: 0,
            swimming_activities: 0,
            total_weighted_score: 0.0,
            synced_at: now,
        }
    }

    fn from_activities(
        team_members: usize,
        athletes_with_activities: usize,
        activities: &[ScoredActivity],
        now: DateTime<Utc>,
    ) -> Self {
        let total: f64 = activities.iter().map(|a| a.weighted_score).sum();
        Self {
            cached: false,
            team_members,
            athletes_with_activities,
            activities: activities.len(),
            swimming_activities: activities.iter().filter(|a| a.is_swimming).count(),
            total_weighted_score: total.round(),
            synced_at: now,
        }
    }
}

/// An athlete's self-submitted activities.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualSubmission {
    pub athlete: StravaAthlete,
    #[serde(default)]
    pub activities: Vec<StravaActivity>,
}

impl ManualSubmission {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| AppError::BadRequest(format!("Invalid submission: {}", e)))
    }
}

/// Pulls team activities from Strava into the store.
#[derive(Clone)]
pub struct SyncService {
    strava: StravaService,
    db: LeaderboardDb,
    cache: CacheClient,
    team_member_ids: Vec<u64>,
}

impl SyncService {
    pub fn new(
        strava: StravaService,
        db: LeaderboardDb,
        cache: CacheClient,
        team_member_ids: Vec<u64>,
    ) -> Self {
        Self {
            strava,
            db,
            cache,
            team_member_ids,
        }
    }

    /// Sync the last week of activities for every team member.
    ///
    /// A sync inside the cooldown returns a `cached` report without touching
    /// Strava. `force` clears the cooldown first.
    pub async fn sync(&self, force: bool, now: DateTime<Utc>) -> Result<SyncReport> {
        let team_members = self.team_member_ids.len();

        if force {
            self.cache.delete(keys::LAST_SYNC);
        } else if let Some(last) = self.cache.get_json::<String>(keys::LAST_SYNC) {
            tracing::info!(last_sync = %last, "Sync skipped, cooldown active");
            return Ok(SyncReport::cooldown(team_members, now));
        }

        tracing::info!(team_members, force, "Starting team sync");

        let query = ActivityQuery::since(now - Duration::days(LEADERBOARD_WINDOW_DAYS));
        let fetches = self
            .team_member_ids
            .iter()
            .map(|&athlete_id| self.fetch_member(athlete_id, &query));
        let fetched = join_all(fetches).await;

        let mut athletes = Vec::new();
        let mut activities = Vec::new();
        for (athlete_id, list) in fetched {
            if list.is_empty() {
                continue;
            }
            athletes.push(Athlete::minimal(athlete_id));
            activities.extend(list.into_iter().map(|a| a.into_activity(athlete_id)));
        }

        let athletes_with_activities = athletes.len();
        let scored = score_activities(activities);
        let report =
            SyncReport::from_activities(team_members, athletes_with_activities, &scored, now);

        self.db.upsert_athletes(athletes);
        self.db.upsert_activities(scored);
        self.db.refresh_weekly_leaderboard(now);

        self.cache
            .set_json(keys::LAST_SYNC, &format_utc_rfc3339(now), ttl::LAST_SYNC);
        self.cache.invalidate_streaks(&self.team_member_ids);
        self.cache.invalidate_leaderboard();

        tracing::info!(
            athletes = report.athletes_with_activities,
            activities = report.activities,
            swimming = report.swimming_activities,
            total_score = report.total_weighted_score,
            "Team sync complete"
        );

        Ok(report)
    }

    /// One member's activities; failures count as none.
    async fn fetch_member(
        &self,
        athlete_id: u64,
        query: &ActivityQuery,
    ) -> (u64, Vec<StravaActivity>) {
        match self.strava.list_athlete_activities(athlete_id, query).await {
            Ok(list) => {
                tracing::debug!(athlete_id, count = list.len(), "Fetched activities");
                (athlete_id, list)
            }
            Err(e) => {
                tracing::warn!(athlete_id, error = %e, "Failed to fetch activities");
                (athlete_id, Vec::new())
            }
        }
    }

    /// Store a manual submission as if it had been synced.
    pub fn import_submission(
        &self,
        submission: ManualSubmission,
        now: DateTime<Utc>,
    ) -> Result<SyncReport> {
        let athlete_id = submission.athlete.id;
        if athlete_id == 0 {
            return Err(AppError::BadRequest("Submission has no athlete id".to_string()));
        }
        if submission.activities.is_empty() {
            return Err(AppError::BadRequest("Submission has no activities".to_string()));
        }

        let activities = submission
            .activities
            .into_iter()
            .map(|a| a.into_activity(athlete_id))
            .collect();
        let scored = score_activities(activities);
        let report = SyncReport::from_activities(1, 1, &scored, now);

        self.db.upsert_athlete(submission.athlete.into_athlete());
        self.db.upsert_activities(scored);
        self.db.refresh_weekly_leaderboard(now);

        self.cache.invalidate_streaks(&[athlete_id]);
        self.cache.invalidate_leaderboard();

        tracing::info!(
            athlete_id,
            activities = report.activities,
            total_score = report.total_weighted_score,
            "Imported manual submission"
        );

        Ok(report)
    }
}
