// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard ranking and enrichment.
//!
//! Builds the response served to the team page:
//! 1. Read the weekly view (already ranked)
//! 2. Add rank, score gaps, swimming share, streak and recency
//! 3. Attach the recent activity feed
//! 4. Cache the whole response briefly

use crate::cache::{keys, ttl, CacheClient};
use crate::db::LeaderboardDb;
use crate::models::{
    ActivityFeedItem, Athlete, AthleteHrZones, EnrichedLeaderboardEntry, LeaderboardEntry,
    LeaderboardMetadata, LeaderboardResponse, ScoredActivity,
};
use crate::services::heartrate::{athlete_zones, HR_WINDOW_DAYS};
use crate::services::streak::{StreakService, STREAK_LOOKBACK_DAYS};
use crate::time_utils::{format_time_ago, is_within_hours, week_start};
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Size of the recent activity feed.
pub const ACTIVITY_FEED_LIMIT: usize = 20;

/// Window for the "recently active" indicator.
const RECENT_ACTIVITY_HOURS: i64 = 6;

/// Swimming share at which an athlete counts as swimming-dominant.
const SWIMMING_DOMINANT_PERCENT: f64 = 50.0;

/// Order entries by composite score, newest last activity breaking ties.
///
/// Entries without any activity time sort after those with one. The sort is
/// stable, so fully tied entries keep their input order.
pub fn rank_entries(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| {
        b.composite_score
            .partial_cmp(&a.composite_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| match (a.last_activity_at, b.last_activity_at) {
                (Some(a_at), Some(b_at)) => b_at.cmp(&a_at),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    });
}

/// Add display metrics to ranked entries.
///
/// `streak_for` supplies each athlete's streak.
pub fn enrich_entries<F>(
    entries: &[LeaderboardEntry],
    now: DateTime<Utc>,
    mut streak_for: F,
) -> Vec<EnrichedLeaderboardEntry>
where
    F: FnMut(u64) -> u32,
{
    let leader_score = entries.first().map(|e| e.composite_score).unwrap_or(0.0);

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let gap_behind_leader = (leader_score - entry.composite_score).max(0.0);
            let gap_behind_next = if index > 0 {
                entries[index - 1].composite_score - entry.composite_score
            } else {
                0.0
            };

            let swimming_percentage = if entry.total_activities > 0 {
                f64::from(entry.swimming_activities) / f64::from(entry.total_activities) * 100.0
            } else {
                0.0
            };

            EnrichedLeaderboardEntry {
                athlete_id: entry.athlete_id,
                rank: index as u32 + 1,
                username: entry.username.clone(),
                firstname: entry.firstname.clone(),
                lastname: entry.lastname.clone(),
                profile_picture_url: entry.profile_picture_url.clone(),
                total_activities: entry.total_activities,
                swimming_activities: entry.swimming_activities,
                total_weighted_score: entry.total_weighted_score,
                composite_score: entry.composite_score,
                last_activity_at: entry.last_activity_at,
                gap_behind_leader,
                gap_behind_next,
                swimming_percentage,
                is_swimming_dominant: swimming_percentage >= SWIMMING_DOMINANT_PERCENT,
                streak: streak_for(entry.athlete_id),
                has_recent_activity: is_within_hours(
                    entry.last_activity_at,
                    now,
                    RECENT_ACTIVITY_HOURS,
                ),
            }
        })
        .collect()
}

/// Feed items for recent activities, labelled with athlete names.
pub fn build_activity_feed(
    activities: &[ScoredActivity],
    athletes: &HashMap<u64, Athlete>,
    now: DateTime<Utc>,
) -> Vec<ActivityFeedItem> {
    activities
        .iter()
        .map(|scored| {
            let activity = &scored.activity;
            let athlete = athletes.get(&activity.athlete_id);
            let firstname = athlete
                .map(|a| a.firstname.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Unknown".to_string());

            ActivityFeedItem {
                id: activity.id,
                athlete_id: activity.athlete_id,
                athlete_firstname: firstname,
                athlete_lastname: athlete.map(|a| a.lastname.clone()).unwrap_or_default(),
                activity_type: activity.activity_type.clone(),
                name: activity.name.clone(),
                // Same flag the swimming counts are built from
                is_swimming: scored.is_swimming,
                weighted_score: scored.weighted_score,
                start_date: activity.start_date,
                time_ago: format_time_ago(activity.start_date, now),
            }
        })
        .collect()
}

/// Assembles leaderboard and HR zone reports from the store.
#[derive(Clone)]
pub struct LeaderboardService {
    db: LeaderboardDb,
    cache: CacheClient,
    streaks: StreakService,
    default_max_heartrate: u32,
}

impl LeaderboardService {
    pub fn new(db: LeaderboardDb, cache: CacheClient, default_max_heartrate: u32) -> Self {
        Self {
            streaks: StreakService::new(cache.clone()),
            db,
            cache,
            default_max_heartrate,
        }
    }

    /// Enriched leaderboard, served from cache when fresh.
    pub fn get_leaderboard(&self, now: DateTime<Utc>) -> LeaderboardResponse {
        if let Some(cached) = self.cache.get_json::<LeaderboardResponse>(keys::LEADERBOARD) {
            return cached;
        }

        let response = self.build_leaderboard(now);
        self.cache
            .set_json(keys::LEADERBOARD, &response, ttl::LEADERBOARD);
        response
    }

    /// Build the enriched leaderboard without consulting the response cache.
    pub fn build_leaderboard(&self, now: DateTime<Utc>) -> LeaderboardResponse {
        let entries = self.db.get_weekly_leaderboard();
        let streak_since = now - Duration::days(STREAK_LOOKBACK_DAYS);

        let leaderboard = enrich_entries(&entries, now, |athlete_id| {
            self.streaks.get_streak(athlete_id, now, || {
                self.db
                    .get_athlete_activities(athlete_id, Some(streak_since))
                    .into_iter()
                    .map(|a| a.activity.start_date)
                    .collect()
            })
        });

        let athletes: HashMap<u64, Athlete> = self
            .db
            .get_athletes()
            .into_iter()
            .map(|a| (a.id, a))
            .collect();
        let recent = self.db.get_recent_activities(ACTIVITY_FEED_LIMIT);
        let activity_feed = build_activity_feed(&recent, &athletes, now);

        tracing::debug!(
            athletes = leaderboard.len(),
            feed = activity_feed.len(),
            "Built leaderboard"
        );

        LeaderboardResponse {
            metadata: LeaderboardMetadata {
                week_start_date: week_start(now),
                last_updated: now,
                total_athletes: leaderboard.len(),
            },
            leaderboard,
            activity_feed,
        }
    }

    /// Seven-day HR zone report for every stored athlete.
    pub fn get_hr_zones(&self, now: DateTime<Utc>) -> Vec<AthleteHrZones> {
        let since = now - Duration::days(HR_WINDOW_DAYS);

        self.db
            .get_athletes()
            .iter()
            .map(|athlete| {
                let activities: Vec<_> = self
                    .db
                    .get_athlete_activities(athlete.id, Some(since))
                    .into_iter()
                    .map(|a| a.activity)
                    .collect();
                athlete_zones(athlete, &activities, self.default_max_heartrate)
            })
            .collect()
    }
}
