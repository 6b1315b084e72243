// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard aggregates and the enriched response built from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-athlete aggregate over the trailing 7-day window.
///
/// Recomputed wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub athlete_id: u64,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub profile_picture_url: Option<String>,
    pub total_activities: u32,
    pub swimming_activities: u32,
    pub total_weighted_score: f64,
    pub composite_score: f64,
    pub last_activity_at: Option<DateTime<Utc>>,
}

/// Leaderboard row with derived display metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedLeaderboardEntry {
    pub athlete_id: u64,
    /// 1-based position
    pub rank: u32,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub profile_picture_url: Option<String>,
    pub total_activities: u32,
    pub swimming_activities: u32,
    pub total_weighted_score: f64,
    pub composite_score: f64,
    pub last_activity_at: Option<DateTime<Utc>>,
    /// Points behind rank 1 (0 for the leader)
    pub gap_behind_leader: f64,
    /// Points behind the athlete immediately above (0 for the leader)
    pub gap_behind_next: f64,
    pub swimming_percentage: f64,
    pub is_swimming_dominant: bool,
    /// Consecutive weeks with 5+ training days
    pub streak: u32,
    /// Activity within the last 6 hours
    pub has_recent_activity: bool,
}

/// Recent activity for the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityFeedItem {
    pub id: u64,
    pub athlete_id: u64,
    pub athlete_firstname: String,
    pub athlete_lastname: String,
    pub activity_type: String,
    pub name: String,
    pub is_swimming: bool,
    pub weighted_score: f64,
    pub start_date: DateTime<Utc>,
    /// "2h ago"
    pub time_ago: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardMetadata {
    pub week_start_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub total_athletes: usize,
}

/// Full leaderboard payload, cached briefly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<EnrichedLeaderboardEntry>,
    pub activity_feed: Vec<ActivityFeedItem>,
    pub metadata: LeaderboardMetadata,
}

/// Cached streak value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreakCacheEntry {
    pub athlete_id: u64,
    pub streak: u32,
    pub computed_at: DateTime<Utc>,
}
