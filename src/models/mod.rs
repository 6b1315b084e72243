// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod athlete;
pub mod hr;
pub mod leaderboard;

pub use activity::{Activity, ScoredActivity};
pub use athlete::Athlete;
pub use hr::{
    AthleteHrZones, HrZone, HrZoneData, HrZoneDistribution, HrZoneStats, HrZoneSummary,
};
pub use leaderboard::{
    ActivityFeedItem, EnrichedLeaderboardEntry, LeaderboardEntry, LeaderboardMetadata,
    LeaderboardResponse, StreakCacheEntry,
};
