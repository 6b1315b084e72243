// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod heartrate;
pub mod leaderboard;
pub mod rate_limit;
pub mod scoring;
pub mod streak;
pub mod strava;
pub mod sync;

pub use leaderboard::LeaderboardService;
pub use rate_limit::RateLimiter;
pub use streak::StreakService;
pub use strava::{StravaClient, StravaService};
pub use sync::{ManualSubmission, SyncReport, SyncService};
