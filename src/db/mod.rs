// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer (in-process, JSON snapshot on disk).

pub mod store;

pub use store::LeaderboardDb;

/// Trailing window covered by the weekly leaderboard view.
pub const LEADERBOARD_WINDOW_DAYS: i64 = 7;
