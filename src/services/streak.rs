// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Smart streak calculation.
//!
//! A streak is the number of consecutive Monday-aligned weeks with at least
//! five distinct training days (two rest days allowed). The week in progress
//! counts when it already qualifies but never ends a streak. Weeks with no
//! activity at all are skipped rather than ending the streak.

use crate::cache::{keys, ttl, CacheClient};
use crate::models::StreakCacheEntry;
use crate::time_utils::monday_of;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::{BTreeMap, HashSet};

/// History considered for a streak (caps it at roughly 12 weeks).
pub const STREAK_LOOKBACK_DAYS: i64 = 90;

/// Distinct training days a week needs to count.
pub const MIN_TRAINING_DAYS_PER_WEEK: usize = 5;

/// Streak from activity start times (no cache).
pub fn calculate_streak<I>(start_dates: I, now: DateTime<Utc>) -> u32
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let since = now - Duration::days(STREAK_LOOKBACK_DAYS);

    let training_days: HashSet<NaiveDate> = start_dates
        .into_iter()
        .filter(|start| *start >= since)
        .map(|start| start.date_naive())
        .collect();

    if training_days.is_empty() {
        return 0;
    }

    let mut days_per_week: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for day in training_days {
        *days_per_week.entry(monday_of(day)).or_insert(0) += 1;
    }

    let current_week = monday_of(now.date_naive());

    // Only weeks with activity are walked, newest first.
    let mut streak = 0;
    for (week, days) in days_per_week.iter().rev() {
        if *days >= MIN_TRAINING_DAYS_PER_WEEK {
            streak += 1;
        } else if *week != current_week {
            break;
        }
    }

    streak
}

/// Streak lookups backed by a short-TTL cache.
#[derive(Clone)]
pub struct StreakService {
    cache: CacheClient,
    ttl: std::time::Duration,
}

impl StreakService {
    pub fn new(cache: CacheClient) -> Self {
        Self {
            cache,
            ttl: ttl::STREAK,
        }
    }

    /// Cached streak for an athlete, computing it from `history` on a miss.
    ///
    /// `history` is only called on a miss and should return activity start
    /// times covering at least the lookback window.
    pub fn get_streak<F>(&self, athlete_id: u64, now: DateTime<Utc>, history: F) -> u32
    where
        F: FnOnce() -> Vec<DateTime<Utc>>,
    {
        let key = keys::streak(athlete_id);

        if let Some(cached) = self.cache.get_json::<StreakCacheEntry>(&key) {
            if self.is_fresh(&cached, now) {
                return cached.streak;
            }
        }

        let streak = calculate_streak(history(), now);

        self.cache.set_json(
            &key,
            &StreakCacheEntry {
                athlete_id,
                streak,
                computed_at: now,
            },
            self.ttl,
        );

        streak
    }

    /// Drop an athlete's cached streak, e.g. after new activities arrive.
    pub fn invalidate(&self, athlete_id: u64) {
        self.cache.delete(&keys::streak(athlete_id));
    }

    fn is_fresh(&self, entry: &StreakCacheEntry, now: DateTime<Utc>) -> bool {
        let age = now - entry.computed_at;
        match Duration::from_std(self.ttl) {
            Ok(ttl) => age >= Duration::zero() && age <= ttl,
            Err(_) => false,
        }
    }
}
