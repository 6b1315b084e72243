// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity scoring.
//!
//! - Swimming classification from type, sport type, or activity name
//! - Weighted score = moving minutes + kilometers, no multipliers
//! - Composite score = 60% consistency (count) + 40% volume (weighted score)
//!
//! The swimming flag is tracked for display but does not change the score.

use crate::models::{Activity, ScoredActivity};

/// Strava types that count as swimming.
pub const SWIMMING_ACTIVITY_TYPES: [&str; 4] = ["Swim", "Pool Swim", "Open Water Swim", "IceSwim"];

/// Lower-case name fragments that mark an activity as swimming.
pub const SWIMMING_KEYWORDS: [&str; 6] = [
    "swim",
    "pool",
    "laps",
    "uwh",
    "underwater hockey",
    "aquatic",
];

const COUNT_WEIGHT: f64 = 0.6;
const SCORE_WEIGHT: f64 = 0.4;
const POINTS_PER_ACTIVITY: f64 = 100.0;

/// Whether an activity should be treated as swimming.
///
/// Type and sport type are matched exactly first; only then is the name
/// searched for keywords.
pub fn is_swimming(activity_type: &str, sport_type: &str, name: &str) -> bool {
    if SWIMMING_ACTIVITY_TYPES.contains(&activity_type)
        || SWIMMING_ACTIVITY_TYPES.contains(&sport_type)
    {
        return true;
    }

    let name_lower = name.to_lowercase();
    SWIMMING_KEYWORDS
        .iter()
        .any(|keyword| name_lower.contains(keyword))
}

/// Per-activity score: moving minutes plus kilometers.
///
/// Negative inputs (never produced by Strava) are clamped so the score stays
/// non-negative.
pub fn weighted_score(moving_time_secs: u32, distance_meters: f64) -> f64 {
    let minutes = f64::from(moving_time_secs) / 60.0;
    let km = distance_meters.max(0.0) / 1000.0;
    minutes + km
}

/// Single ranking number for an athlete's window.
pub fn composite_score(activity_count: u32, total_weighted_score: f64) -> f64 {
    f64::from(activity_count) * POINTS_PER_ACTIVITY * COUNT_WEIGHT
        + total_weighted_score * SCORE_WEIGHT
}

/// Attach the derived scoring fields to an activity.
pub fn score_activity(activity: Activity) -> ScoredActivity {
    let weighted_score = weighted_score(activity.moving_time_secs, activity.distance_meters);
    let is_swimming = is_swimming(&activity.activity_type, &activity.sport_type, &activity.name);

    ScoredActivity {
        activity,
        weighted_score,
        is_swimming,
    }
}

pub fn score_activities(activities: Vec<Activity>) -> Vec<ScoredActivity> {
    activities.into_iter().map(score_activity).collect()
}
