// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity model for storage and scoring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored activity record, keyed by Strava activity ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Strava activity ID
    pub id: u64,
    /// Strava athlete ID (owner)
    pub athlete_id: u64,
    /// Activity name/title
    pub name: String,
    /// Legacy Strava type (Run, Swim, Workout, ...)
    pub activity_type: String,
    /// More specific sport type
    pub sport_type: String,
    /// Start date/time (UTC)
    pub start_date: DateTime<Utc>,
    /// Distance in meters
    pub distance_meters: f64,
    /// Moving time in seconds
    pub moving_time_secs: u32,
    /// Elapsed time in seconds
    pub elapsed_time_secs: u32,
    /// Elevation gain in meters
    #[serde(default)]
    pub total_elevation_gain: f64,
    /// Average heart rate (BPM), when recorded
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    /// Max heart rate (BPM), when recorded
    #[serde(default)]
    pub max_heartrate: Option<f64>,
}

impl Activity {
    /// Moving time in minutes.
    pub fn moving_minutes(&self) -> f64 {
        f64::from(self.moving_time_secs) / 60.0
    }

    /// Average heart rate if one was actually recorded.
    pub fn recorded_heartrate(&self) -> Option<f64> {
        self.average_heartrate.filter(|hr| *hr > 0.0)
    }
}

/// Activity with derived scoring fields.
///
/// Both fields are pure functions of the activity and are recomputed on every
/// re-sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredActivity {
    #[serde(flatten)]
    pub activity: Activity,
    pub weighted_score: f64,
    pub is_swimming: bool,
}
