// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, Utc};
use uwh_leaderboard::cache::CacheClient;
use uwh_leaderboard::config::Config;
use uwh_leaderboard::db::LeaderboardDb;
use uwh_leaderboard::models::{Activity, Athlete};
use uwh_leaderboard::AppState;

/// Parse an RFC3339 timestamp.
#[allow(dead_code)]
pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

/// Athlete with a name and nothing else.
#[allow(dead_code)]
pub fn athlete(id: u64, firstname: &str, lastname: &str) -> Athlete {
    Athlete {
        id,
        username: String::new(),
        firstname: firstname.to_string(),
        lastname: lastname.to_string(),
        profile_picture_url: None,
        max_heartrate: None,
    }
}

/// Activity without heart rate.
#[allow(dead_code)]
pub fn activity(
    id: u64,
    athlete_id: u64,
    activity_type: &str,
    name: &str,
    start_date: DateTime<Utc>,
    moving_time_secs: u32,
    distance_meters: f64,
) -> Activity {
    Activity {
        id,
        athlete_id,
        name: name.to_string(),
        activity_type: activity_type.to_string(),
        sport_type: activity_type.to_string(),
        start_date,
        distance_meters,
        moving_time_secs,
        elapsed_time_secs: moving_time_secs,
        total_elevation_gain: 0.0,
        average_heartrate: None,
        max_heartrate: None,
    }
}

/// Same activity with an average heart rate.
#[allow(dead_code)]
pub fn with_heartrate(mut activity: Activity, average: f64) -> Activity {
    activity.average_heartrate = Some(average);
    activity
}

/// Offline app state with an in-memory store and cache.
#[allow(dead_code)]
pub fn test_state() -> AppState {
    AppState::new(
        Config::test_default(),
        LeaderboardDb::new_in_memory(),
        CacheClient::in_memory(),
    )
}

/// App state whose Strava endpoints point at a mock server.
#[allow(dead_code)]
pub fn mock_strava_state(server_uri: &str, team_member_ids: Vec<u64>) -> AppState {
    let config = Config {
        strava_api_base_url: format!("{}/api/v3", server_uri),
        strava_token_url: format!("{}/oauth/token", server_uri),
        team_member_ids,
        ..Config::test_default()
    };
    AppState::new(config, LeaderboardDb::new_in_memory(), CacheClient::in_memory())
}
