// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync against a mock Strava API.

mod common;

use anyhow::Result;
use chrono::{Duration, Utc};
use common::{athlete, mock_strava_state, test_state};
use serde_json::{json, Value};
use uwh_leaderboard::cache::keys;
use uwh_leaderboard::error::AppError;
use uwh_leaderboard::services::strava::ActivityQuery;
use uwh_leaderboard::services::ManualSubmission;
use uwh_leaderboard::time_utils::format_utc_rfc3339;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCESS_TOKEN: &str = "test_access_token";

async fn mount_token(server: &MockServer, expected_calls: u64) {
    let expires_at = (Utc::now() + Duration::hours(6)).timestamp();
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=test_refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "refresh_token": "test_refresh_token",
            "expires_at": expires_at
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn strava_activity(
    id: u64,
    athlete_id: u64,
    kind: &str,
    hours_ago: i64,
    moving: u32,
    distance: f64,
) -> Value {
    json!({
        "id": id,
        "athlete": {"id": athlete_id, "resource_state": 1},
        "name": format!("{} session", kind),
        "type": kind,
        "sport_type": kind,
        "start_date": format_utc_rfc3339(Utc::now() - Duration::hours(hours_ago)),
        "distance": distance,
        "moving_time": moving,
        "elapsed_time": moving + 120,
        "has_heartrate": false
    })
}

#[tokio::test]
async fn test_sync_fetches_scores_and_refreshes_leaderboard() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v3/athletes/1001/activities"))
        .and(header("authorization", format!("Bearer {}", ACCESS_TOKEN).as_str()))
        .and(query_param("per_page", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            strava_activity(1, 1001, "Swim", 20, 1800, 1500.0),
            strava_activity(2, 1001, "Run", 30, 1500, 5000.0),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/athletes/1002/activities"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let state = mock_strava_state(&server.uri(), vec![1001, 1002]);
    let now = Utc::now();
    let report = state.sync_service.sync(false, now).await?;

    assert!(!report.cached);
    assert_eq!(report.team_members, 2);
    assert_eq!(report.athletes_with_activities, 1);
    assert_eq!(report.activities, 2);
    assert_eq!(report.swimming_activities, 1);
    // 31.5 + 30
    assert_eq!(report.total_weighted_score, 62.0);

    let board = state.db.get_weekly_leaderboard();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].athlete_id, 1001);
    assert_eq!(board[0].total_activities, 2);

    assert!(state.db.get_athlete(1001).is_some());
    assert!(state.db.get_athlete(1002).is_none());
    assert!(state.cache.get_json::<String>(keys::LAST_SYNC).is_some());

    let stored = state.db.get_athlete_activities(1001, None);
    let run = stored.iter().find(|a| a.activity.id == 2).unwrap();
    assert_eq!(run.activity.elapsed_time_secs, 1620);
    Ok(())
}

#[tokio::test]
async fn test_sync_respects_cooldown_unless_forced() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v3/athletes/1001/activities"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([strava_activity(1, 1001, "Run", 2, 1800, 5000.0)])),
        )
        .expect(2)
        .mount(&server)
        .await;

    let state = mock_strava_state(&server.uri(), vec![1001]);
    let now = Utc::now();

    let first = state.sync_service.sync(false, now).await?;
    assert!(!first.cached);
    assert_eq!(first.activities, 1);

    let second = state.sync_service.sync(false, now).await?;
    assert!(second.cached);
    assert_eq!(second.activities, 0);

    let forced = state.sync_service.sync(true, now).await?;
    assert!(!forced.cached);
    assert_eq!(forced.activities, 1);

    // Re-synced activities overwrite by id
    assert_eq!(state.db.get_activities(None).len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_sync_keeps_known_athlete_names() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v3/athletes/1001/activities"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([strava_activity(1, 1001, "Swim", 2, 1800, 1500.0)])),
        )
        .mount(&server)
        .await;

    let state = mock_strava_state(&server.uri(), vec![1001]);
    state.db.upsert_athlete(athlete(1001, "Mara", "Quinn"));

    state.sync_service.sync(false, Utc::now()).await?;

    let stored = state.db.get_athlete(1001).unwrap();
    assert_eq!(stored.firstname, "Mara");
    assert_eq!(stored.lastname, "Quinn");
    Ok(())
}

#[tokio::test]
async fn test_unauthorized_response_drops_cached_token() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v3/athletes/1001/activities"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Authorization Error"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = mock_strava_state(&server.uri(), vec![1001]);
    let report = state.sync_service.sync(false, Utc::now()).await?;

    assert_eq!(report.activities, 0);
    assert!(state.cache.get_json::<String>(keys::ACCESS_TOKEN).is_none());
    Ok(())
}

#[tokio::test]
async fn test_failed_token_refresh_yields_empty_sync() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Bad Request",
            "errors": [{"code": "invalid", "field": "refresh_token"}]
        })))
        .mount(&server)
        .await;

    let state = mock_strava_state(&server.uri(), vec![1001, 1002]);
    let report = state.sync_service.sync(false, Utc::now()).await?;

    assert!(!report.cached);
    assert_eq!(report.activities, 0);
    assert!(state.db.get_athletes().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_access_token_is_reused_between_calls() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v3/athlete"))
        .and(header("authorization", format!("Bearer {}", ACCESS_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "username": "coach",
            "firstname": "Pat",
            "lastname": "Coach",
            "profile": "https://example.com/pat.jpg"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let state = mock_strava_state(&server.uri(), vec![]);
    let first = state.strava_service.get_athlete().await?;
    let second = state.strava_service.get_athlete().await?;

    assert_eq!(first.id, 42);
    assert_eq!(second.into_athlete().username, "coach");
    Ok(())
}

#[tokio::test]
async fn test_list_own_activities_passes_window() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    let after = Utc::now() - Duration::days(7);
    Mock::given(method("GET"))
        .and(path("/api/v3/athlete/activities"))
        .and(query_param("after", after.timestamp().to_string().as_str()))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            strava_activity(5, 42, "Swim", 1, 2400, 2000.0)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let state = mock_strava_state(&server.uri(), vec![]);
    let list = state
        .strava_service
        .list_activities(&ActivityQuery::since(after))
        .await?;

    assert_eq!(list.len(), 1);
    assert_eq!(list[0].clone().into_activity(0).athlete_id, 42);
    Ok(())
}

#[tokio::test]
async fn test_rate_limited_response_is_reported() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v3/activities/77"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let state = mock_strava_state(&server.uri(), vec![]);
    let err = state.strava_service.get_activity(77).await.unwrap_err();

    assert!(err.is_rate_limited());
    assert!(!err.is_strava_token_error());
    // Still cached: a 429 says nothing about the token
    assert!(state.cache.get_json::<String>(keys::ACCESS_TOKEN).is_some());
}

#[tokio::test]
async fn test_not_found_response_keeps_cached_token() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v3/activities/77"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Record Not Found",
            "errors": [{"resource": "Activity", "field": "id", "code": "invalid"}]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let state = mock_strava_state(&server.uri(), vec![]);
    let err = state.strava_service.get_activity(77).await.unwrap_err();
    assert!(!err.is_strava_token_error());
    assert!(state.cache.get_json::<String>(keys::ACCESS_TOKEN).is_some());

    // Second call reuses the token; the mock allows only one refresh
    let err = state.strava_service.get_activity(77).await.unwrap_err();
    assert!(matches!(err, AppError::StravaApi(ref msg) if msg.starts_with("HTTP 404")));
}

fn club_activity(name: &str) -> Value {
    json!({
        "resource_state": 2,
        "athlete": {"resource_state": 2, "firstname": "Kai", "lastname": "M."},
        "name": name,
        "distance": 1500.0,
        "moving_time": 1800,
        "elapsed_time": 1900,
        "total_elevation_gain": 0,
        "type": "Swim",
        "sport_type": "Swim",
        "workout_type": null
    })
}

#[tokio::test]
async fn test_club_feed_pages_until_short_page() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    let full_page: Vec<Value> = (0..200).map(|i| club_activity(&format!("Swim {}", i))).collect();
    Mock::given(method("GET"))
        .and(path("/api/v3/clubs/1853738/activities"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(full_page)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/clubs/1853738/activities"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([club_activity("Last swim")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/clubs/1853738/activities"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let state = mock_strava_state(&server.uri(), vec![]);
    let feed = state
        .strava_service
        .list_recent_club_activities(1853738)
        .await?;

    assert_eq!(feed.len(), 201);
    assert_eq!(feed[200].name, "Last swim");
    assert_eq!(feed[0].athlete.firstname, "Kai");
    Ok(())
}

#[tokio::test]
async fn test_club_feed_stops_at_page_limit() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    let full_page: Vec<Value> = (0..200).map(|i| club_activity(&format!("Swim {}", i))).collect();
    Mock::given(method("GET"))
        .and(path("/api/v3/clubs/9/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(full_page)))
        .expect(5)
        .mount(&server)
        .await;

    let state = mock_strava_state(&server.uri(), vec![]);
    let feed = state.strava_service.list_recent_club_activities(9).await?;

    assert_eq!(feed.len(), 1000);
    Ok(())
}

#[tokio::test]
async fn test_club_members_are_listed() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v3/clubs/1853738/members"))
        .and(query_param("per_page", "200"))
        .and(header("authorization", format!("Bearer {}", ACCESS_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"resource_state": 2, "firstname": "Pat", "lastname": "C.",
             "membership": "member", "admin": true, "owner": true},
            {"resource_state": 2, "firstname": "Ana", "lastname": "L.",
             "membership": "member", "admin": false, "owner": false}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let state = mock_strava_state(&server.uri(), vec![]);
    let members = state.strava_service.list_club_members(1853738).await?;

    assert_eq!(members.len(), 2);
    assert!(members[0].owner);
    assert_eq!(members[1].firstname, "Ana");
    assert!(!members[1].admin);
    Ok(())
}

#[test]
fn test_manual_import_scores_and_ranks() {
    let state = test_state();
    let now = Utc::now();

    let raw = json!({
        "athlete": {"id": 77, "firstname": "Ivo", "lastname": "Petrov", "profile": "https://example.com/ivo.jpg"},
        "activities": [
            {
                "id": 9001,
                "name": "Underwater hockey",
                "type": "Workout",
                "start_date": format_utc_rfc3339(now - Duration::hours(3)),
                "distance": 0,
                "moving_time": 5400,
                "average_heartrate": 150
            }
        ]
    })
    .to_string();

    let submission = ManualSubmission::from_json(&raw).unwrap();
    let report = state.sync_service.import_submission(submission, now).unwrap();

    assert_eq!(report.activities, 1);
    assert_eq!(report.swimming_activities, 1);
    assert_eq!(report.total_weighted_score, 90.0);

    let board = state.leaderboard_service.get_leaderboard(now).leaderboard;
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].firstname, "Ivo");
    assert_eq!(
        board[0].profile_picture_url.as_deref(),
        Some("https://example.com/ivo.jpg")
    );
    assert!(board[0].has_recent_activity);

    let stored = state.db.get_athlete_activities(77, None);
    assert_eq!(stored[0].activity.elapsed_time_secs, 5400);
    assert_eq!(stored[0].activity.average_heartrate, Some(150.0));
}

#[test]
fn test_manual_import_rejects_empty_submission() {
    let state = test_state();
    let submission =
        ManualSubmission::from_json(r#"{"athlete": {"id": 77}, "activities": []}"#).unwrap();

    let err = state
        .sync_service
        .import_submission(submission, Utc::now())
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}
