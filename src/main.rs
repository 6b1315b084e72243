// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! UWH Leaderboard CLI
//!
//! Syncs team activities from Strava and prints leaderboard reports as JSON.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uwh_leaderboard::{
    cache::CacheClient,
    config::{Config, ConfigError},
    db::LeaderboardDb,
    services::strava::{StravaClubActivity, StravaClubMember},
    services::ManualSubmission,
    AppState,
};

#[derive(Parser)]
#[command(name = "uwh-leaderboard")]
#[command(about = "Team training leaderboard built from Strava activities")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the last week of activities for every team member
    Sync {
        /// Ignore the sync cooldown
        #[arg(long)]
        force: bool,
    },
    /// Import a manual activity submission (JSON file)
    Import {
        /// Path to the submission
        path: PathBuf,
    },
    /// Print the enriched weekly leaderboard
    Leaderboard,
    /// Print seven-day heart rate zone estimates
    HrZones,
    /// Print the configured Strava club's members and recent feed
    Club,
}

/// Club listing printed by the `club` command.
#[derive(Serialize)]
struct ClubReport {
    club_id: u64,
    members: Vec<StravaClubMember>,
    activities: Vec<StravaClubActivity>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let db = LeaderboardDb::open(&config.data_file)?;
    let now = Utc::now();
    db.refresh_weekly_leaderboard(now);

    let state = AppState::new(config, db, CacheClient::in_memory());

    match cli.command {
        Commands::Sync { force } => {
            let report = state.sync_service.sync(force, now).await?;
            state.db.save()?;
            print_json(&report)?;
        }
        Commands::Import { path } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let submission = ManualSubmission::from_json(&raw)?;
            let report = state.sync_service.import_submission(submission, now)?;
            state.db.save()?;
            print_json(&report)?;
        }
        Commands::Leaderboard => {
            print_json(&state.leaderboard_service.get_leaderboard(now))?;
        }
        Commands::HrZones => {
            print_json(&state.leaderboard_service.get_hr_zones(now))?;
        }
        Commands::Club => {
            let club_id = state
                .config
                .strava_club_id
                .ok_or(ConfigError::Missing("STRAVA_CLUB_ID"))?;
            let members = state.strava_service.list_club_members(club_id).await?;
            let activities = state
                .strava_service
                .list_recent_club_activities(club_id)
                .await?;
            tracing::info!(
                club_id,
                members = members.len(),
                activities = activities.len(),
                "Listed club"
            );
            print_json(&ClubReport {
                club_id,
                members,
                activities,
            })?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize structured JSON logging on stderr; stdout carries the reports.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("uwh_leaderboard=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
