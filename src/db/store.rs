// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Athlete and activity store with typed operations.
//!
//! Provides:
//! - Athletes (upsert by ID, blank fields never overwrite known ones)
//! - Activities (upsert by ID, re-syncs overwrite)
//! - The weekly leaderboard view (recomputed wholesale on refresh)
//!
//! State can be persisted as a JSON snapshot so separate CLI runs share it.

use crate::db::LEADERBOARD_WINDOW_DAYS;
use crate::error::AppError;
use crate::models::{Athlete, LeaderboardEntry, ScoredActivity};
use crate::services::leaderboard::rank_entries;
use crate::services::scoring::composite_score;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// On-disk snapshot format.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    athletes: Vec<Athlete>,
    #[serde(default)]
    activities: Vec<ScoredActivity>,
}

#[derive(Default)]
struct Inner {
    athletes: DashMap<u64, Athlete>,
    activities: DashMap<u64, ScoredActivity>,
    weekly_leaderboard: RwLock<Vec<LeaderboardEntry>>,
    path: Option<PathBuf>,
}

/// Leaderboard database handle. Cheap to clone.
#[derive(Clone, Default)]
pub struct LeaderboardDb {
    inner: Arc<Inner>,
}

impl LeaderboardDb {
    /// Empty store that is never persisted.
    pub fn new_in_memory() -> Self {
        Self::default()
    }

    /// Open a store backed by a snapshot file, starting empty if it does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();

        let snapshot = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|e| {
                AppError::Database(format!("Failed to read {}: {}", path.display(), e))
            })?;
            serde_json::from_str::<Snapshot>(&raw).map_err(|e| {
                AppError::Database(format!("Failed to parse {}: {}", path.display(), e))
            })?
        } else {
            Snapshot::default()
        };

        tracing::info!(
            path = %path.display(),
            athletes = snapshot.athletes.len(),
            activities = snapshot.activities.len(),
            "Opened leaderboard store"
        );

        let inner = Inner {
            athletes: snapshot.athletes.into_iter().map(|a| (a.id, a)).collect(),
            activities: snapshot
                .activities
                .into_iter()
                .map(|a| (a.activity.id, a))
                .collect(),
            weekly_leaderboard: RwLock::new(Vec::new()),
            path: Some(path),
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Write the snapshot file. No-op for in-memory stores.
    pub fn save(&self) -> Result<(), AppError> {
        let Some(path) = &self.inner.path else {
            return Ok(());
        };

        let mut athletes: Vec<Athlete> = self.inner.athletes.iter().map(|e| e.clone()).collect();
        athletes.sort_by_key(|a| a.id);
        let mut activities: Vec<ScoredActivity> =
            self.inner.activities.iter().map(|e| e.clone()).collect();
        activities.sort_by_key(|a| a.activity.id);

        let raw = serde_json::to_string_pretty(&Snapshot {
            athletes,
            activities,
        })
        .map_err(|e| AppError::Database(format!("Failed to encode snapshot: {}", e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Database(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        std::fs::write(path, raw)
            .map_err(|e| AppError::Database(format!("Failed to write {}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), "Saved leaderboard store");
        Ok(())
    }

    // ─── Athlete Operations ──────────────────────────────────────

    /// Create or update an athlete.
    pub fn upsert_athlete(&self, athlete: Athlete) {
        self.inner
            .athletes
            .entry(athlete.id)
            .and_modify(|existing| existing.merge(athlete.clone()))
            .or_insert(athlete);
    }

    pub fn upsert_athletes(&self, athletes: Vec<Athlete>) {
        for athlete in athletes {
            self.upsert_athlete(athlete);
        }
    }

    pub fn get_athlete(&self, athlete_id: u64) -> Option<Athlete> {
        self.inner.athletes.get(&athlete_id).map(|a| a.clone())
    }

    /// All athletes ordered by first then last name.
    pub fn get_athletes(&self) -> Vec<Athlete> {
        let mut athletes: Vec<Athlete> = self.inner.athletes.iter().map(|e| e.clone()).collect();
        athletes.sort_by(|a, b| {
            (a.firstname.as_str(), a.lastname.as_str(), a.id)
                .cmp(&(b.firstname.as_str(), b.lastname.as_str(), b.id))
        });
        athletes
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Store a scored activity, replacing any earlier sync of the same ID.
    pub fn upsert_activity(&self, activity: ScoredActivity) {
        self.inner.activities.insert(activity.activity.id, activity);
    }

    pub fn upsert_activities(&self, activities: Vec<ScoredActivity>) {
        for activity in activities {
            self.upsert_activity(activity);
        }
    }

    /// Delete an activity. Returns whether it existed.
    pub fn delete_activity(&self, activity_id: u64) -> bool {
        self.inner.activities.remove(&activity_id).is_some()
    }

    /// Activities for one athlete starting at or after `since`, newest first.
    pub fn get_athlete_activities(
        &self,
        athlete_id: u64,
        since: Option<DateTime<Utc>>,
    ) -> Vec<ScoredActivity> {
        self.collect_newest_first(|a| {
            a.activity.athlete_id == athlete_id && since.map_or(true, |s| a.activity.start_date >= s)
        })
    }

    /// All activities starting at or after `since`, newest first.
    pub fn get_activities(&self, since: Option<DateTime<Utc>>) -> Vec<ScoredActivity> {
        self.collect_newest_first(|a| since.map_or(true, |s| a.activity.start_date >= s))
    }

    /// The `limit` most recent activities across the team.
    pub fn get_recent_activities(&self, limit: usize) -> Vec<ScoredActivity> {
        let mut activities = self.get_activities(None);
        activities.truncate(limit);
        activities
    }

    fn collect_newest_first<F>(&self, keep: F) -> Vec<ScoredActivity>
    where
        F: Fn(&ScoredActivity) -> bool,
    {
        let mut activities: Vec<ScoredActivity> = self
            .inner
            .activities
            .iter()
            .filter(|e| keep(e.value()))
            .map(|e| e.clone())
            .collect();
        activities.sort_by(|a, b| {
            b.activity
                .start_date
                .cmp(&a.activity.start_date)
                .then(b.activity.id.cmp(&a.activity.id))
        });
        activities
    }

    // ─── Weekly Leaderboard View ─────────────────────────────────

    /// Recompute the weekly leaderboard from scratch.
    pub fn refresh_weekly_leaderboard(&self, now: DateTime<Utc>) {
        let since = now - Duration::days(LEADERBOARD_WINDOW_DAYS);
        let activities = self.get_activities(Some(since));

        let mut by_athlete: HashMap<u64, LeaderboardEntry> = HashMap::new();
        for scored in &activities {
            let athlete_id = scored.activity.athlete_id;
            let entry = by_athlete
                .entry(athlete_id)
                .or_insert_with(|| self.empty_entry(athlete_id));

            entry.total_activities += 1;
            if scored.is_swimming {
                entry.swimming_activities += 1;
            }
            entry.total_weighted_score += scored.weighted_score;
            if entry
                .last_activity_at
                .map_or(true, |last| scored.activity.start_date > last)
            {
                entry.last_activity_at = Some(scored.activity.start_date);
            }
        }

        let mut entries: Vec<LeaderboardEntry> = by_athlete
            .into_values()
            .map(|mut e| {
                e.composite_score = composite_score(e.total_activities, e.total_weighted_score);
                e
            })
            .collect();
        // Deterministic input order for the stable ranking sort.
        entries.sort_by_key(|e| e.athlete_id);
        rank_entries(&mut entries);

        tracing::info!(
            athletes = entries.len(),
            activities = activities.len(),
            "Weekly leaderboard refreshed"
        );

        let mut view = self
            .inner
            .weekly_leaderboard
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *view = entries;
    }

    /// Current weekly leaderboard rows in rank order.
    pub fn get_weekly_leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.inner
            .weekly_leaderboard
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn empty_entry(&self, athlete_id: u64) -> LeaderboardEntry {
        let athlete = self
            .get_athlete(athlete_id)
            .unwrap_or_else(|| Athlete::minimal(athlete_id));
        LeaderboardEntry {
            athlete_id,
            username: athlete.username,
            firstname: athlete.firstname,
            lastname: athlete.lastname,
            profile_picture_url: athlete.profile_picture_url,
            total_activities: 0,
            swimming_activities: 0,
            total_weighted_score: 0.0,
            composite_score: 0.0,
            last_activity_at: None,
        }
    }
}
