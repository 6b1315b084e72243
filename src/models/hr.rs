// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Heart-rate zone models.
//!
//! Zone data is informational only and never feeds leaderboard ranking.

use serde::{Deserialize, Serialize};

/// Intensity zone by percentage of max heart rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HrZone {
    Z1, // Recovery: < 60% max
    Z2, // Endurance: 60-70% max
    Z3, // Tempo: 70-80% max
    Z4, // Threshold: 80-90% max
    Z5, // VO2 Max: >= 90% max
}

impl HrZone {
    pub const ALL: [HrZone; 5] = [HrZone::Z1, HrZone::Z2, HrZone::Z3, HrZone::Z4, HrZone::Z5];

    /// Zone implied by a heart rate relative to `max_hr`.
    pub fn from_heart_rate(heart_rate: f64, max_hr: f64) -> Self {
        let percent = (heart_rate / max_hr) * 100.0;
        match percent {
            p if p >= 90.0 => HrZone::Z5,
            p if p >= 80.0 => HrZone::Z4,
            p if p >= 70.0 => HrZone::Z3,
            p if p >= 60.0 => HrZone::Z2,
            _ => HrZone::Z1,
        }
    }

    /// Zone number, 1 through 5.
    pub fn number(self) -> u8 {
        match self {
            HrZone::Z1 => 1,
            HrZone::Z2 => 2,
            HrZone::Z3 => 3,
            HrZone::Z4 => 4,
            HrZone::Z5 => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HrZone::Z1 => "Recovery",
            HrZone::Z2 => "Endurance",
            HrZone::Z3 => "Tempo",
            HrZone::Z4 => "Threshold",
            HrZone::Z5 => "VO2 Max",
        }
    }
}

/// Minutes attributed to each zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HrZoneDistribution {
    pub z1: f64,
    pub z2: f64,
    pub z3: f64,
    pub z4: f64,
    pub z5: f64,
}

impl HrZoneDistribution {
    pub fn add(&mut self, zone: HrZone, minutes: f64) {
        *self.slot_mut(zone) += minutes;
    }

    pub fn get(&self, zone: HrZone) -> f64 {
        match zone {
            HrZone::Z1 => self.z1,
            HrZone::Z2 => self.z2,
            HrZone::Z3 => self.z3,
            HrZone::Z4 => self.z4,
            HrZone::Z5 => self.z5,
        }
    }

    pub fn total(&self) -> f64 {
        self.z1 + self.z2 + self.z3 + self.z4 + self.z5
    }

    fn slot_mut(&mut self, zone: HrZone) -> &mut f64 {
        match zone {
            HrZone::Z1 => &mut self.z1,
            HrZone::Z2 => &mut self.z2,
            HrZone::Z3 => &mut self.z3,
            HrZone::Z4 => &mut self.z4,
            HrZone::Z5 => &mut self.z5,
        }
    }
}

/// Zone statistics over a set of activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HrZoneStats {
    pub zone_minutes: HrZoneDistribution,
    /// Always equal to `zone_minutes.total()`
    pub total_hr_minutes: f64,
    pub total_activities: usize,
    pub activities_with_hr: usize,
    pub activities_without_hr: usize,
    pub has_hr_data: bool,
}

/// Rounded per-athlete zone minutes for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HrZoneData {
    pub zone1_minutes: u32,
    pub zone2_minutes: u32,
    pub zone3_minutes: u32,
    pub zone4_minutes: u32,
    pub zone5_minutes: u32,
    pub total_minutes: u32,
    pub activities_with_hr: usize,
    /// Zones 1 through 5, in order
    pub zones: Vec<HrZoneSummary>,
}

/// One zone's line in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HrZoneSummary {
    pub zone: u8,
    pub name: String,
    pub minutes: u32,
    /// e.g. "1h 5m"
    pub formatted: String,
    /// Share of `total_minutes`; 0 when the total is 0
    pub percentage: f64,
}

/// One athlete's row in the HR zone report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteHrZones {
    pub athlete_id: u64,
    pub firstname: String,
    pub lastname: String,
    pub profile_picture_url: Option<String>,
    pub max_heartrate: u32,
    /// `None` when the athlete has no HR-bearing activity in the window
    pub hr_zone_data: Option<HrZoneData>,
}
