// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Heart rate zone estimation.
//!
//! Each activity's whole moving time is attributed to the zone of its
//! average heart rate. There is no HR stream, so this is an estimate and is
//! kept out of leaderboard ranking so athletes without monitors are not
//! penalised.

use crate::config::DEFAULT_MAX_HEARTRATE;
use crate::models::{
    Activity, Athlete, AthleteHrZones, HrZone, HrZoneData, HrZoneDistribution, HrZoneStats,
    HrZoneSummary,
};

/// Trailing window for the per-athlete zone report.
pub const HR_WINDOW_DAYS: i64 = 7;

/// Max HR to use, falling back to the default for missing or nonsensical values.
pub fn effective_max_heartrate(max_hr: Option<u32>, default_max_hr: u32) -> u32 {
    match max_hr {
        Some(hr) if hr > 0 => hr,
        _ if default_max_hr > 0 => default_max_hr,
        _ => DEFAULT_MAX_HEARTRATE,
    }
}

/// Zone minutes for a single activity; all zero when it has no heart rate.
pub fn activity_zone_minutes(activity: &Activity, max_hr: u32) -> HrZoneDistribution {
    let mut zones = HrZoneDistribution::default();
    if let Some(avg) = activity.recorded_heartrate() {
        let zone = HrZone::from_heart_rate(avg, f64::from(max_hr));
        zones.add(zone, activity.moving_minutes());
    }
    zones
}

/// Zone statistics across activities.
pub fn calculate_zone_stats<'a, I>(activities: I, max_hr: u32) -> HrZoneStats
where
    I: IntoIterator<Item = &'a Activity>,
{
    let max_hr = effective_max_heartrate(Some(max_hr), DEFAULT_MAX_HEARTRATE);
    let mut zone_minutes = HrZoneDistribution::default();
    let mut total_activities = 0;
    let mut activities_with_hr = 0;

    for activity in activities {
        total_activities += 1;
        if let Some(avg) = activity.recorded_heartrate() {
            activities_with_hr += 1;
            zone_minutes.add(
                HrZone::from_heart_rate(avg, f64::from(max_hr)),
                activity.moving_minutes(),
            );
        }
    }

    HrZoneStats {
        zone_minutes,
        total_hr_minutes: zone_minutes.total(),
        total_activities,
        activities_with_hr,
        activities_without_hr: total_activities - activities_with_hr,
        has_hr_data: activities_with_hr > 0,
    }
}

/// Rounded display data, or `None` when no activity carried heart rate.
pub fn zone_data(stats: &HrZoneStats) -> Option<HrZoneData> {
    if !stats.has_hr_data {
        return None;
    }

    let round = |minutes: f64| minutes.round() as u32;
    let z = &stats.zone_minutes;
    let total_minutes = round(stats.total_hr_minutes);
    let zones = HrZone::ALL
        .iter()
        .map(|&zone| zone_summary(zone, round(z.get(zone)), total_minutes))
        .collect();

    Some(HrZoneData {
        zone1_minutes: round(z.z1),
        zone2_minutes: round(z.z2),
        zone3_minutes: round(z.z3),
        zone4_minutes: round(z.z4),
        zone5_minutes: round(z.z5),
        total_minutes,
        activities_with_hr: stats.activities_with_hr,
        zones,
    })
}

fn zone_summary(zone: HrZone, minutes: u32, total_minutes: u32) -> HrZoneSummary {
    let percentage = if total_minutes > 0 {
        f64::from(minutes) / f64::from(total_minutes) * 100.0
    } else {
        0.0
    };
    HrZoneSummary {
        zone: zone.number(),
        name: zone.name().to_string(),
        minutes,
        formatted: format_zone_minutes(f64::from(minutes)),
        percentage,
    }
}

/// One athlete's zone report over the given activities.
pub fn athlete_zones(
    athlete: &Athlete,
    activities: &[Activity],
    default_max_hr: u32,
) -> AthleteHrZones {
    let max_heartrate = effective_max_heartrate(athlete.max_heartrate, default_max_hr);
    let stats = calculate_zone_stats(activities, max_heartrate);

    AthleteHrZones {
        athlete_id: athlete.id,
        firstname: athlete.firstname.clone(),
        lastname: athlete.lastname.clone(),
        profile_picture_url: athlete.profile_picture_url.clone(),
        max_heartrate,
        hr_zone_data: zone_data(&stats),
    }
}

/// "1h 5m" or "45m".
pub fn format_zone_minutes(minutes: f64) -> String {
    let total = minutes.max(0.0).round() as u64;
    let hours = total / 60;
    let mins = total % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}
