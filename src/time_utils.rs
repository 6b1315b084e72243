// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and week arithmetic.

use chrono::{DateTime, Datelike, Duration, NaiveDate, SecondsFormat, TimeZone, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Monday of the week containing `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Start (Monday 00:00 UTC) of the week containing `now`.
pub fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let monday = monday_of(now.date_naive());
    Utc.from_utc_datetime(&monday.and_hms_opt(0, 0, 0).unwrap_or_default())
}

/// Relative time label: "just now", "5m ago", "3h ago", "2d ago", then "Jan 15".
pub fn format_time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now - then;
    if diff < Duration::zero() {
        return "just now".to_string();
    }

    let minutes = diff.num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }

    let days = hours / 24;
    if days < 7 {
        return format!("{}d ago", days);
    }

    then.format("%b %-d").to_string()
}

/// Whether `then` lies in the last `hours` hours (future timestamps excluded).
pub fn is_within_hours(then: Option<DateTime<Utc>>, now: DateTime<Utc>, hours: i64) -> bool {
    match then {
        Some(then) => {
            let diff = now - then;
            diff >= Duration::zero() && diff <= Duration::hours(hours)
        }
        None => false,
    }
}
