// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Athlete model for storage.

use serde::{Deserialize, Serialize};

/// Athlete profile, keyed by Strava athlete ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Athlete {
    /// Strava athlete ID
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    /// Profile picture URL
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    /// Max heart rate used for zone estimation
    #[serde(default)]
    pub max_heartrate: Option<u32>,
}

impl Athlete {
    /// Placeholder record for an athlete known only by ID.
    pub fn minimal(id: u64) -> Self {
        Self {
            id,
            username: String::new(),
            firstname: String::new(),
            lastname: String::new(),
            profile_picture_url: None,
            max_heartrate: None,
        }
    }

    /// Merge an incoming record over this one, keeping fields the incoming
    /// record leaves blank.
    pub fn merge(&mut self, incoming: Athlete) {
        if !incoming.username.is_empty() {
            self.username = incoming.username;
        }
        if !incoming.firstname.is_empty() {
            self.firstname = incoming.firstname;
        }
        if !incoming.lastname.is_empty() {
            self.lastname = incoming.lastname;
        }
        if incoming.profile_picture_url.is_some() {
            self.profile_picture_url = incoming.profile_picture_url;
        }
        if incoming.max_heartrate.is_some() {
            self.max_heartrate = incoming.max_heartrate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_existing_names_for_minimal_record() {
        let mut existing = Athlete {
            firstname: "Drake".to_string(),
            lastname: "M".to_string(),
            max_heartrate: Some(201),
            ..Athlete::minimal(7)
        };

        existing.merge(Athlete::minimal(7));

        assert_eq!(existing.firstname, "Drake");
        assert_eq!(existing.lastname, "M");
        assert_eq!(existing.max_heartrate, Some(201));
    }

    #[test]
    fn test_merge_overwrites_supplied_fields() {
        let mut existing = Athlete::minimal(7);
        existing.merge(Athlete {
            firstname: "Levi".to_string(),
            profile_picture_url: Some("https://example.com/p.jpg".to_string()),
            ..Athlete::minimal(7)
        });

        assert_eq!(existing.firstname, "Levi");
        assert!(existing.profile_picture_url.is_some());
    }
}
