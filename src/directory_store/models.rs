//! Directory models for SQLite-backed storage.
//!
//! Stored entities (`Venue`, `Artist`), the typed inputs accepted by write
//! operations, and the joined rows returned by relational reads. Shows are
//! only ever read joined with their venue and artist.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format used to persist show start times.
pub const START_TIME_DB_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Stored Entities
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub image_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub image_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

// =============================================================================
// Write Inputs
// =============================================================================

/// Fields accepted when listing a new venue.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewVenue {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub image_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

/// Fields accepted when listing a new artist.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewArtist {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub image_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewShow {
    pub venue_id: i64,
    pub artist_id: i64,
    pub start_time: NaiveDateTime,
}

/// Partial venue edit. Only the fields that are `Some` are overwritten.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VenueUpdate {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub genres: Option<Vec<String>>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub image_link: Option<String>,
    pub seeking_talent: Option<bool>,
    pub seeking_description: Option<String>,
}

/// Partial artist edit. Only the fields that are `Some` are overwritten.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArtistUpdate {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub genres: Option<Vec<String>>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub image_link: Option<String>,
    pub seeking_venue: Option<bool>,
    pub seeking_description: Option<String>,
}

fn overwrite<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn overwrite_optional<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

impl VenueUpdate {
    pub fn apply_to(self, venue: &mut Venue) {
        overwrite(&mut venue.name, self.name);
        overwrite(&mut venue.city, self.city);
        overwrite(&mut venue.state, self.state);
        overwrite_optional(&mut venue.address, self.address);
        overwrite_optional(&mut venue.phone, self.phone);
        overwrite(&mut venue.genres, self.genres);
        overwrite_optional(&mut venue.website, self.website);
        overwrite_optional(&mut venue.facebook_link, self.facebook_link);
        overwrite_optional(&mut venue.image_link, self.image_link);
        overwrite(&mut venue.seeking_talent, self.seeking_talent);
        overwrite_optional(&mut venue.seeking_description, self.seeking_description);
    }
}

impl ArtistUpdate {
    pub fn apply_to(self, artist: &mut Artist) {
        overwrite(&mut artist.name, self.name);
        overwrite(&mut artist.city, self.city);
        overwrite(&mut artist.state, self.state);
        overwrite_optional(&mut artist.phone, self.phone);
        overwrite(&mut artist.genres, self.genres);
        overwrite_optional(&mut artist.website, self.website);
        overwrite_optional(&mut artist.facebook_link, self.facebook_link);
        overwrite_optional(&mut artist.image_link, self.image_link);
        overwrite(&mut artist.seeking_venue, self.seeking_venue);
        overwrite_optional(&mut artist.seeking_description, self.seeking_description);
    }
}

// =============================================================================
// Joined Rows
// =============================================================================

/// Id and name of a venue or artist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub id: i64,
    pub name: String,
}

/// A venue together with the location it is grouped under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VenueLocation {
    pub city: String,
    pub state: String,
    pub venue: EntitySummary,
}

/// A show as seen from one side: the other party's id, name and image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShowCounterpart {
    pub show_id: i64,
    pub counterpart_id: i64,
    pub counterpart_name: String,
    pub counterpart_image_link: Option<String>,
    pub start_time: NaiveDateTime,
}

/// A show joined with both its venue and its artist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShowRecord {
    pub show_id: i64,
    pub venue_id: i64,
    pub venue_name: String,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: NaiveDateTime,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryCounts {
    pub venues: usize,
    pub artists: usize,
    pub shows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_venue() -> Venue {
        Venue {
            id: 1,
            name: "The Musical Hop".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            address: Some("1015 Folsom Street".to_string()),
            phone: Some("123-123-1234".to_string()),
            genres: vec!["Jazz".to_string(), "Reggae".to_string()],
            website: None,
            facebook_link: None,
            image_link: None,
            seeking_talent: true,
            seeking_description: Some("We are on the lookout".to_string()),
        }
    }

    #[test]
    fn venue_update_only_touches_supplied_fields() {
        let mut venue = make_venue();
        VenueUpdate {
            name: Some("The Dueling Pianos Bar".to_string()),
            genres: Some(vec!["Classical".to_string()]),
            seeking_talent: Some(false),
            ..Default::default()
        }
        .apply_to(&mut venue);

        assert_eq!(venue.name, "The Dueling Pianos Bar");
        assert_eq!(venue.genres, vec!["Classical".to_string()]);
        assert!(!venue.seeking_talent);
        assert_eq!(venue.city, "San Francisco");
        assert_eq!(venue.address.as_deref(), Some("1015 Folsom Street"));
        assert_eq!(
            venue.seeking_description.as_deref(),
            Some("We are on the lookout")
        );
    }

    #[test]
    fn empty_update_is_a_no_op() {
        let mut venue = make_venue();
        VenueUpdate::default().apply_to(&mut venue);
        assert_eq!(venue, make_venue());
    }

    #[test]
    fn new_venue_deserializes_with_defaults() {
        let venue: NewVenue = serde_json::from_str(
            r#"{"name": "The Fillmore", "city": "San Francisco", "state": "CA"}"#,
        )
        .unwrap();
        assert_eq!(venue.name, "The Fillmore");
        assert!(venue.genres.is_empty());
        assert!(!venue.seeking_talent);
        assert!(venue.address.is_none());
    }
}
