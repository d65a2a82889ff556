//! Plain serializable shapes returned by the services.
//!
//! Nothing in here refers to the storage layer beyond the entity structs,
//! so a presentation layer can hand them straight to a renderer or encoder.

use super::timing::{format_show_time, ShowTiming, SHOW_TIME_LISTING_FORMAT};
use crate::directory_store::{Artist, EntitySummary, ShowCounterpart, ShowRecord, Venue};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Venues sharing one (city, state) pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VenueArea {
    pub city: String,
    pub state: String,
    pub venues: Vec<EntitySummary>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<EntitySummary>,
}

impl From<Vec<EntitySummary>> for SearchResults {
    fn from(data: Vec<EntitySummary>) -> Self {
        SearchResults {
            count: data.len(),
            data,
        }
    }
}

/// A show on a venue page, described by its artist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VenueShowEntry {
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

impl From<ShowCounterpart> for VenueShowEntry {
    fn from(show: ShowCounterpart) -> Self {
        VenueShowEntry {
            artist_id: show.counterpart_id,
            artist_name: show.counterpart_name,
            artist_image_link: show.counterpart_image_link,
            start_time: format_show_time(show.start_time),
        }
    }
}

/// A show on an artist page, described by its venue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArtistShowEntry {
    pub venue_id: i64,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub start_time: String,
}

impl From<ShowCounterpart> for ArtistShowEntry {
    fn from(show: ShowCounterpart) -> Self {
        ArtistShowEntry {
            venue_id: show.counterpart_id,
            venue_name: show.counterpart_name,
            venue_image_link: show.counterpart_image_link,
            start_time: format_show_time(show.start_time),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VenueDetail {
    #[serde(flatten)]
    pub venue: Venue,
    pub past_shows: Vec<VenueShowEntry>,
    pub upcoming_shows: Vec<VenueShowEntry>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

impl VenueDetail {
    pub fn new(venue: Venue, shows: Vec<ShowCounterpart>, now: NaiveDateTime) -> Self {
        let (past_shows, upcoming_shows) = split_shows(shows, now);
        VenueDetail {
            venue,
            past_shows_count: past_shows.len(),
            upcoming_shows_count: upcoming_shows.len(),
            past_shows,
            upcoming_shows,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArtistDetail {
    #[serde(flatten)]
    pub artist: Artist,
    pub past_shows: Vec<ArtistShowEntry>,
    pub upcoming_shows: Vec<ArtistShowEntry>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

impl ArtistDetail {
    pub fn new(artist: Artist, shows: Vec<ShowCounterpart>, now: NaiveDateTime) -> Self {
        let (past_shows, upcoming_shows) = split_shows(shows, now);
        ArtistDetail {
            artist,
            past_shows_count: past_shows.len(),
            upcoming_shows_count: upcoming_shows.len(),
            past_shows,
            upcoming_shows,
        }
    }
}

/// Split shows into (past, upcoming), keeping their relative order.
fn split_shows<T: From<ShowCounterpart>>(
    shows: Vec<ShowCounterpart>,
    now: NaiveDateTime,
) -> (Vec<T>, Vec<T>) {
    let mut past = Vec::new();
    let mut upcoming = Vec::new();
    for show in shows {
        match ShowTiming::classify(show.start_time, now) {
            ShowTiming::Past => past.push(T::from(show)),
            ShowTiming::Upcoming => upcoming.push(T::from(show)),
        }
    }
    (past, upcoming)
}

/// One row of the show listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShowListing {
    pub venue_id: i64,
    pub venue_name: String,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

impl From<ShowRecord> for ShowListing {
    fn from(show: ShowRecord) -> Self {
        ShowListing {
            venue_id: show.venue_id,
            venue_name: show.venue_name,
            artist_id: show.artist_id,
            artist_name: show.artist_name,
            artist_image_link: show.artist_image_link,
            start_time: show.start_time.format(SHOW_TIME_LISTING_FORMAT).to_string(),
        }
    }
}

// =============================================================================
// Mutation outcomes
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Created {
    pub id: i64,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Updated<T> {
    pub record: T,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Deleted {
    pub id: i64,
    pub name: String,
    pub removed_shows: usize,
    pub message: String,
}
