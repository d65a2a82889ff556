//! Test fixture creation for the directory database

use super::constants::*;
use anyhow::Result;
use chrono::NaiveDateTime;
use std::path::PathBuf;
use tempfile::TempDir;
use venue_directory::directory_store::{
    DirectoryStore, NewArtist, NewShow, NewVenue, SqliteDirectoryStore, START_TIME_DB_FORMAT,
};

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn time(value: &str) -> Result<NaiveDateTime> {
    Ok(NaiveDateTime::parse_from_str(value, START_TIME_DB_FORMAT)?)
}

/// Creates a temporary directory database with 3 venues, 3 artists, 5 shows.
/// Returns (temp_dir, db_path)
pub fn create_test_directory() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("directory.db");
    let store = SqliteDirectoryStore::new(&db_path, 1)?;

    let venues = [
        NewVenue {
            name: VENUE_1_NAME.to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            address: text("1015 Folsom Street"),
            phone: text("123-123-1234"),
            genres: tags(&["Jazz", "Reggae", "Swing", "Classical", "Folk"]),
            website: text("https://www.themusicalhop.com"),
            facebook_link: text("https://www.facebook.com/TheMusicalHop"),
            seeking_talent: true,
            seeking_description: text("We are on the lookout for a local artist to play every two weeks."),
            ..Default::default()
        },
        NewVenue {
            name: VENUE_2_NAME.to_string(),
            city: "New York".to_string(),
            state: "NY".to_string(),
            address: text("335 Delancey Street"),
            phone: text("914-003-1132"),
            genres: tags(&["Classical", "R&B", "Hip-Hop"]),
            ..Default::default()
        },
        NewVenue {
            name: VENUE_3_NAME.to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            address: text("34 Whiskey Moore Ave"),
            phone: text("415-000-1234"),
            genres: tags(&["Rock n Roll", "Jazz", "Classical", "Folk"]),
            ..Default::default()
        },
    ];
    for venue in &venues {
        store.insert_venue(venue)?;
    }

    let artists = [
        NewArtist {
            name: ARTIST_1_NAME.to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            phone: text("326-123-5000"),
            genres: tags(&["Rock n Roll"]),
            image_link: text("https://images.example/guns-n-petals.jpg"),
            seeking_venue: true,
            seeking_description: text("Looking for shows to perform at in the San Francisco Bay Area!"),
            ..Default::default()
        },
        NewArtist {
            name: ARTIST_2_NAME.to_string(),
            city: "New York".to_string(),
            state: "NY".to_string(),
            phone: text("300-400-5000"),
            genres: tags(&["Jazz"]),
            ..Default::default()
        },
        NewArtist {
            name: ARTIST_3_NAME.to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            phone: text("432-325-5432"),
            genres: tags(&["Jazz", "Classical"]),
            image_link: text("https://images.example/wild-sax-band.jpg"),
            ..Default::default()
        },
    ];
    for artist in &artists {
        store.insert_artist(artist)?;
    }

    let shows = [
        (VENUE_1_ID, ARTIST_1_ID, "2019-05-21 21:30:00"),
        (VENUE_3_ID, ARTIST_2_ID, "2019-06-15 23:00:00"),
        (VENUE_3_ID, ARTIST_3_ID, "2035-04-01 20:00:00"),
        (VENUE_3_ID, ARTIST_3_ID, "2035-04-08 20:00:00"),
        (VENUE_3_ID, ARTIST_3_ID, "2035-04-15 20:00:00"),
    ];
    for (venue_id, artist_id, start_time) in shows {
        store.insert_show(&NewShow {
            venue_id,
            artist_id,
            start_time: time(start_time)?,
        })?;
    }

    Ok((dir, db_path))
}

pub fn test_now() -> Result<NaiveDateTime> {
    time(TEST_NOW)
}
