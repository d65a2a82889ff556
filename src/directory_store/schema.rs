//! SQLite schema definitions for the venue/artist/show directory.
//!
//! Genres are stored one row per tag in side tables. Shows reference both
//! their venue and their artist and are removed together with either one.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

// =============================================================================
// Foreign Keys
// =============================================================================

const VENUE_FOREIGN_KEY: ForeignKey = ForeignKey {
    foreign_table: "venues",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const ARTIST_FOREIGN_KEY: ForeignKey = ForeignKey {
    foreign_table: "artists",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

// =============================================================================
// Core Tables
// =============================================================================

const VENUES_TABLE: Table = Table {
    name: "venues",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("city", &SqlType::Text, non_null = true),
        sqlite_column!("state", &SqlType::Text, non_null = true),
        sqlite_column!("address", &SqlType::Text),
        sqlite_column!("phone", &SqlType::Text),
        sqlite_column!("website", &SqlType::Text),
        sqlite_column!("facebook_link", &SqlType::Text),
        sqlite_column!("image_link", &SqlType::Text),
        sqlite_column!(
            "seeking_talent",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("seeking_description", &SqlType::Text),
    ],
    indices: &[("idx_venues_location", "state, city")],
};

const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("city", &SqlType::Text, non_null = true),
        sqlite_column!("state", &SqlType::Text, non_null = true),
        sqlite_column!("phone", &SqlType::Text),
        sqlite_column!("website", &SqlType::Text),
        sqlite_column!("facebook_link", &SqlType::Text),
        sqlite_column!("image_link", &SqlType::Text),
        sqlite_column!(
            "seeking_venue",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("seeking_description", &SqlType::Text),
    ],
    indices: &[],
};

const SHOWS_TABLE: Table = Table {
    name: "shows",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "venue_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&VENUE_FOREIGN_KEY)
        ),
        sqlite_column!(
            "artist_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ARTIST_FOREIGN_KEY)
        ),
        sqlite_column!("start_time", &SqlType::Text, non_null = true), // 'YYYY-MM-DD HH:MM:SS'
    ],
    indices: &[
        ("idx_shows_venue", "venue_id"),
        ("idx_shows_artist", "artist_id"),
    ],
};

// =============================================================================
// Genre Tables
// =============================================================================

const VENUE_GENRES_TABLE: Table = Table {
    name: "venue_genres",
    columns: &[
        sqlite_column!(
            "venue_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&VENUE_FOREIGN_KEY)
        ),
        sqlite_column!("genre", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_venue_genres_venue", "venue_id")],
};

const ARTIST_GENRES_TABLE: Table = Table {
    name: "artist_genres",
    columns: &[
        sqlite_column!(
            "artist_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ARTIST_FOREIGN_KEY)
        ),
        sqlite_column!("genre", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_artist_genres_artist", "artist_id")],
};

// =============================================================================
// Versioned Schema Definition
// =============================================================================

pub const DIRECTORY_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        VENUES_TABLE,
        VENUE_GENRES_TABLE,
        ARTISTS_TABLE,
        ARTIST_GENRES_TABLE,
        SHOWS_TABLE,
    ],
}];
