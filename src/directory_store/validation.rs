//! Validation for directory entities.
//!
//! Typed inputs are checked here before they reach the store, so a rejected
//! write never opens a transaction.

use super::models::{ArtistUpdate, NewArtist, NewShow, NewVenue, VenueUpdate};
use chrono::NaiveDateTime;
use std::fmt;

/// Validation error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField {
        field: &'static str,
    },
    InvalidField {
        field: &'static str,
        reason: String,
    },
    ForeignKeyViolation {
        entity_type: &'static str,
        id: i64,
    },
}

impl ValidationError {
    /// Name of the offending field, for building user-facing messages.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyField { field } => *field,
            ValidationError::InvalidField { field, .. } => *field,
            ValidationError::ForeignKeyViolation { entity_type, .. } => match *entity_type {
                "venue" => "venue_id",
                "artist" => "artist_id",
                other => other,
            },
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField { field } => {
                write!(f, "Field '{}' is required but was empty", field)
            }
            ValidationError::InvalidField { field, reason } => {
                write!(f, "Field '{}' is invalid: {}", field, reason)
            }
            ValidationError::ForeignKeyViolation { entity_type, id } => {
                write!(f, "Referenced {} '{}' does not exist", entity_type, id)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

const START_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a show start time as submitted by a form.
pub fn parse_start_time(value: &str) -> ValidationResult<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::EmptyField {
            field: "start_time",
        });
    }
    START_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| ValidationError::InvalidField {
            field: "start_time",
            reason: format!("'{}' is not a YYYY-MM-DD HH:MM:SS timestamp", value),
        })
}

fn require(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

fn require_if_supplied(field: &'static str, value: &Option<String>) -> ValidationResult<()> {
    match value {
        Some(value) => require(field, value),
        None => Ok(()),
    }
}

/// Trim tags, drop blank ones and keep the first occurrence of each.
pub fn normalize_genres(genres: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(genres.len());
    for genre in genres {
        let genre = genre.trim();
        if !genre.is_empty() && !normalized.iter().any(|g| g == genre) {
            normalized.push(genre.to_string());
        }
    }
    normalized
}

/// Validate a venue before insertion, normalizing its genres.
pub fn validate_new_venue(mut venue: NewVenue) -> ValidationResult<NewVenue> {
    require("name", &venue.name)?;
    require("city", &venue.city)?;
    require("state", &venue.state)?;
    venue.genres = normalize_genres(venue.genres);
    Ok(venue)
}

/// Validate an artist before insertion, normalizing its genres.
pub fn validate_new_artist(mut artist: NewArtist) -> ValidationResult<NewArtist> {
    require("name", &artist.name)?;
    require("city", &artist.city)?;
    require("state", &artist.state)?;
    artist.genres = normalize_genres(artist.genres);
    Ok(artist)
}

pub fn validate_venue_update(mut update: VenueUpdate) -> ValidationResult<VenueUpdate> {
    require_if_supplied("name", &update.name)?;
    require_if_supplied("city", &update.city)?;
    require_if_supplied("state", &update.state)?;
    update.genres = update.genres.map(normalize_genres);
    Ok(update)
}

pub fn validate_artist_update(mut update: ArtistUpdate) -> ValidationResult<ArtistUpdate> {
    require_if_supplied("name", &update.name)?;
    require_if_supplied("city", &update.city)?;
    require_if_supplied("state", &update.state)?;
    update.genres = update.genres.map(normalize_genres);
    Ok(update)
}

/// Validate a show (without foreign key check, which needs the store).
pub fn validate_new_show(show: &NewShow) -> ValidationResult<()> {
    if show.venue_id < 1 {
        return Err(ValidationError::InvalidField {
            field: "venue_id",
            reason: format!("must be positive, got {}", show.venue_id),
        });
    }
    if show.artist_id < 1 {
        return Err(ValidationError::InvalidField {
            field: "artist_id",
            reason: format!("must be positive, got {}", show.artist_id),
        });
    }
    Ok(())
}
