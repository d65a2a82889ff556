//! DirectoryStore trait definition.
//!
//! The services only ever see this trait, so the storage handle is injected
//! at construction instead of living in process-wide state.

use super::models::*;
use anyhow::Result;

/// Outcome of deleting a venue or artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedEntity {
    pub name: String,
    /// Shows removed together with the entity.
    pub removed_shows: usize,
}

/// Trait for directory storage backends.
///
/// Every write method runs in its own transaction: it either commits exactly
/// one logical change or leaves the database untouched.
pub trait DirectoryStore: Send + Sync {
    // =========================================================================
    // Venues
    // =========================================================================

    /// Get a venue by ID.
    fn get_venue(&self, id: i64) -> Result<Option<Venue>>;

    /// All venues with their (city, state), ordered by state, city, id.
    fn list_venue_locations(&self) -> Result<Vec<VenueLocation>>;

    /// Venues whose name contains `term`, ignoring case.
    fn search_venues(&self, term: &str) -> Result<Vec<EntitySummary>>;

    /// Shows hosted by a venue, each joined with its artist.
    fn get_venue_shows(&self, venue_id: i64) -> Result<Vec<ShowCounterpart>>;

    /// A venue and its shows, read from a single snapshot.
    fn get_venue_with_shows(&self, id: i64) -> Result<Option<(Venue, Vec<ShowCounterpart>)>>;

    /// Insert a venue, returning its generated id.
    fn insert_venue(&self, venue: &NewVenue) -> Result<i64>;

    /// Overwrite the supplied fields. Returns `None` if the venue doesn't exist.
    fn update_venue(&self, id: i64, update: VenueUpdate) -> Result<Option<Venue>>;

    /// Delete a venue and its shows. Returns `None` if the venue doesn't exist.
    fn delete_venue(&self, id: i64) -> Result<Option<DeletedEntity>>;

    // =========================================================================
    // Artists
    // =========================================================================

    /// Get an artist by ID.
    fn get_artist(&self, id: i64) -> Result<Option<Artist>>;

    /// All artists as id and name, ordered by id.
    fn list_artists(&self) -> Result<Vec<EntitySummary>>;

    /// Artists whose name contains `term`, ignoring case.
    fn search_artists(&self, term: &str) -> Result<Vec<EntitySummary>>;

    /// Shows performed by an artist, each joined with its venue.
    fn get_artist_shows(&self, artist_id: i64) -> Result<Vec<ShowCounterpart>>;

    /// An artist and their shows, read from a single snapshot.
    fn get_artist_with_shows(&self, id: i64) -> Result<Option<(Artist, Vec<ShowCounterpart>)>>;

    /// Insert an artist, returning its generated id.
    fn insert_artist(&self, artist: &NewArtist) -> Result<i64>;

    /// Overwrite the supplied fields. Returns `None` if the artist doesn't exist.
    fn update_artist(&self, id: i64, update: ArtistUpdate) -> Result<Option<Artist>>;

    /// Delete an artist and its shows. Returns `None` if the artist doesn't exist.
    fn delete_artist(&self, id: i64) -> Result<Option<DeletedEntity>>;

    // =========================================================================
    // Shows
    // =========================================================================

    /// Insert a show after checking both references inside the transaction.
    ///
    /// A missing venue or artist fails with a
    /// [`ValidationError::ForeignKeyViolation`](super::ValidationError).
    fn insert_show(&self, show: &NewShow) -> Result<i64>;

    /// All shows joined with venue and artist, ordered by id.
    fn list_shows(&self) -> Result<Vec<ShowRecord>>;

    // =========================================================================
    // Counts
    // =========================================================================

    fn get_counts(&self) -> Result<DirectoryCounts>;
}
