use super::clock::Clock;
use super::error::{DirectoryError, DirectoryResult};
use super::views::{ArtistDetail, SearchResults, ShowListing, VenueArea, VenueDetail};
use crate::directory_store::{Artist, DirectoryCounts, DirectoryStore, EntitySummary, Venue};
use std::sync::Arc;
use tracing::debug;

/// Read operations over the directory.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn DirectoryStore>,
    clock: Arc<dyn Clock>,
}

impl QueryService {
    pub fn new(store: Arc<dyn DirectoryStore>, clock: Arc<dyn Clock>) -> Self {
        QueryService { store, clock }
    }

    /// One group per distinct (city, state), ordered by state then city.
    /// Venues inside a group are ordered by id.
    pub fn list_venues_grouped_by_location(&self) -> DirectoryResult<Vec<VenueArea>> {
        let locations = self
            .store
            .list_venue_locations()
            .map_err(DirectoryError::from_store)?;

        let mut areas: Vec<VenueArea> = Vec::new();
        for location in locations {
            match areas.last_mut() {
                Some(area) if area.city == location.city && area.state == location.state => {
                    area.venues.push(location.venue)
                }
                _ => areas.push(VenueArea {
                    city: location.city,
                    state: location.state,
                    venues: vec![location.venue],
                }),
            }
        }
        debug!("Grouped venues into {} areas", areas.len());
        Ok(areas)
    }

    /// Case-insensitive substring search on venue names. An empty term
    /// matches every venue.
    pub fn search_venues(&self, term: &str) -> DirectoryResult<SearchResults> {
        let matches = self
            .store
            .search_venues(term)
            .map_err(DirectoryError::from_store)?;
        debug!("Venue search '{}' matched {}", term, matches.len());
        Ok(matches.into())
    }

    /// Case-insensitive substring search on artist names. An empty term
    /// matches every artist.
    pub fn search_artists(&self, term: &str) -> DirectoryResult<SearchResults> {
        let matches = self
            .store
            .search_artists(term)
            .map_err(DirectoryError::from_store)?;
        debug!("Artist search '{}' matched {}", term, matches.len());
        Ok(matches.into())
    }

    pub fn list_artists(&self) -> DirectoryResult<Vec<EntitySummary>> {
        self.store.list_artists().map_err(DirectoryError::from_store)
    }

    /// The venue with its shows split around the current time.
    pub fn get_venue_detail(&self, id: i64) -> DirectoryResult<VenueDetail> {
        let (venue, shows) = self
            .store
            .get_venue_with_shows(id)
            .map_err(DirectoryError::from_store)?
            .ok_or_else(|| DirectoryError::not_found("Venue", id))?;
        Ok(VenueDetail::new(venue, shows, self.clock.now()))
    }

    /// The artist with its shows split around the current time.
    pub fn get_artist_detail(&self, id: i64) -> DirectoryResult<ArtistDetail> {
        let (artist, shows) = self
            .store
            .get_artist_with_shows(id)
            .map_err(DirectoryError::from_store)?
            .ok_or_else(|| DirectoryError::not_found("Artist", id))?;
        Ok(ArtistDetail::new(artist, shows, self.clock.now()))
    }

    pub fn list_shows(&self) -> DirectoryResult<Vec<ShowListing>> {
        let shows = self.store.list_shows().map_err(DirectoryError::from_store)?;
        Ok(shows.into_iter().map(ShowListing::from).collect())
    }

    /// The editable venue record, without shows.
    pub fn get_venue(&self, id: i64) -> DirectoryResult<Venue> {
        self.store
            .get_venue(id)
            .map_err(DirectoryError::from_store)?
            .ok_or_else(|| DirectoryError::not_found("Venue", id))
    }

    /// The editable artist record, without shows.
    pub fn get_artist(&self, id: i64) -> DirectoryResult<Artist> {
        self.store
            .get_artist(id)
            .map_err(DirectoryError::from_store)?
            .ok_or_else(|| DirectoryError::not_found("Artist", id))
    }

    pub fn summary_counts(&self) -> DirectoryResult<DirectoryCounts> {
        self.store.get_counts().map_err(DirectoryError::from_store)
    }
}
