use super::error::{DirectoryError, DirectoryResult};
use super::views::{Created, Deleted, Updated};
use crate::directory_store::{
    validate_artist_update, validate_new_artist, validate_new_show, validate_new_venue,
    validate_venue_update, Artist, ArtistUpdate, DirectoryStore, NewArtist, NewShow, NewVenue,
    ValidationError, Venue, VenueUpdate,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Create, update and delete operations.
///
/// Inputs are validated before the store is touched; each store call is a
/// single transaction, so a failed call leaves no trace in the database.
#[derive(Clone)]
pub struct MutationService {
    store: Arc<dyn DirectoryStore>,
}

fn rejected(err: ValidationError) -> DirectoryError {
    warn!("Rejected input: {}", err);
    DirectoryError::Validation(err)
}

fn storage_failure(err: anyhow::Error) -> DirectoryError {
    let err = DirectoryError::from_store(err);
    warn!("Directory write failed: {}", err);
    err
}

impl MutationService {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        MutationService { store }
    }

    // =========================================================================
    // Venues
    // =========================================================================

    pub fn create_venue(&self, venue: NewVenue) -> DirectoryResult<Created> {
        let venue = validate_new_venue(venue).map_err(rejected)?;
        let id = self.store.insert_venue(&venue).map_err(storage_failure)?;
        info!("Created venue {} ({})", id, venue.name);
        Ok(Created {
            id,
            message: format!("Venue {} was successfully listed!", venue.name),
        })
    }

    pub fn update_venue(&self, id: i64, update: VenueUpdate) -> DirectoryResult<Updated<Venue>> {
        let update = validate_venue_update(update).map_err(rejected)?;
        let venue = self
            .store
            .update_venue(id, update)
            .map_err(storage_failure)?
            .ok_or_else(|| DirectoryError::not_found("Venue", id))?;
        info!("Updated venue {}", id);
        Ok(Updated {
            message: format!("Venue {} was successfully updated!", venue.name),
            record: venue,
        })
    }

    /// Delete the venue together with every show it hosts.
    pub fn delete_venue(&self, id: i64) -> DirectoryResult<Deleted> {
        let deleted = self
            .store
            .delete_venue(id)
            .map_err(storage_failure)?
            .ok_or_else(|| DirectoryError::not_found("Venue", id))?;
        info!(
            "Deleted venue {} ({}) and {} shows",
            id, deleted.name, deleted.removed_shows
        );
        Ok(Deleted {
            id,
            message: format!("Venue {} was successfully deleted!", deleted.name),
            name: deleted.name,
            removed_shows: deleted.removed_shows,
        })
    }

    // =========================================================================
    // Artists
    // =========================================================================

    pub fn create_artist(&self, artist: NewArtist) -> DirectoryResult<Created> {
        let artist = validate_new_artist(artist).map_err(rejected)?;
        let id = self.store.insert_artist(&artist).map_err(storage_failure)?;
        info!("Created artist {} ({})", id, artist.name);
        Ok(Created {
            id,
            message: format!("Artist {} was successfully listed!", artist.name),
        })
    }

    pub fn update_artist(
        &self,
        id: i64,
        update: ArtistUpdate,
    ) -> DirectoryResult<Updated<Artist>> {
        let update = validate_artist_update(update).map_err(rejected)?;
        let artist = self
            .store
            .update_artist(id, update)
            .map_err(storage_failure)?
            .ok_or_else(|| DirectoryError::not_found("Artist", id))?;
        info!("Updated artist {}", id);
        Ok(Updated {
            message: format!("Artist {} was successfully updated!", artist.name),
            record: artist,
        })
    }

    /// Delete the artist together with every show it performs.
    pub fn delete_artist(&self, id: i64) -> DirectoryResult<Deleted> {
        let deleted = self
            .store
            .delete_artist(id)
            .map_err(storage_failure)?
            .ok_or_else(|| DirectoryError::not_found("Artist", id))?;
        info!(
            "Deleted artist {} ({}) and {} shows",
            id, deleted.name, deleted.removed_shows
        );
        Ok(Deleted {
            id,
            message: format!("Artist {} was successfully deleted!", deleted.name),
            name: deleted.name,
            removed_shows: deleted.removed_shows,
        })
    }

    // =========================================================================
    // Shows
    // =========================================================================

    /// Fails with [`ValidationError::ForeignKeyViolation`] when either
    /// referenced row is missing.
    pub fn create_show(&self, show: NewShow) -> DirectoryResult<Created> {
        validate_new_show(&show).map_err(rejected)?;
        let id = self.store.insert_show(&show).map_err(storage_failure)?;
        info!(
            "Created show {} (venue {}, artist {})",
            id, show.venue_id, show.artist_id
        );
        Ok(Created {
            id,
            message: "Show was successfully listed!".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory_store::SqliteDirectoryStore;
    use crate::services::{FixedClock, QueryService};
    use chrono::{NaiveDate, NaiveDateTime};
    use tempfile::TempDir;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    struct Fixture {
        temp_dir: TempDir,
        store: Arc<SqliteDirectoryStore>,
        mutation: MutationService,
        query: QueryService,
    }

    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let store =
            Arc::new(SqliteDirectoryStore::new(temp_dir.path().join("test.db"), 2).unwrap());
        let mutation = MutationService::new(store.clone());
        let query = QueryService::new(store.clone(), Arc::new(FixedClock(at(2025, 6, 1, 12))));
        Fixture {
            temp_dir,
            store,
            mutation,
            query,
        }
    }

    fn fillmore() -> NewVenue {
        NewVenue {
            name: "The Fillmore".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            seeking_talent: false,
            ..Default::default()
        }
    }

    fn petals() -> NewArtist {
        NewArtist {
            name: "Guns N Petals".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            genres: vec!["Rock n Roll".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn created_venue_has_no_shows() {
        let f = fixture();
        let created = f.mutation.create_venue(fillmore()).unwrap();
        assert_eq!(created.message, "Venue The Fillmore was successfully listed!");

        let detail = f.query.get_venue_detail(created.id).unwrap();
        assert!(!detail.venue.seeking_talent);
        assert_eq!(detail.past_shows_count, 0);
        assert_eq!(detail.upcoming_shows_count, 0);
    }

    #[test]
    fn create_venue_round_trips_every_field() {
        let f = fixture();
        let input = NewVenue {
            name: "The Musical Hop".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            address: Some("1015 Folsom Street".to_string()),
            phone: Some("123-123-1234".to_string()),
            genres: vec!["Jazz".to_string(), "Reggae".to_string(), "Swing".to_string()],
            website: Some("https://www.themusicalhop.com".to_string()),
            facebook_link: Some("https://www.facebook.com/TheMusicalHop".to_string()),
            image_link: Some("https://images.example/hop.jpg".to_string()),
            seeking_talent: true,
            seeking_description: Some("We are on the lookout for a local artist".to_string()),
        };
        let id = f.mutation.create_venue(input.clone()).unwrap().id;

        let venue = f.query.get_venue_detail(id).unwrap().venue;
        assert_eq!(
            venue,
            Venue {
                id,
                name: input.name,
                city: input.city,
                state: input.state,
                address: input.address,
                phone: input.phone,
                genres: input.genres,
                website: input.website,
                facebook_link: input.facebook_link,
                image_link: input.image_link,
                seeking_talent: input.seeking_talent,
                seeking_description: input.seeking_description,
            }
        );
    }

    #[test]
    fn rejected_create_leaves_counts_unchanged() {
        let f = fixture();
        f.mutation.create_venue(fillmore()).unwrap();

        let mut nameless = fillmore();
        nameless.name = "  ".to_string();
        let err = f.mutation.create_venue(nameless).unwrap_err();
        assert!(matches!(
            err,
            DirectoryError::Validation(ValidationError::EmptyField { field: "name" })
        ));

        let mut stateless = petals();
        stateless.state = String::new();
        assert!(f.mutation.create_artist(stateless).is_err());

        let counts = f.query.summary_counts().unwrap();
        assert_eq!(counts.venues, 1);
        assert_eq!(counts.artists, 0);
    }

    #[test]
    fn show_with_missing_venue_is_a_foreign_key_violation() {
        let f = fixture();
        let artist_id = f.mutation.create_artist(petals()).unwrap().id;

        let err = f
            .mutation
            .create_show(NewShow {
                venue_id: 999999,
                artist_id,
                start_time: at(2035, 4, 1, 20),
            })
            .unwrap_err();

        match err {
            DirectoryError::Validation(err) => {
                assert_eq!(
                    err,
                    ValidationError::ForeignKeyViolation {
                        entity_type: "venue",
                        id: 999999
                    }
                );
                assert_eq!(err.field(), "venue_id");
            }
            other => panic!("Unexpected error {:?}", other),
        }
        assert_eq!(f.query.summary_counts().unwrap().shows, 0);
    }

    #[test]
    fn show_with_missing_artist_is_rejected() {
        let f = fixture();
        let venue_id = f.mutation.create_venue(fillmore()).unwrap().id;

        let err = f
            .mutation
            .create_show(NewShow {
                venue_id,
                artist_id: 31337,
                start_time: at(2035, 4, 1, 20),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            DirectoryError::Validation(ValidationError::ForeignKeyViolation {
                entity_type: "artist",
                ..
            })
        ));
    }

    #[test]
    fn create_show_reports_success() {
        let f = fixture();
        let venue_id = f.mutation.create_venue(fillmore()).unwrap().id;
        let artist_id = f.mutation.create_artist(petals()).unwrap().id;

        let created = f
            .mutation
            .create_show(NewShow {
                venue_id,
                artist_id,
                start_time: at(2035, 4, 1, 20),
            })
            .unwrap();
        assert_eq!(created.message, "Show was successfully listed!");
        assert_eq!(f.query.list_shows().unwrap().len(), 1);
    }

    #[test]
    fn update_overwrites_only_supplied_fields() {
        let f = fixture();
        let id = f.mutation.create_artist(petals()).unwrap().id;

        let updated = f
            .mutation
            .update_artist(
                id,
                ArtistUpdate {
                    phone: Some("326-123-5000".to_string()),
                    seeking_venue: Some(true),
                    genres: Some(vec!["Rock n Roll".to_string(), " Punk ".to_string()]),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.message, "Artist Guns N Petals was successfully updated!");
        let artist = f.query.get_artist(id).unwrap();
        assert_eq!(artist, updated.record);
        assert_eq!(artist.name, "Guns N Petals");
        assert_eq!(artist.phone.as_deref(), Some("326-123-5000"));
        assert!(artist.seeking_venue);
        assert_eq!(artist.genres, vec!["Rock n Roll".to_string(), "Punk".to_string()]);
    }

    #[test]
    fn rejected_update_keeps_prior_values() {
        let f = fixture();
        let id = f.mutation.create_venue(fillmore()).unwrap().id;

        let result = f.mutation.update_venue(
            id,
            VenueUpdate {
                name: Some(String::new()),
                city: Some("Oakland".to_string()),
                ..Default::default()
            },
        );

        assert!(matches!(result, Err(DirectoryError::Validation(_))));
        let venue = f.query.get_venue(id).unwrap();
        assert_eq!(venue.name, "The Fillmore");
        assert_eq!(venue.city, "San Francisco");
    }

    /// Installs a trigger through a second connection so a later statement in
    /// the store's write transaction fails.
    fn install_failing_trigger(f: &Fixture, sql: &str) {
        let conn = rusqlite::Connection::open(f.temp_dir.path().join("test.db")).unwrap();
        conn.execute_batch(sql).unwrap();
    }

    #[test]
    fn update_failing_midway_keeps_prior_values() {
        let f = fixture();
        let id = f
            .mutation
            .create_venue(NewVenue {
                genres: vec!["Jazz".to_string()],
                ..fillmore()
            })
            .unwrap()
            .id;
        install_failing_trigger(
            &f,
            "CREATE TRIGGER block_venue_genres BEFORE INSERT ON venue_genres
             BEGIN SELECT RAISE(ABORT, 'genre insert blocked'); END;",
        );

        let result = f.mutation.update_venue(
            id,
            VenueUpdate {
                name: Some("The Warfield".to_string()),
                genres: Some(vec!["Rock n Roll".to_string(), "Folk".to_string()]),
                ..Default::default()
            },
        );

        assert!(matches!(result, Err(DirectoryError::Storage(_))));
        let venue = f.query.get_venue(id).unwrap();
        assert_eq!(venue.name, "The Fillmore");
        assert_eq!(venue.genres, vec!["Jazz".to_string()]);
    }

    #[test]
    fn delete_failing_midway_keeps_venue_and_shows() {
        let f = fixture();
        let venue_id = f
            .mutation
            .create_venue(NewVenue {
                genres: vec!["Jazz".to_string()],
                ..fillmore()
            })
            .unwrap()
            .id;
        let artist_id = f.mutation.create_artist(petals()).unwrap().id;
        f.mutation
            .create_show(NewShow {
                venue_id,
                artist_id,
                start_time: at(2035, 4, 1, 20),
            })
            .unwrap();
        install_failing_trigger(
            &f,
            "CREATE TRIGGER block_venue_delete BEFORE DELETE ON venues
             BEGIN SELECT RAISE(ABORT, 'venue delete blocked'); END;",
        );

        let result = f.mutation.delete_venue(venue_id);

        assert!(matches!(result, Err(DirectoryError::Storage(_))));
        let detail = f.query.get_venue_detail(venue_id).unwrap();
        assert_eq!(detail.venue.name, "The Fillmore");
        assert_eq!(detail.venue.genres, vec!["Jazz".to_string()]);
        assert_eq!(detail.upcoming_shows_count, 1);
        assert_eq!(f.query.list_shows().unwrap().len(), 1);
    }

    #[test]
    fn update_and_delete_of_missing_rows_are_not_found() {
        let f = fixture();
        assert!(matches!(
            f.mutation.update_venue(5, VenueUpdate::default()),
            Err(DirectoryError::NotFound { entity: "Venue", id: 5 })
        ));
        assert!(matches!(
            f.mutation.delete_artist(5),
            Err(DirectoryError::NotFound { entity: "Artist", id: 5 })
        ));
        assert!(matches!(
            f.mutation.delete_venue(5),
            Err(DirectoryError::NotFound { .. })
        ));
    }

    #[test]
    fn sequential_updates_last_writer_wins() {
        let f = fixture();
        let id = f.mutation.create_venue(fillmore()).unwrap().id;

        let first = f.mutation.clone();
        let second = f.mutation.clone();
        first
            .update_venue(
                id,
                VenueUpdate {
                    phone: Some("111-111-1111".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        second
            .update_venue(
                id,
                VenueUpdate {
                    phone: Some("222-222-2222".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        // No versioning: the second write silently replaces the first
        assert_eq!(
            f.query.get_venue(id).unwrap().phone.as_deref(),
            Some("222-222-2222")
        );
    }

    #[test]
    fn concurrent_updates_leave_one_of_the_writes() {
        let f = fixture();
        let id = f.mutation.create_venue(fillmore()).unwrap().id;
        let phones = ["111-111-1111", "222-222-2222"];

        std::thread::scope(|scope| {
            let handles: Vec<_> = phones
                .iter()
                .map(|phone| {
                    let mutation = f.mutation.clone();
                    scope.spawn(move || {
                        mutation.update_venue(
                            id,
                            VenueUpdate {
                                phone: Some(phone.to_string()),
                                ..Default::default()
                            },
                        )
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap().unwrap();
            }
        });

        let phone = f.query.get_venue(id).unwrap().phone.unwrap();
        assert!(phones.contains(&phone.as_str()));
    }

    #[test]
    fn deleting_artist_removes_its_shows() {
        let f = fixture();
        let venue_id = f.mutation.create_venue(fillmore()).unwrap().id;
        let artist_id = f.mutation.create_artist(petals()).unwrap().id;
        let other_artist = f
            .mutation
            .create_artist(NewArtist {
                name: "Matt Quevedo".to_string(),
                ..petals()
            })
            .unwrap()
            .id;
        for start_time in [at(2019, 5, 21, 21), at(2035, 4, 1, 20)] {
            f.mutation
                .create_show(NewShow {
                    venue_id,
                    artist_id,
                    start_time,
                })
                .unwrap();
        }
        f.mutation
            .create_show(NewShow {
                venue_id,
                artist_id: other_artist,
                start_time: at(2035, 4, 8, 20),
            })
            .unwrap();

        let deleted = f.mutation.delete_artist(artist_id).unwrap();

        assert_eq!(deleted.removed_shows, 2);
        assert_eq!(deleted.message, "Artist Guns N Petals was successfully deleted!");
        let shows = f.query.list_shows().unwrap();
        assert_eq!(shows.len(), 1);
        assert!(shows.iter().all(|s| s.artist_id != artist_id));
        assert!(f.store.get_artist_shows(artist_id).unwrap().is_empty());
    }

    #[test]
    fn deleting_venue_removes_its_shows() {
        let f = fixture();
        let venue_id = f.mutation.create_venue(fillmore()).unwrap().id;
        let artist_id = f.mutation.create_artist(petals()).unwrap().id;
        f.mutation
            .create_show(NewShow {
                venue_id,
                artist_id,
                start_time: at(2035, 4, 1, 20),
            })
            .unwrap();

        let deleted = f.mutation.delete_venue(venue_id).unwrap();

        assert_eq!(deleted.message, "Venue The Fillmore was successfully deleted!");
        assert_eq!(deleted.removed_shows, 1);
        assert!(f.query.list_shows().unwrap().is_empty());
        assert_eq!(f.query.get_artist_detail(artist_id).unwrap().past_shows_count, 0);
    }
}
