//! SQLite-backed directory store.
//!
//! One write connection serializes all mutations; reads are spread over a
//! small pool of read-only connections.

use super::models::*;
use super::schema::DIRECTORY_VERSIONED_SCHEMAS;
use super::trait_def::{DeletedEntity, DirectoryStore};
use super::validation::ValidationError;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

const VENUE_SHOWS_SQL: &str = "SELECT s.id, a.id, a.name, a.image_link, s.start_time
     FROM shows s
     INNER JOIN artists a ON a.id = s.artist_id
     WHERE s.venue_id = ?1
     ORDER BY s.start_time, s.id";

const ARTIST_SHOWS_SQL: &str = "SELECT s.id, v.id, v.name, v.image_link, s.start_time
     FROM shows s
     INNER JOIN venues v ON v.id = s.venue_id
     WHERE s.artist_id = ?1
     ORDER BY s.start_time, s.id";

const VENUE_COLUMNS: &str = "id, name, city, state, address, phone, website, facebook_link,
     image_link, seeking_talent, seeking_description";

const ARTIST_COLUMNS: &str = "id, name, city, state, phone, website, facebook_link,
     image_link, seeking_venue, seeking_description";

/// SQLite-backed store for venues, artists and shows.
#[derive(Clone)]
pub struct SqliteDirectoryStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| anyhow!("Directory database connection mutex poisoned"))
}

fn initialize_schema(conn: &Connection) -> Result<()> {
    let latest_version = DIRECTORY_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &DIRECTORY_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating directory db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    let expected_version = (BASE_DB_VERSION + latest_version) as i64;
    if db_version != expected_version {
        bail!(
            "Directory database is at version {}, expected {}",
            db_version,
            expected_version
        );
    }
    latest_schema.validate(conn)
}

fn get_naive_datetime(row: &Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let text = row.get_ref(idx)?.as_str()?;

    NaiveDateTime::parse_from_str(text, START_TIME_DB_FORMAT).map_err(|err| {
        let ty = rusqlite::types::Type::Text;
        rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(err))
    })
}

fn name_matches(name: &str, term: &str) -> bool {
    name.to_lowercase().contains(&term.to_lowercase())
}

impl SqliteDirectoryStore {
    /// Open (or create) the directory database.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `read_pool_size` - Number of read-only connections (at least one is opened)
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let write_conn = Connection::open_with_flags(
            db_path_ref,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open directory database at {:?}", db_path_ref))?;

        write_conn.pragma_update(None, "foreign_keys", "ON")?;
        initialize_schema(&write_conn)?;
        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        let read_pool_size = read_pool_size.max(1);
        let mut read_pool = Vec::with_capacity(read_pool_size);
        for _ in 0..read_pool_size {
            let read_conn = Connection::open_with_flags(
                db_path_ref,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        let store = SqliteDirectoryStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        };

        let counts = store.get_counts()?;
        info!(
            "Opened directory: {} venues, {} artists, {} shows",
            counts.venues, counts.artists, counts.shows
        );

        Ok(store)
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    /// Run `body` inside `BEGIN IMMEDIATE ... COMMIT` on the write connection.
    ///
    /// Any error from the body or from the commit rolls the transaction back.
    /// The connection lock is released when this returns, on every path.
    fn with_write_transaction<T>(
        &self,
        body: impl FnOnce(&Connection) -> Result<T>,
    ) -> Result<T> {
        let conn = lock(&self.write_conn)?;
        conn.execute("BEGIN IMMEDIATE", [])?;

        let result = body(&conn).and_then(|value| {
            conn.execute("COMMIT", [])?;
            Ok(value)
        });

        if let Err(e) = &result {
            warn!("Rolling back directory transaction: {}", e);
            let _ = conn.execute("ROLLBACK", []);
        }
        result
    }

    /// Runs `body` inside a deferred transaction on one pooled read
    /// connection, so every statement sees the same snapshot.
    fn with_read_snapshot<T>(&self, body: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;
        conn.execute("BEGIN", [])?;

        let result = body(&conn);
        let end = if result.is_ok() { "COMMIT" } else { "ROLLBACK" };
        if let Err(e) = conn.execute(end, []) {
            warn!("Failed to end read snapshot: {}", e);
        }
        result
    }

    // =========================================================================
    // Internal Helper Methods
    // =========================================================================

    fn get_genres(conn: &Connection, sql: &str, owner_id: i64) -> Result<Vec<String>> {
        let mut stmt = conn.prepare_cached(sql)?;
        let genres = stmt
            .query_map(params![owner_id], |r| r.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(genres)
    }

    fn replace_genres(
        conn: &Connection,
        delete_sql: &str,
        insert_sql: &str,
        owner_id: i64,
        genres: &[String],
    ) -> Result<()> {
        conn.execute(delete_sql, params![owner_id])?;
        let mut stmt = conn.prepare_cached(insert_sql)?;
        for genre in genres {
            stmt.execute(params![owner_id, genre])?;
        }
        Ok(())
    }

    fn exists(conn: &Connection, sql: &str, id: i64) -> Result<bool> {
        Ok(conn.query_row(sql, params![id], |r| r.get(0))?)
    }

    /// Parse a Venue from a row selected with `VENUE_COLUMNS`.
    fn parse_venue_row(row: &Row) -> rusqlite::Result<Venue> {
        Ok(Venue {
            id: row.get(0)?,
            name: row.get(1)?,
            city: row.get(2)?,
            state: row.get(3)?,
            address: row.get(4)?,
            phone: row.get(5)?,
            genres: Vec::new(),
            website: row.get(6)?,
            facebook_link: row.get(7)?,
            image_link: row.get(8)?,
            seeking_talent: row.get::<_, i32>(9)? != 0,
            seeking_description: row.get(10)?,
        })
    }

    /// Parse an Artist from a row selected with `ARTIST_COLUMNS`.
    fn parse_artist_row(row: &Row) -> rusqlite::Result<Artist> {
        Ok(Artist {
            id: row.get(0)?,
            name: row.get(1)?,
            city: row.get(2)?,
            state: row.get(3)?,
            phone: row.get(4)?,
            genres: Vec::new(),
            website: row.get(5)?,
            facebook_link: row.get(6)?,
            image_link: row.get(7)?,
            seeking_venue: row.get::<_, i32>(8)? != 0,
            seeking_description: row.get(9)?,
        })
    }

    fn parse_counterpart_row(row: &Row) -> rusqlite::Result<ShowCounterpart> {
        Ok(ShowCounterpart {
            show_id: row.get(0)?,
            counterpart_id: row.get(1)?,
            counterpart_name: row.get(2)?,
            counterpart_image_link: row.get(3)?,
            start_time: get_naive_datetime(row, 4)?,
        })
    }

    fn get_venue_inner(conn: &Connection, id: i64) -> Result<Option<Venue>> {
        let mut stmt =
            conn.prepare_cached(&format!("SELECT {} FROM venues WHERE id = ?1", VENUE_COLUMNS))?;
        let mut venue = match stmt.query_row(params![id], Self::parse_venue_row) {
            Ok(venue) => venue,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        venue.genres = Self::get_genres(
            conn,
            "SELECT genre FROM venue_genres WHERE venue_id = ?1 ORDER BY rowid",
            id,
        )?;
        Ok(Some(venue))
    }

    fn get_artist_inner(conn: &Connection, id: i64) -> Result<Option<Artist>> {
        let mut stmt = conn
            .prepare_cached(&format!("SELECT {} FROM artists WHERE id = ?1", ARTIST_COLUMNS))?;
        let mut artist = match stmt.query_row(params![id], Self::parse_artist_row) {
            Ok(artist) => artist,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        artist.genres = Self::get_genres(
            conn,
            "SELECT genre FROM artist_genres WHERE artist_id = ?1 ORDER BY rowid",
            id,
        )?;
        Ok(Some(artist))
    }

    fn search_names(&self, sql: &str, term: &str) -> Result<Vec<EntitySummary>> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;

        let mut stmt = conn.prepare_cached(sql)?;
        let summaries = stmt
            .query_map([], |row| {
                Ok(EntitySummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(summaries
            .into_iter()
            .filter(|summary| name_matches(&summary.name, term))
            .collect())
    }

    fn get_counterparts(&self, sql: &str, owner_id: i64) -> Result<Vec<ShowCounterpart>> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;
        Self::get_counterparts_inner(&conn, sql, owner_id)
    }

    fn get_counterparts_inner(
        conn: &Connection,
        sql: &str,
        owner_id: i64,
    ) -> Result<Vec<ShowCounterpart>> {
        let mut stmt = conn.prepare_cached(sql)?;
        let shows = stmt
            .query_map(params![owner_id], Self::parse_counterpart_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(shows)
    }

    fn count(conn: &Connection, table: &str) -> Result<usize> {
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
        Ok(count as usize)
    }
}

impl DirectoryStore for SqliteDirectoryStore {
    // =========================================================================
    // Venues
    // =========================================================================

    fn get_venue(&self, id: i64) -> Result<Option<Venue>> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;
        Self::get_venue_inner(&conn, id)
    }

    fn list_venue_locations(&self) -> Result<Vec<VenueLocation>> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;

        let mut stmt = conn
            .prepare_cached("SELECT id, name, city, state FROM venues ORDER BY state, city, id")?;
        let locations = stmt
            .query_map([], |row| {
                Ok(VenueLocation {
                    venue: EntitySummary {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    },
                    city: row.get(2)?,
                    state: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(locations)
    }

    fn search_venues(&self, term: &str) -> Result<Vec<EntitySummary>> {
        self.search_names("SELECT id, name FROM venues ORDER BY id", term)
    }

    fn get_venue_shows(&self, venue_id: i64) -> Result<Vec<ShowCounterpart>> {
        self.get_counterparts(VENUE_SHOWS_SQL, venue_id)
    }

    fn get_venue_with_shows(&self, id: i64) -> Result<Option<(Venue, Vec<ShowCounterpart>)>> {
        self.with_read_snapshot(|conn| {
            let Some(venue) = Self::get_venue_inner(conn, id)? else {
                return Ok(None);
            };
            let shows = Self::get_counterparts_inner(conn, VENUE_SHOWS_SQL, id)?;
            Ok(Some((venue, shows)))
        })
    }

    fn insert_venue(&self, venue: &NewVenue) -> Result<i64> {
        self.with_write_transaction(|conn| {
            conn.execute(
                "INSERT INTO venues (name, city, state, address, phone, website, facebook_link,
                                     image_link, seeking_talent, seeking_description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    &venue.name,
                    &venue.city,
                    &venue.state,
                    &venue.address,
                    &venue.phone,
                    &venue.website,
                    &venue.facebook_link,
                    &venue.image_link,
                    venue.seeking_talent,
                    &venue.seeking_description,
                ],
            )?;
            let id = conn.last_insert_rowid();

            Self::replace_genres(
                conn,
                "DELETE FROM venue_genres WHERE venue_id = ?1",
                "INSERT INTO venue_genres (venue_id, genre) VALUES (?1, ?2)",
                id,
                &venue.genres,
            )?;
            debug!("Inserted venue {} ({})", id, venue.name);
            Ok(id)
        })
    }

    fn update_venue(&self, id: i64, update: VenueUpdate) -> Result<Option<Venue>> {
        self.with_write_transaction(|conn| {
            let mut venue = match Self::get_venue_inner(conn, id)? {
                Some(venue) => venue,
                None => return Ok(None),
            };
            update.apply_to(&mut venue);

            conn.execute(
                "UPDATE venues SET name = ?1, city = ?2, state = ?3, address = ?4, phone = ?5,
                        website = ?6, facebook_link = ?7, image_link = ?8, seeking_talent = ?9,
                        seeking_description = ?10
                 WHERE id = ?11",
                params![
                    &venue.name,
                    &venue.city,
                    &venue.state,
                    &venue.address,
                    &venue.phone,
                    &venue.website,
                    &venue.facebook_link,
                    &venue.image_link,
                    venue.seeking_talent,
                    &venue.seeking_description,
                    id,
                ],
            )?;
            Self::replace_genres(
                conn,
                "DELETE FROM venue_genres WHERE venue_id = ?1",
                "INSERT INTO venue_genres (venue_id, genre) VALUES (?1, ?2)",
                id,
                &venue.genres,
            )?;
            Ok(Some(venue))
        })
    }

    fn delete_venue(&self, id: i64) -> Result<Option<DeletedEntity>> {
        self.with_write_transaction(|conn| {
            let name: String = match conn.query_row(
                "SELECT name FROM venues WHERE id = ?1",
                params![id],
                |r| r.get(0),
            ) {
                Ok(name) => name,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            let removed_shows = conn.execute("DELETE FROM shows WHERE venue_id = ?1", params![id])?;
            conn.execute("DELETE FROM venue_genres WHERE venue_id = ?1", params![id])?;
            conn.execute("DELETE FROM venues WHERE id = ?1", params![id])?;
            Ok(Some(DeletedEntity {
                name,
                removed_shows,
            }))
        })
    }

    // =========================================================================
    // Artists
    // =========================================================================

    fn get_artist(&self, id: i64) -> Result<Option<Artist>> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;
        Self::get_artist_inner(&conn, id)
    }

    fn list_artists(&self) -> Result<Vec<EntitySummary>> {
        self.search_names("SELECT id, name FROM artists ORDER BY id", "")
    }

    fn search_artists(&self, term: &str) -> Result<Vec<EntitySummary>> {
        self.search_names("SELECT id, name FROM artists ORDER BY id", term)
    }

    fn get_artist_shows(&self, artist_id: i64) -> Result<Vec<ShowCounterpart>> {
        self.get_counterparts(ARTIST_SHOWS_SQL, artist_id)
    }

    fn get_artist_with_shows(&self, id: i64) -> Result<Option<(Artist, Vec<ShowCounterpart>)>> {
        self.with_read_snapshot(|conn| {
            let Some(artist) = Self::get_artist_inner(conn, id)? else {
                return Ok(None);
            };
            let shows = Self::get_counterparts_inner(conn, ARTIST_SHOWS_SQL, id)?;
            Ok(Some((artist, shows)))
        })
    }

    fn insert_artist(&self, artist: &NewArtist) -> Result<i64> {
        self.with_write_transaction(|conn| {
            conn.execute(
                "INSERT INTO artists (name, city, state, phone, website, facebook_link,
                                      image_link, seeking_venue, seeking_description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    &artist.name,
                    &artist.city,
                    &artist.state,
                    &artist.phone,
                    &artist.website,
                    &artist.facebook_link,
                    &artist.image_link,
                    artist.seeking_venue,
                    &artist.seeking_description,
                ],
            )?;
            let id = conn.last_insert_rowid();

            Self::replace_genres(
                conn,
                "DELETE FROM artist_genres WHERE artist_id = ?1",
                "INSERT INTO artist_genres (artist_id, genre) VALUES (?1, ?2)",
                id,
                &artist.genres,
            )?;
            debug!("Inserted artist {} ({})", id, artist.name);
            Ok(id)
        })
    }

    fn update_artist(&self, id: i64, update: ArtistUpdate) -> Result<Option<Artist>> {
        self.with_write_transaction(|conn| {
            let mut artist = match Self::get_artist_inner(conn, id)? {
                Some(artist) => artist,
                None => return Ok(None),
            };
            update.apply_to(&mut artist);

            conn.execute(
                "UPDATE artists SET name = ?1, city = ?2, state = ?3, phone = ?4, website = ?5,
                        facebook_link = ?6, image_link = ?7, seeking_venue = ?8,
                        seeking_description = ?9
                 WHERE id = ?10",
                params![
                    &artist.name,
                    &artist.city,
                    &artist.state,
                    &artist.phone,
                    &artist.website,
                    &artist.facebook_link,
                    &artist.image_link,
                    artist.seeking_venue,
                    &artist.seeking_description,
                    id,
                ],
            )?;
            Self::replace_genres(
                conn,
                "DELETE FROM artist_genres WHERE artist_id = ?1",
                "INSERT INTO artist_genres (artist_id, genre) VALUES (?1, ?2)",
                id,
                &artist.genres,
            )?;
            Ok(Some(artist))
        })
    }

    fn delete_artist(&self, id: i64) -> Result<Option<DeletedEntity>> {
        self.with_write_transaction(|conn| {
            let name: String = match conn.query_row(
                "SELECT name FROM artists WHERE id = ?1",
                params![id],
                |r| r.get(0),
            ) {
                Ok(name) => name,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            let removed_shows =
                conn.execute("DELETE FROM shows WHERE artist_id = ?1", params![id])?;
            conn.execute("DELETE FROM artist_genres WHERE artist_id = ?1", params![id])?;
            conn.execute("DELETE FROM artists WHERE id = ?1", params![id])?;
            Ok(Some(DeletedEntity {
                name,
                removed_shows,
            }))
        })
    }

    // =========================================================================
    // Shows
    // =========================================================================

    fn insert_show(&self, show: &NewShow) -> Result<i64> {
        self.with_write_transaction(|conn| {
            if !Self::exists(
                conn,
                "SELECT EXISTS(SELECT 1 FROM venues WHERE id = ?1)",
                show.venue_id,
            )? {
                return Err(ValidationError::ForeignKeyViolation {
                    entity_type: "venue",
                    id: show.venue_id,
                }
                .into());
            }
            if !Self::exists(
                conn,
                "SELECT EXISTS(SELECT 1 FROM artists WHERE id = ?1)",
                show.artist_id,
            )? {
                return Err(ValidationError::ForeignKeyViolation {
                    entity_type: "artist",
                    id: show.artist_id,
                }
                .into());
            }

            conn.execute(
                "INSERT INTO shows (venue_id, artist_id, start_time) VALUES (?1, ?2, ?3)",
                params![
                    show.venue_id,
                    show.artist_id,
                    show.start_time.format(START_TIME_DB_FORMAT).to_string()
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn list_shows(&self) -> Result<Vec<ShowRecord>> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;

        let mut stmt = conn.prepare_cached(
            "SELECT s.id, v.id, v.name, a.id, a.name, a.image_link, s.start_time
             FROM shows s
             INNER JOIN venues v ON v.id = s.venue_id
             INNER JOIN artists a ON a.id = s.artist_id
             ORDER BY s.id",
        )?;
        let shows = stmt
            .query_map([], |row| {
                Ok(ShowRecord {
                    show_id: row.get(0)?,
                    venue_id: row.get(1)?,
                    venue_name: row.get(2)?,
                    artist_id: row.get(3)?,
                    artist_name: row.get(4)?,
                    artist_image_link: row.get(5)?,
                    start_time: get_naive_datetime(row, 6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(shows)
    }

    // =========================================================================
    // Counts
    // =========================================================================

    fn get_counts(&self) -> Result<DirectoryCounts> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;
        Ok(DirectoryCounts {
            venues: Self::count(&conn, "venues")?,
            artists: Self::count(&conn, "artists")?,
            shows: Self::count(&conn, "shows")?,
        })
    }
}
