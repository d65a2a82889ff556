mod models;
mod schema;
mod store;
mod trait_def;
mod validation;

pub use models::*;
pub use schema::DIRECTORY_VERSIONED_SCHEMAS;
pub use store::SqliteDirectoryStore;
pub use trait_def::{DeletedEntity, DirectoryStore};
pub use validation::{
    normalize_genres, parse_start_time, validate_artist_update, validate_new_artist,
    validate_new_show, validate_new_venue, validate_venue_update, ValidationError,
    ValidationResult,
};
