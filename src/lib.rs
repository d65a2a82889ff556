//! Venue Directory Library
//!
//! Venues, artists and the shows that connect them, stored in SQLite and
//! served over a small JSON API.

pub mod config;
pub mod directory_store;
pub mod server;
pub mod services;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use directory_store::{DirectoryStore, SqliteDirectoryStore};
pub use server::{run_server, RequestsLoggingLevel};
pub use services::{DirectoryError, MutationService, QueryService, SystemClock};
