//! Shared constants for end-to-end tests
//!
//! When the seeded directory changes, update only this file.

// ============================================================================
// Seeded Venues
// ============================================================================

pub const VENUE_1_ID: i64 = 1;
pub const VENUE_1_NAME: &str = "The Musical Hop";

pub const VENUE_2_ID: i64 = 2;
pub const VENUE_2_NAME: &str = "The Dueling Pianos Bar";

pub const VENUE_3_ID: i64 = 3;
pub const VENUE_3_NAME: &str = "Park Square Live Music & Coffee";

// ============================================================================
// Seeded Artists
// ============================================================================

pub const ARTIST_1_ID: i64 = 1;
pub const ARTIST_1_NAME: &str = "Guns N Petals";

pub const ARTIST_2_ID: i64 = 2;
pub const ARTIST_2_NAME: &str = "Matt Quevedo";

pub const ARTIST_3_ID: i64 = 3;
pub const ARTIST_3_NAME: &str = "The Wild Sax Band";

/// Number of shows in the seeded directory
pub const SEEDED_SHOWS_COUNT: usize = 5;

/// The server's clock is pinned here; seeded shows fall on both sides of it.
pub const TEST_NOW: &str = "2025-01-01 00:00:00";

/// A venue/artist id that is never seeded
pub const MISSING_ID: i64 = 999999;

// ============================================================================
// Timeouts
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
