//! Query and mutation services over the directory store.

mod clock;
mod error;
mod mutation;
mod query;
mod timing;
mod views;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{DirectoryError, DirectoryResult};
pub use mutation::MutationService;
pub use query::QueryService;
pub use timing::{format_show_time, ShowTiming, SHOW_TIME_DISPLAY_FORMAT, SHOW_TIME_LISTING_FORMAT};
pub use views::{
    ArtistDetail, ArtistShowEntry, Created, Deleted, SearchResults, ShowListing, Updated,
    VenueArea, VenueDetail, VenueShowEntry,
};
