//! Seeds the event catalog from a cinema's film archive.
//!
//! The flow is strictly sequential: fetch the archive listing, fetch every
//! linked detail page, turn each listed showing into a `(name, start, end)`
//! triple and insert them as events. Any failure aborts the whole run.

pub mod error;
pub mod fetch;
pub mod page;
pub mod runtime;
pub mod showings;

pub use error::{IngestError, Result};
pub use fetch::{HttpFetcher, PageFetcher};
pub use runtime::{Runtime, RuntimeError, parse_runtime};
pub use showings::{ArchiveSource, Showing, collect_showings, ingest, showings_for_page, store_showings};

/// Archive listing scraped when no other URL is configured.
pub const DEFAULT_ARCHIVE_URL: &str = "https://cinema.cornell.edu/film-archive/spring-2022";

/// Location recorded on scraped events; detail pages do not carry one.
pub const DEFAULT_LOCATION: &str = "Cornell Cinema";

/// Offset given to start times printed without one (US Eastern standard time).
pub const DEFAULT_UTC_OFFSET: &str = "-05:00";
