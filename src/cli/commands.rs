pub mod initdb;
pub mod scrape;
pub mod serve;

pub use initdb::init_database;
pub use scrape::{ingest_events, run_ingest};
pub use serve::serve;
