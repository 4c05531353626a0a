use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod commands;

use crate::config::{DEFAULT_BIND_ADDRESS, DEFAULT_DATABASE_URL};
use ::ingest::ArchiveSource;
use chrono::FixedOffset;
use commands::{ingest_events, init_database, serve};

#[derive(Parser)]
#[command(name = "cinetrack")]
#[command(about = "Campus movie and event tracker API with an event archive scraper")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where scraped events come from and where they take place.
#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
    /// Archive listing page whose event cards are scraped
    #[arg(long, env = "ARCHIVE_URL", default_value = ingest::DEFAULT_ARCHIVE_URL)]
    pub archive_url: String,

    /// Location recorded on every scraped event
    #[arg(long, env = "EVENT_LOCATION", default_value = ingest::DEFAULT_LOCATION)]
    pub location: String,

    /// UTC offset for start times the archive prints without one (e.g. -05:00)
    #[arg(
        long,
        env = "EVENT_UTC_OFFSET",
        default_value = ingest::DEFAULT_UTC_OFFSET,
        allow_hyphen_values = true
    )]
    pub utc_offset: FixedOffset,
}

impl From<SourceArgs> for ArchiveSource {
    fn from(args: SourceArgs) -> Self {
        Self {
            archive_url: args.archive_url,
            location: args.location,
            utc_offset: args.utc_offset,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Database URL
        ///
        /// For SQLite databases, use:
        ///   - sqlite://relative/path.db?mode=rwc (created if missing)
        ///   - sqlite:///absolute/path/to/database.sqlite (absolute path)
        #[arg(short, long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
        database_url: String,

        /// Bind address for the web server
        ///
        /// Format: IP:PORT (e.g., 0.0.0.0:5000, 127.0.0.1:8080)
        #[arg(short, long, env = "BIND_ADDRESS", default_value = DEFAULT_BIND_ADDRESS)]
        bind_address: String,

        /// Scrape the event archive before accepting requests.
        /// A failed scrape stops the server from starting.
        #[arg(long, env = "INGEST_ON_STARTUP")]
        ingest: bool,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Initialize the database using migrations
    InitDb {
        /// Database URL
        #[arg(short, long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
        database_url: String,
    },
    /// Scrape the event archive into the database once and exit
    Ingest {
        /// Database URL
        #[arg(short, long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
        database_url: String,

        #[command(flatten)]
        source: SourceArgs,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve {
                database_url,
                bind_address,
                ingest,
                source,
            } => {
                let seed = ingest.then(|| ArchiveSource::from(source));
                serve(&database_url, &bind_address, seed.as_ref()).await?;
            }
            Commands::InitDb { database_url } => {
                init_database(&database_url).await?;
            }
            Commands::Ingest {
                database_url,
                source,
            } => {
                ingest_events(&database_url, &ArchiveSource::from(source)).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["cinetrack", "serve"]).unwrap();
        match cli.command {
            Commands::Serve {
                ingest: on_startup,
                source,
                ..
            } => {
                assert!(!on_startup);
                assert_eq!(source.archive_url, ingest::DEFAULT_ARCHIVE_URL);
                assert_eq!(source.location, ingest::DEFAULT_LOCATION);
                assert_eq!(source.utc_offset, FixedOffset::west_opt(5 * 3600).unwrap());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_ingest_arguments() {
        let cli = Cli::try_parse_from([
            "cinetrack",
            "ingest",
            "--database-url",
            "sqlite::memory:",
            "--archive-url",
            "https://example.edu/archive",
            "--location",
            "Room 101",
            "--utc-offset",
            "-04:00",
        ])
        .unwrap();
        match cli.command {
            Commands::Ingest {
                database_url,
                source,
            } => {
                assert_eq!(database_url, "sqlite::memory:");
                assert_eq!(source.archive_url, "https://example.edu/archive");
                assert_eq!(source.location, "Room 101");
                assert_eq!(source.utc_offset, FixedOffset::west_opt(4 * 3600).unwrap());
            }
            _ => panic!("expected ingest"),
        }
    }
}
