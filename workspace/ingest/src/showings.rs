use chrono::{DateTime, FixedOffset};
use model::entities::event;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::page::{EventPage, event_links, parse_event_page};
use crate::runtime::{end_times, parse_runtime};

/// One scheduled showing of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Showing {
    pub name: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// One showing per listed start, ends computed from the page's runtime.
///
/// A page that lists no starts yields nothing, whatever its runtime says.
pub fn showings_for_page(page: &EventPage) -> Result<Vec<Showing>> {
    if page.starts.is_empty() {
        debug!("'{}' lists no showings", page.name);
        return Ok(Vec::new());
    }

    let runtime = parse_runtime(&page.runtime)?;
    let ends = end_times(&page.starts, runtime);

    Ok(page
        .starts
        .iter()
        .zip(ends)
        .map(|(start, end)| Showing {
            name: page.name.clone(),
            start: *start,
            end,
        })
        .collect())
}

/// Where events are scraped from and how they are stamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSource {
    pub archive_url: String,
    /// Location recorded on every scraped event.
    pub location: String,
    /// Offset for start times the pages print without one.
    pub utc_offset: FixedOffset,
}

/// Walks the archive listing and every linked detail page, in order.
#[instrument(skip(fetcher))]
pub async fn collect_showings<F>(
    fetcher: &F,
    archive_url: &str,
    utc_offset: FixedOffset,
) -> Result<Vec<Showing>>
where
    F: PageFetcher + ?Sized,
{
    let archive = fetcher.fetch(archive_url).await?;
    let links = event_links(&archive, archive_url)?;
    info!("Archive lists {} events", links.len());

    let mut showings = Vec::new();
    for link in links {
        let html = fetcher.fetch(link.as_str()).await?;
        let page = parse_event_page(&html, link.as_str(), utc_offset)?;
        showings.extend(showings_for_page(&page)?);
    }

    Ok(showings)
}

/// Inserts one event per showing in a single transaction.
#[instrument(skip(db, showings), fields(count = showings.len()))]
pub async fn store_showings(
    db: &DatabaseConnection,
    showings: &[Showing],
    location: &str,
) -> Result<Vec<event::Model>> {
    let txn = db.begin().await?;

    let mut events = Vec::with_capacity(showings.len());
    for showing in showings {
        let model = event::ActiveModel {
            name: Set(showing.name.clone()),
            location: Set(location.to_string()),
            start: Set(showing.start),
            end: Set(showing.end),
            host_id: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        events.push(model);
    }

    txn.commit().await?;
    Ok(events)
}

/// Scrapes the archive and seeds the event table.
pub async fn ingest<F>(
    db: &DatabaseConnection,
    fetcher: &F,
    source: &ArchiveSource,
) -> Result<Vec<event::Model>>
where
    F: PageFetcher + ?Sized,
{
    info!("Ingesting events from {}", source.archive_url);
    let showings = collect_showings(fetcher, &source.archive_url, source.utc_offset).await?;
    let events = store_showings(db, &showings, &source.location).await?;
    info!("Stored {} events from {}", events.len(), source.archive_url);
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use crate::runtime::RuntimeError;
    use async_trait::async_trait;
    use migration::{Migrator, MigratorTrait};
    use model::entities::prelude::Event;
    use sea_orm::{Database, EntityTrait};
    use std::collections::HashMap;
    use std::sync::Mutex;

    const ARCHIVE_URL: &str = "https://cinema.example.edu/film-archive/spring-2022";

    /// Serves canned pages and records the order they were requested in.
    struct StubFetcher {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn new(pages: &[(&str, String)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.clone()))
                    .collect(),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| IngestError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    fn eastern() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    fn source(location: &str) -> ArchiveSource {
        ArchiveSource {
            archive_url: ARCHIVE_URL.to_string(),
            location: location.to_string(),
            utc_offset: eastern(),
        }
    }

    fn at(value: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(value).unwrap()
    }

    fn detail(title: &str, runtime: &str, starts: &[&str]) -> String {
        let spans: String = starts
            .iter()
            .map(|start| format!(r#"<span class="date-display-single" content="{}">x</span>"#, start))
            .collect();
        format!(
            r#"<h1 class="pageTitle">{}</h1><h3 class="field-label">Runtime</h3>{}<div>{}</div>"#,
            title, runtime, spans
        )
    }

    fn archive(paths: &[&str]) -> String {
        paths
            .iter()
            .map(|path| format!(r#"<article class="card card--event"><a href="{}">x</a></article>"#, path))
            .collect()
    }

    #[test]
    fn test_one_showing_per_start() {
        let page = EventPage {
            name: "Alien".to_string(),
            starts: vec![
                at("2022-02-04T19:00:00-05:00"),
                at("2022-02-05T21:30:00-05:00"),
                at("2022-02-06T15:00:00-05:00"),
            ],
            runtime: "1h 57m".to_string(),
        };

        let showings = showings_for_page(&page).unwrap();
        assert_eq!(showings.len(), 3);
        for (showing, start) in showings.iter().zip(&page.starts) {
            assert_eq!(showing.name, "Alien");
            assert_eq!(showing.start, *start);
            assert_eq!(showing.end, *start + chrono::TimeDelta::minutes(117));
        }
    }

    #[test]
    fn test_no_starts_no_showings() {
        let page = EventPage {
            name: "Cancelled".to_string(),
            starts: Vec::new(),
            runtime: "about an hour".to_string(),
        };
        assert!(showings_for_page(&page).unwrap().is_empty());
    }

    #[test]
    fn test_bad_runtime_is_fatal() {
        let page = EventPage {
            name: "Mystery".to_string(),
            starts: vec![at("2022-02-04T19:00:00-05:00")],
            runtime: "about an hour".to_string(),
        };
        let err = showings_for_page(&page).unwrap_err();
        assert!(matches!(err, IngestError::Runtime(RuntimeError::MissingValue { .. })));
    }

    #[tokio::test]
    async fn test_collect_showings_in_archive_order() {
        let fetcher = StubFetcher::new(&[
            (ARCHIVE_URL, archive(&["/film/dune", "/film/alien"])),
            (
                "https://cinema.example.edu/film/dune",
                detail("Dune", "2 hr 35 min", &["2022-02-04T19:00:00-05:00"]),
            ),
            (
                "https://cinema.example.edu/film/alien",
                detail(
                    "Alien",
                    "50m",
                    &["2022-02-05T21:30:00-05:00", "2022-02-06T15:00:00-05:00"],
                ),
            ),
        ]);

        let showings = collect_showings(&fetcher, ARCHIVE_URL, eastern()).await.unwrap();
        assert_eq!(
            showings,
            vec![
                Showing {
                    name: "Dune".to_string(),
                    start: at("2022-02-04T19:00:00-05:00"),
                    end: at("2022-02-04T21:35:00-05:00"),
                },
                Showing {
                    name: "Alien".to_string(),
                    start: at("2022-02-05T21:30:00-05:00"),
                    end: at("2022-02-05T22:20:00-05:00"),
                },
                Showing {
                    name: "Alien".to_string(),
                    start: at("2022-02-06T15:00:00-05:00"),
                    end: at("2022-02-06T15:50:00-05:00"),
                },
            ]
        );
        assert_eq!(
            *fetcher.requested.lock().unwrap(),
            vec![
                ARCHIVE_URL.to_string(),
                "https://cinema.example.edu/film/dune".to_string(),
                "https://cinema.example.edu/film/alien".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts() {
        let fetcher = StubFetcher::new(&[(ARCHIVE_URL, archive(&["/film/missing"]))]);
        let err = collect_showings(&fetcher, ARCHIVE_URL, eastern()).await.unwrap_err();
        assert!(matches!(err, IngestError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_ingest_stores_events() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let fetcher = StubFetcher::new(&[
            (ARCHIVE_URL, archive(&["/film/dune"])),
            (
                "https://cinema.example.edu/film/dune",
                detail(
                    "Dune",
                    "2h",
                    &["2022-02-04T19:00:00-05:00", "2022-02-05T19:00:00-05:00"],
                ),
            ),
        ]);

        let events = ingest(&db, &fetcher, &source("Willard Straight Theatre"))
            .await
            .unwrap();
        assert_eq!(events.len(), 2);
        assert_ne!(events[0].id, events[1].id);

        let stored = Event::find().all(&db).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|e| e.name == "Dune"));
        assert!(stored.iter().all(|e| e.location == "Willard Straight Theatre"));
        assert!(stored.iter().all(|e| e.host_id.is_none()));
        assert!(stored.iter().all(|e| e.end - e.start == chrono::TimeDelta::hours(2)));
    }

    #[tokio::test]
    async fn test_failed_ingest_stores_nothing() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let fetcher = StubFetcher::new(&[
            (ARCHIVE_URL, archive(&["/film/dune", "/film/broken"])),
            (
                "https://cinema.example.edu/film/dune",
                detail("Dune", "2h", &["2022-02-04T19:00:00-05:00"]),
            ),
            (
                "https://cinema.example.edu/film/broken",
                detail("Broken", "some minutes", &["2022-02-04T19:00:00-05:00"]),
            ),
        ]);

        assert!(ingest(&db, &fetcher, &source("Anywhere")).await.is_err());
        assert!(Event::find().all(&db).await.unwrap().is_empty());
    }
}
