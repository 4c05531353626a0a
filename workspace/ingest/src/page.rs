//! Extraction of the few HTML fragments the archive and detail pages carry.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

use crate::error::{IngestError, Result};

static ARTICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<article\b([^>]*)>(.*?)</article>").unwrap());

static ANCHOR_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*["']([^"']*)["']"#).unwrap());

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1\b([^>]*)>(.*?)</h1>").unwrap());

static SPAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<span\b([^>]*)>").unwrap());

static RUNTIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<h3\b([^>]*)>\s*Runtime:?\s*</h3>([^<]*)").unwrap()
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

static CLASS_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| attribute_regex("class"));

static CONTENT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| attribute_regex("content"));

const EVENT_CARD_CLASSES: &[&str] = &["card", "card--event"];
const TITLE_CLASS: &str = "pageTitle";
const START_CLASS: &str = "date-display-single";
const RUNTIME_LABEL_CLASS: &str = "field-label";
const NAIVE_START_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// What a single event detail page lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPage {
    pub name: String,
    /// Every scheduled showing, in document order.
    pub starts: Vec<DateTime<FixedOffset>>,
    /// Raw runtime text; empty when the page has no runtime field.
    pub runtime: String,
}

/// Detail page links of every event card on an archive page, resolved
/// against `base`.
pub fn event_links(archive_html: &str, base: &str) -> Result<Vec<Url>> {
    let base_url = Url::parse(base).map_err(|source| IngestError::Url {
        url: base.to_string(),
        source,
    })?;

    let mut links = Vec::new();
    for card in ARTICLE_RE.captures_iter(archive_html) {
        if !has_classes(&card[1], EVENT_CARD_CLASSES) {
            continue;
        }
        let Some(href) = ANCHOR_HREF_RE.captures(&card[2]) else {
            warn!("Event card without a link on {}", base);
            continue;
        };
        let href = decode_entities(&href[1]);
        let link = base_url.join(&href).map_err(|source| IngestError::Url {
            url: href.clone(),
            source,
        })?;
        links.push(link);
    }

    debug!("Found {} event links on {}", links.len(), base);
    Ok(links)
}

/// Parses an event detail page. `page` names the page in errors.
///
/// Start times printed without an offset are read as local times at
/// `utc_offset`.
pub fn parse_event_page(html: &str, page: &str, utc_offset: FixedOffset) -> Result<EventPage> {
    let name = TITLE_RE
        .captures_iter(html)
        .find(|title| has_classes(&title[1], &[TITLE_CLASS]))
        .map(|title| text_content(&title[2]))
        .ok_or_else(|| IngestError::MissingField {
            field: "title",
            page: page.to_string(),
        })?;

    let mut starts = Vec::new();
    for span in SPAN_RE.captures_iter(html) {
        let attrs = &span[1];
        if !has_classes(attrs, &[START_CLASS]) {
            continue;
        }
        let Some(content) = attribute(attrs, &CONTENT_ATTR_RE) else {
            warn!("Start date without content attribute on {}", page);
            continue;
        };
        let start = parse_start(content.trim(), utc_offset).map_err(|source| {
            IngestError::Timestamp {
                value: content.clone(),
                page: page.to_string(),
                source,
            }
        })?;
        starts.push(start);
    }

    let runtime = RUNTIME_RE
        .captures_iter(html)
        .find(|label| has_classes(&label[1], &[RUNTIME_LABEL_CLASS]))
        .map(|label| decode_entities(label[2].trim()))
        .unwrap_or_default();

    debug!(
        "Parsed '{}' with {} showings and runtime '{}'",
        name,
        starts.len(),
        runtime
    );
    Ok(EventPage {
        name,
        starts,
        runtime,
    })
}

/// RFC 3339 first, then the ISO-8601 forms that carry no offset.
fn parse_start(
    value: &str,
    utc_offset: FixedOffset,
) -> std::result::Result<DateTime<FixedOffset>, chrono::ParseError> {
    let rfc3339_error = match DateTime::parse_from_rfc3339(value) {
        Ok(start) => return Ok(start),
        Err(e) => e,
    };

    NAIVE_START_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .and_then(|naive| naive.and_local_timezone(utc_offset).single())
        .ok_or(rfc3339_error)
}

fn attribute_regex(name: &str) -> Regex {
    let pattern = format!(r#"(?i)(?:^|\s){}\s*=\s*(?:"([^"]*)"|'([^']*)')"#, regex::escape(name));
    Regex::new(&pattern).unwrap()
}

/// Value of the attribute matched by `re` inside the text of an opening tag.
fn attribute(attrs: &str, re: &Regex) -> Option<String> {
    let captures = re.captures(attrs)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|value| decode_entities(value.as_str()))
}

fn has_classes(attrs: &str, wanted: &[&str]) -> bool {
    attribute(attrs, &CLASS_ATTR_RE).is_some_and(|classes| {
        let present: Vec<&str> = classes.split_whitespace().collect();
        wanted.iter().all(|class| present.contains(class))
    })
}

fn text_content(fragment: &str) -> String {
    let text = TAG_RE.replace_all(fragment, "");
    decode_entities(text.trim())
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eastern() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    const ARCHIVE: &str = r#"
        <html><body>
          <article class="card card--event" about="/events/dune">
            <div class="card__image"><a href="/film/dune"><img src="dune.jpg"></a></div>
            <h2><a href="/film/dune">Dune</a></h2>
          </article>
          <article class="card card--news">
            <a href="/news/not-an-event">News</a>
          </article>
          <article class="card card--event">
            <a href="https://cinema.cornell.edu/film/alien?a=1&amp;b=2">Alien</a>
          </article>
        </body></html>
    "#;

    const DETAIL: &str = r#"
        <html><body>
          <h1 class="pageTitle">
             Dune <span>(2021)</span>
          </h1>
          <div class="field field--runtime">
            <h3 class="field-label">
    Runtime  </h3>
    2 hr 35 min
          </div>
          <div class="showtimes">
            <span class="date-display-single" property="dc:date" content="2022-02-04T19:00:00-05:00">Fri Feb 4, 7:00pm</span>
            <span content="2022-02-05T21:30:00-05:00" class="date-display-single">Sat Feb 5, 9:30pm</span>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_event_links() {
        let links = event_links(ARCHIVE, "https://cinema.cornell.edu/film-archive/spring-2022").unwrap();
        assert_eq!(
            links.iter().map(Url::as_str).collect::<Vec<_>>(),
            vec![
                "https://cinema.cornell.edu/film/dune",
                "https://cinema.cornell.edu/film/alien?a=1&b=2",
            ]
        );
    }

    #[test]
    fn test_event_links_invalid_base() {
        let err = event_links(ARCHIVE, "not a url").unwrap_err();
        assert!(matches!(err, IngestError::Url { .. }));
    }

    #[test]
    fn test_parse_event_page() {
        let page = parse_event_page(DETAIL, "dune", eastern()).unwrap();
        assert_eq!(page.name, "Dune (2021)");
        assert_eq!(page.runtime, "2 hr 35 min");
        assert_eq!(
            page.starts,
            vec![
                DateTime::parse_from_rfc3339("2022-02-04T19:00:00-05:00").unwrap(),
                DateTime::parse_from_rfc3339("2022-02-05T21:30:00-05:00").unwrap(),
            ]
        );
    }

    #[test]
    fn test_page_without_showings_or_runtime() {
        let html = r#"<h1 class="pageTitle">Members &amp; Friends Night</h1>"#;
        let page = parse_event_page(html, "members", eastern()).unwrap();
        assert_eq!(page.name, "Members & Friends Night");
        assert!(page.starts.is_empty());
        assert_eq!(page.runtime, "");
    }

    #[test]
    fn test_missing_title() {
        let err = parse_event_page("<h1>Wrong class</h1>", "nowhere", eastern()).unwrap_err();
        assert!(matches!(err, IngestError::MissingField { field: "title", .. }));
    }

    #[test]
    fn test_invalid_timestamp() {
        let html = r#"<h1 class="pageTitle">X</h1><span class="date-display-single" content="Friday">"#;
        let err = parse_event_page(html, "x", eastern()).unwrap_err();
        assert!(matches!(err, IngestError::Timestamp { .. }));
    }

    #[test]
    fn test_start_without_offset_uses_local_offset() {
        let html = r#"<h1 class="pageTitle">Alien</h1>
            <span class="date-display-single" content="2022-02-05T21:30:00">Sat</span>
            <span class="date-display-single" content="2022-02-06 15:00">Sun</span>
            <span class="date-display-single" content="2022-02-07T12:00:00+00:00">Mon</span>"#;
        let page = parse_event_page(html, "alien", eastern()).unwrap();
        assert_eq!(
            page.starts,
            vec![
                DateTime::parse_from_rfc3339("2022-02-05T21:30:00-05:00").unwrap(),
                DateTime::parse_from_rfc3339("2022-02-06T15:00:00-05:00").unwrap(),
                DateTime::parse_from_rfc3339("2022-02-07T12:00:00+00:00").unwrap(),
            ]
        );
        assert_eq!(page.starts[0].offset(), &eastern());
    }

    #[test]
    fn test_single_quoted_attributes() {
        let html = "<h1 class='pageTitle'>Alien</h1><span content='2022-02-05T21:30:00-05:00' class='x date-display-single'>";
        let page = parse_event_page(html, "alien", eastern()).unwrap();
        assert_eq!(page.name, "Alien");
        assert_eq!(page.starts.len(), 1);
    }
}
