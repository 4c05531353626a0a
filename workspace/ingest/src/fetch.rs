use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::error::{IngestError, Result};

const USER_AGENT: &str = concat!("cinetrack/", env!("CARGO_PKG_VERSION"));

/// Source of raw HTML pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches pages over HTTP. One attempt per page; no retry or backoff.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| IngestError::Http {
                url: String::new(),
                source,
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| IngestError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| IngestError::Http {
            url: url.to_string(),
            source,
        })?;
        debug!("Fetched {} bytes", body.len());
        Ok(body)
    }
}
