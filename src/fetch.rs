use anyhow::Result;
use reqwest::{Client, Url};
use tracing::debug;

use crate::error::ScrapeError;

/// Thin wrapper over one pooled HTTP client. No retries, no timeout beyond the client's own.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    /// GET `url` and return the body text. Non-2xx statuses are errors.
    pub async fn get_html(&self, url: &Url) -> Result<String, ScrapeError> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ScrapeError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| ScrapeError::Request {
            url: url.to_string(),
            source,
        })
    }
}
