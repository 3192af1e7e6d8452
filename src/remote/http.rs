//! Implements the `Remote` trait against the expense record HTTP service.

use crate::model::{Month, Row};
use crate::remote::{MonthRecord, Remote};
use crate::Result;
use anyhow::{anyhow, bail, Context};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::debug;
use url::Url;

/// Talks to the record service at `base`:
///
/// - `POST {base}/expenses/save`
/// - `GET {base}/expenses/{year}/{month}`
/// - `GET {base}/expenses/year/{year}`
/// - `DELETE {base}/expenses/{year}/{month}`
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    base: Url,
}

#[derive(Debug, Serialize)]
struct SaveRequest<'a> {
    month: Month,
    year: i32,
    rows: &'a [Row],
}

impl HttpRemote {
    pub fn new(base: Url) -> Self {
        Self {
            client: Client::new(),
            base,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("The remote URL '{}' cannot have a path", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Turns a non-success response into an error carrying the status and body.
async fn check(response: Response, what: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    bail!("{what} failed with status {status}: {body}")
}

#[async_trait::async_trait]
impl Remote for HttpRemote {
    async fn save_month(&mut self, year: i32, month: Month, rows: &[Row]) -> Result<MonthRecord> {
        let url = self.endpoint(&["expenses", "save"])?;
        debug!("POST {url}");
        let response = self
            .client
            .post(url)
            .json(&SaveRequest { month, year, rows })
            .send()
            .await
            .with_context(|| format!("Failed to send {month} {year} to the remote"))?;
        check(response, "Saving a month")
            .await?
            .json()
            .await
            .context("Failed to parse the remote save response")
    }

    async fn fetch_month(&mut self, year: i32, month: Month) -> Result<Option<MonthRecord>> {
        let url = self.endpoint(&["expenses", &year.to_string(), month.name()])?;
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {month} {year} from the remote"))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let record = check(response, "Fetching a month")
            .await?
            .json()
            .await
            .context("Failed to parse the remote month record")?;
        Ok(Some(record))
    }

    async fn fetch_year(&mut self, year: i32) -> Result<Vec<MonthRecord>> {
        let url = self.endpoint(&["expenses", "year", &year.to_string()])?;
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {year} from the remote"))?;
        check(response, "Fetching a year")
            .await?
            .json()
            .await
            .context("Failed to parse the remote year records")
    }

    async fn delete_month(&mut self, year: i32, month: Month) -> Result<bool> {
        let url = self.endpoint(&["expenses", &year.to_string(), month.name()])?;
        debug!("DELETE {url}");
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .with_context(|| format!("Failed to delete {month} {year} from the remote"))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check(response, "Deleting a month").await?;
        Ok(true)
    }
}
