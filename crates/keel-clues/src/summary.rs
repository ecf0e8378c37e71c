//! Article summary fetch — the optional free-text source for trivia.

use std::{future::Future, time::Duration};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;

use crate::{Error, Result};

const USER_AGENT: &str =
  "Mozilla/5.0 (compatible; KeelGame/1.0; +https://github.com/keel-game)";

// The `encodeURIComponent` alphabet, applied to the title path segment.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'!')
  .remove(b'~')
  .remove(b'*')
  .remove(b'\'')
  .remove(b'(')
  .remove(b')');

/// Plain-text page summary: the lead abstract plus an optional one-line
/// description.
#[derive(Debug, Clone, Deserialize)]
pub struct PageSummary {
  pub title:       String,
  pub extract:     String,
  #[serde(default)]
  pub description: Option<String>,
}

/// Fetches the summary for an article title. `Ok(None)` means the article
/// has no summary (a normal outcome), while `Err` is a service fault the
/// caller may degrade on.
pub trait SummaryClient: Send + Sync {
  fn fetch_summary<'a>(
    &'a self,
    title: &'a str,
  ) -> impl Future<Output = Result<Option<PageSummary>>> + Send + 'a;
}

/// [`SummaryClient`] backed by the Wikipedia REST summary endpoint.
#[derive(Clone)]
pub struct HttpSummaryClient {
  client:   reqwest::Client,
  base_url: String,
}

impl HttpSummaryClient {
  pub const DEFAULT_BASE_URL: &'static str =
    "https://en.wikipedia.org/api/rest_v1/page/summary";

  pub fn new() -> Result<Self> {
    Self::with_base_url(Self::DEFAULT_BASE_URL)
  }

  pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
    let client = reqwest::Client::builder()
      .user_agent(USER_AGENT)
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self {
      client,
      base_url: base_url.into(),
    })
  }

  fn url_for(&self, title: &str) -> String {
    let underscored = title.replace(' ', "_");
    let encoded = utf8_percent_encode(&underscored, COMPONENT);
    format!("{}/{encoded}", self.base_url)
  }
}

impl SummaryClient for HttpSummaryClient {
  async fn fetch_summary(&self, title: &str) -> Result<Option<PageSummary>> {
    let resp = self
      .client
      .get(self.url_for(title))
      .header("Accept", "application/json")
      .send()
      .await?;

    let status = resp.status();
    if status.as_u16() == 404 {
      return Ok(None);
    }
    if !status.is_success() {
      return Err(Error::UpstreamStatus(status.as_u16()));
    }
    Ok(Some(resp.json().await?))
  }
}
