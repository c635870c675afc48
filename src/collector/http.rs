// reqwest-backed collector client

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::instrument;

use super::{Collector, CollectorError};
use crate::models::RawSnapshot;
use crate::version;

pub struct HttpCollector {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCollector {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CollectorError> {
        let client = reqwest::Client::builder()
            .user_agent(version::user_agent())
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    #[instrument(skip(self), fields(collector = %self.base_url, operation = "fetch_metrics"))]
    async fn get_metrics(&self) -> Result<RawSnapshot, CollectorError> {
        let response = self
            .client
            .get(self.endpoint("/api/metrics"))
            .send()
            .await?;
        let snapshot = accepted(response).await?.json::<RawSnapshot>().await?;
        Ok(snapshot)
    }

    #[instrument(skip(self), fields(collector = %self.base_url))]
    async fn post_command(&self, path: &'static str) -> Result<(), CollectorError> {
        let response = self.client.post(self.endpoint(path)).send().await?;
        accepted(response).await?;
        tracing::debug!(path, "collector command accepted");
        Ok(())
    }
}

const MAX_ERROR_BODY: usize = 200;

/// Passes 2xx responses through; anything else becomes `Unavailable` with the
/// status and the start of the body.
async fn accepted(response: reqwest::Response) -> Result<reqwest::Response, CollectorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CollectorError::Unavailable(describe_status(status, &body)))
}

fn describe_status(status: reqwest::StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return status.to_string();
    }
    let mut end = body.len().min(MAX_ERROR_BODY);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{status}: {}", &body[..end])
}

impl Collector for HttpCollector {
    fn fetch_metrics(&self) -> BoxFuture<'_, Result<RawSnapshot, CollectorError>> {
        self.get_metrics().boxed()
    }

    fn start(&self) -> BoxFuture<'_, Result<(), CollectorError>> {
        self.post_command("/api/start").boxed()
    }

    fn stop(&self) -> BoxFuture<'_, Result<(), CollectorError>> {
        self.post_command("/api/stop").boxed()
    }
}
