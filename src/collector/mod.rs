// Remote metrics collector: the seam between the poller and the network.

mod http;

pub use http::HttpCollector;

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::models::RawSnapshot;

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("collector request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The collector answered but refused the request (non-success status), or an
    /// injected collector has no connection to report through `reqwest`.
    #[error("collector unavailable: {0}")]
    Unavailable(String),
}

/// The collector API the dashboard consumes.
///
/// Methods return boxed futures so the controller can hold an `Arc<dyn Collector>`
/// and move fetches onto their own tasks.
pub trait Collector: Send + Sync {
    /// GET /api/metrics
    fn fetch_metrics(&self) -> BoxFuture<'_, Result<RawSnapshot, CollectorError>>;

    /// POST /api/start
    fn start(&self) -> BoxFuture<'_, Result<(), CollectorError>>;

    /// POST /api/stop
    fn stop(&self) -> BoxFuture<'_, Result<(), CollectorError>>;
}
