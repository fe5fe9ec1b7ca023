//! # Streaming Change Feed
//!
//! Client side of the SSE subscription endpoints. A subscription forwards
//! each parsed [`EngagementEvent`] through a channel; dropping or
//! cancelling it aborts the stream task, which is the explicit unsubscribe
//! the notifier contract requires.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::api::ApiError;
use crate::shared::EngagementEvent;

/// Buffered signals per subscription. Signals are idempotent re-fetch
/// triggers, so a full buffer dropping the sender's send is acceptable.
const SIGNAL_BUFFER: usize = 32;

/// Factory for change-feed subscriptions.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    base_url: String,
    client: reqwest::Client,
}

impl ChangeFeed {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Subscribe to one product's engagement mutations.
    pub async fn subscribe_product(
        &self,
        product_id: &str,
    ) -> Result<ChangeSubscription, ApiError> {
        self.open(&format!("/api/engagement/subscribe/{}", product_id))
            .await
    }

    /// Subscribe to every engagement mutation across the catalog.
    pub async fn subscribe_catalog(&self) -> Result<ChangeSubscription, ApiError> {
        self.open("/api/catalog/subscribe").await
    }

    async fn open(&self, path: &str) -> Result<ChangeSubscription, ApiError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("Accept", "text/event-stream")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Status { status, message });
        }

        let (tx, rx) = mpsc::channel(SIGNAL_BUFFER);
        let task = tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk) = stream.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!("Change feed stream error: {}", e);
                        break;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(newline) = buffer.find('\n') {
                    let line = buffer[..newline].trim_end_matches('\r').to_string();
                    buffer.drain(..=newline);
                    if let Some(event) = parse_sse_line(&line) {
                        if tx.send(event).await.is_err() {
                            // Receiver dropped; unsubscribe.
                            return;
                        }
                    }
                }
            }
        });

        Ok(ChangeSubscription { rx, task })
    }
}

/// Parse one SSE line; only `data:` lines carry events. Event-name lines
/// and keep-alive comments are skipped.
fn parse_sse_line(line: &str) -> Option<EngagementEvent> {
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() {
        return None;
    }
    match serde_json::from_str(data) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!("Unparseable change-feed payload: {}", e);
            None
        }
    }
}

/// An open change-feed subscription.
///
/// Dropping it (or calling [`cancel`](Self::cancel)) aborts the underlying
/// stream task and closes the HTTP connection.
#[derive(Debug)]
pub struct ChangeSubscription {
    rx: mpsc::Receiver<EngagementEvent>,
    task: JoinHandle<()>,
}

impl ChangeSubscription {
    /// Next signal, or `None` once the stream has closed.
    pub async fn next_signal(&mut self) -> Option<EngagementEvent> {
        self.rx.recv().await
    }

    /// Explicit unsubscribe.
    pub fn cancel(self) {
        // Drop does the work.
    }
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
