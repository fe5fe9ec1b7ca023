/**
 * SSE Subscription Handlers
 *
 * This module exposes the Change Notifier over Server-Sent Events. A
 * storefront client opens one stream per product it is currently showing
 * (plus, optionally, one catalog-wide stream) and treats every event as a
 * signal to re-fetch that product's engagement state.
 *
 * # Server-Sent Events (SSE)
 *
 * SSE is one-way server-to-client, which is all a re-fetch signal needs,
 * and the default keep-alive comments keep intermediaries from closing
 * idle streams.
 *
 * # Connection Management
 *
 * Closing the HTTP stream drops the broadcast receiver, which is the
 * unsubscribe. Lagged receivers skip missed signals and keep listening:
 * the next signal triggers the same re-fetch the missed ones would have.
 */

use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use futures_util::stream;
use tokio::sync::broadcast;

use crate::backend::realtime::ChangeNotifier;
use crate::shared::EngagementEvent;

/// Handle product subscription (GET /api/engagement/subscribe/{product_id})
///
/// Streams one SSE event per mutation of the product's engagement facts.
/// The event name is the fact kind (`favorite` or `like`) and the data is
/// the serialized [`EngagementEvent`].
pub async fn subscribe_product(
    State(notifier): State<ChangeNotifier>,
    Path(product_id): Path<String>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, axum::Error>>> {
    tracing::info!("[Realtime] Product subscription opened: {}", product_id);
    let rx = notifier.subscribe_product(&product_id);
    sse_from_receiver(rx)
}

/// Handle catalog subscription (GET /api/catalog/subscribe)
///
/// Streams every engagement mutation across all products. Used by feed
/// views that keep many products on screen at once.
pub async fn subscribe_catalog(
    State(notifier): State<ChangeNotifier>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, axum::Error>>> {
    tracing::info!("[Realtime] Catalog subscription opened");
    let rx = notifier.subscribe_catalog();
    sse_from_receiver(rx)
}

/// Turn a broadcast receiver into an SSE stream.
///
/// Loops until a deliverable event arrives; lag is logged and skipped so a
/// slow consumer never tears down its own stream.
fn sse_from_receiver(
    rx: broadcast::Receiver<EngagementEvent>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, axum::Error>>> {
    let stream = stream::unfold(rx, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let data = match serde_json::to_string(&event) {
                        Ok(data) => data,
                        Err(e) => {
                            tracing::error!("[Realtime] Failed to serialize event: {:?}", e);
                            continue;
                        }
                    };

                    let sse_event = Event::default().event(event.fact.as_str()).data(data);
                    return Some((Ok(sse_event), rx));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Realtime] Receiver lagged, skipped {} events", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("[Realtime] Broadcast channel closed, ending stream");
                    return None;
                }
            }
        }
    });

    Sse::new(stream).keep_alive(axum::response::sse::KeepAlive::default())
}
