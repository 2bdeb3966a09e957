use std::future::Future;
use std::sync::mpsc;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use page_logging::{page_debug, page_info, page_warn, TARGET_SEARCH, TARGET_SETS};
use tokio_util::sync::CancellationToken;

use crate::{
    AttrQuery, ClaimRequest, ConnectionError, EngineEvent, FailureKind, JobId, RequestId,
    ServerConnection,
};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Runs `operation` until it finishes, `limit` elapses or `cancel` fires.
async fn bounded<T>(
    limit: Duration,
    cancel: &CancellationToken,
    operation: impl Future<Output = Result<T, ConnectionError>>,
) -> Result<T, ConnectionError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(ConnectionError::new(FailureKind::Cancelled, "page disposed")),
        outcome = tokio::time::timeout(limit, operation) => match outcome {
            Ok(result) => result,
            Err(_) => Err(ConnectionError::new(
                FailureKind::Timeout,
                format!("no answer within {} ms", limit.as_millis()),
            )),
        },
    }
}

pub async fn search(
    connection: &dyn ServerConnection,
    request_id: RequestId,
    query: &AttrQuery,
    limit: Duration,
    cancel: &CancellationToken,
    sink: &dyn EventSink,
) {
    page_debug!(
        target: TARGET_SEARCH,
        "Search request_id={} attr={:?} fuzzy={} max={}",
        request_id,
        query.attribute,
        query.fuzzy,
        query.max
    );
    let result = bounded(limit, cancel, connection.permanodes_with_attr(query)).await;
    if let Err(err) = &result {
        page_warn!(target: TARGET_SEARCH, "Search {} failed: {}", request_id, err);
    }
    sink.emit(EngineEvent::SearchCompleted { request_id, result });
}

pub async fn create_permanode(
    connection: &dyn ServerConnection,
    job_id: JobId,
    limit: Duration,
    cancel: &CancellationToken,
    sink: &dyn EventSink,
) {
    let result = bounded(limit, cancel, connection.create_permanode()).await;
    match &result {
        Ok(permanode) => page_info!(target: TARGET_SETS, "Job {} created {}", job_id, permanode),
        Err(err) => page_warn!(target: TARGET_SETS, "Job {} permanode failed: {}", job_id, err),
    }
    sink.emit(EngineEvent::PermanodeCreated { job_id, result });
}

/// Issues every claim against `permanode` concurrently, in slice order, and
/// emits one [`EngineEvent::ClaimSettled`] per claim as each finishes.
///
/// Each claim is bounded by `limit` on its own, so a stalled request settles
/// as [`FailureKind::Timeout`] instead of holding back the others.
pub async fn add_claims(
    connection: &dyn ServerConnection,
    job_id: JobId,
    permanode: &str,
    claims: &[ClaimRequest],
    limit: Duration,
    cancel: &CancellationToken,
    sink: &dyn EventSink,
) {
    let mut pending: FuturesUnordered<_> = claims
        .iter()
        .enumerate()
        .map(|(claim_index, claim)| async move {
            let result = bounded(
                limit,
                cancel,
                connection.add_attribute_claim(permanode, &claim.attribute, &claim.value),
            )
            .await;
            (claim_index, result)
        })
        .collect();

    while let Some((claim_index, result)) = pending.next().await {
        if let Err(err) = &result {
            page_warn!(
                target: TARGET_SETS,
                "Job {} claim {} on {} failed: {}",
                job_id,
                claim_index,
                permanode,
                err
            );
        }
        sink.emit(EngineEvent::ClaimSettled {
            job_id,
            claim_index,
            result,
        });
    }
}
