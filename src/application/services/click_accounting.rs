//! Fire-and-forget click counting across the store and the cache.
//!
//! The redirect handler calls [`ClickAccounting::record`], which only enqueues a
//! [`ClickEvent`]. [`run_click_worker`] drains the queue in the background and
//! hands each event to a [`ClickRecorder`].

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Semaphore, mpsc};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::cache::{CacheLookup, UrlCache};

/// Producer side of the click queue.
#[derive(Clone)]
pub struct ClickAccounting {
    sender: mpsc::Sender<ClickEvent>,
}

impl ClickAccounting {
    /// Creates the producer and the receiver for [`run_click_worker`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ClickEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Queues a click without waiting.
    ///
    /// Returns false if the click was dropped because the queue is full or the
    /// worker has stopped.
    pub fn record(&self, code: &str) -> bool {
        match self.sender.try_send(ClickEvent::new(code)) {
            Ok(()) => {
                metrics::counter!("clicks_enqueued_total").increment(1);
                true
            }
            Err(TrySendError::Full(event)) => {
                metrics::counter!("clicks_dropped_total").increment(1);
                tracing::warn!("Click queue full, dropping click for {}", event.code);
                false
            }
            Err(TrySendError::Closed(event)) => {
                metrics::counter!("clicks_dropped_total").increment(1);
                tracing::warn!("Click worker stopped, dropping click for {}", event.code);
                false
            }
        }
    }

    /// Free slots in the queue.
    pub fn available_capacity(&self) -> usize {
        self.sender.capacity()
    }

    /// Total queue size.
    pub fn max_capacity(&self) -> usize {
        self.sender.max_capacity()
    }

    /// Returns true while the worker is still receiving.
    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }
}

/// Applies a single click to both tiers.
pub struct ClickRecorder<R: UrlRepository + ?Sized> {
    repository: Arc<R>,
    cache: Arc<dyn UrlCache>,
    cache_ttl: Duration,
}

impl<R: UrlRepository + ?Sized> ClickRecorder<R> {
    pub fn new(repository: Arc<R>, cache: Arc<dyn UrlCache>, cache_ttl: Duration) -> Self {
        Self {
            repository,
            cache,
            cache_ttl,
        }
    }

    /// Increments the durable counter and the cached copy independently.
    ///
    /// Neither update waits on or undoes the other. Failures are logged and
    /// counted, never retried.
    pub async fn apply(&self, event: &ClickEvent) {
        let (store_result, cache_result) =
            tokio::join!(self.increment_store(event), self.increment_cache(event));

        if let Err(e) = store_result {
            metrics::counter!("click_updates_failed_total", "tier" => "store").increment(1);
            tracing::warn!("Failed to record click for {} in store: {}", event.code, e);
        }
        if let Err(e) = cache_result {
            metrics::counter!("click_updates_failed_total", "tier" => "cache").increment(1);
            tracing::warn!("Failed to record click for {} in cache: {}", event.code, e);
        }
    }

    async fn increment_store(&self, event: &ClickEvent) -> Result<(), String> {
        self.repository
            .increment_clicks(&event.code)
            .await
            .map_err(|e| e.to_string())
    }

    /// Read, bump, rewrite. Concurrent clicks may lose cache increments; the
    /// next write from the store path reconciles the count.
    async fn increment_cache(&self, event: &ClickEvent) -> Result<(), String> {
        match self.cache.get(&event.code).await.map_err(|e| e.to_string())? {
            CacheLookup::Hit(mut record) => {
                record.click_count += 1;
                self.cache
                    .set(&event.code, &record, self.cache_ttl)
                    .await
                    .map_err(|e| e.to_string())
            }
            CacheLookup::Miss => Ok(()),
        }
    }
}

/// Drains the click queue until every producer is dropped.
///
/// Each event runs on its own task; at most `concurrency` run at once.
pub async fn run_click_worker<R>(
    mut receiver: mpsc::Receiver<ClickEvent>,
    recorder: Arc<ClickRecorder<R>>,
    concurrency: usize,
) where
    R: UrlRepository + ?Sized + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    tracing::info!("Click worker started (concurrency: {})", concurrency);

    while let Some(event) = receiver.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let recorder = recorder.clone();

        tokio::spawn(async move {
            recorder.apply(&event).await;
            drop(permit);
        });
    }

    // Wait for in-flight updates before reporting shutdown.
    let _ = permits.acquire_many(concurrency.max(1) as u32).await;
    tracing::info!("Click worker stopped");
}
