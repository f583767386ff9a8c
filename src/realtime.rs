//! Change notifications and live listings.
//!
//! Writers publish a [`ChangeEvent`] after they commit. A [`LiveView`] re-runs
//! its full listing query on every event for its collection and swaps the
//! result in wholesale; there is no incremental patching.

use std::future::Future;

use tokio::sync::{broadcast, watch};

use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Events,
    Services,
    CartLines,
    Orders,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, collection: Collection, kind: ChangeKind) {
        tracing::debug!(?collection, ?kind, "change published");
        let _ = self.tx.send(ChangeEvent { collection, kind });
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(256)
    }
}

#[derive(Debug, Clone)]
pub struct LiveView<T> {
    rx: watch::Receiver<Vec<T>>,
}

impl<T> LiveView<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Spawns the refresh task. The initial listing is fetched immediately.
    pub fn spawn<F, Fut>(collection: Collection, feed: &ChangeFeed, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Vec<T>>> + Send,
    {
        let (tx, rx) = watch::channel(Vec::new());
        let mut changes = feed.subscribe();

        tokio::spawn(async move {
            refresh(collection, &tx, &fetch).await;
            loop {
                match changes.recv().await {
                    Ok(event) if event.collection == collection => {
                        refresh(collection, &tx, &fetch).await
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(?collection, skipped, "change feed lagged");
                        refresh(collection, &tx, &fetch).await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
                if tx.is_closed() {
                    break;
                }
            }
        });

        Self { rx }
    }

    pub fn current(&self) -> Vec<T> {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.rx.clone()
    }
}

async fn refresh<T, F, Fut>(collection: Collection, tx: &watch::Sender<Vec<T>>, fetch: &F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = AppResult<Vec<T>>>,
{
    match fetch().await {
        Ok(items) => {
            tracing::debug!(?collection, count = items.len(), "live view refreshed");
            tx.send_replace(items);
        }
        // Keep serving the previous listing.
        Err(err) => tracing::warn!(?collection, error = %err, "live view refresh failed"),
    }
}
