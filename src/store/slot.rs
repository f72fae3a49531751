use crate::storage::{load_json, save_json, Storage};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, warn};

/// State that can be written to and restored from a storage slot
pub trait Persistable: Clone + Default + Send + Sync + 'static {
    type Snapshot: Serialize + DeserializeOwned;

    fn to_snapshot(&self) -> Self::Snapshot;

    fn from_snapshot(snapshot: Self::Snapshot) -> Self;
}

/// Current state of a store, its subscribers, and the slot it is mirrored to.
///
/// Readers get `Arc` snapshots. A commit publishes a new `Arc` and never
/// touches the previous one.
pub(crate) struct StateSlot<T: Persistable> {
    storage: Arc<dyn Storage>,
    key: String,
    tx: watch::Sender<Arc<T>>,
}

impl<T: Persistable> StateSlot<T> {
    /// Restores the state stored under `key`. Missing or unreadable slots
    /// start from the default state.
    pub(crate) async fn open(storage: Arc<dyn Storage>, key: String) -> Self {
        let state = match load_json::<T::Snapshot>(storage.as_ref(), &key).await {
            Ok(Some(snapshot)) => {
                debug!(key = %key, "restored persisted state");
                T::from_snapshot(snapshot)
            }
            Ok(None) => T::default(),
            Err(err) => {
                warn!(key = %key, error = %err, "discarding unreadable persisted state");
                T::default()
            }
        };

        let (tx, _) = watch::channel(Arc::new(state));
        Self { storage, key, tx }
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn current(&self) -> Arc<T> {
        self.tx.borrow().clone()
    }

    /// A private copy of the current state to build the next one from
    pub(crate) fn draft(&self) -> T {
        T::clone(&self.tx.borrow())
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<T>> {
        self.tx.subscribe()
    }

    /// Publishes `next` to subscribers and writes it to storage. A failed
    /// write is logged; the new state stays published.
    pub(crate) async fn commit(&self, next: T) {
        let next = Arc::new(next);
        self.tx.send_replace(next.clone());

        if let Err(err) = save_json(self.storage.as_ref(), &self.key, &next.to_snapshot()).await {
            error!(key = %self.key, error = %err, "failed to persist state");
        }
    }
}
