//! Remote realtime document store.
//!
//! The store is an opaque collection of JSON documents addressed by
//! [`CollectionPath`]. It assigns document ids and stamps `createdAt` on
//! every added document. Live listeners deliver the full collection on every
//! change; there is no incremental diff.

mod http;
mod memory;

pub use http::HttpDocumentStore;
pub use memory::MemoryDocumentStore;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::StoreError;
use crate::identity::UserHandle;

/// Field the store fills with its own timestamp on insert.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Buffered snapshots per listener before the producer waits.
const LISTENER_CAPACITY: usize = 16;

/// `{namespace}/public/data/{collection}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    namespace: String,
    collection: String,
}

impl CollectionPath {
    pub fn new(namespace: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn segments(&self) -> [&str; 4] {
        [&self.namespace, "public", "data", &self.collection]
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments().join("/"))
    }
}

/// One stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: serde_json::Value,
}

/// Full collection contents at one point in time.
pub type Snapshot = Vec<Document>;

/// Live feed of snapshots for one collection.
///
/// Dropping the listener stops the producing task.
pub struct Listener {
    rx: mpsc::Receiver<Result<Snapshot, StoreError>>,
    task: JoinHandle<()>,
}

impl Listener {
    /// Spawn `produce` with the sending half of a fresh channel.
    pub fn spawn<F, Fut>(produce: F) -> Self
    where
        F: FnOnce(mpsc::Sender<Result<Snapshot, StoreError>>) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(LISTENER_CAPACITY);
        let task = tokio::spawn(produce(tx));
        Self { rx, task }
    }

    /// Next snapshot or listen error. `None` once the producer has stopped.
    pub async fn recv(&mut self) -> Option<Result<Snapshot, StoreError>> {
        self.rx.recv().await
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Port for the remote document store.
///
/// Every call carries the signed-in user; there is no anonymous access.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert `data` as a new document. The store assigns the id and
    /// sets [`CREATED_AT_FIELD`].
    async fn add(
        &self,
        user: &UserHandle,
        path: &CollectionPath,
        data: serde_json::Value,
    ) -> Result<Document, StoreError>;

    /// Read the whole collection once.
    async fn list(&self, user: &UserHandle, path: &CollectionPath)
        -> Result<Snapshot, StoreError>;

    /// Start a live listener. The first snapshot arrives as soon as the
    /// store answers, then one per change.
    fn listen(&self, user: &UserHandle, path: &CollectionPath) -> Listener;
}
