//! In-process document store.
//!
//! Behaves like the remote store: ids and `createdAt` are assigned on insert
//! and every write pushes a fresh snapshot to the listeners of that
//! collection. Used by tests and offline demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::broadcast;

use super::{CollectionPath, Document, DocumentStore, Listener, Snapshot, CREATED_AT_FIELD};
use crate::error::StoreError;
use crate::identity::UserHandle;

#[derive(Default)]
struct Collections {
    docs: HashMap<CollectionPath, Vec<Document>>,
    last_stamp: Option<DateTime<Utc>>,
}

/// Document store held in memory.
#[derive(Clone)]
pub struct MemoryDocumentStore {
    inner: Arc<Mutex<Collections>>,
    changes: broadcast::Sender<CollectionPath>,
    reject_writes: Arc<AtomicBool>,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Mutex::new(Collections::default())),
            changes,
            reject_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every following `add` fail with a permission error.
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn snapshot(&self, path: &CollectionPath) -> Snapshot {
        self.lock().docs.get(path).cloned().unwrap_or_default()
    }

    /// Strictly increasing server time, so inserts never tie.
    fn stamp(collections: &mut Collections) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match collections.last_stamp {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        collections.last_stamp = Some(stamp);
        stamp
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn add(
        &self,
        _user: &UserHandle,
        path: &CollectionPath,
        mut data: serde_json::Value,
    ) -> Result<Document, StoreError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Upstream {
                status: 403,
                message: "permission denied".to_string(),
            });
        }
        let doc = {
            let mut collections = self.lock();
            let stamp = Self::stamp(&mut collections);
            if let Some(fields) = data.as_object_mut() {
                fields.insert(
                    CREATED_AT_FIELD.to_string(),
                    serde_json::Value::String(stamp.to_rfc3339()),
                );
            }
            let doc = Document {
                id: uuid::Uuid::new_v4().simple().to_string(),
                data,
            };
            collections
                .docs
                .entry(path.clone())
                .or_default()
                .push(doc.clone());
            doc
        };
        // No listeners is fine.
        let _ = self.changes.send(path.clone());
        Ok(doc)
    }

    async fn list(&self, _user: &UserHandle, path: &CollectionPath) -> Result<Snapshot, StoreError> {
        Ok(self.snapshot(path))
    }

    fn listen(&self, _user: &UserHandle, path: &CollectionPath) -> Listener {
        let store = self.clone();
        let path = path.clone();
        let mut changes = self.changes.subscribe();
        Listener::spawn(move |tx| async move {
            if tx.send(Ok(store.snapshot(&path))).await.is_err() {
                return;
            }
            loop {
                match changes.recv().await {
                    Ok(changed) if changed != path => continue,
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        if tx.send(Ok(store.snapshot(&path))).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}
