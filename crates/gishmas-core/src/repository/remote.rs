use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{GuestRepository, Subscription};
use crate::error::{Result, StoreError};
use crate::guest::{sort_newest_first, Guest, GuestDraft};
use crate::identity::UserHandle;
use crate::quiz::QuizVariant;
use crate::remote::{CollectionPath, Document, DocumentStore};
use crate::storage::LocalStorage;

const SUBSCRIPTION_CAPACITY: usize = 8;

/// Local copy kept in step with every remote snapshot.
#[derive(Clone)]
struct Mirror {
    storage: Arc<LocalStorage>,
    key: &'static str,
}

/// Guest collection in the remote document store.
#[derive(Clone)]
pub struct RemoteRepository {
    store: Arc<dyn DocumentStore>,
    user: UserHandle,
    path: CollectionPath,
    mirror: Option<Mirror>,
}

impl RemoteRepository {
    pub fn new(store: Arc<dyn DocumentStore>, user: UserHandle, path: CollectionPath) -> Self {
        Self {
            store,
            user,
            path,
            mirror: None,
        }
    }

    /// Repository for `variant`'s collection under `namespace`, mirroring
    /// into local storage when the variant asks for it.
    pub fn for_variant(
        store: Arc<dyn DocumentStore>,
        user: UserHandle,
        namespace: &str,
        variant: QuizVariant,
        storage: Arc<LocalStorage>,
    ) -> Self {
        let mut repo = Self::new(store, user, CollectionPath::new(namespace, variant.collection()));
        if variant.mirrors_remote() {
            repo.mirror = Some(Mirror {
                storage,
                key: variant.local_key(),
            });
        }
        repo
    }

    pub fn path(&self) -> &CollectionPath {
        &self.path
    }
}

/// Turn a stored document into a guest. The document id wins over any
/// `id` field in the body.
pub fn document_to_guest(doc: Document) -> std::result::Result<Guest, StoreError> {
    let mut data = doc.data;
    let Some(fields) = data.as_object_mut() else {
        return Err(StoreError::Decode(format!("document {} is not an object", doc.id)));
    };
    fields.insert("id".to_string(), serde_json::Value::String(doc.id.clone()));
    serde_json::from_value(data).map_err(|e| StoreError::Decode(format!("document {}: {e}", doc.id)))
}

/// Decode a snapshot, skipping documents that do not look like guests.
pub fn snapshot_to_guests(docs: Vec<Document>) -> Vec<Guest> {
    let mut guests: Vec<Guest> = docs
        .into_iter()
        .filter_map(|doc| match document_to_guest(doc) {
            Ok(guest) => Some(guest),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed guest document");
                None
            }
        })
        .collect();
    sort_newest_first(&mut guests);
    guests
}

#[async_trait]
impl GuestRepository for RemoteRepository {
    async fn append(&self, draft: GuestDraft) -> Result<Guest> {
        let data = serde_json::to_value(&draft)?;
        let doc = self.store.add(&self.user, &self.path, data).await?;
        let guest = document_to_guest(doc)?;
        tracing::debug!(path = %self.path, id = %guest.id, "guest saved remotely");
        Ok(guest)
    }

    fn subscribe(&self) -> Subscription {
        let mut listener = self.store.listen(&self.user, &self.path);
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_CAPACITY);
        let mirror = self.mirror.clone();
        let path = self.path.clone();
        tracing::debug!(%path, "guest subscription started");

        let task = tokio::spawn(async move {
            while let Some(item) = listener.recv().await {
                let docs = match item {
                    Ok(docs) => docs,
                    Err(e) => {
                        tracing::warn!(%path, error = %e, "guest listener error");
                        continue;
                    }
                };
                let guests = snapshot_to_guests(docs);
                if let Some(mirror) = &mirror {
                    if let Err(e) = mirror.storage.save_guests(mirror.key, &guests) {
                        tracing::warn!(key = mirror.key, error = %e, "failed to mirror guests locally");
                    }
                }
                if tx.send(guests).await.is_err() {
                    break;
                }
            }
            tracing::debug!(%path, "guest listener stopped");
        });

        Subscription::live(rx, task)
    }
}
