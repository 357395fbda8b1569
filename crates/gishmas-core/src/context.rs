//! Application context.
//!
//! Built once at startup and passed by reference to every page. Holds the
//! loaded config, the local store, the optional remote store, and the
//! resolved user.

use std::sync::Arc;

use crate::error::Result;
use crate::guest::Guest;
use crate::identity::{self, HttpIdentityProvider, IdentityProvider, UserHandle};
use crate::quiz::QuizVariant;
use crate::remote::{CollectionPath, DocumentStore, HttpDocumentStore};
use crate::repository::{GuestBook, RemoteRepository};
use crate::storage::{Config, LocalStorage};

pub struct AppContext {
    config: Config,
    local: Arc<LocalStorage>,
    store: Option<Arc<dyn DocumentStore>>,
    user: Option<UserHandle>,
}

impl AppContext {
    pub fn new(
        config: Config,
        local: Arc<LocalStorage>,
        store: Option<Arc<dyn DocumentStore>>,
        user: Option<UserHandle>,
    ) -> Self {
        Self {
            config,
            local,
            store,
            user,
        }
    }

    /// Open local storage in the data directory, connect the configured
    /// remote services, and resolve the user.
    ///
    /// Remote failures degrade to local-only; only local storage errors are
    /// fatal.
    ///
    /// # Errors
    /// Returns an error if local storage cannot be opened.
    pub async fn bootstrap(config: Config) -> Result<Self> {
        let local = Arc::new(LocalStorage::open()?);

        let store: Option<Arc<dyn DocumentStore>> = match config.store.base_url.as_deref() {
            Some(url) => {
                match HttpDocumentStore::new(url, config.request_timeout(), config.poll_interval()) {
                    Ok(store) => Some(Arc::new(store)),
                    Err(e) => {
                        tracing::warn!(url, error = %e, "remote store unavailable; running local-only");
                        None
                    }
                }
            }
            None => None,
        };

        let provider = match config.identity.auth_url.as_deref() {
            Some(url) => match HttpIdentityProvider::new(url, config.request_timeout()) {
                Ok(provider) => Some(provider),
                Err(e) => {
                    tracing::warn!(url, error = %e, "identity provider unavailable; running local-only");
                    None
                }
            },
            None => None,
        };
        let token = config.initial_token();
        let user = match &store {
            Some(_) => {
                identity::bootstrap(
                    provider.as_ref().map(|p| p as &dyn IdentityProvider),
                    token.as_deref(),
                )
                .await
            }
            None => None,
        };

        Ok(Self::new(config, local, store, user))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn local(&self) -> &Arc<LocalStorage> {
        &self.local
    }

    pub fn user(&self) -> Option<&UserHandle> {
        self.user.as_ref()
    }

    /// Replace the session user, e.g. after the identity provider signs in
    /// late or signs out. Pages built afterwards pick up the change.
    pub fn set_user(&mut self, user: Option<UserHandle>) {
        self.user = user;
    }

    pub fn collection_path(&self, variant: QuizVariant) -> CollectionPath {
        CollectionPath::new(self.config.app.namespace.as_str(), variant.collection())
    }

    /// Guest storage for `variant`, remote-backed only when both a store and
    /// a user are present.
    pub fn guest_book(&self, variant: QuizVariant) -> GuestBook {
        let remote = match (&self.store, &self.user) {
            (Some(store), Some(user)) => Some(RemoteRepository::for_variant(
                store.clone(),
                user.clone(),
                &self.config.app.namespace,
                variant,
                self.local.clone(),
            )),
            _ => None,
        };
        GuestBook::new(variant, self.local.clone(), remote)
    }

    /// First snapshot from whichever repository is active, newest first.
    pub async fn fetch_guests(&self, variant: QuizVariant) -> Vec<Guest> {
        let book = self.guest_book(variant);
        let mut subscription = book.active().subscribe();
        let guests = subscription.next().await.unwrap_or_default();
        subscription.unsubscribe();
        guests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guest::{GuestDraft, GuestStatus, SusLevel};
    use crate::remote::MemoryDocumentStore;

    fn draft() -> GuestDraft {
        GuestDraft::new("Elf", "On the Nice List! 🎄", SusLevel::Low, GuestStatus::Invited).unwrap()
    }

    #[tokio::test]
    async fn store_without_user_stays_local() {
        let local = Arc::new(LocalStorage::open_memory().unwrap());
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let ctx = AppContext::new(Config::default(), local, Some(store), None);
        assert!(!ctx.guest_book(QuizVariant::V1).is_remote());
    }

    #[tokio::test]
    async fn user_switches_book_to_remote() {
        let local = Arc::new(LocalStorage::open_memory().unwrap());
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let mut ctx = AppContext::new(Config::default(), local, Some(store), None);
        ctx.set_user(Some(UserHandle::new("u", true, "t")));

        let book = ctx.guest_book(QuizVariant::V1);
        assert!(book.is_remote());
        assert!(book.append_local(draft()).await.is_none());
        book.remote_append(draft()).unwrap().await.unwrap();
        let guests = ctx.fetch_guests(QuizVariant::V1).await;
        assert_eq!(guests.len(), 1);
        assert!(ctx.fetch_guests(QuizVariant::V2).await.is_empty());
        assert_eq!(
            ctx.collection_path(QuizVariant::V2).to_string(),
            "default-app-id/public/data/guests_v2"
        );
    }
}
