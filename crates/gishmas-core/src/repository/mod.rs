//! Guest persistence.
//!
//! Two backends sit behind [`GuestRepository`]: device-local storage and the
//! remote document store. [`GuestBook`] picks between them per call based on
//! whether a user is signed in, and applies the per-variant write rules.

mod local;
mod remote;

pub use local::LocalRepository;
pub use remote::RemoteRepository;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::guest::{Guest, GuestDraft};
use crate::quiz::QuizVariant;
use crate::storage::LocalStorage;

/// A place guests are appended to and read back from.
#[async_trait]
pub trait GuestRepository: Send + Sync {
    /// Persist a draft. The backend assigns id and creation time.
    async fn append(&self, draft: GuestDraft) -> Result<Guest>;

    /// Deliver the guest list, newest first. Remote backends keep
    /// delivering on every change; local storage delivers once.
    fn subscribe(&self) -> Subscription;
}

/// Handle on a stream of guest-list snapshots.
///
/// Unsubscribing is idempotent and also happens on drop.
pub struct Subscription {
    rx: Option<mpsc::Receiver<Vec<Guest>>>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub(crate) fn live(rx: mpsc::Receiver<Vec<Guest>>, task: JoinHandle<()>) -> Self {
        Self {
            rx: Some(rx),
            task: Some(task),
        }
    }

    /// A subscription that yields `guests` once and then ends.
    pub fn once(guests: Vec<Guest>) -> Self {
        let (tx, rx) = mpsc::channel(1);
        // Capacity one and a fresh channel, so this cannot fail.
        let _ = tx.try_send(guests);
        Self {
            rx: Some(rx),
            task: None,
        }
    }

    /// A subscription that never yields.
    pub fn closed() -> Self {
        Self {
            rx: None,
            task: None,
        }
    }

    /// True until the stream ends or the caller unsubscribes.
    pub fn is_active(&self) -> bool {
        self.rx.is_some()
    }

    /// Next snapshot, or `None` once the stream is over.
    pub async fn next(&mut self) -> Option<Vec<Guest>> {
        let rx = self.rx.as_mut()?;
        let snapshot = rx.recv().await;
        if snapshot.is_none() {
            self.rx = None;
        }
        snapshot
    }

    pub fn unsubscribe(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("guest subscription torn down");
        }
        self.rx = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Per-variant view over local and remote guest storage.
pub struct GuestBook {
    variant: QuizVariant,
    local: LocalRepository,
    remote: Option<RemoteRepository>,
}

impl GuestBook {
    pub fn new(
        variant: QuizVariant,
        storage: Arc<LocalStorage>,
        remote: Option<RemoteRepository>,
    ) -> Self {
        Self {
            variant,
            local: LocalRepository::new(storage, variant),
            remote,
        }
    }

    pub fn variant(&self) -> QuizVariant {
        self.variant
    }

    /// True when a user is signed in and the remote store is reachable.
    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// The repository reads and writes go to right now.
    pub fn active(&self) -> &dyn GuestRepository {
        match &self.remote {
            Some(remote) => remote as &dyn GuestRepository,
            None => &self.local as &dyn GuestRepository,
        }
    }

    /// Cached list to render before any subscription delivers.
    pub fn initial_guests(&self) -> Vec<Guest> {
        self.local.load()
    }

    /// Live remote feed. Without a user there is nothing to listen to.
    pub fn live_subscription(&self) -> Subscription {
        match &self.remote {
            Some(remote) => remote.subscribe(),
            None => Subscription::closed(),
        }
    }

    /// Store a finished quiz result on this device.
    ///
    /// Local storage takes the write when nobody is signed in, and always
    /// for variants that write locally first. `None` when the local write
    /// was skipped or failed; failures are logged.
    pub async fn append_local(&self, draft: GuestDraft) -> Option<Guest> {
        if self.remote.is_some() && !self.variant.writes_local_first() {
            return None;
        }
        match self.local.append(draft).await {
            Ok(guest) => Some(guest),
            Err(e) => {
                tracing::warn!(variant = %self.variant, error = %e, "failed to save guest locally");
                None
            }
        }
    }

    /// The remote write for a finished quiz result, detached from `self` so
    /// it can run in the background. `None` when nobody is signed in. The
    /// write resolves to `None` on failure, which is logged.
    pub fn remote_append(
        &self,
        draft: GuestDraft,
    ) -> Option<impl Future<Output = Option<Guest>> + Send + 'static> {
        let remote = self.remote.clone()?;
        let variant = self.variant;
        Some(async move {
            match remote.append(draft).await {
                Ok(guest) => Some(guest),
                Err(e) => {
                    tracing::warn!(%variant, error = %e, "failed to save guest remotely");
                    None
                }
            }
        })
    }
}
