use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;

use super::{GuestRepository, Subscription};
use crate::error::Result;
use crate::guest::{Guest, GuestDraft};
use crate::quiz::{LocalIdStyle, QuizVariant};
use crate::storage::LocalStorage;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_ID_LEN: usize = 9;

/// Guest list cached on this device under one key.
pub struct LocalRepository {
    storage: Arc<LocalStorage>,
    key: &'static str,
    id_style: LocalIdStyle,
}

impl LocalRepository {
    pub fn new(storage: Arc<LocalStorage>, variant: QuizVariant) -> Self {
        Self {
            storage,
            key: variant.local_key(),
            id_style: variant.local_id_style(),
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Stored list, newest first. Unreadable data reads as empty.
    pub fn load(&self) -> Vec<Guest> {
        self.storage.load_guests(self.key)
    }

    fn mint_id(&self) -> String {
        match self.id_style {
            LocalIdStyle::RandomToken => {
                let mut rng = rand::thread_rng();
                (0..RANDOM_ID_LEN)
                    .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
                    .collect()
            }
            LocalIdStyle::Timestamp => Utc::now().timestamp_millis().to_string(),
        }
    }
}

#[async_trait]
impl GuestRepository for LocalRepository {
    async fn append(&self, draft: GuestDraft) -> Result<Guest> {
        let guest = draft.into_guest(self.mint_id(), Some(Utc::now()));
        let mut guests = self.load();
        guests.insert(0, guest.clone());
        self.storage.save_guests(self.key, &guests)?;
        tracing::debug!(key = self.key, id = %guest.id, "guest saved locally");
        Ok(guest)
    }

    fn subscribe(&self) -> Subscription {
        Subscription::once(self.load())
    }
}
