//! Integration tests for the quiz page against an in-memory remote store.
//!
//! Covers the full run from name entry to overlay reset, with the live
//! subscription replacing the visible list on every write.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gishmas_core::{
    AppContext, CollectionPath, Config, Document, DocumentStore, Listener, LocalStorage,
    MemoryDocumentStore, QuizEvent, QuizPage, QuizStep, QuizVariant, Snapshot, StoreError,
    UserHandle,
};
use tokio::time::Instant;

/// Memory store whose writes take `delay` to land.
struct SlowStore {
    inner: MemoryDocumentStore,
    delay: Duration,
}

#[async_trait]
impl DocumentStore for SlowStore {
    async fn add(
        &self,
        user: &UserHandle,
        path: &CollectionPath,
        data: serde_json::Value,
    ) -> Result<Document, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.add(user, path, data).await
    }

    async fn list(&self, user: &UserHandle, path: &CollectionPath) -> Result<Snapshot, StoreError> {
        self.inner.list(user, path).await
    }

    fn listen(&self, user: &UserHandle, path: &CollectionPath) -> Listener {
        self.inner.listen(user, path)
    }
}

fn quick_config() -> Config {
    let mut config = Config::default();
    config.quiz.result_display_ms = 50;
    config
}

fn signed_in(store: &MemoryDocumentStore) -> AppContext {
    let local = Arc::new(LocalStorage::open_memory().unwrap());
    let store: Arc<dyn DocumentStore> = Arc::new(store.clone());
    AppContext::new(
        quick_config(),
        local,
        Some(store),
        Some(UserHandle::new("guest-1", true, "token")),
    )
}

async fn take(page: &mut QuizPage, name: &str, answers: [usize; 3]) -> Vec<QuizEvent> {
    page.set_name(name);
    assert!(page.start().is_some());
    let mut events = Vec::new();
    for a in answers {
        events.extend(page.answer(a).await.unwrap());
    }
    events
}

/// Drain page events until the overlay has cleared and no snapshot is
/// still on its way.
async fn settle(page: &mut QuizPage) -> Vec<QuizEvent> {
    let mut seen = Vec::new();
    while page.overlay_active() {
        let event = tokio::time::timeout(Duration::from_secs(5), page.next_event())
            .await
            .expect("page went quiet")
            .expect("page has nothing pending");
        seen.push(event);
    }
    while let Ok(Some(event)) =
        tokio::time::timeout(Duration::from_millis(100), page.next_event()).await
    {
        seen.push(event);
    }
    assert!(seen
        .iter()
        .any(|e| matches!(e, QuizEvent::ResultCleared { .. })));
    seen
}

#[tokio::test]
async fn v1_signed_in_writes_remote_and_renders_from_snapshots() {
    let store = MemoryDocumentStore::new();
    let ctx = signed_in(&store);
    let mut page = QuizPage::mount(&ctx, QuizVariant::V1);
    assert!(page.is_listening());

    // First delivery is the empty collection.
    let first = page.next_event().await.unwrap();
    assert!(matches!(first, QuizEvent::GuestsUpdated { total: 0, .. }));

    let events = take(&mut page, "Grinch", [0, 1, 1]).await;
    assert!(!events
        .iter()
        .any(|e| matches!(e, QuizEvent::GuestSaved { .. })));
    assert_eq!(page.step(), QuizStep::Submitting { status: gishmas_core::GuestStatus::Sus });

    let seen = settle(&mut page).await;
    assert!(seen
        .iter()
        .any(|e| matches!(e, QuizEvent::GuestSaved { remote: true, .. })));
    assert!(seen
        .iter()
        .any(|e| matches!(e, QuizEvent::GuestsUpdated { total: 1, sus: 1, .. })));
    assert_eq!(page.guests()[0].name, "Grinch");
    assert_eq!(page.guests()[0].reason, "Called the cops on a nap.");
    assert!(page.guests()[0].created_at.is_some());

    // v1 never touches the local cache while signed in.
    assert!(ctx
        .local()
        .load_guests(QuizVariant::V1.local_key())
        .is_empty());
}

#[tokio::test]
async fn v2_signed_in_writes_both_and_mirrors() {
    let store = MemoryDocumentStore::new();
    let ctx = signed_in(&store);
    let mut page = QuizPage::mount(&ctx, QuizVariant::V2);
    page.next_event().await.unwrap();

    let events = take(&mut page, "Cindy Lou", [1, 1, 1]).await;
    let saved = |events: &[QuizEvent]| -> Vec<bool> {
        events
            .iter()
            .filter_map(|e| match e {
                QuizEvent::GuestSaved { remote, .. } => Some(*remote),
                _ => None,
            })
            .collect()
    };
    assert_eq!(saved(&events), vec![false]);
    // Optimistic local entry shows before any snapshot arrives.
    assert_eq!(page.guests().len(), 1);

    let seen = settle(&mut page).await;
    assert_eq!(saved(&seen), vec![true]);
    // Remote snapshot replaced the optimistic entry and was mirrored.
    let mirrored = ctx.local().load_guests(QuizVariant::V2.local_key());
    assert_eq!(mirrored.len(), 1);
    assert_eq!(mirrored, page.guests().to_vec());
}

#[tokio::test]
async fn newest_guest_is_listed_first() {
    let store = MemoryDocumentStore::new();
    let ctx = signed_in(&store);
    let mut page = QuizPage::mount(&ctx, QuizVariant::V1);
    page.next_event().await.unwrap();

    for name in ["First", "Second", "Third"] {
        take(&mut page, name, [1, 1, 1]).await;
        settle(&mut page).await;
    }

    let names: Vec<_> = page.guests().iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Third", "Second", "First"]);
}

#[tokio::test]
async fn failed_remote_write_still_completes_the_run() {
    let store = MemoryDocumentStore::new();
    store.reject_writes(true);
    let ctx = signed_in(&store);
    let mut page = QuizPage::mount(&ctx, QuizVariant::V1);
    page.next_event().await.unwrap();

    let events = take(&mut page, "Elf", [1, 1, 1]).await;
    assert!(events
        .iter()
        .all(|e| !matches!(e, QuizEvent::GuestSaved { .. })));
    assert!(page.overlay_active());

    settle(&mut page).await;
    assert_eq!(page.step(), QuizStep::NameEntry);
    assert!(page.guests().is_empty());
}

#[tokio::test]
async fn offline_v2_renders_cached_guests_on_mount() {
    let local = Arc::new(LocalStorage::open_memory().unwrap());
    let ctx = AppContext::new(Config::default(), local.clone(), None, None);

    let mut page = QuizPage::mount(&ctx, QuizVariant::V2);
    assert!(!page.is_listening());
    take(&mut page, "Buddy", [1, 1, 1]).await;
    page.unmount();

    let page = QuizPage::mount(&ctx, QuizVariant::V2);
    assert_eq!(page.guests().len(), 1);
    assert!(page.guests()[0].id.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn resubscribe_follows_sign_in() {
    let store = MemoryDocumentStore::new();
    let local = Arc::new(LocalStorage::open_memory().unwrap());
    let shared: Arc<dyn DocumentStore> = Arc::new(store.clone());
    let mut ctx = AppContext::new(Config::default(), local, Some(shared), None);

    let mut page = QuizPage::mount(&ctx, QuizVariant::V1);
    assert!(!page.is_listening());

    ctx.set_user(Some(UserHandle::new("late", false, "t")));
    page.resubscribe(&ctx);
    assert!(page.is_listening());
    assert!(matches!(
        page.next_event().await,
        Some(QuizEvent::GuestsUpdated { total: 0, .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn slow_remote_write_does_not_hold_back_the_result() {
    let store: Arc<dyn DocumentStore> = Arc::new(SlowStore {
        inner: MemoryDocumentStore::new(),
        delay: Duration::from_secs(5),
    });
    let local = Arc::new(LocalStorage::open_memory().unwrap());
    let ctx = AppContext::new(
        Config::default(),
        local,
        Some(store),
        Some(UserHandle::new("guest-1", true, "token")),
    );
    let mut page = QuizPage::mount(&ctx, QuizVariant::V1);
    page.next_event().await.unwrap();

    page.set_name("Grinch");
    page.start().unwrap();
    page.answer(0).await.unwrap();
    page.answer(0).await.unwrap();
    let started = Instant::now();
    let events = page.answer(0).await.unwrap();
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert!(matches!(events[0], QuizEvent::QuizSubmitted { .. }));
    assert!(page.overlay_active());
    assert!(page.is_saving());

    // The overlay runs its full time while the write is still in flight.
    let cleared = page.next_event().await.unwrap();
    assert!(matches!(cleared, QuizEvent::ResultCleared { .. }));
    assert_eq!(started.elapsed(), Duration::from_millis(1500));
    assert!(page.is_saving());

    // The live snapshot for the new document may land first.
    loop {
        match page.next_event().await.unwrap() {
            QuizEvent::GuestSaved { remote: true, .. } => break,
            QuizEvent::GuestsUpdated { .. } => continue,
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(started.elapsed(), Duration::from_secs(5));
    assert!(!page.is_saving());
}
