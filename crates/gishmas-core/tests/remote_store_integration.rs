//! Integration tests for the HTTP document store and the remote guest
//! repository built on it, against a mock server.

use std::sync::Arc;
use std::time::Duration;

use gishmas_core::{
    CollectionPath, DocumentStore, GuestDraft, GuestRepository, GuestStatus, HttpDocumentStore,
    LocalStorage, QuizVariant, RemoteRepository, StoreError, SusLevel, UserHandle,
};
use mockito::Matcher;
use serde_json::json;

const GUESTS_PATH: &str = "/v1/app-1/public/data/guests/documents";

fn store(server: &mockito::ServerGuard) -> HttpDocumentStore {
    HttpDocumentStore::new(
        &server.url(),
        Duration::from_secs(2),
        Duration::from_millis(20),
    )
    .unwrap()
}

fn user() -> UserHandle {
    UserHandle::new("uid-1", true, "id-token")
}

fn path() -> CollectionPath {
    CollectionPath::new("app-1", "guests")
}

#[tokio::test]
async fn list_sends_bearer_token_and_decodes_documents() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", GUESTS_PATH)
        .match_header("authorization", "Bearer id-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"documents": [
                {"id": "a", "data": {"name": "A", "reason": "r", "susLevel": "low",
                                     "status": "invited", "createdAt": "2025-12-18T10:00:00Z"}}
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let docs = store(&server).list(&user(), &path()).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "a");
    mock.assert_async().await;
}

#[tokio::test]
async fn upstream_errors_keep_status_and_message() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", GUESTS_PATH)
        .with_status(403)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"missing permissions"}"#)
        .create_async()
        .await;

    let err = store(&server).list(&user(), &path()).await.unwrap_err();
    match err {
        StoreError::Upstream { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "missing permissions");
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn garbage_body_is_a_decode_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", GUESTS_PATH)
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let err = store(&server).list(&user(), &path()).await.unwrap_err();
    assert!(matches!(err, StoreError::Decode(_)));
}

#[tokio::test]
async fn repository_append_asks_for_server_timestamp() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", GUESTS_PATH)
        .match_body(Matcher::PartialJson(json!({
            "data": {"name": "Grinch", "status": "sus", "susLevel": "medium"},
            "serverTimestamp": ["createdAt"]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"id": "doc-9", "data": {
                "name": "Grinch", "reason": "Called the cops on a nap.", "susLevel": "medium",
                "status": "sus", "createdAt": "2025-12-19T08:30:00Z"}})
            .to_string(),
        )
        .create_async()
        .await;

    let repo = RemoteRepository::new(Arc::new(store(&server)), user(), path());
    let draft = GuestDraft::new(
        "Grinch",
        "Called the cops on a nap.",
        SusLevel::Medium,
        GuestStatus::Sus,
    )
    .unwrap();
    let guest = repo.append(draft).await.unwrap();

    assert_eq!(guest.id, "doc-9");
    assert!(guest.created_at.is_some());
    mock.assert_async().await;
}

#[tokio::test]
async fn polling_subscription_mirrors_v2_snapshots() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v1/app-1/public/data/guests_v2/documents")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"documents": [
                {"id": "old", "data": {"name": "Old", "reason": "r", "susLevel": "low",
                                       "status": "invited", "createdAt": "2025-12-18T10:00:00Z"}},
                {"id": "new", "data": {"name": "New", "reason": "r", "susLevel": "high",
                                       "status": "sus", "createdAt": "2025-12-20T10:00:00Z"}},
                {"id": "bad", "data": {"name": "Bad"}}
            ]})
            .to_string(),
        )
        .expect_at_least(1)
        .create_async()
        .await;

    let storage = Arc::new(LocalStorage::open_memory().unwrap());
    let repo = RemoteRepository::for_variant(
        Arc::new(store(&server)),
        user(),
        "app-1",
        QuizVariant::V2,
        storage.clone(),
    );

    let mut sub = repo.subscribe();
    let guests = tokio::time::timeout(Duration::from_secs(2), sub.next())
        .await
        .unwrap()
        .unwrap();
    let ids: Vec<_> = guests.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "old"]);

    // Unchanged collection: polling keeps running but delivers nothing new.
    assert!(
        tokio::time::timeout(Duration::from_millis(150), sub.next())
            .await
            .is_err()
    );
    sub.unsubscribe();

    assert_eq!(storage.load_guests(QuizVariant::V2.local_key()), guests);
}

#[tokio::test]
async fn listener_reports_an_outage_once() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", GUESTS_PATH)
        .with_status(503)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"down for maintenance"}"#)
        .expect_at_least(3)
        .create_async()
        .await;

    let mut listener = store(&server).listen(&user(), &path());
    let first = tokio::time::timeout(Duration::from_secs(2), listener.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(first, Err(StoreError::Upstream { status: 503, .. })));

    // Polling goes on every 20ms, but the repeated failures stay quiet.
    assert!(
        tokio::time::timeout(Duration::from_millis(200), listener.recv())
            .await
            .is_err()
    );
}
