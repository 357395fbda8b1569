//! HTTP client for the remote document store.
//!
//! Wire format:
//! - `GET  {base}/v1/{path}/documents` answers `{"documents": [{"id", "data"}]}`
//! - `POST {base}/v1/{path}/documents` with `{"data", "serverTimestamp"}`
//!   answers the stored document.
//!
//! Live listeners poll the collection and forward a snapshot only when it
//! differs from the previous one. While the store keeps failing, only the
//! first error of the run is forwarded.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{CollectionPath, Document, DocumentStore, Listener, Snapshot, CREATED_AT_FIELD};
use crate::error::StoreError;
use crate::identity::UserHandle;

#[derive(Serialize)]
struct AddRequest<'a> {
    data: &'a serde_json::Value,
    #[serde(rename = "serverTimestamp")]
    server_timestamp: [&'static str; 1],
}

#[derive(Deserialize)]
struct ListResponse {
    documents: Vec<Document>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Document store reached over HTTP.
#[derive(Clone)]
pub struct HttpDocumentStore {
    http: Client,
    base_url: Url,
    poll_interval: Duration,
}

impl HttpDocumentStore {
    /// Build a client for `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL does not parse or the HTTP client cannot
    /// be built.
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Self, StoreError> {
        let http = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            poll_interval,
        })
    }

    fn documents_url(&self, path: &CollectionPath) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push("v1")
            .extend(path.segments())
            .push("documents");
        Ok(url)
    }

    async fn check(res: Response) -> Result<Response, StoreError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        // Keep the upstream message when the body carries one.
        let message = res
            .json::<ErrorResponse>()
            .await
            .map(|payload| payload.message)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());
        Err(StoreError::Upstream {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn add(
        &self,
        user: &UserHandle,
        path: &CollectionPath,
        data: serde_json::Value,
    ) -> Result<Document, StoreError> {
        let url = self.documents_url(path)?;
        let res = self
            .http
            .post(url)
            .bearer_auth(user.token())
            .json(&AddRequest {
                data: &data,
                server_timestamp: [CREATED_AT_FIELD],
            })
            .send()
            .await?;
        let res = Self::check(res).await?;
        res.json::<Document>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn list(&self, user: &UserHandle, path: &CollectionPath) -> Result<Snapshot, StoreError> {
        let url = self.documents_url(path)?;
        let res = self
            .http
            .get(url)
            .bearer_auth(user.token())
            .send()
            .await?;
        let res = Self::check(res).await?;
        let body = res
            .json::<ListResponse>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(body.documents)
    }

    fn listen(&self, user: &UserHandle, path: &CollectionPath) -> Listener {
        let store = self.clone();
        let user = user.clone();
        let path = path.clone();
        Listener::spawn(move |tx| async move {
            let mut ticker = tokio::time::interval(store.poll_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            let mut last: Option<Snapshot> = None;
            let mut failing = false;
            loop {
                ticker.tick().await;
                let item = match store.list(&user, &path).await {
                    Ok(docs) => {
                        if failing {
                            tracing::info!(%path, "store reachable again");
                            failing = false;
                        }
                        if last.as_ref() == Some(&docs) {
                            continue;
                        }
                        last = Some(docs.clone());
                        Ok(docs)
                    }
                    // One error per outage.
                    Err(e) if failing => {
                        tracing::debug!(%path, error = %e, "store still unreachable");
                        continue;
                    }
                    Err(e) => {
                        failing = true;
                        Err(e)
                    }
                };
                if tx.send(item).await.is_err() {
                    tracing::debug!(%path, "listener receiver dropped; stopping poll");
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(base: &str) -> HttpDocumentStore {
        HttpDocumentStore::new(base, Duration::from_secs(1), Duration::from_millis(50)).unwrap()
    }

    #[test]
    fn documents_url_encodes_segments() {
        let s = store("http://localhost:9000/api/");
        let url = s
            .documents_url(&CollectionPath::new("my app", "guests"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/api/v1/my%20app/public/data/guests/documents"
        );
    }

    #[test]
    fn rejects_bad_base_url() {
        let err = HttpDocumentStore::new("not a url", Duration::from_secs(1), Duration::from_secs(1));
        assert!(matches!(err, Err(StoreError::InvalidUrl(_))));
    }
}
