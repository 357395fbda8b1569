//! Identity bootstrap.
//!
//! Resolves an optional [`UserHandle`] at startup: custom token first,
//! anonymous sign-in as the fallback, and no user at all when both fail.
//! Failures are logged, never returned.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// Signed-in user. Required for any remote store access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserHandle {
    uid: String,
    anonymous: bool,
    #[serde(skip_serializing, default)]
    id_token: String,
}

impl UserHandle {
    pub fn new(uid: impl Into<String>, anonymous: bool, id_token: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            anonymous,
            id_token: id_token.into(),
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// Bearer token for store requests.
    pub fn token(&self) -> &str {
        &self.id_token
    }
}

/// Port for the identity service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_token(&self, token: &str) -> Result<UserHandle, IdentityError>;
    async fn sign_in_anonymously(&self) -> Result<UserHandle, IdentityError>;
}

/// Resolve the session user.
///
/// Without a provider there is never a user. A rejected token falls through
/// to anonymous sign-in.
pub async fn bootstrap(
    provider: Option<&dyn IdentityProvider>,
    token: Option<&str>,
) -> Option<UserHandle> {
    let Some(provider) = provider else {
        tracing::info!("no identity provider configured; running local-only");
        return None;
    };

    if let Some(token) = token {
        match provider.sign_in_with_token(token).await {
            Ok(user) => {
                tracing::info!(uid = user.uid(), "signed in with token");
                return Some(user);
            }
            Err(e) => tracing::warn!(error = %e, "token sign-in failed; trying anonymous"),
        }
    }

    match provider.sign_in_anonymously().await {
        Ok(user) => {
            tracing::info!(uid = user.uid(), "signed in anonymously");
            Some(user)
        }
        Err(e) => {
            tracing::warn!(error = %e, "anonymous sign-in failed; running local-only");
            None
        }
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    uid: String,
    id_token: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Identity service reached over HTTP.
///
/// `POST {base}/v1/signInWithToken` and `POST {base}/v1/signInAnonymously`
/// both answer `{"uid", "idToken"}`.
pub struct HttpIdentityProvider {
    http: Client,
    base_url: String,
}

impl HttpIdentityProvider {
    /// Build a client for `base_url`. Every sign-in call gives up after
    /// `request_timeout`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, IdentityError> {
        let http = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn error_message(res: Response) -> String {
        let status = res.status();
        match res.json::<ErrorResponse>().await {
            Ok(payload) => format!("{status}: {}", payload.message),
            Err(_) => status.to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_in_with_token(&self, token: &str) -> Result<UserHandle, IdentityError> {
        let url = format!("{}/v1/signInWithToken", self.base_url);
        let res = self
            .http
            .post(url)
            .json(&TokenRequest { token })
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(IdentityError::TokenRejected(Self::error_message(res).await));
        }
        let body = res.json::<SignInResponse>().await?;
        Ok(UserHandle::new(body.uid, false, body.id_token))
    }

    async fn sign_in_anonymously(&self) -> Result<UserHandle, IdentityError> {
        let url = format!("{}/v1/signInAnonymously", self.base_url);
        let res = self.http.post(url).send().await?;
        if !res.status().is_success() {
            return Err(IdentityError::AnonymousFailed(Self::error_message(res).await));
        }
        let body = res.json::<SignInResponse>().await?;
        Ok(UserHandle::new(body.uid, true, body.id_token))
    }
}
