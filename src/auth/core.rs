use crate::errors::{ApiError, AuthError};
use crate::http_client::HttpClient;
use crate::models::Profile;
use crate::token_store::TokenStore;
use reqwest::Method;
use serde_json::Value;

/// Session state resulting from an auth operation.
///
/// Carried explicitly instead of being inferred from token presence, so
/// callers can tell what an operation did to the session.
#[derive(Debug, Clone)]
pub enum Session {
    Anonymous,
    Authenticated(Profile),
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    pub fn profile(&self) -> Option<&Profile> {
        match self {
            Session::Authenticated(profile) => Some(profile),
            Session::Anonymous => None,
        }
    }
}

/// Facade over the marketplace auth endpoints.
///
/// Owns an HTTP client and an injected token store; every operation that
/// changes the session keeps the store consistent with the server response.
pub struct AuthApi {
    pub(in crate::auth) http: HttpClient,
    pub(in crate::auth) store: TokenStore,
}

impl AuthApi {
    /// Creates the facade. The token store is passed in by the caller so
    /// credential placement stays under the caller's control.
    pub fn new(http: HttpClient, store: TokenStore) -> Self {
        AuthApi { http, store }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// True iff an access token is currently stored.
    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// Sends an authorized request, refreshing the access token once on 401.
    ///
    /// The stored access token (when present) is attached as a bearer
    /// header. A 401 response triggers exactly one refresh followed by one
    /// replay with the re-read token; the `retried` flag guarantees the
    /// replay's own 401 propagates instead of looping. A failed refresh has
    /// already cleared the stored tokens and surfaces as `SessionExpired`,
    /// at which point the caller has to log in again.
    pub async fn send_authorized(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, AuthError> {
        let mut bearer = self.store.access_token()?;
        let mut retried = false;

        loop {
            let result = self
                .http
                .request(method.clone(), path, body.as_ref(), bearer.as_ref())
                .await;

            match result {
                Err(ApiError::Status { status: 401, .. }) if !retried => {
                    tracing::info!("401 from {} {}, attempting token refresh", method, path);
                    self.refresh_access_token().await.map_err(|e| {
                        tracing::warn!("Token refresh after 401 failed: {}", e);
                        AuthError::SessionExpired
                    })?;
                    bearer = self.store.access_token()?;
                    retried = true;
                }
                Err(e) => return Err(e.into()),
                Ok(value) => return Ok(value),
            }
        }
    }
}
