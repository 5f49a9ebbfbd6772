use super::Session;
use crate::errors::{ApiError, AuthError};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};

impl super::AuthApi {
    /// Registers a new account.
    ///
    /// Whether tokens come back depends on the server flow (a registration
    /// pending phone verification returns none). Tokens present in the
    /// response are persisted immediately; on any error nothing is written.
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<(Session, AuthResponse), AuthError> {
        let value = self
            .http
            .post("/auth/register/", request, None)
            .await
            .map_err(|e| {
                tracing::error!("Registration failed: {}", e);
                AuthError::from(e)
            })?;

        let response: AuthResponse =
            serde_json::from_value(value).map_err(|source| ApiError::Parse { source })?;
        let session = self.persist_session(&response)?;
        tracing::info!(
            "Registered account for {}",
            response.profile.display_name()
        );
        Ok((session, response))
    }

    /// Logs in with an identifier (phone number) and secret.
    pub async fn login(
        &self,
        identifier: &str,
        secret: SecretString,
    ) -> Result<(Session, AuthResponse), AuthError> {
        let request = LoginRequest {
            identifier: identifier.to_string(),
            secret,
        };
        let value = self
            .http
            .post("/auth/login/", &request, None)
            .await
            .map_err(|e| {
                tracing::error!("Login failed: {}", e);
                AuthError::from(e)
            })?;

        let response: AuthResponse =
            serde_json::from_value(value).map_err(|source| ApiError::Parse { source })?;
        let session = self.persist_session(&response)?;
        if session.is_authenticated() {
            tracing::info!("Logged in as {}", response.profile.display_name());
        } else {
            tracing::warn!("Login response carried no access token");
        }
        Ok((session, response))
    }

    /// Logs out.
    ///
    /// The server call is best effort: its failure is logged and swallowed.
    /// Local tokens are cleared no matter what, so this always ends in an
    /// anonymous session.
    pub async fn logout(&self) -> Result<Session, AuthError> {
        match self.store.refresh_token() {
            Ok(Some(refresh)) => {
                let body = serde_json::json!({ "refresh": refresh.expose_secret() });
                if let Err(e) = self
                    .send_authorized(Method::POST, "/auth/logout/", Some(body))
                    .await
                {
                    tracing::warn!("Server logout failed, clearing local tokens anyway: {}", e);
                }
            }
            Ok(None) => {
                tracing::debug!("No refresh token stored, skipping server logout");
            }
            Err(e) => {
                tracing::warn!("Could not read refresh token for logout: {}", e);
            }
        }

        self.store.clear_tokens()?;
        tracing::info!("Logged out");
        Ok(Session::Anonymous)
    }

    // Persists tokens carried by a login/register response. Access present
    // means the session is authenticated; the refresh token is written only
    // when the response carries one.
    fn persist_session(&self, response: &AuthResponse) -> Result<Session, AuthError> {
        match response.access {
            Some(ref access) => {
                self.store.set_tokens(access, response.refresh.as_deref())?;
                Ok(Session::Authenticated(response.profile.clone()))
            }
            None => Ok(Session::Anonymous),
        }
    }
}
