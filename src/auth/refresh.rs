use crate::errors::{ApiError, AuthError};
use crate::models::{RefreshRequest, RefreshResponse};
use secrecy::SecretString;

impl super::AuthApi {
    /// Exchanges the stored refresh token for a new access token.
    ///
    /// On success only the access token is rewritten; the stored refresh
    /// token stays in place. A missing refresh token and a server rejection
    /// are both irrecoverable here: storage is cleared before the error
    /// propagates, leaving a clean anonymous state.
    pub async fn refresh_access_token(&self) -> Result<SecretString, AuthError> {
        let Some(refresh) = self.store.refresh_token()? else {
            tracing::warn!("Token refresh requested with no stored refresh token");
            self.store.clear_tokens()?;
            return Err(AuthError::MissingRefreshToken);
        };

        // Concurrent refreshes are not deduplicated: racing calls all hit
        // the endpoint and the last set_tokens wins.
        let request = RefreshRequest { refresh };
        let value = match self.http.post("/auth/token/refresh/", &request, None).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Token refresh rejected: {}", e);
                self.store.clear_tokens()?;
                return Err(e.into());
            }
        };

        let response: RefreshResponse =
            serde_json::from_value(value).map_err(|source| ApiError::Parse { source })?;
        self.store.set_tokens(&response.access, None)?;
        tracing::info!("Access token refreshed");
        Ok(SecretString::new(response.access))
    }
}
