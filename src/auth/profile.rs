use crate::errors::{ApiError, AuthError};
use crate::models::{Profile, ProfileUpdate};
use reqwest::Method;

impl super::AuthApi {
    /// Fetches the authenticated user's profile.
    pub async fn profile(&self) -> Result<Profile, AuthError> {
        let value = self
            .send_authorized(Method::GET, "/auth/profile/", None)
            .await?;
        let profile: Profile =
            serde_json::from_value(value).map_err(|source| ApiError::Parse { source })?;
        Ok(profile)
    }

    /// Updates profile fields. Fields left unset are not sent, so the
    /// server keeps their current values.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, AuthError> {
        let body = serde_json::to_value(update).map_err(|source| ApiError::Parse { source })?;
        let value = self
            .send_authorized(Method::PUT, "/auth/profile/", Some(body))
            .await?;
        let profile: Profile =
            serde_json::from_value(value).map_err(|source| ApiError::Parse { source })?;
        Ok(profile)
    }
}
