use crate::errors::AuthError;
use crate::models::{SendCodeRequest, VerifyCodeRequest};
use serde_json::Value;

impl super::AuthApi {
    /// Requests an SMS verification code for the given phone number.
    ///
    /// The server acknowledgement is opaque and returned as-is. Phone
    /// format checks are left to the server.
    pub async fn send_verification_code(&self, phone: &str) -> Result<Value, AuthError> {
        let request = SendCodeRequest {
            phone: phone.to_string(),
        };
        let ack = self
            .http
            .post("/auth/send-sms/", &request, None)
            .await
            .map_err(|e| {
                tracing::error!("Verification code request failed: {}", e);
                AuthError::from(e)
            })?;

        tracing::info!("Verification code requested for {}", mask_phone(phone));
        Ok(ack)
    }

    /// Submits the SMS code the user received.
    pub async fn verify_code(&self, phone: &str, code: &str) -> Result<Value, AuthError> {
        let request = VerifyCodeRequest {
            phone: phone.to_string(),
            code: code.to_string(),
        };
        let ack = self
            .http
            .post("/auth/verify-sms/", &request, None)
            .await
            .map_err(|e| {
                tracing::error!("Code verification failed: {}", e);
                AuthError::from(e)
            })?;

        tracing::info!("Phone {} verified", mask_phone(phone));
        Ok(ack)
    }
}

// Keep full phone numbers out of the logs
fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    let visible = 4.min(chars.len());
    let masked_len = chars.len() - visible;
    let mut masked = "*".repeat(masked_len);
    masked.extend(&chars[masked_len..]);
    masked
}
