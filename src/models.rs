use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 保存される資格情報ペア
///
/// アクセストークンの有無が認証状態の唯一の判定材料となる。
/// 有効期限の検証はクライアント側では一切行わない。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(
        serialize_with = "serialize_secret",
        deserialize_with = "deserialize_secret"
    )]
    pub access_token: SecretString,
    #[serde(
        serialize_with = "serialize_secret_option",
        deserialize_with = "deserialize_secret_option",
        default
    )]
    pub refresh_token: Option<SecretString>,
}

// Custom serialization for SecretString
pub fn serialize_secret<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::ser::Serializer,
{
    serializer.serialize_str(secret.expose_secret())
}

pub fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(SecretString::new(s))
}

// Custom serialization for Option<SecretString>
pub fn serialize_secret_option<S>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::ser::Serializer,
{
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize_secret_option<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.map(SecretString::new))
}

// --- マーケットプレイスのドメインモデル ---

/// マーケットプレイス上のアカウント種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Supplier,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Supplier => "supplier",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            "supplier" => Ok(Role::Supplier),
            other => Err(format!(
                "unknown role '{other}' (expected buyer, seller or supplier)"
            )),
        }
    }
}

/// サーバーが返すユーザープロフィール
///
/// サーバー側のシリアライザ変更に耐えるよう、全フィールドを任意とする。
/// 未知のフィールドは無視される。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

impl Profile {
    /// 表示用の名前（姓名が無ければ電話番号、それも無ければ"unknown"）
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self
                .phone
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

/// プロフィール更新リクエスト（未指定フィールドは送信しない）
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.email.is_none()
    }
}

// --- 認証APIのリクエスト/レスポンスモデル ---

#[derive(Debug, Clone, Serialize)]
pub struct SendCodeRequest {
    pub phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyCodeRequest {
    pub phone: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub phone: String,
    #[serde(serialize_with = "serialize_secret")]
    pub secret: SecretString,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub identifier: String,
    #[serde(serialize_with = "serialize_secret")]
    pub secret: SecretString,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    #[serde(serialize_with = "serialize_secret")]
    pub refresh: SecretString,
}

/// ログイン/登録レスポンス
///
/// トークンの有無はサーバーのフロー次第（例: 電話番号未認証の登録は
/// トークンを返さない）。プロフィールフィールドは同階層に展開される。
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(flatten)]
    pub profile: Profile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_credentials_serialization() {
        let creds = Credentials {
            access_token: SecretString::new("access_value".to_string()),
            refresh_token: Some(SecretString::new("refresh_value".to_string())),
        };

        // Test serialization
        let serialized = serde_json::to_string(&creds).expect("Failed to serialize Credentials");
        assert!(serialized.contains("access_value"));
        assert!(serialized.contains("refresh_value"));

        // Test deserialization
        let deserialized: Credentials =
            serde_json::from_str(&serialized).expect("Failed to deserialize Credentials");
        assert_eq!(deserialized.access_token.expose_secret(), "access_value");
        assert_eq!(
            deserialized
                .refresh_token
                .as_ref()
                .map(|t| t.expose_secret().to_string()),
            Some("refresh_value".to_string())
        );
    }

    #[test]
    fn test_credentials_without_refresh_token() {
        let creds = Credentials {
            access_token: SecretString::new("access_value".to_string()),
            refresh_token: None,
        };

        let serialized = serde_json::to_string(&creds).expect("Failed to serialize Credentials");
        assert!(serialized.contains("null"));

        let deserialized: Credentials =
            serde_json::from_str(&serialized).expect("Failed to deserialize Credentials");
        assert!(deserialized.refresh_token.is_none());

        // Missing key entirely is also tolerated
        let deserialized: Credentials =
            serde_json::from_str(r#"{"access_token":"a"}"#).expect("Failed to deserialize");
        assert!(deserialized.refresh_token.is_none());
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!("buyer".parse::<Role>().unwrap(), Role::Buyer);
        assert_eq!("SELLER".parse::<Role>().unwrap(), Role::Seller);
        assert_eq!("supplier".parse::<Role>().unwrap(), Role::Supplier);
        assert!("admin".parse::<Role>().is_err());

        assert_eq!(serde_json::to_string(&Role::Seller).unwrap(), "\"seller\"");
        let role: Role = serde_json::from_str("\"supplier\"").unwrap();
        assert_eq!(role, Role::Supplier);
        assert_eq!(Role::Buyer.to_string(), "buyer");
    }

    #[test]
    fn test_profile_tolerates_partial_payloads() {
        // Only a couple of fields present, plus an unknown one
        let profile: Profile = serde_json::from_str(
            r#"{"id": 7, "phone": "+15550001111", "unknown_field": true}"#,
        )
        .expect("Failed to deserialize partial profile");
        assert_eq!(profile.id, Some(7));
        assert_eq!(profile.phone.as_deref(), Some("+15550001111"));
        assert!(profile.role.is_none());
        assert!(profile.date_joined.is_none());

        let profile: Profile = serde_json::from_str("{}").expect("Failed to deserialize");
        assert!(profile.id.is_none());
    }

    #[test]
    fn test_profile_display_name() {
        let mut profile = Profile::default();
        assert_eq!(profile.display_name(), "unknown");

        profile.phone = Some("+15550001111".to_string());
        assert_eq!(profile.display_name(), "+15550001111");

        profile.first_name = Some("Ada".to_string());
        assert_eq!(profile.display_name(), "Ada");

        profile.last_name = Some("Lovelace".to_string());
        assert_eq!(profile.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_auth_response_with_and_without_tokens() {
        let response: AuthResponse = serde_json::from_str(
            r#"{"access": "A1", "refresh": "R1", "id": 3, "role": "seller"}"#,
        )
        .expect("Failed to deserialize AuthResponse");
        assert_eq!(response.access.as_deref(), Some("A1"));
        assert_eq!(response.refresh.as_deref(), Some("R1"));
        assert_eq!(response.profile.id, Some(3));
        assert_eq!(response.profile.role, Some(Role::Seller));

        // Registration pending verification returns no tokens
        let response: AuthResponse =
            serde_json::from_str(r#"{"id": 4, "phone": "+15550002222"}"#)
                .expect("Failed to deserialize AuthResponse");
        assert!(response.access.is_none());
        assert!(response.refresh.is_none());
        assert_eq!(response.profile.id, Some(4));
    }

    #[test]
    fn test_login_request_serializes_secret() {
        let request = LoginRequest {
            identifier: "+15550001111".to_string(),
            secret: SecretString::new("hunter2".to_string()),
        };
        let serialized = serde_json::to_string(&request).unwrap();
        assert!(serialized.contains("\"identifier\":\"+15550001111\""));
        assert!(serialized.contains("\"secret\":\"hunter2\""));
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            email: Some("ada@example.com".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
        let serialized = serde_json::to_string(&update).unwrap();
        assert_eq!(serialized, r#"{"email":"ada@example.com"}"#);

        assert!(ProfileUpdate::default().is_empty());
    }
}
