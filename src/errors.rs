use keyring;
use thiserror::Error;

/// アプリケーション全体のエラー型
#[derive(Error, Debug)]
pub enum AppError {
    /// 認証関連エラー
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// マーケットプレイスAPI関連エラー
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// トークン保存関連エラー
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// 設定関連エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 汎用エラー
    #[error("{message}")]
    Generic { message: String },
}

/// マーケットプレイスAPI関連エラー
#[derive(Error, Debug)]
pub enum ApiError {
    /// ネットワークエラー
    #[error("Network error: {source}")]
    Network {
        #[source]
        source: reqwest::Error,
    },

    /// 非2xxレスポンス
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// JSONパースエラー
    #[error("Response parsing failed: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    /// ベースURL不正
    #[error("Invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    /// 汎用APIエラー
    #[error("{message}")]
    Generic { message: String },
}

/// 認証関連エラー
#[derive(Error, Debug)]
pub enum AuthError {
    /// アクセストークン未保存
    #[error("Not authenticated. Please log in first.")]
    NotAuthenticated,

    /// リフレッシュトークン未保存
    #[error("No refresh token available. Please log in again.")]
    MissingRefreshToken,

    /// セッション失効（リフレッシュ失敗後）
    #[error("Session expired. Please log in again.")]
    SessionExpired,

    /// APIエラーの伝播
    #[error(transparent)]
    Api(#[from] ApiError),

    /// トークン保存エラーの伝播
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// 汎用認証エラー
    #[error("{reason}")]
    Generic { reason: String },
}

/// トークン保存関連エラー
#[derive(Error, Debug)]
pub enum StorageError {
    /// Keyring操作エラー
    #[error("Keyring error: {source}")]
    Keyring {
        #[source]
        source: keyring::Error,
    },

    /// ファイル入出力エラー
    #[error("Credential file error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },

    /// 資格情報ファイルのパースエラー
    #[error("Credential file parsing failed: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    /// 汎用保存エラー
    #[error("{message}")]
    Generic { message: String },
}

/// 設定関連エラー
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 設定ファイル読み込みエラー
    #[error("Failed to load config file: {source}")]
    LoadError {
        #[source]
        source: std::io::Error,
    },

    /// 設定ファイルパースエラー
    #[error("Failed to parse config file: {source}")]
    ParseError {
        #[source]
        source: toml::de::Error,
    },

    /// 設定バリデーションエラー
    #[error("Configuration validation failed: {reason}")]
    ValidationError { reason: String },

    /// 設定ファイル書き込みエラー
    #[error("Failed to write config file: {source}")]
    WriteError {
        #[source]
        source: std::io::Error,
    },

    /// 汎用設定エラー
    #[error("{message}")]
    Generic { message: String },
}

impl ApiError {
    /// ステータスコードを返す（非2xxレスポンス由来の場合のみ）
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl AuthError {
    /// 基になるHTTPステータスコードを返す
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Api(api) => api.status(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        ApiError::Network { source: error }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::Parse { source: error }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::Api(ApiError::Network { source: error })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::Api(ApiError::Parse { source: error })
    }
}

impl From<keyring::Error> for StorageError {
    fn from(error: keyring::Error) -> Self {
        StorageError::Keyring { source: error }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(error: std::io::Error) -> Self {
        StorageError::Io { source: error }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        ConfigError::LoadError { source: error }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(error: toml::de::Error) -> Self {
        ConfigError::ParseError { source: error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_extraction() {
        let err = ApiError::Status {
            status: 404,
            body: "not found".to_string(),
        };
        assert_eq!(err.status(), Some(404));

        let err = ApiError::Generic {
            message: "boom".to_string(),
        };
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_auth_error_status_passthrough() {
        let err = AuthError::Api(ApiError::Status {
            status: 401,
            body: String::new(),
        });
        assert_eq!(err.status(), Some(401));
        assert_eq!(AuthError::SessionExpired.status(), None);
    }

    #[test]
    fn test_status_error_display_carries_code() {
        let err = ApiError::Status {
            status: 404,
            body: "{\"detail\":\"Not found.\"}".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("404"));
    }

    #[test]
    fn test_app_error_wraps_domains() {
        let app: AppError = AuthError::SessionExpired.into();
        assert!(matches!(app, AppError::Auth(AuthError::SessionExpired)));

        let app: AppError = ConfigError::ValidationError {
            reason: "empty base_url".to_string(),
        }
        .into();
        assert!(app.to_string().contains("Configuration error"));
    }
}
