use crate::errors::ConfigError;
use crate::utils;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// ベースURLを上書きする環境変数
pub const API_URL_ENV: &str = "TRADEPOST_API_URL";

/// マーケットプレイスAPI設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// APIベースURL（省略可、デフォルト: http://localhost:8000/api）
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// リクエストタイムアウト（秒、省略時はタイムアウトなし）
    #[serde(default)]
    pub request_timeout_sec: Option<u64>,
}

fn default_api_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            request_timeout_sec: None,
        }
    }
}

/// 認証設定
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// 前回ログインに使った識別子（電話番号）。秘密情報は保存しない
    #[serde(default)]
    pub identifier: Option<String>,
}

/// ログ設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// ログレベル（省略可、デフォルト: info）
    #[serde(default = "default_log_level")]
    pub level: String,

    /// ログファイルのパス（省略時はコンソール出力のみ）
    #[serde(default)]
    pub file_path: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_path: None,
        }
    }
}

/// メイン設定構造体
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// マーケットプレイスAPI設定
    #[serde(default)]
    pub api: ApiConfig,

    /// 認証設定
    #[serde(default)]
    pub auth: AuthConfig,

    /// ログ設定
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// 互換性のためのgetterメソッド
    pub fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    pub fn request_timeout_sec(&self) -> Option<u64> {
        self.api.request_timeout_sec
    }

    pub fn saved_identifier(&self) -> Option<&str> {
        self.auth.identifier.as_deref()
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }

    pub fn log_file_path(&self) -> &Option<String> {
        &self.logging.file_path
    }

    /// 実際に使用するベースURLを決定する
    ///
    /// 優先順位: 環境変数 > 設定ファイル > デフォルト値。
    /// 空文字の環境変数は未設定として扱う。
    pub fn resolved_base_url(&self, env_override: Option<String>) -> String {
        match env_override {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => self.api.base_url.clone(),
        }
    }

    /// 設定値の整合性チェック
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                reason: "api.base_url must not be empty".to_string(),
            });
        }
        if self.api.request_timeout_sec == Some(0) {
            return Err(ConfigError::ValidationError {
                reason: "api.request_timeout_sec must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// 設定ファイルのパスを決定する（--config指定があればそれを優先）
fn config_file_path(override_path: Option<&Path>) -> PathBuf {
    match override_path {
        Some(path) => path.to_path_buf(),
        None => utils::get_config_path(),
    }
}

/// 設定ファイルを読み込む
///
/// ファイルが存在しない場合はデフォルト設定を返す。
pub fn load_config(override_path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = config_file_path(override_path);

    let config = if config_path.exists() {
        let contents = fs::read_to_string(config_path)?;
        toml::from_str::<Config>(&contents)?
    } else {
        Config::default()
    };

    config.validate()?;
    Ok(config)
}

/// 設定ファイルを保存する
pub fn save_config(config: &Config, override_path: Option<&Path>) -> Result<(), ConfigError> {
    let config_path = config_file_path(override_path);

    // 設定ディレクトリが存在しない場合は作成
    if let Some(parent_dir) = config_path.parent() {
        if !parent_dir.exists() {
            fs::create_dir_all(parent_dir).map_err(|source| ConfigError::WriteError { source })?;
        }
    }

    let contents = toml::to_string_pretty(config).map_err(|e| ConfigError::Generic {
        message: format!("Failed to serialize config: {e}"),
    })?;
    fs::write(config_path, contents).map_err(|source| ConfigError::WriteError { source })?;
    Ok(())
}
