use crate::config::{self, Config};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// 設定ファイルのパスを取得
pub fn get_config_path() -> PathBuf {
    let mut config_path = dirs::config_dir()
        .unwrap_or_else(|| std::env::current_dir().expect("Current directory not accessible"));
    config_path.push("tradepost");
    config_path.push("config.toml");
    config_path
}

/// 資格情報ファイル（keyringフォールバック）のパスを取得
pub fn get_credentials_path() -> PathBuf {
    let mut credentials_path = dirs::config_dir()
        .unwrap_or_else(|| std::env::current_dir().expect("Current directory not accessible"));
    credentials_path.push("tradepost");
    credentials_path.push("credentials.json");
    credentials_path
}

/// ログファイルのパスを取得
pub fn get_log_file_path(config: &Config) -> PathBuf {
    if let Some(log_file_path) = config.log_file_path() {
        PathBuf::from(log_file_path)
    } else {
        let mut log_path = dirs::config_dir()
            .unwrap_or_else(|| std::env::current_dir().expect("Current directory not accessible"));
        log_path.push("tradepost");
        log_path.push("logs");
        std::fs::create_dir_all(&log_path).unwrap_or_default();
        log_path.push("tradepost.log");
        log_path
    }
}

/// 環境変数からベースURLを読み込むヘルパー
pub fn get_api_url_from_env() -> Option<String> {
    std::env::var(config::API_URL_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// User-Agent文字列を生成
pub fn create_user_agent() -> String {
    format!("tradepost/{}", env!("CARGO_PKG_VERSION"))
}

/// 時間差分を人間 readable な形式に変換
pub fn format_time_ago(timestamp: &DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(*timestamp);

    if duration.num_days() > 0 {
        format!("{} days ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{} hours ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{} minutes ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_config_path_components() {
        let path = get_config_path();
        assert!(path.ends_with("tradepost/config.toml"));
    }

    #[test]
    fn test_credentials_path_components() {
        let path = get_credentials_path();
        assert!(path.ends_with("tradepost/credentials.json"));
    }

    #[test]
    fn test_log_file_path_respects_config() {
        let mut config = Config::default();
        config.logging.file_path = Some("/tmp/custom.log".to_string());
        assert_eq!(get_log_file_path(&config), PathBuf::from("/tmp/custom.log"));
    }

    #[test]
    fn test_create_user_agent() {
        let user_agent = create_user_agent();
        assert!(user_agent.starts_with("tradepost/"));
        assert!(user_agent.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_format_time_ago() {
        let now = Utc::now();
        assert_eq!(format_time_ago(&now), "just now");
        assert_eq!(
            format_time_ago(&(now - Duration::minutes(5))),
            "5 minutes ago"
        );
        assert_eq!(format_time_ago(&(now - Duration::hours(3))), "3 hours ago");
        assert_eq!(format_time_ago(&(now - Duration::days(2))), "2 days ago");
    }
}
