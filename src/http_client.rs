use crate::errors::ApiError;
use crate::utils;
use reqwest::{Client, Method};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// マーケットプレイスAPIクライアント
///
/// ベースURLと相対パスからリクエストを組み立てる薄いラッパー。
/// リトライやキャッシュは行わない。再送は認証ファサードの401ハンドリング
/// のみが担当する。
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// 新しいAPIクライアントを作成
    ///
    /// ベースURLはこの時点で検証する。タイムアウトは指定時のみ設定され、
    /// 未指定ならリクエストは完了かトランスポートエラーまで待ち続ける。
    pub fn new(base_url: &str, timeout_sec: Option<u64>) -> Result<Self, ApiError> {
        Url::parse(base_url).map_err(|_| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
        })?;

        let mut builder = Client::builder().user_agent(utils::create_user_agent());
        if let Some(secs) = timeout_sec {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Network { source: e })?;

        Ok(HttpClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// APIベースURLを取得
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 単一のリクエスト/レスポンスサイクルを実行
    ///
    /// 成功時はパース済みJSON（空ボディはNull）。非2xxはステータスコードと
    /// レスポンスボディを持つエラーになる。
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        bearer: Option<&SecretString>,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint_url(path);
        tracing::debug!("{} {}", method, url);

        let mut request_builder = self.client.request(method.clone(), &url);
        if let Some(token) = bearer {
            request_builder = request_builder
                .header("Authorization", format!("Bearer {}", token.expose_secret()));
        }
        if let Some(body) = body {
            request_builder = request_builder.json(body);
        }

        let response = request_builder.send().await.map_err(|e| {
            tracing::error!("{} {} failed: {}", method, url, e);
            ApiError::Network { source: e }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network { source: e })?;

        if !status.is_success() {
            tracing::warn!("{} {} returned {}", method, url, status.as_u16());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|source| ApiError::Parse { source })
    }

    /// GETリクエストを送信
    pub async fn get(&self, path: &str, bearer: Option<&SecretString>) -> Result<Value, ApiError> {
        self.request(Method::GET, path, None, bearer).await
    }

    /// JSONボディ付きのPOSTリクエストを送信
    pub async fn post<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&SecretString>,
    ) -> Result<Value, ApiError> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, Some(&body), bearer).await
    }

    /// JSONボディ付きのPUTリクエストを送信
    pub async fn put<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&SecretString>,
    ) -> Result<Value, ApiError> {
        let body = serde_json::to_value(body)?;
        self.request(Method::PUT, path, Some(&body), bearer).await
    }

    fn endpoint_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}
