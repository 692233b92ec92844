use anyhow::{anyhow, Result};
use log::error;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::core::config::ClientConfig;

/// Uniform envelope every backend endpoint responds with. When `success`
/// is true `data` is present and typed; otherwise `error`/`message`
/// carries a human-readable cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the envelope: application-level failure becomes an error
    /// carrying the server's message.
    pub fn into_result(self) -> Result<T> {
        if !self.success {
            return Err(self.into_failure());
        }
        self.data
            .ok_or_else(|| anyhow!("API response marked success but carried no data"))
    }

    /// For endpoints whose `data` is null (delete, cleanup).
    pub fn ok(self) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(self.into_failure())
        }
    }

    fn into_failure(self) -> anyhow::Error {
        let cause = self
            .error
            .or(self.message)
            .unwrap_or_else(|| "Unknown API error".to_string());
        anyhow!(cause)
    }
}

/// Shared HTTP client. Built once per process; every call decodes the
/// envelope. Transport failures are logged and re-raised to the caller,
/// with no retry: the owning store surfaces them to the user.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Url::parse(&config.base_url)
            .map_err(|e| anyhow!("Invalid API base URL '{}': {}", config.base_url, e))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>> {
        self.execute(self.http.get(self.url(path))).await
    }

    pub async fn get_with_query<Q, T>(&self, path: &str, query: &Q) -> Result<ApiResponse<T>>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.http.get(self.url(path)).query(query)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.http.post(self.url(path)).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>> {
        self.execute(self.http.delete(self.url(path))).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiResponse<T>> {
        let resp = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                error!("API request failed: {}", e);
                return Err(e.into());
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("API request failed: {} {}", status, body);
            return Err(anyhow!("API error {}: {}", status, body));
        }

        // Decode from text so a shape mismatch can report the actual body.
        let body = resp.text().await?;
        match serde_json::from_str(&body) {
            Ok(envelope) => Ok(envelope),
            Err(e) => Err(anyhow!("Failed to parse API response: {}. Body: {}", e, body)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_envelope_success_unwraps_data() {
        let json = r#"{ "success": true, "data": { "config": {} }, "message": "ok" }"#;
        let envelope: ApiResponse<Value> = serde_json::from_str(json).unwrap();
        let data = envelope.into_result().unwrap();
        assert!(data.get("config").is_some());
    }

    #[test]
    fn test_envelope_failure_carries_message() {
        let json = r#"{ "success": false, "error": "模板不存在: t99" }"#;
        let envelope: ApiResponse<Value> = serde_json::from_str(json).unwrap();
        let err = envelope.into_result().unwrap_err();
        assert!(err.to_string().contains("t99"));
    }

    #[test]
    fn test_envelope_success_without_data_is_error() {
        let json = r#"{ "success": true }"#;
        let envelope: ApiResponse<Value> = serde_json::from_str(json).unwrap();
        assert!(envelope.into_result().is_err());
    }

    #[test]
    fn test_envelope_null_data_ok_for_unit_endpoints() {
        let json = r#"{ "success": true, "data": null, "message": "deleted" }"#;
        let envelope: ApiResponse<Value> = serde_json::from_str(json).unwrap();
        assert!(envelope.ok().is_ok());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ClientConfig {
            base_url: "http://localhost:8000/api/v1/".to_string(),
            ..ClientConfig::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.url("/templates"), "http://localhost:8000/api/v1/templates");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..ClientConfig::default()
        };
        assert!(ApiClient::new(&config).is_err());
    }
}
