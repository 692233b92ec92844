use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::core::client::ApiClient;
use crate::stores::settings::LlmProvider;

/// Assembled infographic configuration: template reference, design/style
/// descriptor, extracted data payload and an optional theme override.
/// Replaced wholesale on every generation, never merged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InfographicConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design: Option<Value>,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_config: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    pub text: String,
    pub template_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<LlmProvider>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub config: InfographicConfig,
    /// Server-measured seconds.
    #[serde(default)]
    pub extraction_time: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartGenerateRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<LlmProvider>,
}

/// The smart path classifies the text, picks a template and extracts in
/// one round trip, so the response also names what was chosen.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartGenerateResponse {
    pub config: InfographicConfig,
    pub template_id: String,
    pub template_name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub extraction_time: Option<f64>,
}

#[async_trait]
pub trait GenerateApi: Send + Sync {
    /// Extract structured data for an explicitly chosen template.
    async fn extract(&self, request: &ExtractRequest) -> Result<ExtractResponse>;
    /// One-call path: classification, template selection and extraction.
    async fn smart(&self, request: &SmartGenerateRequest) -> Result<SmartGenerateResponse>;
}

pub struct HttpGenerateApi {
    client: Arc<ApiClient>,
}

impl HttpGenerateApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GenerateApi for HttpGenerateApi {
    async fn extract(&self, request: &ExtractRequest) -> Result<ExtractResponse> {
        self.client.post("/generate/extract", request).await?.into_result()
    }

    async fn smart(&self, request: &SmartGenerateRequest) -> Result<SmartGenerateResponse> {
        self.client.post("/generate/smart", request).await?.into_result()
    }
}
