use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::core::client::ApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Svg,
    Png,
    Pdf,
    Pptx,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub svg_content: String,
    pub format: ExportFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// PPTX only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// PNG only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
}

impl ExportRequest {
    pub fn new(svg_content: impl Into<String>, format: ExportFormat) -> Self {
        Self {
            svg_content: svg_content.into(),
            format,
            filename: None,
            title: None,
            width: None,
            height: None,
            scale: None,
        }
    }
}

/// File descriptor for a finished export. The only retained reference is
/// the download URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub format: String,
    pub filename: String,
    pub filepath: String,
    pub size: u64,
    pub download_url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportFormatInfo {
    pub value: String,
    pub label: String,
    pub description: String,
    pub extension: String,
}

/// Pure string formatting, no network call. The relative form is
/// canonical so a reverse proxy can serve the file.
pub fn download_url(filename: &str) -> String {
    format!("/api/v1/export/download/{}", filename)
}

#[async_trait]
pub trait ExportApi: Send + Sync {
    async fn export(&self, request: &ExportRequest) -> Result<ExportResponse>;
    async fn formats(&self) -> Result<Vec<ExportFormatInfo>>;
    /// Ask the backend to drop a temporary export artifact.
    async fn cleanup(&self, filename: &str) -> Result<()>;
}

pub struct HttpExportApi {
    client: Arc<ApiClient>,
}

impl HttpExportApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExportApi for HttpExportApi {
    async fn export(&self, request: &ExportRequest) -> Result<ExportResponse> {
        self.client.post("/export", request).await?.into_result()
    }

    async fn formats(&self) -> Result<Vec<ExportFormatInfo>> {
        self.client.get("/export/formats").await?.into_result()
    }

    async fn cleanup(&self, filename: &str) -> Result<()> {
        self.client
            .delete::<Value>(&format!("/export/cleanup/{}", filename))
            .await?
            .ok()
    }
}
