use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::core::client::ApiClient;

pub const DEFAULT_MAX_RECOMMENDATIONS: u32 = 5;

/// A reusable visual/data schema pairing. Immutable on the client; cached
/// in memory per session only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub use_cases: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Shape of the data the template expects.
    #[serde(default)]
    pub data_schema: Value,
    /// Visual design descriptor.
    #[serde(default)]
    pub design_config: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub count: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePage {
    pub templates: Vec<Template>,
    pub total: u32,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub text: String,
    pub max_recommendations: u32,
}

impl RecommendRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
        }
    }
}

/// Transient AI recommendation; not persisted anywhere.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecommendation {
    pub template_id: String,
    pub template_name: String,
    /// In [0,1].
    pub confidence: f64,
    pub reason: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub recommendations: Vec<TemplateRecommendation>,
    #[serde(default)]
    pub analysis_time: Option<f64>,
}

#[async_trait]
pub trait TemplateApi: Send + Sync {
    async fn list(&self, query: &TemplateQuery) -> Result<TemplatePage>;
    async fn get(&self, template_id: &str) -> Result<Template>;
    async fn categories(&self) -> Result<Vec<Category>>;
    async fn recommend(&self, request: &RecommendRequest) -> Result<RecommendResponse>;
}

pub struct HttpTemplateApi {
    client: Arc<ApiClient>,
}

impl HttpTemplateApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TemplateApi for HttpTemplateApi {
    async fn list(&self, query: &TemplateQuery) -> Result<TemplatePage> {
        self.client.get_with_query("/templates", query).await?.into_result()
    }

    async fn get(&self, template_id: &str) -> Result<Template> {
        self.client
            .get(&format!("/templates/{}", template_id))
            .await?
            .into_result()
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        self.client.get("/templates/categories").await?.into_result()
    }

    async fn recommend(&self, request: &RecommendRequest) -> Result<RecommendResponse> {
        self.client.post("/templates/recommend", request).await?.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parsing_with_sparse_fields() {
        let json = r#"{
            "id": "timeline-horizontal",
            "name": "横向时间轴",
            "category": "顺序型",
            "dataSchema": { "items": "array" },
            "designConfig": { "layout": "horizontal" }
        }"#;

        let template: Template = serde_json::from_str(json).unwrap();
        assert_eq!(template.id, "timeline-horizontal");
        assert!(template.description.is_none());
        assert_eq!(template.design_config["layout"], "horizontal");
    }

    #[test]
    fn test_page_parsing() {
        let json = r#"{
            "templates": [],
            "total": 42,
            "page": 1,
            "pageSize": 20
        }"#;

        let page: TemplatePage = serde_json::from_str(json).unwrap();
        assert_eq!(page.total, 42);
        assert_eq!(page.page_size, 20);
    }

    #[test]
    fn test_recommend_request_default_cap() {
        let request = RecommendRequest::new("年度增长分为四个阶段");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["maxRecommendations"], 5);
    }

    #[test]
    fn test_query_serializes_only_set_fields() {
        let query = TemplateQuery {
            category: Some("对比型".to_string()),
            ..TemplateQuery::default()
        };
        let encoded = serde_json::to_string(&query).unwrap();
        assert!(encoded.contains("category"));
        assert!(!encoded.contains("keyword"));
        assert!(!encoded.contains("pageSize"));
    }

    #[test]
    fn test_recommendation_parsing() {
        let json = r#"{
            "recommendations": [
                {
                    "templateId": "swot-classic",
                    "templateName": "SWOT分析",
                    "confidence": 0.83,
                    "reason": "文本包含优势与劣势对比",
                    "category": "对比型"
                }
            ],
            "analysisTime": 1.8
        }"#;

        let response: RecommendResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.recommendations.len(), 1);
        assert_eq!(response.recommendations[0].confidence, 0.83);
        assert_eq!(response.analysis_time, Some(1.8));
    }
}
