use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::api::generate::InfographicConfig;
use crate::core::client::ApiClient;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkCreateRequest {
    pub title: String,
    pub template_id: String,
    pub input_text: String,
    pub infographic_config: InfographicConfig,
}

/// A saved artifact. Created by an explicit save action; read-only from
/// the client afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub id: i64,
    pub title: String,
    pub template_id: String,
    pub input_text: String,
    pub infographic_config: InfographicConfig,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkPage {
    pub works: Vec<Work>,
    pub total: u32,
    pub page: u32,
    pub page_size: u32,
}

#[async_trait]
pub trait WorkApi: Send + Sync {
    async fn create(&self, request: &WorkCreateRequest) -> Result<Work>;
    async fn list(&self, page: u32, page_size: u32) -> Result<WorkPage>;
    async fn get(&self, id: i64) -> Result<Work>;
    async fn delete(&self, id: i64) -> Result<()>;
}

pub struct HttpWorkApi {
    client: Arc<ApiClient>,
}

impl HttpWorkApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WorkApi for HttpWorkApi {
    async fn create(&self, request: &WorkCreateRequest) -> Result<Work> {
        self.client.post("/works", request).await?.into_result()
    }

    async fn list(&self, page: u32, page_size: u32) -> Result<WorkPage> {
        let query = [("page", page), ("pageSize", page_size)];
        self.client.get_with_query("/works", &query).await?.into_result()
    }

    async fn get(&self, id: i64) -> Result<Work> {
        self.client.get(&format!("/works/{}", id)).await?.into_result()
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete::<Value>(&format!("/works/{}", id)).await?.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_parsing() {
        let json = r#"{
            "id": 7,
            "title": "产品生命周期",
            "templateId": "timeline-horizontal",
            "inputText": "产品分为四个阶段……",
            "infographicConfig": { "data": { "items": [] } },
            "createdAt": "2025-06-01T09:30:00Z",
            "updatedAt": "2025-06-01T09:30:00Z"
        }"#;

        let work: Work = serde_json::from_str(json).unwrap();
        assert_eq!(work.id, 7);
        assert_eq!(work.template_id, "timeline-horizontal");
        assert_eq!(work.created_at, work.updated_at);
    }

    #[test]
    fn test_create_request_wire_shape() {
        let request = WorkCreateRequest {
            title: "测试作品".to_string(),
            template_id: "t1".to_string(),
            input_text: "text".to_string(),
            infographic_config: InfographicConfig {
                template: Some("t1".to_string()),
                design: None,
                data: serde_json::json!({}),
                theme_config: None,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["templateId"], "t1");
        assert_eq!(json["inputText"], "text");
        assert!(json["infographicConfig"].get("design").is_none());
    }
}
