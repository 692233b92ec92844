use anyhow::Result;
use log::error;

use crate::api::templates::{
    Category, RecommendRequest, Template, TemplateApi, TemplateQuery, TemplateRecommendation,
};

/// Recommendation with the confidence surfaced as a 0-100 integer for
/// display.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecommendation {
    pub template_id: String,
    pub template_name: String,
    pub confidence: f64,
    pub match_score: i32,
    pub reason: String,
    pub category: Option<String>,
}

impl From<TemplateRecommendation> for ScoredRecommendation {
    fn from(rec: TemplateRecommendation) -> Self {
        Self {
            match_score: (rec.confidence * 100.0).round() as i32,
            template_id: rec.template_id,
            template_name: rec.template_name,
            confidence: rec.confidence,
            reason: rec.reason,
            category: rec.category,
        }
    }
}

/// Session cache of templates, categories and the latest recommendations.
pub struct TemplateStore {
    api: Box<dyn TemplateApi>,
    pub templates: Vec<Template>,
    pub categories: Vec<Category>,
    pub recommendations: Vec<ScoredRecommendation>,
    pub loading: bool,
}

impl TemplateStore {
    pub fn new(api: Box<dyn TemplateApi>) -> Self {
        Self {
            api,
            templates: Vec::new(),
            categories: Vec::new(),
            recommendations: Vec::new(),
            loading: false,
        }
    }

    /// Fetch the template list, optionally filtered. One page is enough:
    /// the catalog tops out around a hundred entries.
    pub async fn fetch_templates(
        &mut self,
        category: Option<&str>,
        keyword: Option<&str>,
    ) -> Result<()> {
        self.loading = true;

        let query = TemplateQuery {
            category: category.map(str::to_string),
            keyword: keyword.map(str::to_string),
            page: Some(1),
            page_size: Some(100),
        };
        let result = self.api.list(&query).await;
        self.loading = false;

        match result {
            Ok(page) => {
                self.templates = page.templates;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Category fetch failures are logged and leave the list untouched;
    /// categories are decoration, not required state.
    pub async fn fetch_categories(&mut self) {
        match self.api.categories().await {
            Ok(categories) => self.categories = categories,
            Err(e) => error!("Failed to fetch template categories: {}", e),
        }
    }

    pub async fn fetch_recommendations(
        &mut self,
        text: &str,
        max_recommendations: u32,
    ) -> Result<Vec<ScoredRecommendation>> {
        self.loading = true;

        let request = RecommendRequest {
            text: text.to_string(),
            max_recommendations,
        };
        let result = self.api.recommend(&request).await;
        self.loading = false;

        match result {
            Ok(response) => {
                let recs: Vec<ScoredRecommendation> =
                    response.recommendations.into_iter().map(Into::into).collect();
                self.recommendations = recs.clone();
                Ok(recs)
            }
            Err(e) => Err(e),
        }
    }

    /// Linear scan; the list is small and session-local.
    pub fn get_template_by_id(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::templates::{RecommendResponse, TemplatePage};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::Value;

    fn template(id: &str, name: &str) -> Template {
        Template {
            id: id.to_string(),
            name: name.to_string(),
            category: "顺序型".to_string(),
            description: None,
            use_cases: None,
            preview_url: None,
            tags: None,
            data_schema: Value::Null,
            design_config: Value::Null,
        }
    }

    struct MockTemplateApi {
        should_fail: bool,
        confidence: f64,
    }

    #[async_trait]
    impl TemplateApi for MockTemplateApi {
        async fn list(&self, query: &TemplateQuery) -> Result<TemplatePage> {
            if self.should_fail {
                return Err(anyhow!("Mock list error"));
            }
            assert_eq!(query.page, Some(1));
            assert_eq!(query.page_size, Some(100));
            Ok(TemplatePage {
                templates: vec![template("t1", "横向时间轴"), template("t2", "漏斗图")],
                total: 2,
                page: 1,
                page_size: 100,
            })
        }

        async fn get(&self, template_id: &str) -> Result<Template> {
            Ok(template(template_id, "单个模板"))
        }

        async fn categories(&self) -> Result<Vec<Category>> {
            Err(anyhow!("Mock categories error"))
        }

        async fn recommend(&self, request: &RecommendRequest) -> Result<RecommendResponse> {
            if self.should_fail {
                return Err(anyhow!("Mock recommend error"));
            }
            Ok(RecommendResponse {
                recommendations: vec![TemplateRecommendation {
                    template_id: "t1".to_string(),
                    template_name: "横向时间轴".to_string(),
                    confidence: self.confidence,
                    reason: format!("适合: {}", request.text),
                    category: None,
                }],
                analysis_time: Some(1.0),
            })
        }
    }

    fn store(should_fail: bool, confidence: f64) -> TemplateStore {
        TemplateStore::new(Box::new(MockTemplateApi { should_fail, confidence }))
    }

    #[tokio::test]
    async fn test_fetch_templates_and_lookup() -> Result<()> {
        let mut store = store(false, 0.5);
        store.fetch_templates(None, None).await?;

        assert_eq!(store.templates.len(), 2);
        assert_eq!(store.get_template_by_id("t2").unwrap().name, "漏斗图");
        assert!(store.get_template_by_id("missing").is_none());
        assert!(!store.loading);
        Ok(())
    }

    #[tokio::test]
    async fn test_confidence_rounds_to_display_score() -> Result<()> {
        let mut store = store(false, 0.83);
        let recs = store.fetch_recommendations("对比优势与劣势", 5).await?;

        assert_eq!(recs[0].match_score, 83);
        assert_eq!(store.recommendations[0].match_score, 83);
        Ok(())
    }

    #[tokio::test]
    async fn test_rounding_contract_edges() {
        assert_eq!(score_of(0.0), 0);
        assert_eq!(score_of(1.0), 100);
        assert_eq!(score_of(0.835), 84);
        assert_eq!(score_of(0.004), 0);
    }

    fn score_of(confidence: f64) -> i32 {
        ScoredRecommendation::from(TemplateRecommendation {
            template_id: String::new(),
            template_name: String::new(),
            confidence,
            reason: String::new(),
            category: None,
        })
        .match_score
    }

    #[tokio::test]
    async fn test_loading_released_after_failure() {
        let mut store = store(true, 0.0);

        assert!(store.fetch_templates(None, None).await.is_err());
        assert!(!store.loading);

        assert!(store.fetch_recommendations("text", 5).await.is_err());
        assert!(!store.loading);
    }

    #[tokio::test]
    async fn test_categories_failure_leaves_list_untouched() {
        let mut store = store(false, 0.5);
        store.fetch_categories().await;
        assert!(store.categories.is_empty());
    }
}
