use anyhow::Result;

use crate::api::generate::{ExtractRequest, GenerateApi, InfographicConfig};
use crate::stores::settings::LlmProvider;

/// Holds the infographic currently being worked on: the latest generated
/// configuration, its rendered SVG markup and the source text.
pub struct InfographicStore {
    api: Box<dyn GenerateApi>,
    pub current_config: Option<InfographicConfig>,
    pub current_svg: String,
    pub user_input_text: String,
    pub loading: bool,
    pub error: Option<String>,
}

impl InfographicStore {
    pub fn new(api: Box<dyn GenerateApi>) -> Self {
        Self {
            api,
            current_config: None,
            current_svg: String::new(),
            user_input_text: String::new(),
            loading: false,
            error: None,
        }
    }

    pub fn set_user_input_text(&mut self, text: impl Into<String>) {
        self.user_input_text = text.into();
    }

    pub fn set_svg_content(&mut self, svg: impl Into<String>) {
        self.current_svg = svg.into();
    }

    /// Extract a configuration for the chosen template. Only the `config`
    /// part of the payload is kept; the caller receives the same value.
    /// The loading flag is released on every exit path.
    pub async fn generate_config(
        &mut self,
        text: &str,
        template_id: &str,
        provider: Option<LlmProvider>,
    ) -> Result<InfographicConfig> {
        self.loading = true;
        self.error = None;

        let request = ExtractRequest {
            text: text.to_string(),
            template_id: template_id.to_string(),
            provider,
        };
        let result = self.api.extract(&request).await;
        self.loading = false;

        match result {
            Ok(response) => {
                self.current_config = Some(response.config.clone());
                Ok(response.config)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn reset(&mut self) {
        self.current_config = None;
        self.current_svg.clear();
        self.user_input_text.clear();
        self.error = None;
    }
}
