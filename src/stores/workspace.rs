use std::collections::HashMap;

use crate::api::generate::InfographicConfig;
use crate::api::templates::Template;

/// Whether creation is driven by automatic template selection or an
/// explicit user choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationMode {
    #[default]
    Smart,
    Manual,
}

/// Template annotated with its recommendation score, for display ordering
/// in the picker.
#[derive(Debug, Clone)]
pub struct ScoredTemplate {
    pub template: Template,
    pub match_score: Option<i32>,
}

/// Transient editing state for the current session. The per-template
/// configuration cache avoids re-extracting when the user switches
/// templates and back; it is unbounded with explicit invalidation only,
/// which is acceptable because its lifetime equals the session and the
/// template count stays small.
#[derive(Default)]
pub struct WorkspaceStore {
    pub input_text: String,
    pub selected_template_id: Option<String>,
    pub config: Option<InfographicConfig>,
    pub is_analyzing: bool,
    pub is_generating: bool,
    pub generation_mode: GenerationMode,
    pub scored_templates: Vec<ScoredTemplate>,
    config_cache: HashMap<String, InfographicConfig>,
}

impl WorkspaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_input(&self) -> bool {
        !self.input_text.trim().is_empty()
    }

    pub fn has_config(&self) -> bool {
        self.config.is_some()
    }

    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.input_text = text.into();
    }

    pub fn set_selected_template(&mut self, template_id: impl Into<String>) {
        self.selected_template_id = Some(template_id.into());
    }

    pub fn set_config(&mut self, config: InfographicConfig) {
        self.config = Some(config);
    }

    pub fn set_analyzing(&mut self, analyzing: bool) {
        self.is_analyzing = analyzing;
    }

    pub fn set_generating(&mut self, generating: bool) {
        self.is_generating = generating;
    }

    pub fn set_generation_mode(&mut self, mode: GenerationMode) {
        self.generation_mode = mode;
    }

    pub fn set_scored_templates(&mut self, templates: Vec<ScoredTemplate>) {
        self.scored_templates = templates;
    }

    pub fn cache_template_config(
        &mut self,
        template_id: impl Into<String>,
        config: InfographicConfig,
    ) {
        self.config_cache.insert(template_id.into(), config);
    }

    pub fn get_cached_config(&self, template_id: &str) -> Option<&InfographicConfig> {
        self.config_cache.get(template_id)
    }

    pub fn clear_template_cache(&mut self, template_id: &str) {
        self.config_cache.remove(template_id);
    }

    pub fn clear_all_cache(&mut self) {
        self.config_cache.clear();
    }

    /// Back to the documented initial state, cache included.
    pub fn reset(&mut self) {
        self.input_text.clear();
        self.selected_template_id = None;
        self.config = None;
        self.is_analyzing = false;
        self.is_generating = false;
        self.generation_mode = GenerationMode::default();
        self.scored_templates.clear();
        self.config_cache.clear();
    }
}
