use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Confirm, Select, Text};
use std::sync::Arc;
use std::time::Duration;

use text2infographic::api::export::{
    download_url, ExportApi, ExportFormat, ExportRequest, HttpExportApi,
};
use text2infographic::api::generate::{
    GenerateApi, HttpGenerateApi, InfographicConfig, SmartGenerateRequest,
};
use text2infographic::api::templates::{HttpTemplateApi, DEFAULT_MAX_RECOMMENDATIONS};
use text2infographic::api::works::{HttpWorkApi, WorkApi, WorkCreateRequest};
use text2infographic::core::client::ApiClient;
use text2infographic::core::config::ClientConfig;
use text2infographic::core::io::{NativeStorage, Storage};
use text2infographic::mockup::gemini::GeminiClient;
use text2infographic::mockup::renderer::{self, DiagramKind};
use text2infographic::stores::infographic::InfographicStore;
use text2infographic::stores::settings::{LlmProvider, SettingsStore};
use text2infographic::stores::template::TemplateStore;
use text2infographic::stores::workspace::{GenerationMode, ScoredTemplate, WorkspaceStore};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = ClientConfig::load()?;
    let client = Arc::new(ApiClient::new(&config)?);
    let storage: Arc<dyn Storage> = Arc::new(NativeStorage::new());
    let mut settings = SettingsStore::load(storage, &config.settings_path).await;

    println!("text2infographic ({})", client.base_url());

    // First CLI arg is a text file; otherwise prompt for the text.
    let input_text = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file {}", path))?,
        None => Text::new("Input text:").prompt()?,
    };
    if input_text.trim().is_empty() {
        return Err(anyhow!("Input text is empty"));
    }

    let provider = select_provider(&mut settings).await?;

    let mode = Select::new(
        "Generation mode:",
        vec![
            "Smart (auto template selection)",
            "Manual (choose a template)",
            "Mockup (direct Gemini call)",
        ],
    )
    .prompt()?;

    match mode {
        m if m.starts_with("Smart") => run_smart(&client, &input_text, provider).await,
        m if m.starts_with("Manual") => run_manual(&client, &input_text, provider).await,
        _ => run_mockup(&client, &input_text).await,
    }
}

/// The persisted provider choice is offered as the default for this run.
async fn select_provider(settings: &mut SettingsStore) -> Result<LlmProvider> {
    let current = settings.llm_provider();
    let start = match current {
        LlmProvider::System => 0,
        LlmProvider::Dify => 1,
    };
    let label = Select::new("Generation provider:", vec!["system", "dify"])
        .with_starting_cursor(start)
        .prompt()?;

    let provider = if label == "dify" {
        LlmProvider::Dify
    } else {
        LlmProvider::System
    };
    if provider != current {
        settings.set_llm_provider(provider).await?;
    }
    Ok(provider)
}

async fn run_smart(client: &Arc<ApiClient>, text: &str, provider: LlmProvider) -> Result<()> {
    let mut workspace = WorkspaceStore::new();
    workspace.set_input_text(text);
    workspace.set_generation_mode(GenerationMode::Smart);

    let api = HttpGenerateApi::new(client.clone());
    let request = SmartGenerateRequest {
        text: text.to_string(),
        provider: Some(provider),
    };

    workspace.set_generating(true);
    let spinner = spinner("Generating infographic config...");
    let result = api.smart(&request).await;
    spinner.finish_and_clear();
    workspace.set_generating(false);

    let response = result?;
    println!(
        "Selected template: {} ({})",
        response.template_name, response.template_id
    );
    if let Some(content_type) = &response.content_type {
        println!("Classified content type: {}", content_type);
    }

    workspace.set_selected_template(&response.template_id);
    workspace.cache_template_config(&response.template_id, response.config.clone());
    workspace.set_config(response.config.clone());

    print_config(&response.config)?;
    offer_save(client, text, &response.template_id, &response.config).await
}

async fn run_manual(client: &Arc<ApiClient>, text: &str, provider: LlmProvider) -> Result<()> {
    let mut workspace = WorkspaceStore::new();
    workspace.set_input_text(text);
    workspace.set_generation_mode(GenerationMode::Manual);

    let mut templates = TemplateStore::new(Box::new(HttpTemplateApi::new(client.clone())));
    templates.fetch_templates(None, None).await?;
    templates.fetch_categories().await;
    if templates.templates.is_empty() {
        return Err(anyhow!("No templates available"));
    }

    recommend_templates(text, &mut templates, &mut workspace).await?;

    let mut infographic = InfographicStore::new(Box::new(HttpGenerateApi::new(client.clone())));
    infographic.set_user_input_text(text);

    loop {
        let names: Vec<String> = templates
            .templates
            .iter()
            .map(|t| {
                let score = workspace
                    .scored_templates
                    .iter()
                    .find(|s| s.template.id == t.id)
                    .and_then(|s| s.match_score);
                match score {
                    Some(score) => format!("{} [{}] ({}% match)", t.name, t.category, score),
                    None => format!("{} [{}]", t.name, t.category),
                }
            })
            .collect();
        let picked = Select::new("Select template:", names.clone()).prompt()?;
        let index = names
            .iter()
            .position(|n| n == &picked)
            .context("Selection vanished from the list")?;
        let template_id = templates.templates[index].id.clone();
        workspace.set_selected_template(&template_id);

        // Switching back to an already-generated template reuses its config.
        let cached = workspace.get_cached_config(&template_id).cloned();
        let config = match cached {
            Some(config) => {
                println!("Reusing cached config for {}", template_id);
                config
            }
            None => {
                workspace.set_generating(true);
                let spinner = spinner("Extracting structured data...");
                let result = infographic
                    .generate_config(text, &template_id, Some(provider))
                    .await;
                spinner.finish_and_clear();
                workspace.set_generating(false);

                let config = result?;
                workspace.cache_template_config(&template_id, config.clone());
                config
            }
        };
        workspace.set_config(config.clone());

        print_config(&config)?;
        offer_save(client, text, &template_id, &config).await?;

        if !Confirm::new("Try another template?").with_default(false).prompt()? {
            return Ok(());
        }
    }
}

/// Ask the backend for recommendations and annotate the picker with the
/// 0-100 match scores. Failures degrade to an unscored list.
async fn recommend_templates(
    text: &str,
    templates: &mut TemplateStore,
    workspace: &mut WorkspaceStore,
) -> Result<()> {
    if !Confirm::new("Ask for AI template recommendations?")
        .with_default(true)
        .prompt()?
    {
        return Ok(());
    }

    workspace.set_analyzing(true);
    let spinner = spinner("Analyzing text...");
    let result = templates
        .fetch_recommendations(text, DEFAULT_MAX_RECOMMENDATIONS)
        .await;
    spinner.finish_and_clear();
    workspace.set_analyzing(false);

    match result {
        Ok(recs) => {
            for rec in &recs {
                println!("  {:>3}% {} - {}", rec.match_score, rec.template_name, rec.reason);
            }
            let scored = templates
                .templates
                .iter()
                .map(|t| ScoredTemplate {
                    match_score: recs
                        .iter()
                        .find(|r| r.template_id == t.id)
                        .map(|r| r.match_score),
                    template: t.clone(),
                })
                .collect();
            workspace.set_scored_templates(scored);
        }
        Err(e) => log::warn!("Recommendation failed, continuing without scores: {}", e),
    }
    Ok(())
}

/// The prototype path: one direct Gemini call, rendered locally to SVG,
/// optionally pushed through the backend exporter.
async fn run_mockup(client: &Arc<ApiClient>, text: &str) -> Result<()> {
    let gemini = GeminiClient::from_env()?;

    let spinner = spinner("Analyzing with Gemini...");
    let result = gemini.generate_infographic(text).await;
    spinner.finish_and_clear();
    let data = result?;

    let labels: Vec<&str> = DiagramKind::ALL.iter().map(|k| k.label()).collect();
    let picked = Select::new("Diagram kind:", labels).prompt()?;
    let kind = DiagramKind::ALL
        .iter()
        .copied()
        .find(|k| k.label() == picked)
        .unwrap_or_default();

    let svg = renderer::render(&data, kind);
    std::fs::write("infographic.svg", &svg).context("Failed to write infographic.svg")?;
    println!("Wrote infographic.svg ({} stages)", data.stages.len());

    if Confirm::new("Export as PNG via the backend?")
        .with_default(false)
        .prompt()?
    {
        let export = HttpExportApi::new(client.clone());
        let request = ExportRequest {
            width: Some(1200),
            height: Some(675),
            scale: Some(2),
            ..ExportRequest::new(svg, ExportFormat::Png)
        };
        let response = export.export(&request).await?;
        println!("Download: {}", download_url(&response.filename));
    }
    Ok(())
}

async fn offer_save(
    client: &Arc<ApiClient>,
    text: &str,
    template_id: &str,
    config: &InfographicConfig,
) -> Result<()> {
    if !Confirm::new("Save as a work?").with_default(false).prompt()? {
        return Ok(());
    }

    let title = Text::new("Work title:").prompt()?;
    let works = HttpWorkApi::new(client.clone());
    let work = works
        .create(&WorkCreateRequest {
            title,
            template_id: template_id.to_string(),
            input_text: text.to_string(),
            infographic_config: config.clone(),
        })
        .await?;
    println!("Saved work #{} ({})", work.id, work.created_at);
    Ok(())
}

fn print_config(config: &InfographicConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
