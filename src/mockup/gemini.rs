use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const GEMINI_MODEL: &str = "gemini-2.5-flash";

const SYSTEM_INSTRUCTION: &str = "You are an expert data visualization assistant. \
    You extract structured data from unstructured text to build beautiful timeline infographics.";

/// One stage of the generated timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stage {
    pub name: String,
    pub description: String,
    /// Quantitative or qualitative metric, e.g. "市场份额约 5%".
    pub value: String,
    /// Hex color for the stage block.
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InfographicData {
    pub title: String,
    pub subtitle: String,
    pub stages: Vec<Stage>,
}

impl InfographicData {
    /// Seed dataset shown before the first generation.
    pub fn sample() -> Self {
        Self {
            title: "产品生命周期与市场份额变化".to_string(),
            subtitle: "通过不同阶段的策略调整，实现市场份额的稳步增长与平稳过渡。".to_string(),
            stages: vec![
                Stage {
                    name: "导入期".to_string(),
                    description: "产品刚进入市场，销量较低".to_string(),
                    value: "市场份额约 5%".to_string(),
                    color: "#6aa84f".to_string(),
                },
                Stage {
                    name: "成长期".to_string(),
                    description: "销量快速攀升，加大营销投入".to_string(),
                    value: "份额增长至 25%".to_string(),
                    color: "#f1c232".to_string(),
                },
                Stage {
                    name: "成熟期".to_string(),
                    description: "市场份额达到峰值，优化成本结构".to_string(),
                    value: "份额高达 40%".to_string(),
                    color: "#e69138".to_string(),
                },
                Stage {
                    name: "衰退期".to_string(),
                    description: "市场份额下滑，及时推出升级产品".to_string(),
                    value: "下滑至 15%".to_string(),
                    color: "#cc4125".to_string(),
                },
            ],
        }
    }
}

/// Direct Gemini call used by the mockup flow: one request with a fixed
/// response schema, one strict parse. No retry, no streaming.
pub struct GeminiClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    system_instruction: GeminiSystemInstruction,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: String,
}

#[derive(Deserialize, Debug)]
struct GeminiError {
    message: String,
}

/// Shape the model is forced to reply with: title, subtitle, 4-5 stages.
fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "A catchy title for the infographic based on the content."
            },
            "subtitle": {
                "type": "STRING",
                "description": "A one-sentence summary or subtitle."
            },
            "stages": {
                "type": "ARRAY",
                "description": "Array of 4 to 5 distinct stages/steps identified in the text.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": {
                            "type": "STRING",
                            "description": "Name of the stage (e.g., Introduction, Growth)."
                        },
                        "description": {
                            "type": "STRING",
                            "description": "Short description of what happens in this stage (max 15 words)."
                        },
                        "value": {
                            "type": "STRING",
                            "description": "A quantitative or qualitative metric mentioned (e.g. '15% share', 'High cost')."
                        },
                        "color": {
                            "type": "STRING",
                            "description": "A hex color code suitable for this stage (use a gradient from green to red or distinct colors)."
                        }
                    },
                    "required": ["name", "description", "value", "color"]
                }
            }
        },
        "required": ["title", "subtitle", "stages"]
    })
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_model(api_key, GEMINI_MODEL)
    }

    pub fn with_model(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Reads the key from `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY is not set")?;
        Ok(Self::new(&api_key))
    }

    /// Turn free text into timeline data. Atomic from the caller's view:
    /// the structured result or an error, nothing partial.
    pub async fn generate_infographic(&self, text: &str) -> Result<InfographicData> {
        let prompt = format!(
            "Analyze the following text and structure it into a \"Product Lifecycle\" or \
            \"Process Timeline\" visualization data.\n\
            The output must be in Chinese (Simplified) if the input is Chinese.\n\
            Identify 4 to 5 key stages.\n\n\
            Input Text:\n{}",
            text
        );

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart { text: prompt }],
            }],
            system_instruction: GeminiSystemInstruction {
                parts: vec![GeminiPart {
                    text: SYSTEM_INSTRUCTION.to_string(),
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        };

        let resp = self.client.post(&url).json(&request_body).send().await?;

        if !resp.status().is_success() {
            let error_text = resp.text().await?;
            return Err(anyhow!("Gemini API error: {}", error_text));
        }

        let response_text = resp.text().await?;
        let result: GeminiResponse = serde_json::from_str(&response_text)
            .map_err(|e| anyhow!("Failed to parse Gemini response: {}. Body: {}", e, response_text))?;

        if let Some(err) = result.error {
            return Err(anyhow!("Gemini API returned error: {}", err.message));
        }

        let text = extract_reply_text(&result)
            .ok_or_else(|| anyhow!("Gemini response format unexpected or empty. Body: {}", response_text))?;

        parse_infographic_json(&text)
    }
}

fn extract_reply_text(response: &GeminiResponse) -> Option<String> {
    let first = response.candidates.as_ref()?.first()?;
    match &first.content {
        Some(content) => content.parts.first().map(|p| p.text.clone()),
        None => {
            let reason = first.finish_reason.as_deref().unwrap_or("UNKNOWN");
            log::warn!("Gemini candidate has no content. Finish reason: {}", reason);
            None
        }
    }
}

/// Strict parse of the model reply against the timeline shape.
fn parse_infographic_json(text: &str) -> Result<InfographicData> {
    let clean_json = strip_code_blocks(text);
    let data: InfographicData = serde_json::from_str(&clean_json)
        .context(format!("Failed to parse infographic JSON: {}", clean_json))?;

    if data.stages.is_empty() {
        return Err(anyhow!("Model returned no stages"));
    }
    Ok(data)
}

pub fn strip_code_blocks(s: &str) -> String {
    let s = s.trim();
    if s.starts_with("```json") {
        s.trim_start_matches("```json").trim_end_matches("```").trim().to_string()
    } else if s.starts_with("```") {
        s.trim_start_matches("```").trim_end_matches("```").trim().to_string()
    } else {
        s.to_string()
    }
}
