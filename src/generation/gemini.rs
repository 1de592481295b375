//! Gemini (Google) generation client.
//!
//! Narrative text comes from `generateContent` with a JSON response schema,
//! the location image from the Imagen `predict` endpoint.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument, warn};

use super::{GenerationClient, image_prompt, narrative_prompt};
use crate::config::GeminiConfig;
use crate::models::{AspectRatio, ImageFormat, ImageOptions, Narrative, data_uri};
use crate::{ExplorerError, Result};

const SLOW_RESPONSE: Duration = Duration::from_secs(15);

/// Client for the Gemini generative language API
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
    image_options: ImageOptions,
}

impl GeminiClient {
    /// Create a client from configuration. Fails without an API key.
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ExplorerError::config("Gemini API key is not set"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("LocationExplorer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            image_options: ImageOptions::default(),
        })
    }

    #[must_use]
    pub fn with_image_options(mut self, image_options: ImageOptions) -> Self {
        self.image_options = image_options;
        self
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<String> {
        debug!("Gemini API request URL: {}", url);
        let start = Instant::now();

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;
        let text = error_for_status(response).await?.text().await?;

        let elapsed = start.elapsed();
        if elapsed > SLOW_RESPONSE {
            warn!("Slow Gemini response detected: {:.3}s", elapsed.as_secs_f64());
        }
        Ok(text)
    }
}

async fn error_for_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ExplorerError::api(status.as_u16(), body))
}

#[async_trait]
impl GenerationClient for GeminiClient {
    #[instrument(skip(self))]
    async fn fetch_narrative(&self, query: &str) -> Result<Narrative> {
        let url = self.model_url(&self.text_model, "generateContent");
        let body = GenerateContentRequest::new(narrative_prompt(query));

        let raw = self.post(&url, &body).await?;
        let envelope = GenerateContentResponse::parse(&raw)?;

        if let Some(reason) = envelope
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
        {
            warn!("Narrative prompt blocked: {}", reason);
        }

        let text = envelope.text();
        let narrative = Narrative::parse(&text).inspect_err(|_| {
            error!(payload = %text, "Failed to parse Gemini response as JSON");
        })?;

        if !narrative.has_expected_fact_count() {
            warn!(facts = narrative.facts.len(), "Unexpected number of facts");
        }
        info!(facts = narrative.facts.len(), "Narrative generated");
        Ok(narrative)
    }

    #[instrument(skip(self))]
    async fn fetch_image(&self, query: &str) -> Result<String> {
        let url = self.model_url(&self.image_model, "predict");
        let body = PredictRequest::new(image_prompt(query), &self.image_options);

        let raw = self.post(&url, &body).await?;
        let response: PredictResponse =
            serde_json::from_str(&raw).map_err(|e| ExplorerError::Decode(e.to_string()))?;

        let Some((bytes, mime)) = response.first_image() else {
            for reason in response.filtered_reasons() {
                warn!("Image filtered: {}", reason);
            }
            return Err(ExplorerError::GenerationEmpty);
        };

        base64::engine::general_purpose::STANDARD
            .decode(bytes)
            .map_err(|e| ExplorerError::Decode(e.to_string()))?;

        let mime_type = mime
            .and_then(ImageFormat::from_mime_type)
            .unwrap_or(self.image_options.output_format)
            .mime_type();

        info!(mime_type, "Image generated");
        Ok(data_uri(mime_type, bytes))
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

impl GenerateContentRequest {
    fn new(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![TextPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: narrative_schema(),
            },
        }
    }
}

/// Output schema for the narrative call
fn narrative_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "description": {
                "type": "STRING",
                "description": "A captivating, one-paragraph description of the location."
            },
            "facts": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "A list of 3-5 interesting facts or must-see spots about the location."
            }
        },
        "required": ["description", "facts"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Parse the response envelope, keeping the raw body when it is not JSON
    fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|_| {
            error!(payload = %raw, "Failed to parse Gemini response as JSON");
            ExplorerError::malformed(raw)
        })
    }

    /// Concatenated text of the first candidate
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    aspect_ratio: AspectRatio,
    output_options: OutputOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputOptions {
    mime_type: &'static str,
}

impl PredictRequest {
    fn new(prompt: String, options: &ImageOptions) -> Self {
        Self {
            instances: vec![PredictInstance { prompt }],
            parameters: PredictParameters {
                sample_count: options.count,
                aspect_ratio: options.aspect_ratio,
                output_options: OutputOptions {
                    mime_type: options.output_format.mime_type(),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    rai_filtered_reason: Option<String>,
}

impl PredictResponse {
    fn first_image(&self) -> Option<(&str, Option<&str>)> {
        self.predictions.iter().find_map(|prediction| {
            prediction
                .bytes_base64_encoded
                .as_deref()
                .filter(|bytes| !bytes.is_empty())
                .map(|bytes| (bytes, prediction.mime_type.as_deref()))
        })
    }

    fn filtered_reasons(&self) -> impl Iterator<Item = &str> {
        self.predictions
            .iter()
            .filter_map(|prediction| prediction.rai_filtered_reason.as_deref())
    }
}
