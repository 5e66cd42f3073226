use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::models::Insights;

pub const MIN_INSIGHTS: usize = 3;
pub const MAX_INSIGHTS: usize = 7;

/// Structured output expected from the local model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInsights {
    pub key_insights: Vec<String>,
}

impl KeyInsights {
    /// JSON schema handed to the model's `format` option.
    pub fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "key_insights": {
                    "type": "array",
                    "description": "List of key insights and important points extracted from the article. Each insight should be a concise, actionable point.",
                    "items": { "type": "string" },
                    "minItems": MIN_INSIGHTS,
                    "maxItems": MAX_INSIGHTS
                }
            },
            "required": ["key_insights"]
        })
    }

    pub fn within_bounds(&self) -> bool {
        (MIN_INSIGHTS..=MAX_INSIGHTS).contains(&self.key_insights.len())
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    format: Value,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Interpret the model's text payload.
///
/// Never fails: empty output becomes [`Insights::Empty`], free text becomes
/// [`Insights::Fallback`], and JSON without a `key_insights` array is treated
/// as empty. Array items that are not strings are kept in their JSON text
/// form (`1`, `true`, `{"a":1}`).
pub fn parse_insights(payload: &str) -> Insights {
    let payload = payload.trim();
    if payload.is_empty() {
        return Insights::Empty;
    }

    let value = match serde_json::from_str::<Value>(payload) {
        Ok(value) => value,
        Err(_) => {
            debug!("model output is not JSON, keeping it as a single insight");
            return Insights::Fallback(payload.to_string());
        }
    };

    let Some(items) = value.get("key_insights").and_then(Value::as_array) else {
        warn!("model output is JSON but has no key_insights array");
        return Insights::Empty;
    };

    let parsed = KeyInsights {
        key_insights: items.iter().map(insight_text).collect(),
    };
    if !parsed.within_bounds() {
        warn!(
            count = parsed.key_insights.len(),
            "model returned an unexpected number of insights"
        );
    }
    Insights::Structured(parsed.key_insights)
}

fn insight_text(item: &Value) -> String {
    match item {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Summarizes articles with a model served by a local Ollama instance.
pub struct OllamaSummarizer {
    client: Client,
    url: String,
    model: String,
}

impl OllamaSummarizer {
    pub fn new(base_url: &str, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: format!("{}/api/generate", base_url.trim_end_matches('/')),
            model: model.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.ollama_url, config.summary_model.clone())
    }

    pub async fn summarize_article(&self, content: &str) -> Result<Insights> {
        let request = GenerateRequest {
            model: &self.model,
            prompt: content,
            format: KeyInsights::schema(),
            stream: false,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Ollama")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Ollama API error ({}): {}", status, error_text);
        }

        let generated = response
            .json::<GenerateResponse>()
            .await
            .context("Failed to parse Ollama response")?;

        Ok(parse_insights(&generated.response))
    }

    /// Summarize each content string in turn. The result has one entry per
    /// input, in the same order.
    #[instrument(level = "info", skip_all, fields(count = contents.len(), model = %self.model))]
    pub async fn summarize(&self, contents: &[String]) -> Result<Vec<Insights>> {
        let mut insights = Vec::with_capacity(contents.len());

        for (index, content) in contents.iter().enumerate() {
            let summary = self
                .summarize_article(content)
                .await
                .with_context(|| format!("Failed to summarize article {}", index + 1))?;
            debug!(index, structured = summary.is_structured(), "summarized article");
            insights.push(summary);
        }

        let structured = insights.iter().filter(|i| i.is_structured()).count();
        info!(structured, total = insights.len(), "summarized articles");
        Ok(insights)
    }
}
