use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use tracing::instrument;

use crate::config::Config;
use crate::openai::{Message, OpenAiClient, ResponsesRequest, TextConfig};

pub const DEFAULT_PROMPT: &str = "Create a 1-day Tokyo itinerary.";

/// A one-day plan split into three parts of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Itinerary {
    pub morning: String,
    pub afternoon: String,
    pub evening: String,
}

impl Itinerary {
    pub const FIELDS: [&'static str; 3] = ["morning", "afternoon", "evening"];

    pub fn schema() -> Value {
        let properties: serde_json::Map<String, Value> = Self::FIELDS
            .iter()
            .map(|field| (field.to_string(), json!({ "type": "string" })))
            .collect();

        json!({
            "type": "object",
            "description": "Structured itinerary: morning, afternoon, evening activities.",
            "properties": properties,
            "required": Self::FIELDS,
            "additionalProperties": false
        })
    }

    pub fn response_format() -> Value {
        json!({
            "type": "json_schema",
            "name": "itinerary",
            "schema": Self::schema(),
            "strict": true
        })
    }
}

impl fmt::Display for Itinerary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Morning:   {}", self.morning)?;
        writeln!(f, "Afternoon: {}", self.afternoon)?;
        write!(f, "Evening:   {}", self.evening)
    }
}

pub fn build_request(prompt: &str, model: &str) -> ResponsesRequest {
    ResponsesRequest {
        model: model.to_string(),
        instructions: None,
        input: vec![Message::user(prompt)],
        text: Some(TextConfig {
            format: Itinerary::response_format(),
        }),
    }
}

pub fn parse_itinerary(text: &str) -> Result<Itinerary> {
    serde_json::from_str(text.trim()).context("Model output does not match the itinerary schema")
}

pub struct ItineraryPlanner {
    client: OpenAiClient,
    model: String,
}

impl ItineraryPlanner {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            OpenAiClient::from_config(config)?,
            config.itinerary_model.clone(),
        ))
    }

    #[instrument(level = "info", skip(self), fields(model = %self.model))]
    pub async fn plan(&self, prompt: &str) -> Result<Itinerary> {
        let reply = self
            .client
            .respond(&build_request(prompt, &self.model))
            .await
            .context("Failed to request itinerary")?;

        parse_itinerary(&reply.output_text())
    }
}
