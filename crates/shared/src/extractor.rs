use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, error, info, instrument};

use crate::config::Config;
use crate::sanitizer::sanitize;

/// Something that can return the body text of an article given its URL.
pub trait ArticleSource {
    fn article_body(&self, url: &str) -> impl Future<Output = Result<String>>;
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    url: &'a str,
    article: bool,
}

#[derive(Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    article: Option<Article>,
}

#[derive(Deserialize)]
struct Article {
    #[serde(rename = "articleBody", default)]
    article_body: Option<String>,
}

/// Client for the Zyte extraction API in article mode.
pub struct ZyteClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl ZyteClient {
    pub fn new(api_key: String, endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.require_zyte_api_key()?.to_string();
        Self::new(api_key, config.zyte_url.clone())
    }
}

impl ArticleSource for ZyteClient {
    async fn article_body(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.api_key, Some(""))
            .json(&ExtractRequest { url, article: true })
            .send()
            .await
            .context("Failed to send request to Zyte API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Zyte API error ({}): {}", status, error_text);
        }

        let extracted = response
            .json::<ExtractResponse>()
            .await
            .context("Failed to parse Zyte API response")?;

        Ok(extracted
            .article
            .and_then(|a| a.article_body)
            .unwrap_or_default())
    }
}

pub struct ContentExtractor<S> {
    source: S,
}

impl<S: ArticleSource> ContentExtractor<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetch and sanitize each article body, one URL at a time.
    ///
    /// The output lines up with `urls`. If any URL fails the whole call fails,
    /// so no partial list is ever returned.
    #[instrument(level = "info", skip_all, fields(count = urls.len()))]
    pub async fn extract_contents(&self, urls: &[String]) -> Result<Vec<String>> {
        let mut contents = Vec::with_capacity(urls.len());

        for url in urls {
            let body = match self.source.article_body(url).await {
                Ok(body) => body,
                Err(e) => {
                    error!(%url, error = %e, "error extracting article content");
                    return Err(e.context(format!("Error extracting content from {}", url)));
                }
            };

            let cleaned = sanitize(&body);
            debug!(%url, raw_len = body.len(), cleaned_len = cleaned.len(), "extracted article");
            contents.push(cleaned);
        }

        info!(count = contents.len(), "extracted all article contents");
        Ok(contents)
    }
}
