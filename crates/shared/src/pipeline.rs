use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::config::Config;
use crate::extractor::{ContentExtractor, ZyteClient};
use crate::models::EnrichedArticle;
use crate::nyt::fetch_popular;
use crate::report::ReportSynthesizer;
use crate::summarizer::OllamaSummarizer;
use crate::writer::{write_report, DEFAULT_REPORT_PATH};

/// What to fetch and where the finished report goes.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub endpoint: String,
    pub period: u32,
    pub articles: usize,
    pub output: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            endpoint: "viewed".to_string(),
            period: 7,
            articles: 30,
            output: PathBuf::from(DEFAULT_REPORT_PATH),
        }
    }
}

/// Fetch, extract, summarize, synthesize and write the report.
///
/// Every client is built before the first request, so a missing credential
/// stops the run without touching the network. An empty article list still
/// goes to the report model and still produces a document.
pub async fn run(config: &Config, options: &RunOptions) -> Result<PathBuf> {
    let extractor = ContentExtractor::new(ZyteClient::from_config(config)?);
    let summarizer = OllamaSummarizer::from_config(config)?;
    let synthesizer = ReportSynthesizer::from_config(config)?;

    println!(
        "\n📰 Fetching most {} articles ({} days)...",
        options.endpoint, options.period
    );
    let records = fetch_popular(config, &options.endpoint, options.period, options.articles).await?;
    if records.is_empty() {
        warn!("the NYT API returned no articles, the report will have no sources");
    }
    println!("✓ Found {} articles", records.len());

    println!("\n🌐 Extracting article content...");
    let urls: Vec<String> = records.iter().map(|r| r.url.clone()).collect();
    let contents = extractor
        .extract_contents(&urls)
        .await
        .context("Failed to extract article content")?;
    println!("✓ Extracted content from {} articles", contents.len());

    println!("\n🤖 Summarizing articles with the local model...");
    println!("  (This may take a while...)");
    let insights = summarizer.summarize(&contents).await?;
    let structured = insights.iter().filter(|i| i.is_structured()).count();
    println!(
        "✓ Structured insights for {}/{} articles",
        structured,
        insights.len()
    );

    anyhow::ensure!(
        records.len() == insights.len(),
        "Pipeline misaligned: {} articles but {} insight lists",
        records.len(),
        insights.len()
    );

    let articles: Vec<EnrichedArticle> = records
        .into_iter()
        .zip(insights.iter())
        .map(|(record, insights)| EnrichedArticle::new(record, insights))
        .collect();
    debug!(count = articles.len(), "enriched articles");

    println!("\n📝 Generating trend report...");
    let report = synthesizer.synthesize(&articles).await?;

    write_report(&report, &options.output)?;
    println!("\n✅ Data report saved to {}", options.output.display());

    Ok(options.output.clone())
}
