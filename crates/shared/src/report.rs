use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::config::{Config, ReportCheck};
use crate::models::{EnrichedArticle, NOT_AVAILABLE};
use crate::openai::{Message, OpenAiClient, ResponsesRequest};

pub const REPORT_TITLE: &str = "# Data Report";
pub const DATE_HEADING: &str = "### Date:";
pub const SUMMARY_HEADING: &str = "### Summary:";
pub const SOURCES_HEADING: &str = "### Sources included:";

pub const REPORT_INSTRUCTIONS: &str = r#"You are a senior news analyst with 30 years of experience in editorial trend reporting.

You will receive a JSON array of news items. Each item has:
- title
- published_date
- section
- url
- key_insights

TASK:
Write ONE consolidated news trend brief of 300-400 words that synthesizes the whole set.

ANALYSIS RULES:
1. Identify the overarching themes and emerging trends across the items
2. Point out shifts in policy, market direction and public sentiment only where the inputs support them
3. Write a synthesis; do NOT summarize the items one by one
4. Do NOT include or reference URLs in the brief
5. Do NOT mention "the provided articles" or "the input data"
6. Keep an objective, analytical, professional tone with no hype or speculation

DATES:
- Take the reporting range from the published_date values
- Use the earliest and the most recent date, inclusive
- If every item has the same date, use that single date

OUTPUT FORMAT (these exact headings, in this order, nothing else):
# Data Report
### Date: <earliest published_date> to <most recent published_date>
### Summary:
<300-400 word consolidated trend brief>
### Sources included:
- <title 1> <url 1>
- <title 2> <url 2>
- <title 3> <url 3>"#;

/// Expected reporting range from the articles' `published_date` values.
///
/// Returns `"<earliest> to <latest>"`, a single date when they coincide, or
/// `None` when no article carries a date.
pub fn date_range(articles: &[EnrichedArticle]) -> Option<String> {
    let dates: Vec<&str> = articles
        .iter()
        .map(|a| a.record.published_date.trim())
        .filter(|d| !d.is_empty() && *d != NOT_AVAILABLE)
        .collect();

    let parsed: Option<Vec<NaiveDate>> = dates
        .iter()
        .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .collect();

    let (earliest, latest) = match parsed {
        Some(parsed) => {
            let earliest = parsed.iter().min()?;
            let latest = parsed.iter().max()?;
            (earliest.format("%Y-%m-%d").to_string(), latest.format("%Y-%m-%d").to_string())
        }
        // Mixed formats: fall back to plain string ordering.
        None => {
            let earliest = dates.iter().min()?;
            let latest = dates.iter().max()?;
            (earliest.to_string(), latest.to_string())
        }
    };

    if earliest == latest {
        Some(earliest)
    } else {
        Some(format!("{} to {}", earliest, latest))
    }
}

/// Build the request for the report model: the articles as a JSON array in
/// the only user message, plus the fixed instructions.
pub fn build_request(articles: &[EnrichedArticle], model: &str) -> Result<ResponsesRequest> {
    let payload =
        serde_json::to_string_pretty(articles).context("Failed to serialize articles for report")?;

    Ok(ResponsesRequest {
        model: model.to_string(),
        instructions: Some(REPORT_INSTRUCTIONS.to_string()),
        input: vec![Message::user(payload)],
        text: None,
    })
}

/// Compare a report with the expected section layout.
///
/// Returns a description of each deviation; an empty list means the report
/// looks as requested. This never rejects a report.
pub fn check_report(report: &str, articles: &[EnrichedArticle]) -> Vec<String> {
    let lines: Vec<&str> = report.lines().map(str::trim_end).collect();
    let mut issues = Vec::new();

    if !lines.iter().any(|l| *l == REPORT_TITLE) {
        issues.push(format!("missing title line \"{}\"", REPORT_TITLE));
    }

    match lines.iter().find(|l| l.starts_with(DATE_HEADING)) {
        Some(line) => {
            if let Some(expected) = date_range(articles) {
                let found = line[DATE_HEADING.len()..].trim();
                if found != expected {
                    issues.push(format!(
                        "date line says \"{}\" but articles span \"{}\"",
                        found, expected
                    ));
                }
            }
        }
        None => issues.push(format!("missing \"{}\" line", DATE_HEADING)),
    }

    if !lines.iter().any(|l| *l == SUMMARY_HEADING) {
        issues.push(format!("missing \"{}\" section", SUMMARY_HEADING));
    }

    match lines.iter().position(|l| *l == SOURCES_HEADING) {
        Some(start) => {
            let bullets = lines[start + 1..]
                .iter()
                .filter(|l| l.starts_with("- "))
                .count();
            if bullets != articles.len() {
                issues.push(format!(
                    "sources section lists {} items for {} articles",
                    bullets,
                    articles.len()
                ));
            }
        }
        None => issues.push(format!("missing \"{}\" section", SOURCES_HEADING)),
    }

    issues
}

/// Turns the enriched articles into one narrative trend brief.
pub struct ReportSynthesizer {
    client: OpenAiClient,
    model: String,
    check: ReportCheck,
}

impl ReportSynthesizer {
    pub fn new(client: OpenAiClient, model: impl Into<String>, check: ReportCheck) -> Self {
        Self {
            client,
            model: model.into(),
            check,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            OpenAiClient::from_config(config)?,
            config.report_model.clone(),
            config.report_check,
        ))
    }

    /// One blocking request, no retry. The report comes back as the model
    /// wrote it.
    #[instrument(level = "info", skip_all, fields(articles = articles.len(), model = %self.model))]
    pub async fn synthesize(&self, articles: &[EnrichedArticle]) -> Result<String> {
        let request = build_request(articles, &self.model)?;
        let reply = self
            .client
            .respond(&request)
            .await
            .context("Failed to generate report")?;
        let report = reply.output_text();

        if report.trim().is_empty() {
            warn!("report model returned no text");
        }

        if self.check == ReportCheck::Warn {
            for issue in check_report(&report, articles) {
                warn!(%issue, "report does not match the requested layout");
            }
        }

        info!(chars = report.len(), "report generated");
        Ok(report)
    }
}
