use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::Config;
use crate::error::{NewsApiError, Result};
use crate::models::{ArticleRecord, NOT_AVAILABLE};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Popularity category of the Most Popular API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Viewed,
    Emailed,
    Shared,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Viewed => "viewed",
            Endpoint::Emailed => "emailed",
            Endpoint::Shared => "shared",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::Viewed => "Most Viewed",
            Endpoint::Emailed => "Most Emailed",
            Endpoint::Shared => "Most Shared",
        }
    }
}

impl FromStr for Endpoint {
    type Err = NewsApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "viewed" => Ok(Endpoint::Viewed),
            "emailed" => Ok(Endpoint::Emailed),
            "shared" => Ok(Endpoint::Shared),
            other => Err(NewsApiError::InvalidEndpoint(other.to_string())),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trailing window, in days, for the popularity ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    pub fn days(&self) -> u32 {
        match self {
            Period::Day => 1,
            Period::Week => 7,
            Period::Month => 30,
        }
    }
}

impl TryFrom<u32> for Period {
    type Error = NewsApiError;

    fn try_from(days: u32) -> Result<Self> {
        match days {
            1 => Ok(Period::Day),
            7 => Ok(Period::Week),
            30 => Ok(Period::Month),
            other => Err(NewsApiError::InvalidPeriod(other)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PopularResponse {
    results: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    title: Option<String>,
    published_date: Option<String>,
    section: Option<String>,
    url: Option<String>,
}

impl From<RawArticle> for ArticleRecord {
    fn from(raw: RawArticle) -> Self {
        let or_na = |field: Option<String>| field.unwrap_or_else(|| NOT_AVAILABLE.to_string());
        Self {
            title: or_na(raw.title),
            published_date: or_na(raw.published_date),
            section: or_na(raw.section),
            url: or_na(raw.url),
        }
    }
}

pub struct NytClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl NytClient {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        api_key: String,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NewsApiError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into(),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .nyt_api_key
            .clone()
            .ok_or(NewsApiError::MissingApiKey)?;
        Self::new(api_key, config.nyt_base_url.trim_end_matches('/'))
    }

    /// Fetch up to `max_articles` of the most popular articles. One attempt,
    /// no retries.
    #[instrument(level = "info", skip_all, fields(endpoint = %endpoint, period = period.days()))]
    pub async fn most_popular(
        &self,
        endpoint: Endpoint,
        period: Period,
        max_articles: usize,
    ) -> Result<Vec<ArticleRecord>> {
        let path = format!(
            "{}/svc/mostpopular/v2/{}/{}.json",
            self.base_url,
            endpoint.as_str(),
            period.days()
        );
        debug!(url = %path, "requesting most popular articles");

        let mut url = Url::parse(&path)
            .map_err(|e| NewsApiError::Request(format!("Invalid NYT API URL {}: {}", path, e)))?;
        url.query_pairs_mut().append_pair("api-key", &self.api_key);

        let response = self.client.get(url).send().await?;

        classify_status(response.status())?;

        let body = response.text().await?;
        let articles = parse_results(&body, max_articles)?;

        info!(count = articles.len(), label = endpoint.label(), "fetched article metadata");
        Ok(articles)
    }
}

/// Validate the request parameters, resolve the API key, and fetch.
///
/// Usage errors are reported before any connection is made.
pub async fn fetch_popular(
    config: &Config,
    endpoint: &str,
    period_days: u32,
    max_articles: usize,
) -> Result<Vec<ArticleRecord>> {
    let endpoint: Endpoint = endpoint.parse()?;
    let period = Period::try_from(period_days)?;
    let client = NytClient::from_config(config)?;

    client.most_popular(endpoint, period, max_articles).await
}

pub fn classify_status(status: StatusCode) -> Result<()> {
    match status {
        StatusCode::OK => Ok(()),
        StatusCode::UNAUTHORIZED => Err(NewsApiError::Unauthorized),
        StatusCode::FORBIDDEN => Err(NewsApiError::Forbidden),
        StatusCode::TOO_MANY_REQUESTS => Err(NewsApiError::RateLimited),
        other => Err(NewsApiError::Status(other.as_u16())),
    }
}

pub fn parse_results(body: &str, max_articles: usize) -> Result<Vec<ArticleRecord>> {
    let response: PopularResponse =
        serde_json::from_str(body).map_err(|e| NewsApiError::Parse(e.to_string()))?;

    Ok(response
        .results
        .into_iter()
        .take(max_articles)
        .map(ArticleRecord::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_NYT_BASE_URL;
    use crate::test_support::{hang_up, serve, silent_listener, was_contacted, Canned};
    use serde_json::json;

    fn config_for(base_url: &str) -> Config {
        Config {
            nyt_api_key: Some("test-key".to_string()),
            nyt_base_url: base_url.to_string(),
            ..Config::default()
        }
    }

    fn sample_results(count: usize) -> serde_json::Value {
        let results: Vec<_> = (0..count)
            .map(|i| {
                json!({
                    "title": format!("Story {}", i),
                    "published_date": "2024-01-05",
                    "section": "World",
                    "url": format!("https://www.nytimes.com/{}", i),
                })
            })
            .collect();
        json!({ "status": "OK", "num_results": count, "results": results })
    }

    #[test]
    fn test_endpoint_parsing() {
        assert_eq!("viewed".parse::<Endpoint>().unwrap(), Endpoint::Viewed);
        assert_eq!("emailed".parse::<Endpoint>().unwrap(), Endpoint::Emailed);
        assert_eq!("shared".parse::<Endpoint>().unwrap(), Endpoint::Shared);
        assert!(matches!(
            "Viewed".parse::<Endpoint>(),
            Err(NewsApiError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!(Period::try_from(1).unwrap(), Period::Day);
        assert_eq!(Period::try_from(7).unwrap().days(), 7);
        assert_eq!(Period::try_from(30).unwrap(), Period::Month);
        assert!(matches!(Period::try_from(3), Err(NewsApiError::InvalidPeriod(3))));
    }

    #[test]
    fn test_classify_status() {
        assert!(classify_status(StatusCode::OK).is_ok());
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED),
            Err(NewsApiError::Unauthorized)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN),
            Err(NewsApiError::Forbidden)
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            Err(NewsApiError::RateLimited)
        ));
        assert!(matches!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE),
            Err(NewsApiError::Status(503))
        ));
        // Other 2xx codes are still unexpected.
        assert!(matches!(
            classify_status(StatusCode::NO_CONTENT),
            Err(NewsApiError::Status(204))
        ));
    }

    #[test]
    fn test_parse_results_limits_in_order() {
        let body = sample_results(20).to_string();
        let articles = parse_results(&body, 5).unwrap();

        assert_eq!(articles.len(), 5);
        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Story 0", "Story 1", "Story 2", "Story 3", "Story 4"]);
    }

    #[test]
    fn test_parse_results_fewer_than_requested() {
        let body = sample_results(3).to_string();
        assert_eq!(parse_results(&body, 30).unwrap().len(), 3);
    }

    #[test]
    fn test_parse_results_defaults_missing_fields() {
        let body = json!({ "results": [{ "title": "Only a title", "section": null }] }).to_string();
        let articles = parse_results(&body, 10).unwrap();

        assert_eq!(
            articles[0],
            ArticleRecord {
                title: "Only a title".into(),
                published_date: "N/A".into(),
                section: "N/A".into(),
                url: "N/A".into(),
            }
        );
    }

    #[test]
    fn test_parse_results_rejects_non_json() {
        let err = parse_results("<html>oops</html>", 5).unwrap_err();
        assert!(matches!(err, NewsApiError::Parse(_)));
        assert!(err.to_string().starts_with("Could not parse the API response"));
    }

    #[tokio::test]
    async fn test_bogus_endpoint_makes_no_request() {
        let (base_url, listener) = silent_listener().await;
        let err = fetch_popular(&config_for(&base_url), "bogus", 7, 5)
            .await
            .unwrap_err();

        assert!(matches!(err, NewsApiError::InvalidEndpoint(_)));
        assert!(err.is_usage());
        assert!(!was_contacted(&listener).await);
    }

    #[tokio::test]
    async fn test_bad_period_makes_no_request() {
        let (base_url, listener) = silent_listener().await;
        let err = fetch_popular(&config_for(&base_url), "viewed", 3, 5)
            .await
            .unwrap_err();

        assert!(matches!(err, NewsApiError::InvalidPeriod(3)));
        assert!(!was_contacted(&listener).await);
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_request() {
        let (base_url, listener) = silent_listener().await;
        let config = Config {
            nyt_api_key: None,
            ..config_for(&base_url)
        };
        let err = fetch_popular(&config, "viewed", 7, 5).await.unwrap_err();

        assert!(matches!(err, NewsApiError::MissingApiKey));
        assert!(!was_contacted(&listener).await);
    }

    #[tokio::test]
    async fn test_fetch_builds_request_and_limits() {
        let (base_url, server) = serve(vec![Canned::json(sample_results(20))]).await;

        let articles = fetch_popular(&config_for(&base_url), "emailed", 30, 5)
            .await
            .unwrap();
        let requests = server.await.unwrap();

        assert_eq!(articles.len(), 5);
        assert_eq!(articles[4].url, "https://www.nytimes.com/4");
        assert!(requests[0].starts_with("GET /svc/mostpopular/v2/emailed/30.json?api-key=test-key "));
    }

    #[tokio::test]
    async fn test_rate_limit_response() {
        let (base_url, server) = serve(vec![Canned::status(429, "Too Many Requests")]).await;

        let err = fetch_popular(&config_for(&base_url), "viewed", 1, 5)
            .await
            .unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, NewsApiError::RateLimited));
        assert_eq!(
            err.to_string(),
            "Rate limit exceeded. Please wait a moment and try again."
        );
    }

    #[tokio::test]
    async fn test_non_json_response() {
        let (base_url, server) =
            serve(vec![Canned::text(200, "OK", "<html>maintenance</html>")]).await;

        let err = fetch_popular(&config_for(&base_url), "shared", 7, 5)
            .await
            .unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, NewsApiError::Parse(_)));
        assert!(!err.is_usage());
    }

    #[test]
    fn test_default_timeout_is_fifteen_seconds() {
        let client = NytClient::from_config(&config_for(DEFAULT_NYT_BASE_URL)).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_unresponsive_server_times_out() {
        // The kernel completes the handshake; nobody ever answers.
        let (base_url, _listener) = silent_listener().await;
        let client =
            NytClient::with_timeout("test-key".to_string(), base_url, Duration::from_millis(200))
                .unwrap();

        let err = client
            .most_popular(Endpoint::Viewed, Period::Week, 5)
            .await
            .unwrap_err();

        assert!(matches!(err, NewsApiError::Timeout));
        assert_eq!(
            err.to_string(),
            "Request timed out. The NYT API is not responding. Please try again."
        );
        assert!(!err.is_usage());
    }

    #[tokio::test]
    async fn test_dropped_connection_is_request_failure() {
        let (base_url, server) = hang_up().await;

        let err = fetch_popular(&config_for(&base_url), "viewed", 7, 5)
            .await
            .unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, NewsApiError::Request(_)));
        assert!(err.to_string().starts_with("Request failed: "));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then drop so the port is very likely closed.
        let (base_url, listener) = silent_listener().await;
        drop(listener);

        let err = fetch_popular(&config_for(&base_url), "viewed", 7, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, NewsApiError::Connect));
    }
}
