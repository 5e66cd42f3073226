use thiserror::Error;

/// Failures from the NYT Most Popular API.
///
/// The first three variants are usage errors and are raised before any
/// request goes out. The rest come from the single request attempt.
#[derive(Error, Debug)]
pub enum NewsApiError {
    #[error("Invalid endpoint: {0}. Please choose from 'viewed', 'emailed', or 'shared'.")]
    InvalidEndpoint(String),

    #[error("Invalid period: {0}. Please choose from 1, 7, or 30 days.")]
    InvalidPeriod(u32),

    #[error("NYT_API_KEY not found in .env file. Please set it up first.")]
    MissingApiKey,

    #[error("Network error: Could not connect to the NYT API. Check your internet connection.")]
    Connect,

    #[error("Request timed out. The NYT API is not responding. Please try again.")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid API key. Please check your NYT_API_KEY in the .env file.")]
    Unauthorized,

    #[error("Access forbidden. Your API key may not have access to this endpoint.")]
    Forbidden,

    #[error("Rate limit exceeded. Please wait a moment and try again.")]
    RateLimited,

    #[error("API returned an error (HTTP {0}). Please try again later.")]
    Status(u16),

    #[error("Could not parse the API response: {0}")]
    Parse(String),
}

impl NewsApiError {
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            NewsApiError::InvalidEndpoint(_) | NewsApiError::InvalidPeriod(_) | NewsApiError::MissingApiKey
        )
    }
}

impl From<reqwest::Error> for NewsApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            NewsApiError::Connect
        } else if err.is_timeout() {
            NewsApiError::Timeout
        } else {
            NewsApiError::Request(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, NewsApiError>;
