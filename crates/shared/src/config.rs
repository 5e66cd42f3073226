use anyhow::{Context, Result};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

pub const DEFAULT_NYT_BASE_URL: &str = "https://api.nytimes.com";
pub const DEFAULT_ZYTE_URL: &str = "https://api.zyte.com/v1/extract";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub const DEFAULT_SUMMARY_MODEL: &str = "newsanalyst:latest";
pub const DEFAULT_REPORT_MODEL: &str = "gpt-5";
pub const DEFAULT_ITINERARY_MODEL: &str = "gpt-4o-mini";

/// Whether the synthesized report is checked against the expected section layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportCheck {
    #[default]
    Off,
    Warn,
}

impl FromStr for ReportCheck {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "off" | "" => Ok(ReportCheck::Off),
            "warn" => Ok(ReportCheck::Warn),
            other => anyhow::bail!("Invalid REPORT_CHECK value: {}. Use 'off' or 'warn'", other),
        }
    }
}

/// Credentials and endpoints for every stage of the pipeline.
///
/// Built once at startup and handed to each component by reference. Nothing
/// here is written back into the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub nyt_api_key: Option<String>,
    pub zyte_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub nyt_base_url: String,
    pub zyte_url: String,
    pub ollama_url: String,
    pub openai_base_url: String,
    pub summary_model: String,
    pub report_model: String,
    pub itinerary_model: String,
    pub report_check: ReportCheck,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nyt_api_key: None,
            zyte_api_key: None,
            openai_api_key: None,
            nyt_base_url: DEFAULT_NYT_BASE_URL.to_string(),
            zyte_url: DEFAULT_ZYTE_URL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            summary_model: DEFAULT_SUMMARY_MODEL.to_string(),
            report_model: DEFAULT_REPORT_MODEL.to_string(),
            itinerary_model: DEFAULT_ITINERARY_MODEL.to_string(),
            report_check: ReportCheck::Off,
        }
    }
}

impl Config {
    /// Load configuration from the first `.env` file found, falling back to
    /// process environment variables for keys the file does not set.
    pub fn load() -> Result<Self> {
        let file_values = match Self::find_dotenv() {
            Some(path) => Self::read_dotenv(&path)?,
            None => {
                tracing::debug!("no .env file found, using process environment only");
                HashMap::new()
            }
        };

        Self::from_lookup(|key| {
            file_values
                .get(key)
                .cloned()
                .or_else(|| env::var(key).ok())
        })
    }

    /// Build a configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Self::default();

        let config = Self {
            nyt_api_key: get("NYT_API_KEY").or_else(|| get("TEST_API_KEY")),
            zyte_api_key: get("ZYTE_API_KEY"),
            openai_api_key: get("OPENAI_API_KEY"),
            nyt_base_url: defaults.nyt_base_url,
            zyte_url: defaults.zyte_url,
            ollama_url: match get("OLLAMA_URL") {
                Some(url) => Self::checked_url("OLLAMA_URL", url)?,
                None => defaults.ollama_url,
            },
            openai_base_url: defaults.openai_base_url,
            summary_model: get("SUMMARY_MODEL").unwrap_or(defaults.summary_model),
            report_model: get("REPORT_MODEL").unwrap_or(defaults.report_model),
            itinerary_model: get("ITINERARY_MODEL").unwrap_or(defaults.itinerary_model),
            report_check: match get("REPORT_CHECK") {
                Some(value) => value.parse()?,
                None => ReportCheck::Off,
            },
        };

        Ok(config)
    }

    pub fn require_zyte_api_key(&self) -> Result<&str> {
        self.zyte_api_key.as_deref().context(
            "ZYTE_API_KEY not found.\n\n\
            To fix this, add it to the .env file next to NYT_API_KEY and OPENAI_API_KEY:\n  \
            ZYTE_API_KEY=your_key_here",
        )
    }

    pub fn require_openai_api_key(&self) -> Result<&str> {
        self.openai_api_key.as_deref().context(
            "OPENAI_API_KEY not found.\n\n\
            To fix this, add it to the .env file:\n  \
            OPENAI_API_KEY=your_key_here\n\n\
            Get your OpenAI API key from: https://platform.openai.com/api-keys",
        )
    }

    fn checked_url(key: &str, value: String) -> Result<String> {
        Url::parse(&value).with_context(|| format!("{} is not a valid URL: {}", key, value))?;
        Ok(value.trim_end_matches('/').to_string())
    }

    fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
        tracing::debug!(path = %path.display(), "reading configuration file");
        let iter = dotenvy::from_path_iter(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let mut values = HashMap::new();
        for item in iter {
            let (key, value) =
                item.with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            values.insert(key, value);
        }
        Ok(values)
    }

    fn find_dotenv() -> Option<PathBuf> {
        // Locations in order of preference:

        // 1. Current directory (for development)
        let local = PathBuf::from(".env");
        if local.exists() {
            return Some(local);
        }

        // 2. ~/.config/data-report/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("data-report").join(".env");
            if config_path.exists() {
                return Some(config_path);
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                return Some(home_path);
            }
        }

        None
    }
}
