// Public modules
pub mod config;
pub mod error;
pub mod extractor;
pub mod itinerary;
pub mod models;
pub mod nyt;
pub mod openai;
pub mod pipeline;
pub mod report;
pub mod sanitizer;
pub mod summarizer;
pub mod writer;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::{Config, ReportCheck};
pub use error::NewsApiError;
pub use extractor::{ArticleSource, ContentExtractor, ZyteClient};
pub use itinerary::{Itinerary, ItineraryPlanner};
pub use models::{ArticleRecord, EnrichedArticle, Insights};
pub use nyt::{fetch_popular, Endpoint, NytClient, Period};
pub use openai::OpenAiClient;
pub use pipeline::{run, RunOptions};
pub use report::ReportSynthesizer;
pub use sanitizer::sanitize;
pub use summarizer::OllamaSummarizer;
pub use writer::write_report;
