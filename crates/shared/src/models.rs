use serde::{Deserialize, Serialize};

/// Placeholder for any field the news API left out.
pub const NOT_AVAILABLE: &str = "N/A";

/// Article metadata as returned by the Most Popular API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub published_date: String,
    pub section: String,
    pub url: String,
}

/// Key insights for one article.
///
/// The variant records how the model output was interpreted, so callers can
/// tell a schema-conforming answer from free text that was kept as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insights {
    Structured(Vec<String>),
    Fallback(String),
    Empty,
}

impl Insights {
    pub fn as_list(&self) -> Vec<String> {
        match self {
            Insights::Structured(items) => items.clone(),
            Insights::Fallback(text) => vec![text.clone()],
            Insights::Empty => Vec::new(),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Insights::Structured(_))
    }
}

/// An article record together with its insights, in the shape sent to the
/// report model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedArticle {
    #[serde(flatten)]
    pub record: ArticleRecord,
    pub key_insights: Vec<String>,
}

impl EnrichedArticle {
    pub fn new(record: ArticleRecord, insights: &Insights) -> Self {
        Self {
            record,
            key_insights: insights.as_list(),
        }
    }
}
