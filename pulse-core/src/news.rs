//! News data structures shared across the aggregation pipeline and API

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A raw entry extracted from one syndication feed.
///
/// Produced by the feed client and consumed by the aggregation pipeline;
/// never persisted and never exposed on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Entry title
    pub title: String,
    /// Link to the full article
    pub link: String,
    /// Feed-provided summary (may contain HTML)
    pub summary: String,
    /// Publication date as the feed reported it
    pub published: Option<String>,
    /// Display name of the feed the entry came from
    pub source_name: String,
}

/// A news article as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Article headline (possibly personalized)
    pub title: String,
    /// Article URL
    pub link: String,
    /// Name of the publishing source
    pub source: String,
    /// Short excerpt from the feed summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Publication date string as reported by the feed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Extracted article body (scraped, or cleaned feed summary)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Lead image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Personalized news response: ranked interests with their article lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalizedNews {
    /// Top-k interests selected by the ranker
    pub recommended_interests: Vec<String>,
    /// Articles grouped by interest
    pub news_by_interest: HashMap<String, Vec<Article>>,
}

/// Qualitative impact bucket for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
}

impl ImpactLevel {
    /// Bucket a numeric impact score: >= 8 is High, >= 6 is Medium.
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            ImpactLevel::High
        } else if score >= 6.0 {
            ImpactLevel::Medium
        } else {
            ImpactLevel::Low
        }
    }
}

/// A single personalized notification derived from a high-impact article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Stable identifier (hash of the article URL)
    pub id: String,
    /// Personalized headline
    pub headline: String,
    /// The article's original headline
    pub original_title: String,
    /// Short summary of the article body
    pub summary: String,
    /// Publishing source name
    pub source: String,
    /// Article URL
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Interest that surfaced the article
    pub interest: String,
    /// Heuristic impact score in the 7.0..=9.0 range
    pub impact_score: f64,
    pub impact_level: ImpactLevel,
    /// Article date, or "Recently" when the feed did not report one
    pub timestamp: String,
}

/// A batch of notifications generated for one profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDigest {
    pub notifications: Vec<Notification>,
    /// RFC 3339 generation time
    pub generated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impact_level_buckets() {
        assert_eq!(ImpactLevel::from_score(9.0), ImpactLevel::High);
        assert_eq!(ImpactLevel::from_score(8.0), ImpactLevel::High);
        assert_eq!(ImpactLevel::from_score(7.9), ImpactLevel::Medium);
        assert_eq!(ImpactLevel::from_score(6.0), ImpactLevel::Medium);
        assert_eq!(ImpactLevel::from_score(5.9), ImpactLevel::Low);
    }

    #[test]
    fn article_omits_empty_optionals() {
        let article = Article {
            title: "Title".to_string(),
            link: "https://example.com/a".to_string(),
            source: "Example".to_string(),
            snippet: None,
            date: None,
            content: None,
            image: None,
        };

        let json = serde_json::to_value(&article).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("snippet"));
        assert!(!obj.contains_key("content"));
        assert!(!obj.contains_key("image"));
    }
}
