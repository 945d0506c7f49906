//! Personalized news orchestration
//!
//! Drives the LLM around the aggregation pipeline: rank the profile's
//! interests, fan out the pipeline per selected interest, then rewrite
//! headlines to show personal impact. Ranking failures are hard failures
//! (nothing to aggregate without the selected interests); headline
//! failures fall back to the original title per article.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use pulse_core::{
    Article, ImpactLevel, Notification, NotificationDigest, PersonalizedNews, PulseError,
    UserProfile,
};
use pulse_llm::LlmClient;
use pulse_news::truncate_chars;

use crate::news_service::NewsService;

/// Articles fetched per interest for the personalized feed
const ARTICLES_PER_INTEREST: usize = 5;

/// Articles fetched per interest when building a notification digest
const DIGEST_ARTICLES_PER_INTEREST: usize = 3;

/// Cap on notifications per digest
const MAX_NOTIFICATIONS: usize = 5;

/// Concurrent headline rewrites per interest
const HEADLINE_CONCURRENCY: usize = 4;

/// LLM-driven personalization over the aggregation pipeline
pub struct Personalizer {
    llm: Arc<LlmClient>,
    news: Arc<NewsService>,
}

impl Personalizer {
    pub fn new(llm: Arc<LlmClient>, news: Arc<NewsService>) -> Self {
        Self { llm, news }
    }

    /// Rank interests, aggregate news per selected interest, and rewrite
    /// every headline for personal impact.
    ///
    /// Articles whose link appears in `read_urls` are dropped before any
    /// headline work.
    #[instrument(skip(self, profile, read_urls))]
    pub async fn personalized_news(
        &self,
        profile: &UserProfile,
        read_urls: &HashSet<String>,
    ) -> Result<PersonalizedNews, PulseError> {
        let interests = self.llm.rank_interests(profile).await?;

        let mut news_by_interest = self
            .news
            .fetch_news_for_interests(&interests, ARTICLES_PER_INTEREST)
            .await;
        filter_read(&mut news_by_interest, read_urls);

        let mut personalized = HashMap::new();
        for (interest, articles) in news_by_interest {
            let rewritten = self
                .rewrite_headlines(profile, &interest, articles)
                .await;
            personalized.insert(interest, rewritten);
        }

        Ok(PersonalizedNews {
            recommended_interests: interests,
            news_by_interest: personalized,
        })
    }

    /// Build a digest of up to five high-impact notifications.
    #[instrument(skip(self, profile))]
    pub async fn notifications(
        &self,
        profile: &UserProfile,
    ) -> Result<NotificationDigest, PulseError> {
        let interests = self.llm.rank_interests(profile).await?;

        let news_by_interest = self
            .news
            .fetch_news_for_interests(&interests, DIGEST_ARTICLES_PER_INTEREST)
            .await;

        // Flatten in ranked-interest order before capping so the strongest
        // interests fill the digest first
        let mut pool: Vec<(String, Article)> = Vec::new();
        for interest in &interests {
            if let Some(articles) = news_by_interest.get(interest) {
                for article in articles {
                    pool.push((interest.clone(), article.clone()));
                }
            }
        }
        pool.truncate(MAX_NOTIFICATIONS);

        let mut notifications = Vec::with_capacity(pool.len());
        for (interest, article) in pool {
            let headline = match self
                .llm
                .personalize_headline(profile, &interest, &article)
                .await
            {
                Ok(headline) => headline,
                Err(e) => {
                    warn!("Headline personalization failed, keeping original: {}", e);
                    article.title.clone()
                }
            };
            notifications.push(build_notification(headline, &interest, article));
        }

        Ok(NotificationDigest {
            notifications,
            generated_at: Utc::now().to_rfc3339(),
        })
    }

    /// Rewrite the headlines of one interest's articles, preserving order.
    async fn rewrite_headlines(
        &self,
        profile: &UserProfile,
        interest: &str,
        articles: Vec<Article>,
    ) -> Vec<Article> {
        stream::iter(articles)
            .map(|article| async move {
                match self
                    .llm
                    .personalize_headline(profile, interest, &article)
                    .await
                {
                    Ok(headline) => Article {
                        title: headline,
                        ..article
                    },
                    Err(e) => {
                        debug!("Keeping original headline for {}: {}", article.link, e);
                        article
                    }
                }
            })
            .buffered(HEADLINE_CONCURRENCY)
            .collect()
            .await
    }
}

/// Drop articles the user has already read.
pub fn filter_read(news_by_interest: &mut HashMap<String, Vec<Article>>, read_urls: &HashSet<String>) {
    if read_urls.is_empty() {
        return;
    }
    for articles in news_by_interest.values_mut() {
        articles.retain(|article| !read_urls.contains(&article.link));
    }
}

fn build_notification(headline: String, interest: &str, article: Article) -> Notification {
    let content_chars = article
        .content
        .as_deref()
        .map(|c| c.chars().count())
        .unwrap_or(0);
    let impact_score = impact_score(content_chars);

    let summary = article
        .content
        .as_deref()
        .map(|c| truncate_chars(c, 200))
        .filter(|s| !s.is_empty())
        .or_else(|| article.snippet.clone())
        .unwrap_or_default();

    Notification {
        id: article_id(&article.link),
        headline,
        original_title: article.title,
        summary,
        source: article.source,
        link: article.link,
        image: article.image,
        interest: interest.to_string(),
        impact_score,
        impact_level: ImpactLevel::from_score(impact_score),
        timestamp: article.date.unwrap_or_else(|| "Recently".to_string()),
    }
}

/// Longer articles score higher; clamped to the 7.0..=9.0 band.
fn impact_score(content_chars: usize) -> f64 {
    let score = 7.0 + content_chars as f64 / 500.0;
    (score.min(9.0) * 10.0).round() / 10.0
}

/// Stable article identifier: first 8 bytes of the URL's SHA-256, hex-encoded.
fn article_id(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(&hasher.finalize()[..8])
}
