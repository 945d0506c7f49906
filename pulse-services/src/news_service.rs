//! News aggregation pipeline
//!
//! Runs the resolve -> fetch -> scrape -> filter sequence for one interest,
//! and fans out one pipeline per interest for a ranked interest list. Leaf
//! failures (dead feeds, blocked articles) degrade to fewer results; the
//! pipeline itself never fails — the worst case is an empty article list.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use pulse_core::{Article, FeedEntry};
use pulse_news::{strip_html, truncate_chars, FeedClient, Scraper, TopicTable};

/// Configuration for the aggregation pipeline
#[derive(Debug, Clone)]
pub struct NewsPipelineConfig {
    /// Entries requested from each feed
    pub entries_per_feed: usize,
    /// Pre-scrape pool cap, as a multiple of the requested result count.
    /// Over-fetching absorbs scrape failures downstream while bounding the
    /// worst-case scraping cost.
    pub overfetch_factor: usize,
    /// Concurrent feed fetches per interest
    pub feed_concurrency: usize,
    /// Concurrent article scrapes per interest
    pub scrape_concurrency: usize,
    /// Articles whose content ends up shorter than this are dropped
    pub min_content_chars: usize,
    /// Cap on the feed-summary snippet carried on each article
    pub max_snippet_chars: usize,
}

impl Default for NewsPipelineConfig {
    fn default() -> Self {
        Self {
            entries_per_feed: 8,
            overfetch_factor: 3,
            feed_concurrency: 3,
            scrape_concurrency: 8,
            min_content_chars: 50,
            max_snippet_chars: 200,
        }
    }
}

/// Aggregation pipeline service
pub struct NewsService {
    topics: TopicTable,
    feeds: FeedClient,
    scraper: Scraper,
    config: NewsPipelineConfig,
}

impl NewsService {
    pub fn new(topics: TopicTable, config: NewsPipelineConfig) -> Self {
        Self {
            topics,
            feeds: FeedClient::new(),
            scraper: Scraper::new(),
            config,
        }
    }

    /// Replace the scraper, e.g. to share a scrape cache across services or
    /// shorten timeouts in tests.
    pub fn with_scraper(mut self, scraper: Scraper) -> Self {
        self.scraper = scraper;
        self
    }

    /// Fetch up to `num_results` enriched articles for one interest.
    ///
    /// Articles are returned in scrape-completion order, which is
    /// nondeterministic across runs. Zero results is a normal outcome, not
    /// an error.
    #[instrument(skip(self))]
    pub async fn fetch_news_for_interest(&self, interest: &str, num_results: usize) -> Vec<Article> {
        if num_results == 0 {
            return Vec::new();
        }

        let sources: Vec<String> = self.topics.resolve(interest).to_vec();

        let pools: Vec<Vec<FeedEntry>> = stream::iter(sources.iter().cloned())
            .map(|source| {
                let feeds = &self.feeds;
                let entries_per_feed = self.config.entries_per_feed;
                async move { feeds.fetch_entries(&source, entries_per_feed).await }
            })
            .buffer_unordered(self.config.feed_concurrency)
            .collect()
            .await;

        let mut entries: Vec<FeedEntry> = pools.into_iter().flatten().collect();

        // The same story can arrive via overlapping feeds
        let mut seen = HashSet::new();
        entries.retain(|entry| seen.insert(entry.link.clone()));

        entries.truncate(num_results * self.config.overfetch_factor);
        debug!(
            "Pooled {} entries for interest '{}' ({} sources)",
            entries.len(),
            interest,
            sources.len()
        );

        let mut articles = Vec::with_capacity(num_results);
        let mut scrapes = stream::iter(entries)
            .map(|entry| self.build_article(entry))
            .buffer_unordered(self.config.scrape_concurrency);

        while let Some(built) = scrapes.next().await {
            if let Some(article) = built {
                articles.push(article);
                if articles.len() >= num_results {
                    // Dropping the stream cancels in-flight scrapes and
                    // starts no new ones; late results are discarded.
                    break;
                }
            }
        }
        drop(scrapes);

        info!(
            "Pipeline produced {}/{} articles for interest '{}'",
            articles.len(),
            num_results,
            interest
        );
        articles
    }

    /// Run one pipeline per interest concurrently.
    ///
    /// Every requested interest gets an entry in the result; an interest
    /// whose pipeline task fails outright maps to an empty list without
    /// affecting its siblings.
    #[instrument(skip(self, interests), fields(count = interests.len()))]
    pub async fn fetch_news_for_interests(
        self: &Arc<Self>,
        interests: &[String],
        per_interest: usize,
    ) -> HashMap<String, Vec<Article>> {
        let mut tasks = JoinSet::new();
        for interest in interests {
            let service = Arc::clone(self);
            let interest = interest.clone();
            tasks.spawn(async move {
                let articles = service.fetch_news_for_interest(&interest, per_interest).await;
                (interest, articles)
            });
        }

        let mut news_by_interest = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((interest, articles)) => {
                    news_by_interest.insert(interest, articles);
                }
                Err(e) => {
                    warn!("Interest pipeline task failed: {}", e);
                }
            }
        }

        // A failed task left its interest without an entry
        for interest in interests {
            news_by_interest.entry(interest.clone()).or_default();
        }

        news_by_interest
    }

    /// Build an article from a feed entry, scraping its page for content.
    ///
    /// When scraping yields no text the cleaned feed summary stands in;
    /// entries whose content still falls below the minimum length produce
    /// nothing, since very short content has no downstream value.
    async fn build_article(&self, entry: FeedEntry) -> Option<Article> {
        let scraped = self.scraper.scrape(&entry.link).await;

        let content = match scraped.text {
            Some(text) if !text.is_empty() => text,
            _ => strip_html(&entry.summary),
        };

        if content.chars().count() < self.config.min_content_chars {
            return None;
        }

        let snippet = if entry.summary.is_empty() {
            None
        } else {
            Some(truncate_chars(&entry.summary, self.config.max_snippet_chars))
        };

        Some(Article {
            title: entry.title,
            link: entry.link,
            source: entry.source_name,
            snippet,
            date: entry.published,
            content: Some(content),
            image: scraped.image,
        })
    }
}
