//! Topic table mapping interests to curated feed sources

use tracing::warn;

/// Key of the fallback topic used when no other key matches.
const GENERAL: &str = "general";

/// Immutable mapping from topic keys to ordered feed source URLs.
///
/// Loaded once at startup and shared read-only; tests inject small tables
/// pointing at local fake servers instead of the built-in one.
#[derive(Debug, Clone)]
pub struct TopicTable {
    topics: Vec<(String, Vec<String>)>,
}

impl TopicTable {
    /// Build a table from `(key, sources)` pairs. Keys are lowercased;
    /// definition order is preserved and drives substring matching.
    pub fn new(topics: Vec<(String, Vec<String>)>) -> Self {
        let topics = topics
            .into_iter()
            .map(|(key, sources)| (key.to_lowercase(), sources))
            .collect();
        Self { topics }
    }

    /// The curated production table.
    pub fn builtin() -> Self {
        fn entry(key: &str, sources: &[&str]) -> (String, Vec<String>) {
            (
                key.to_string(),
                sources.iter().map(|s| s.to_string()).collect(),
            )
        }

        Self::new(vec![
            // Technology & programming
            entry(
                "coding",
                &[
                    "https://hnrss.org/frontpage",
                    "https://www.reddit.com/r/programming/.rss",
                    "https://dev.to/feed",
                ],
            ),
            entry(
                "technology",
                &[
                    "https://techcrunch.com/feed/",
                    "https://www.theverge.com/rss/index.xml",
                    "https://www.wired.com/feed/rss",
                ],
            ),
            entry(
                "cloud architecture",
                &[
                    "https://aws.amazon.com/blogs/aws/feed/",
                    "https://cloud.google.com/blog/rss",
                    "https://devblogs.microsoft.com/azure-sdk/feed/",
                ],
            ),
            entry(
                "ai",
                &[
                    "https://www.artificialintelligence-news.com/feed/",
                    "https://openai.com/blog/rss.xml",
                ],
            ),
            // Health & fitness
            entry(
                "fitness",
                &[
                    "https://www.menshealth.com/rss/all.xml/",
                    "https://www.bodybuilding.com/rss/latest-articles.xml",
                ],
            ),
            entry(
                "health",
                &[
                    "https://www.health.com/syndication/feed",
                    "https://www.healthline.com/rss",
                ],
            ),
            entry("yoga", &["https://www.yogajournal.com/feed/"]),
            entry("meditation", &["https://www.mindful.org/feed/"]),
            // Business & finance
            entry(
                "startup",
                &[
                    "https://techcrunch.com/tag/startups/feed/",
                    "https://www.reddit.com/r/startups/.rss",
                    "https://news.ycombinator.com/rss",
                ],
            ),
            entry(
                "business",
                &[
                    "https://www.businessinsider.com/rss",
                    "https://www.reddit.com/r/business/.rss",
                    "https://hbr.org/feed",
                ],
            ),
            entry(
                "stock trading",
                &[
                    "https://www.investopedia.com/feedbuilder/feed/getfeed?feedName=rss_headline",
                    "https://www.marketwatch.com/rss/",
                    "https://www.reddit.com/r/stocks/.rss",
                ],
            ),
            entry(
                "finance",
                &[
                    "https://www.cnbc.com/id/100003114/device/rss/rss.html",
                    "https://finance.yahoo.com/news/rssindex",
                    "https://www.reddit.com/r/finance/.rss",
                ],
            ),
            // Lifestyle
            entry(
                "cooking",
                &[
                    "https://www.bonappetit.com/feed/rss",
                    "https://www.seriouseats.com/rss/recipes.xml",
                ],
            ),
            entry(
                "gaming",
                &[
                    "https://www.ign.com/feed.xml",
                    "https://www.polygon.com/rss/index.xml",
                ],
            ),
            entry(
                "travel",
                &[
                    "https://www.lonelyplanet.com/feed",
                    "https://www.travelandleisure.com/rss",
                ],
            ),
            entry(
                "hiking",
                &[
                    "https://www.outsideonline.com/rss/",
                    "https://www.backpacker.com/rss/",
                ],
            ),
            // Default fallback
            entry(
                GENERAL,
                &[
                    "https://news.google.com/rss",
                    "https://www.reddit.com/r/news/.rss",
                ],
            ),
        ])
    }

    /// Resolve an interest to its feed sources.
    ///
    /// Matching is case-insensitive: an exact key match wins, otherwise the
    /// first key (in table order) that contains the interest or is contained
    /// by it, otherwise the `general` fallback list. User-supplied interests
    /// are free text, so the substring pass trades precision for coverage.
    pub fn resolve(&self, interest: &str) -> &[String] {
        let interest = interest.to_lowercase();

        if let Some((_, sources)) = self.topics.iter().find(|(key, _)| *key == interest) {
            return sources;
        }

        for (key, sources) in &self.topics {
            if interest.contains(key.as_str()) || key.contains(&interest) {
                return sources;
            }
        }

        self.general()
    }

    /// The fallback source list. Empty only if the table was built without
    /// a `general` key, which the builtin table guarantees against.
    fn general(&self) -> &[String] {
        match self.topics.iter().find(|(key, _)| key == GENERAL) {
            Some((_, sources)) => sources,
            None => {
                warn!("topic table has no '{}' fallback entry", GENERAL);
                &[]
            }
        }
    }
}

impl Default for TopicTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_table() -> TopicTable {
        TopicTable::new(vec![
            (
                "coding".to_string(),
                vec![
                    "https://feeds.test/code-1".to_string(),
                    "https://feeds.test/code-2".to_string(),
                ],
            ),
            (
                "stock trading".to_string(),
                vec!["https://feeds.test/stocks".to_string()],
            ),
            (
                "general".to_string(),
                vec!["https://feeds.test/general".to_string()],
            ),
        ])
    }

    #[test]
    fn exact_match_wins() {
        let table = test_table();
        assert_eq!(
            table.resolve("coding"),
            &[
                "https://feeds.test/code-1".to_string(),
                "https://feeds.test/code-2".to_string()
            ]
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        let table = test_table();
        assert_eq!(table.resolve("CODING"), table.resolve("coding"));
    }

    #[test]
    fn key_contained_in_interest_matches() {
        let table = test_table();
        assert_eq!(
            table.resolve("learn coding fast"),
            &[
                "https://feeds.test/code-1".to_string(),
                "https://feeds.test/code-2".to_string()
            ]
        );
    }

    #[test]
    fn interest_contained_in_key_matches() {
        let table = test_table();
        assert_eq!(
            table.resolve("stock"),
            &["https://feeds.test/stocks".to_string()]
        );
    }

    #[test]
    fn unknown_interest_falls_back_to_general() {
        let table = test_table();
        assert_eq!(
            table.resolve("underwater basket weaving"),
            &["https://feeds.test/general".to_string()]
        );
    }

    #[test]
    fn builtin_resolve_is_never_empty() {
        let table = TopicTable::builtin();
        for interest in ["coding", "Finance", "quantum knitting", "", "yoga retreats"] {
            assert!(
                !table.resolve(interest).is_empty(),
                "no sources for {interest:?}"
            );
        }
    }
}
