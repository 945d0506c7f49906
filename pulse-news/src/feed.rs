//! RSS/Atom feed client
//!
//! Fetches a syndication feed and normalizes its entries. The public
//! `fetch_entries` contract is non-throwing: the aggregation pipeline fans
//! out across several feeds per interest and one dead feed must not abort
//! the batch, so failures degrade to an empty entry list.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use pulse_core::FeedEntry;

use crate::error::NewsError;

const FEED_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "Newspulse/1.0";

/// Feed client over reqwest
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(FEED_TIMEOUT_SECS))
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Fetch a feed and return up to `max_entries` entries in feed order.
    ///
    /// Never returns an error: fetch, status, and parse failures are logged
    /// and yield an empty list.
    pub async fn fetch_entries(&self, url: &str, max_entries: usize) -> Vec<FeedEntry> {
        match self.try_fetch(url, max_entries).await {
            Ok(entries) => {
                debug!("Fetched {} entries from {}", entries.len(), url);
                entries
            }
            Err(e) => {
                warn!("Failed to fetch feed {}: {}", url, e);
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self, url: &str, max_entries: usize) -> Result<Vec<FeedEntry>, NewsError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NewsError::from_reqwest(e, url))?;

        if !response.status().is_success() {
            return Err(NewsError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let content = response
            .bytes()
            .await
            .map_err(|e| NewsError::from_reqwest(e, url))?;

        // Try parsing as RSS first, then Atom
        if let Ok(channel) = rss::Channel::read_from(&content[..]) {
            return Ok(parse_rss_channel(&channel, url, max_entries));
        }

        if let Ok(atom_feed) = atom_syndication::Feed::read_from(&content[..]) {
            return Ok(parse_atom_feed(&atom_feed, max_entries));
        }

        Err(NewsError::ParseError(format!(
            "Failed to parse feed: {}",
            url
        )))
    }
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an RSS channel into normalized entries
fn parse_rss_channel(channel: &rss::Channel, feed_url: &str, max_entries: usize) -> Vec<FeedEntry> {
    let source_name = if channel.title().is_empty() {
        host_name(feed_url)
    } else {
        channel.title().to_string()
    };

    channel
        .items()
        .iter()
        .filter_map(|item| {
            let link = item.link()?.to_string();
            Some(FeedEntry {
                title: item.title().unwrap_or_default().to_string(),
                link,
                summary: item.description().unwrap_or_default().to_string(),
                published: item.pub_date().map(str::to_string),
                source_name: source_name.clone(),
            })
        })
        .take(max_entries)
        .collect()
}

/// Parse an Atom feed into normalized entries
fn parse_atom_feed(feed: &atom_syndication::Feed, max_entries: usize) -> Vec<FeedEntry> {
    let source_name = feed.title().to_string();

    feed.entries()
        .iter()
        .filter_map(|entry| {
            let link = entry.links().first().map(|l| l.href().to_string())?;
            if link.is_empty() {
                return None;
            }

            let summary = entry
                .summary()
                .map(|s| s.to_string())
                .or_else(|| entry.content().and_then(|c| c.value().map(str::to_string)))
                .unwrap_or_default();

            let published = entry
                .published()
                .copied()
                .or_else(|| Some(*entry.updated()))
                .map(|d| d.to_rfc2822());

            Some(FeedEntry {
                title: entry.title().to_string(),
                link,
                summary,
                published,
                source_name: source_name.clone(),
            })
        })
        .take(max_entries)
        .collect()
}

/// Host portion of a URL, for use as a source name fallback
fn host_name(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

/// Strip HTML tags from text and normalize whitespace and entities.
///
/// Used to clean feed summaries before they stand in for scraped content.
pub fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example Feed</title>
    <link>https://example.com</link>
    <description>Example</description>
    <item>
      <title>First story</title>
      <link>https://example.com/1</link>
      <description>&lt;p&gt;Summary one&lt;/p&gt;</description>
      <pubDate>Mon, 06 Jan 2025 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>No link story</title>
      <description>dropped</description>
    </item>
    <item>
      <title>Second story</title>
      <link>https://example.com/2</link>
      <description>Summary two</description>
    </item>
    <item>
      <title>Third story</title>
      <link>https://example.com/3</link>
      <description>Summary three</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn rss_entries_are_normalized_and_capped() {
        let channel = rss::Channel::read_from(RSS_FIXTURE.as_bytes()).unwrap();
        let entries = parse_rss_channel(&channel, "https://example.com/feed", 2);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "First story");
        assert_eq!(entries[0].link, "https://example.com/1");
        assert_eq!(entries[0].source_name, "Example Feed");
        assert_eq!(
            entries[0].published.as_deref(),
            Some("Mon, 06 Jan 2025 10:00:00 GMT")
        );
        // The linkless item is skipped, not counted against the cap
        assert_eq!(entries[1].link, "https://example.com/2");
    }

    #[test]
    fn atom_entries_are_normalized() {
        let fixture = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Source</title>
  <id>urn:uuid:feed</id>
  <updated>2025-01-06T10:00:00Z</updated>
  <entry>
    <title>Atom story</title>
    <id>urn:uuid:entry-1</id>
    <link href="https://example.com/atom-1"/>
    <updated>2025-01-06T10:00:00Z</updated>
    <summary>Atom summary</summary>
  </entry>
</feed>"#;

        let feed = atom_syndication::Feed::read_from(fixture.as_bytes()).unwrap();
        let entries = parse_atom_feed(&feed, 10);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Atom story");
        assert_eq!(entries[0].link, "https://example.com/atom-1");
        assert_eq!(entries[0].summary, "Atom summary");
        assert_eq!(entries[0].source_name, "Atom Source");
        assert!(entries[0].published.is_some());
    }

    #[test]
    fn strip_html_removes_tags_and_entities() {
        let html = "<p>Rates &amp; yields <b>rise</b>&nbsp;again</p>";
        assert_eq!(strip_html(html), "Rates & yields rise again");
    }

    #[test]
    fn strip_html_collapses_whitespace() {
        let html = "<div>\n  spaced\n\n   out  </div>";
        assert_eq!(strip_html(html), "spaced out");
    }

    #[test]
    fn host_name_falls_back_to_raw_input() {
        assert_eq!(host_name("https://feeds.example.org/rss"), "feeds.example.org");
        assert_eq!(host_name("not a url"), "not a url");
    }
}
