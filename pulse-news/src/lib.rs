//! Feed-layer clients for the Newspulse aggregation pipeline
//!
//! This crate provides the leaf I/O stages of the pipeline:
//! - Topic table: maps free-text interests to curated feed source URLs
//! - Feed client: fetches and parses RSS/Atom feeds into normalized entries
//! - Scraper: downloads article pages and extracts main text and a lead
//!   image, backed by a process-lifetime result cache

pub mod error;
pub mod feed;
pub mod scrape;
pub mod topics;
pub mod types;

pub use error::NewsError;
pub use feed::{strip_html, FeedClient};
pub use scrape::{truncate_chars, ScrapeCache, Scraper};
pub use topics::TopicTable;
pub use types::ScrapeResult;
