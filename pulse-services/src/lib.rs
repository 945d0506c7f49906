//! Orchestration services for the Newspulse backend
//!
//! This crate provides the service layer that drives the feed clients:
//! the per-interest aggregation pipeline with its fan-out, the
//! LLM-personalization orchestrator, and the user/read-state store.

pub mod news_service;
pub mod personalizer;
pub mod profile_store;

pub use news_service::{NewsPipelineConfig, NewsService};
pub use personalizer::Personalizer;
pub use profile_store::{ProfileStore, ProfileStoreError};
