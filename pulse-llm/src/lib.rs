//! LLM integration for the Newspulse backend
//!
//! Wraps an OpenAI-compatible chat-completion API for the three LLM-backed
//! features: ranking a user's interests, rewriting headlines to show
//! personal impact, and holding a contextual chat about displayed articles.

pub mod chat;
pub mod client;

pub use chat::{ChatReply, ChatService};
pub use client::LlmClient;
