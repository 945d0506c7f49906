//! Core types for the Newspulse backend
//!
//! This crate defines the shared data structures used across the backend,
//! including articles, user profiles, and notification digests.

pub mod error;
pub mod news;
pub mod profile;

pub use error::{PulseError, PulseResult};
pub use news::{
    Article, FeedEntry, ImpactLevel, Notification, NotificationDigest, PersonalizedNews,
};
pub use profile::{NewUser, ProfileUpdate, StoredUser, UserProfile};
