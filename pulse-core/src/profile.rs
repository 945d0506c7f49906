//! User profile types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_k() -> usize {
    3
}

/// A user profile as supplied per request.
///
/// `k` bounds how many interests the ranker may select; request validation
/// rejects values outside 1..=10.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// User's age in years
    pub age: u32,
    /// Free-text professional or personal goals
    pub goals: String,
    /// Free-text interest labels
    pub interests: Vec<String>,
    /// Number of top interests to select
    #[serde(default = "default_k")]
    pub k: usize,
}

impl UserProfile {
    /// Whether `k` is within the accepted 1..=10 range.
    pub fn k_in_range(&self) -> bool {
        (1..=10).contains(&self.k)
    }
}

/// Fields required to create a stored user account.
///
/// `hashed_password` is opaque to this backend; hashing happens upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub hashed_password: String,
    pub age: u32,
    pub goals: String,
    pub interests: Vec<String>,
    #[serde(default = "default_k")]
    pub k: usize,
}

/// A persisted user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub age: u32,
    pub goals: String,
    pub interests: Vec<String>,
    pub k: usize,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl StoredUser {
    /// View of the stored account as a per-request profile.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            age: self.age,
            goals: self.goals.clone(),
            interests: self.interests.clone(),
            k: self.k,
        }
    }
}

/// Partial profile update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub age: Option<u32>,
    pub goals: Option<String>,
    pub interests: Option<Vec<String>>,
    pub k: Option<usize>,
}

impl ProfileUpdate {
    /// True when the update carries no changes.
    pub fn is_empty(&self) -> bool {
        self.age.is_none() && self.goals.is_none() && self.interests.is_none() && self.k.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn k_defaults_to_three() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"age": 25, "goals": "ship", "interests": ["coding"]}"#,
        )
        .unwrap();
        assert_eq!(profile.k, 3);
    }

    #[test]
    fn k_range_check() {
        let mut profile = UserProfile {
            age: 25,
            goals: String::new(),
            interests: vec![],
            k: 3,
        };
        assert!(profile.k_in_range());
        profile.k = 0;
        assert!(!profile.k_in_range());
        profile.k = 11;
        assert!(!profile.k_in_range());
    }

    #[test]
    fn hashed_password_not_serialized() {
        let user = StoredUser {
            id: "u1".to_string(),
            email: "a@b.c".to_string(),
            hashed_password: "secret-hash".to_string(),
            age: 30,
            goals: "grow".to_string(),
            interests: vec!["finance".to_string()],
            k: 2,
            created_at: Utc::now(),
            last_login: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
