//! User profile and read-article persistence
//!
//! SQLite-backed store for user accounts and per-user read-article state.
//! Password hashing and token issuance happen upstream; this store only
//! holds the opaque hash.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

use pulse_core::{NewUser, ProfileUpdate, StoredUser};

#[derive(Debug, thiserror::Error)]
pub enum ProfileStoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("User not found: {0}")]
    NotFound(String),
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),
}

/// SQLite-backed profile store
pub struct ProfileStore {
    db_path: String,
}

impl ProfileStore {
    /// Create a store, initializing the schema if needed.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, ProfileStoreError> {
        let db_path = db_path.as_ref().to_string_lossy().to_string();

        // Ensure parent directory exists
        if let Some(parent) = Path::new(&db_path).parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let store = Self { db_path };
        store.init_db()?;

        info!("Initialized profile store at: {}", store.db_path);
        Ok(store)
    }

    fn init_db(&self) -> Result<(), ProfileStoreError> {
        let conn = self.get_connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                hashed_password TEXT NOT NULL,
                age INTEGER NOT NULL,
                goals TEXT NOT NULL,
                interests JSON NOT NULL,
                k INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                last_login INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS read_articles (
                user_id TEXT NOT NULL,
                article_url TEXT NOT NULL,
                read_at INTEGER NOT NULL,
                PRIMARY KEY (user_id, article_url)
            )",
            [],
        )?;

        Ok(())
    }

    fn get_connection(&self) -> Result<Connection, ProfileStoreError> {
        Ok(Connection::open(&self.db_path)?)
    }

    /// Create a new user account.
    pub fn create_user(&self, new_user: &NewUser) -> Result<StoredUser, ProfileStoreError> {
        if self.get_user_by_email(&new_user.email)?.is_some() {
            return Err(ProfileStoreError::DuplicateEmail(new_user.email.clone()));
        }

        let conn = self.get_connection()?;
        let now = Utc::now();
        let user = StoredUser {
            id: Uuid::new_v4().to_string(),
            email: new_user.email.clone(),
            hashed_password: new_user.hashed_password.clone(),
            age: new_user.age,
            goals: new_user.goals.clone(),
            interests: new_user.interests.clone(),
            k: new_user.k,
            created_at: now,
            last_login: now,
        };

        conn.execute(
            "INSERT INTO users
             (id, email, hashed_password, age, goals, interests, k, created_at, last_login)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                user.id,
                user.email,
                user.hashed_password,
                user.age,
                user.goals,
                serde_json::to_string(&user.interests)?,
                user.k as i64,
                user.created_at.timestamp(),
                user.last_login.timestamp(),
            ],
        )?;

        debug!("Created user {}", user.id);
        Ok(user)
    }

    /// Fetch a user by id.
    pub fn get_user(&self, user_id: &str) -> Result<StoredUser, ProfileStoreError> {
        let conn = self.get_connection()?;
        let user = conn
            .query_row(
                "SELECT id, email, hashed_password, age, goals, interests, k, created_at, last_login
                 FROM users WHERE id = ?1",
                params![user_id],
                row_to_user,
            )
            .optional()?;

        user.ok_or_else(|| ProfileStoreError::NotFound(user_id.to_string()))
    }

    /// Fetch a user by email, if one exists.
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<StoredUser>, ProfileStoreError> {
        let conn = self.get_connection()?;
        let user = conn
            .query_row(
                "SELECT id, email, hashed_password, age, goals, interests, k, created_at, last_login
                 FROM users WHERE email = ?1",
                params![email],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Apply a partial profile update and return the updated user.
    pub fn update_user(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<StoredUser, ProfileStoreError> {
        let mut user = self.get_user(user_id)?;

        if let Some(age) = update.age {
            user.age = age;
        }
        if let Some(goals) = &update.goals {
            user.goals = goals.clone();
        }
        if let Some(interests) = &update.interests {
            user.interests = interests.clone();
        }
        if let Some(k) = update.k {
            user.k = k;
        }

        let conn = self.get_connection()?;
        conn.execute(
            "UPDATE users SET age = ?2, goals = ?3, interests = ?4, k = ?5 WHERE id = ?1",
            params![
                user.id,
                user.age,
                user.goals,
                serde_json::to_string(&user.interests)?,
                user.k as i64,
            ],
        )?;

        Ok(user)
    }

    /// Record a login.
    pub fn update_last_login(&self, user_id: &str) -> Result<(), ProfileStoreError> {
        let conn = self.get_connection()?;
        let updated = conn.execute(
            "UPDATE users SET last_login = ?2 WHERE id = ?1",
            params![user_id, Utc::now().timestamp()],
        )?;

        if updated == 0 {
            return Err(ProfileStoreError::NotFound(user_id.to_string()));
        }
        Ok(())
    }

    /// Mark an article as read. Idempotent.
    pub fn mark_read(&self, user_id: &str, article_url: &str) -> Result<(), ProfileStoreError> {
        let conn = self.get_connection()?;
        conn.execute(
            "INSERT OR IGNORE INTO read_articles (user_id, article_url, read_at)
             VALUES (?1, ?2, ?3)",
            params![user_id, article_url, Utc::now().timestamp()],
        )?;
        Ok(())
    }

    /// All article URLs the user has read.
    pub fn list_read_urls(&self, user_id: &str) -> Result<Vec<String>, ProfileStoreError> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            "SELECT article_url FROM read_articles WHERE user_id = ?1 ORDER BY read_at",
        )?;

        let urls = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(urls)
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredUser> {
    let interests_json: String = row.get(5)?;
    let interests: Vec<String> = serde_json::from_str(&interests_json).unwrap_or_default();

    Ok(StoredUser {
        id: row.get(0)?,
        email: row.get(1)?,
        hashed_password: row.get(2)?,
        age: row.get(3)?,
        goals: row.get(4)?,
        interests,
        k: row.get::<_, i64>(6)? as usize,
        created_at: timestamp_to_datetime(row.get(7)?),
        last_login: timestamp_to_datetime(row.get(8)?),
    })
}

fn timestamp_to_datetime(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, ProfileStore) {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path().join("profiles.db")).unwrap();
        (dir, store)
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            hashed_password: "$2b$hash".to_string(),
            age: 25,
            goals: "Become a senior software engineer".to_string(),
            interests: vec!["coding".to_string(), "hiking".to_string()],
            k: 3,
        }
    }

    #[test]
    fn create_and_fetch_roundtrip() {
        let (_dir, store) = test_store();

        let created = store.create_user(&new_user("a@example.com")).unwrap();
        let fetched = store.get_user(&created.id).unwrap();

        assert_eq!(fetched.email, "a@example.com");
        assert_eq!(fetched.age, 25);
        assert_eq!(fetched.interests, vec!["coding", "hiking"]);
        assert_eq!(fetched.k, 3);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let (_dir, store) = test_store();

        store.create_user(&new_user("a@example.com")).unwrap();
        let err = store.create_user(&new_user("a@example.com")).unwrap_err();
        assert!(matches!(err, ProfileStoreError::DuplicateEmail(_)));
    }

    #[test]
    fn get_by_email_finds_user() {
        let (_dir, store) = test_store();

        store.create_user(&new_user("a@example.com")).unwrap();
        let user = store.get_user_by_email("a@example.com").unwrap();
        assert!(user.is_some());
        assert!(store.get_user_by_email("missing@example.com").unwrap().is_none());
    }

    #[test]
    fn missing_user_is_not_found() {
        let (_dir, store) = test_store();
        let err = store.get_user("nope").unwrap_err();
        assert!(matches!(err, ProfileStoreError::NotFound(_)));
    }

    #[test]
    fn partial_update_leaves_other_fields() {
        let (_dir, store) = test_store();
        let created = store.create_user(&new_user("a@example.com")).unwrap();

        let updated = store
            .update_user(
                &created.id,
                &ProfileUpdate {
                    goals: Some("Stay healthy".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(updated.goals, "Stay healthy");
        assert_eq!(updated.age, 25);
        assert_eq!(updated.interests, vec!["coding", "hiking"]);
    }

    #[test]
    fn mark_read_is_idempotent() {
        let (_dir, store) = test_store();
        let user = store.create_user(&new_user("a@example.com")).unwrap();

        store.mark_read(&user.id, "https://example.com/1").unwrap();
        store.mark_read(&user.id, "https://example.com/1").unwrap();
        store.mark_read(&user.id, "https://example.com/2").unwrap();

        let urls = store.list_read_urls(&user.id).unwrap();
        assert_eq!(urls.len(), 2);
        assert!(urls.contains(&"https://example.com/1".to_string()));
    }

    #[test]
    fn read_urls_are_per_user() {
        let (_dir, store) = test_store();
        let alice = store.create_user(&new_user("alice@example.com")).unwrap();
        let bob = store.create_user(&new_user("bob@example.com")).unwrap();

        store.mark_read(&alice.id, "https://example.com/1").unwrap();

        assert_eq!(store.list_read_urls(&alice.id).unwrap().len(), 1);
        assert!(store.list_read_urls(&bob.id).unwrap().is_empty());
    }
}
