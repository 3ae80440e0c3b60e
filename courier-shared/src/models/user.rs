/// User model and database operations
///
/// A user is created by signup and never deleted by the API. The row holds
/// the credential checked by Basic Auth on every protected request, the
/// phone the verification code was sent to, and the push registration id
/// the client reports.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id              INTEGER PRIMARY KEY AUTOINCREMENT,
///     username        TEXT    NOT NULL UNIQUE,
///     password_hash   TEXT    NOT NULL,
///     phone           TEXT,
///     registration_id TEXT,
///     verified        BOOLEAN NOT NULL DEFAULT 0,
///     created_at      TEXT    NOT NULL,
///     updated_at      TEXT    NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use courier_shared::models::user::{CreateUser, User};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
/// let user = User::create(
///     &pool,
///     CreateUser {
///         username: "will".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         phone: Some("1111111111".to_string()),
///     },
/// )
/// .await?;
///
/// let found = User::find_by_username(&pool, "will").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

const USER_COLUMNS: &str =
    "id, username, password_hash, phone, registration_id, verified, created_at, updated_at";

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Surrogate key
    pub id: i64,

    /// Unique login name
    pub username: String,

    /// Argon2id PHC string of the generated password
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Phone number the verification code was dispatched to
    pub phone: Option<String>,

    /// Push registration id reported by the client; stored, never used
    pub registration_id: Option<String>,

    /// Set once `/verify` has seen the right code
    pub verified: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,

    /// Argon2id hash, never the plaintext password
    pub password_hash: String,

    pub phone: Option<String>,
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Returns a database error if the username is already taken (see
    /// [`is_unique_violation`]) or the connection fails.
    pub async fn create(pool: &SqlitePool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, password_hash, phone, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.phone)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by exact username
    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// Stores the client's push registration id
    ///
    /// Returns false if the user no longer exists.
    pub async fn set_registration_id(
        pool: &SqlitePool,
        id: i64,
        registration_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET registration_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(registration_id)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Flags the user as having confirmed their phone
    pub async fn mark_verified(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET verified = 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes a user; contacts and messages go with it
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of users with the given username (0 or 1)
    pub async fn count_by_username(pool: &SqlitePool, username: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(pool)
            .await
    }
}

/// True if the error is a UNIQUE constraint failure
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
