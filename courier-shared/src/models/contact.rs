/// Contact queue
///
/// A contact maps a device-assigned `local_id` to a display name for one
/// user. `local_id` is unique per owner, not globally. Uploading a list
/// upserts rows; fetching the list drains it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE contacts (
///     id         INTEGER PRIMARY KEY AUTOINCREMENT,
///     user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     local_id   INTEGER NOT NULL,
///     name       TEXT    NOT NULL,
///     created_at TEXT    NOT NULL,
///     UNIQUE (user_id, local_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contact {
    pub id: i64,

    /// Owning user
    pub user_id: i64,

    /// Device-assigned id, unique within the owner's contacts
    pub local_id: i64,

    pub name: String,

    pub created_at: DateTime<Utc>,
}

/// One entry of an uploaded contact list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub local_id: i64,
    pub name: String,
}

/// Why an uploaded contact list was rejected
#[derive(Debug, thiserror::Error)]
pub enum ContactListError {
    /// Not a JSON object of string values
    #[error("Contact list is not a JSON object of names: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A key that does not parse as an integer local id
    #[error("Contact list key {0:?} is not an integer local id")]
    InvalidLocalId(String),
}

/// Parses the `contact_list` payload: a JSON object mapping local id to name
///
/// Keys are JSON strings holding integers (`{"123": "Jess"}`). A key repeated
/// in the payload collapses to one entry; the last occurrence wins. Entries
/// come back ordered by local id.
pub fn parse_contact_list(raw: &str) -> Result<Vec<NewContact>, ContactListError> {
    let entries: BTreeMap<String, String> = serde_json::from_str(raw)?;

    let mut contacts = entries
        .into_iter()
        .map(|(key, name)| {
            let local_id = key
                .trim()
                .parse::<i64>()
                .map_err(|_| ContactListError::InvalidLocalId(key.clone()))?;
            Ok(NewContact { local_id, name })
        })
        .collect::<Result<Vec<_>, ContactListError>>()?;

    // "7" and "07" are distinct keys but the same local id
    contacts.sort_by_key(|c| c.local_id);
    contacts.dedup_by(|later, earlier| {
        if later.local_id == earlier.local_id {
            earlier.name = std::mem::take(&mut later.name);
            true
        } else {
            false
        }
    });

    Ok(contacts)
}

impl Contact {
    /// Creates or renames the caller's contacts, all in one transaction
    ///
    /// An existing `(user_id, local_id)` row keeps its id, so messages
    /// already queued under it survive a re-upload.
    ///
    /// Returns the number of entries written.
    pub async fn upsert_many(
        pool: &SqlitePool,
        user_id: i64,
        contacts: &[NewContact],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let now = Utc::now();

        for contact in contacts {
            sqlx::query(
                r#"
                INSERT INTO contacts (user_id, local_id, name, created_at)
                VALUES (?, ?, ?, ?)
                ON CONFLICT (user_id, local_id) DO UPDATE SET name = excluded.name
                "#,
            )
            .bind(user_id)
            .bind(contact.local_id)
            .bind(&contact.name)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(user_id, count = contacts.len(), "Upserted contacts");
        Ok(contacts.len() as u64)
    }

    /// Finds the caller's contact with the given device id
    pub async fn find_by_local_id(
        pool: &SqlitePool,
        user_id: i64,
        local_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, user_id, local_id, name, created_at
            FROM contacts
            WHERE user_id = ? AND local_id = ?
            "#,
        )
        .bind(user_id)
        .bind(local_id)
        .fetch_optional(pool)
        .await
    }

    /// Lists the caller's contacts without removing them
    pub async fn list_by_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, user_id, local_id, name, created_at
            FROM contacts
            WHERE user_id = ?
            ORDER BY local_id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Removes and returns every contact the caller owns
    ///
    /// Single `DELETE ... RETURNING` statement: two concurrent drains never
    /// both see the same row. Messages still queued under these contacts
    /// are removed by the cascade.
    pub async fn drain(pool: &SqlitePool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let mut contacts = sqlx::query_as::<_, Contact>(
            r#"
            DELETE FROM contacts
            WHERE user_id = ?
            RETURNING id, user_id, local_id, name, created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        contacts.sort_by_key(|c| c.local_id);

        debug!(user_id, count = contacts.len(), "Drained contacts");
        Ok(contacts)
    }
}
