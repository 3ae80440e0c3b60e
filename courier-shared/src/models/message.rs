/// Message queue
///
/// Messages are queued under one of the recipient's contacts and handed out
/// once: `drain_for_user` deletes what it returns.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE messages (
///     id         INTEGER PRIMARY KEY AUTOINCREMENT,
///     contact_id INTEGER NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
///     body       TEXT    NOT NULL,
///     created_at TEXT    NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use courier_shared::models::{contact::Contact, message::Message};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
/// if let Some(contact) = Contact::find_by_local_id(&pool, user_id, 123).await? {
///     Message::create(&pool, contact.id, "hello").await?;
/// }
///
/// for pending in Message::drain_for_user(&pool, user_id).await? {
///     println!("{}: {}", pending.local_id, pending.body);
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,

    /// Conversation this message is queued under
    pub contact_id: i64,

    pub body: String,

    pub created_at: DateTime<Utc>,
}

/// A delivered message as the client sees it
///
/// `local_id` is the parent contact's device id, not the message id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMessage {
    pub body: String,
    pub local_id: i64,
}

impl Message {
    /// Queues a message under a contact
    pub async fn create(
        pool: &SqlitePool,
        contact_id: i64,
        body: &str,
    ) -> Result<Self, sqlx::Error> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (contact_id, body, created_at)
            VALUES (?, ?, ?)
            RETURNING id, contact_id, body, created_at
            "#,
        )
        .bind(contact_id)
        .bind(body)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        debug!(message_id = message.id, contact_id, "Queued message");
        Ok(message)
    }

    /// Messages still queued under a contact, oldest first
    pub async fn list_by_contact(
        pool: &SqlitePool,
        contact_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, contact_id, body, created_at
            FROM messages
            WHERE contact_id = ?
            ORDER BY id
            "#,
        )
        .bind(contact_id)
        .fetch_all(pool)
        .await
    }

    /// Removes and returns every message queued under the caller's contacts
    ///
    /// The delete and the local id lookup share one transaction. Once the
    /// delete has run, SQLite holds the write lock, so neither a concurrent
    /// message drain nor a contact drain can interleave.
    ///
    /// Results are ordered by message id (arrival order).
    pub async fn drain_for_user(
        pool: &SqlitePool,
        user_id: i64,
    ) -> Result<Vec<PendingMessage>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut messages = sqlx::query_as::<_, Message>(
            r#"
            DELETE FROM messages
            WHERE contact_id IN (SELECT id FROM contacts WHERE user_id = ?)
            RETURNING id, contact_id, body, created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        let local_ids: HashMap<i64, i64> =
            sqlx::query_as::<_, (i64, i64)>("SELECT id, local_id FROM contacts WHERE user_id = ?")
                .bind(user_id)
                .fetch_all(&mut *tx)
                .await?
                .into_iter()
                .collect();

        tx.commit().await?;

        messages.sort_by_key(|m| m.id);

        let pending: Vec<PendingMessage> = messages
            .into_iter()
            .filter_map(|m| match local_ids.get(&m.contact_id) {
                Some(&local_id) => Some(PendingMessage {
                    body: m.body,
                    local_id,
                }),
                None => {
                    warn!(message_id = m.id, contact_id = m.contact_id, "Drained message has no contact");
                    None
                }
            })
            .collect();

        debug!(user_id, count = pending.len(), "Drained messages");
        Ok(pending)
    }
}
