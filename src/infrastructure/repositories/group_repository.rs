//! Group Repository Implementation
//!
//! PostgreSQL implementation of the GroupRepository trait.
//! The table keeps the platform's naming: `telegram_id` is the source group,
//! `fellow_chat_id` the destination.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{Group, GroupRepository};
use crate::shared::error::RelayError;

/// Database row representation matching the groups table schema.
#[derive(Debug, sqlx::FromRow)]
struct GroupRow {
    telegram_id: i64,
    fellow_chat_id: i64,
}

impl GroupRow {
    fn into_group(self) -> Group {
        Group {
            source_group_id: self.telegram_id,
            destination_chat_id: self.fellow_chat_id,
        }
    }
}

/// PostgreSQL group repository implementation.
///
/// The pool is shared by every dispatch worker; `PgPool` handles the
/// concurrency.
#[derive(Clone)]
pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    /// Create a new PgGroupRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn get_all(&self) -> Result<Vec<Group>, RelayError> {
        let rows = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT telegram_id, fellow_chat_id
            FROM groups
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(GroupRow::into_group).collect())
    }

    async fn find_by_source(&self, source_group_id: i64) -> Result<Option<Group>, RelayError> {
        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT telegram_id, fellow_chat_id
            FROM groups
            WHERE telegram_id = $1
            "#,
        )
        .bind(source_group_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GroupRow::into_group))
    }

    /// Insert a mapping. The primary key on `telegram_id` turns a duplicate
    /// into `RelayError::Conflict`.
    async fn insert(
        &self,
        source_group_id: i64,
        destination_chat_id: i64,
    ) -> Result<Group, RelayError> {
        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            INSERT INTO groups (telegram_id, fellow_chat_id)
            VALUES ($1, $2)
            RETURNING telegram_id, fellow_chat_id
            "#,
        )
        .bind(source_group_id)
        .bind(destination_chat_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RelayError::Conflict { source_group_id }
            }
            _ => RelayError::from(e),
        })?;

        tracing::debug!(
            source_group_id,
            destination_chat_id,
            "Group mapping persisted"
        );

        Ok(row.into_group())
    }
}
