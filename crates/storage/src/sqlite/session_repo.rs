use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{SessionRecord, SessionRepository, StorageError};

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

impl SqliteRepository {
    async fn read_key(&self, key: &str) -> Result<Option<(String, DateTime<Utc>)>, StorageError> {
        let row = sqlx::query("SELECT value, updated_at FROM local_storage WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        row.map(|row| {
            let value: String = row.try_get("value").map_err(ser)?;
            let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(ser)?;
            Ok((value, updated_at))
        })
        .transpose()
    }
}

#[async_trait]
impl SessionRepository for SqliteRepository {
    async fn load_session(&self) -> Result<Option<SessionRecord>, StorageError> {
        let Some((token, saved_at)) = self.read_key(TOKEN_KEY).await? else {
            return Ok(None);
        };
        // A token without a profile is as good as logged out.
        let Some((user_json, _)) = self.read_key(USER_KEY).await? else {
            return Ok(None);
        };
        Ok(Some(SessionRecord {
            token,
            user_json,
            saved_at,
        }))
    }

    async fn save_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        for (key, value) in [(TOKEN_KEY, &record.token), (USER_KEY, &record.user_json)] {
            sqlx::query(
                r"
                INSERT INTO local_storage (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                ",
            )
            .bind(key)
            .bind(value)
            .bind(record.saved_at)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }
        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn clear_session(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM local_storage WHERE key IN (?1, ?2)")
            .bind(TOKEN_KEY)
            .bind(USER_KEY)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
