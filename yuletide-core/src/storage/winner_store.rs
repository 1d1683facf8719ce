use crate::error::{Result, YuletideError};
use crate::storage::Storage;
use crate::types::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::params;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Persistence contract for the set of users who already won the book
#[async_trait]
pub trait WinnerStore: Send + Sync {
    async fn load_winners(&self) -> Result<BTreeSet<UserId>>;

    async fn save_winners(&self, winners: &BTreeSet<UserId>) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinnerRecord {
    pub user: UserId,
    pub won_at: DateTime<Utc>,
}

pub struct SqliteWinnerStore {
    storage: Arc<Storage>,
}

impl SqliteWinnerStore {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// Winners with the time they were first saved, oldest first
    pub async fn list_records(&self) -> Result<Vec<WinnerRecord>> {
        let conn = self.storage.get_connection().await;

        let mut stmt =
            conn.prepare("SELECT user_id, won_at FROM book_winners ORDER BY won_at, user_id")?;

        let rows = stmt.query_map([], |row| {
            let user_id: i64 = row.get(0)?;
            Ok(WinnerRecord {
                user: UserId(user_id as u64),
                won_at: DateTime::from_timestamp(row.get(1)?, 0).unwrap_or_else(Utc::now),
            })
        })?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }

        Ok(records)
    }
}

#[async_trait]
impl WinnerStore for SqliteWinnerStore {
    async fn load_winners(&self) -> Result<BTreeSet<UserId>> {
        let conn = self.storage.get_connection().await;

        let mut stmt = conn.prepare("SELECT user_id FROM book_winners")?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;

        let mut winners = BTreeSet::new();
        for user_id in rows {
            winners.insert(UserId(user_id? as u64));
        }

        Ok(winners)
    }

    async fn save_winners(&self, winners: &BTreeSet<UserId>) -> Result<()> {
        let mut conn = self.storage.get_connection().await;
        let tx = conn.transaction()?;

        let stored: Vec<i64> = {
            let mut stmt = tx.prepare("SELECT user_id FROM book_winners")?;
            let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
            let ids = rows.collect::<std::result::Result<Vec<i64>, _>>()?;
            ids
        };

        for user_id in stored {
            if !winners.contains(&UserId(user_id as u64)) {
                tx.execute(
                    "DELETE FROM book_winners WHERE user_id = ?1",
                    params![user_id],
                )?;
            }
        }

        let now = Utc::now().timestamp();
        for user in winners {
            let user_id = i64::try_from(user.get()).map_err(|_| {
                YuletideError::internal(format!("User id {} does not fit storage", user))
            })?;
            tx.execute(
                "INSERT OR IGNORE INTO book_winners (user_id, won_at) VALUES (?1, ?2)",
                params![user_id, now],
            )?;
        }

        tx.commit()?;

        tracing::debug!("Saved {} book winners", winners.len());
        Ok(())
    }
}

/// Volatile store, for sessions that should not touch the disk
#[derive(Debug, Default)]
pub struct MemoryWinnerStore {
    winners: Mutex<BTreeSet<UserId>>,
}

impl MemoryWinnerStore {
    pub fn new(winners: BTreeSet<UserId>) -> Self {
        Self {
            winners: Mutex::new(winners),
        }
    }
}

#[async_trait]
impl WinnerStore for MemoryWinnerStore {
    async fn load_winners(&self) -> Result<BTreeSet<UserId>> {
        Ok(self.winners.lock().clone())
    }

    async fn save_winners(&self, winners: &BTreeSet<UserId>) -> Result<()> {
        *self.winners.lock() = winners.clone();
        Ok(())
    }
}
