//! Remote store: durable home of each board's object sequence.
//!
//! DESIGN
//! ======
//! A board is one row; its objects are a single JSON array column that is
//! replaced wholesale on every save (last write wins). The board container
//! never talks to the store directly: the session hands it due writes.
//!
//! `PgStore` is the Postgres implementation. `MemoryStore` keeps rows in
//! process for offline runs and tests, and can simulate an outage.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::doc::{BoardId, BoardObject};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("board not found: {0}")]
    NotFound(BoardId),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("malformed board objects: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store unavailable")]
    Unavailable,
}

impl crate::error::ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_BOARD_NOT_FOUND",
            Self::Database(_) => "E_DATABASE",
            Self::Serialization(_) => "E_SERIALIZATION",
            Self::Unavailable => "E_STORE_UNAVAILABLE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Unavailable)
    }
}

/// One stored board.
#[derive(Debug, Clone)]
pub struct BoardRow {
    pub id: BoardId,
    pub name: String,
    pub objects: Vec<BoardObject>,
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create an empty board.
    async fn create_board(&self, name: &str) -> Result<BoardRow, StoreError>;

    /// Load one board with its full object sequence.
    async fn load_board(&self, board_id: BoardId) -> Result<BoardRow, StoreError>;

    /// Replace the board's object sequence.
    async fn save_objects(&self, board_id: BoardId, objects: &[BoardObject]) -> Result<(), StoreError>;
}

// =============================================================================
// POSTGRES
// =============================================================================

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RemoteStore for PgStore {
    async fn create_board(&self, name: &str) -> Result<BoardRow, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO boards (id, name) VALUES ($1, $2)")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        info!(board_id = %id, %name, "store: board created");
        Ok(BoardRow { id, name: name.to_string(), objects: Vec::new() })
    }

    async fn load_board(&self, board_id: BoardId) -> Result<BoardRow, StoreError> {
        let row = sqlx::query_as::<_, (Uuid, String, serde_json::Value)>(
            "SELECT id, name, objects FROM boards WHERE id = $1",
        )
        .bind(board_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, name, objects)) = row else {
            return Err(StoreError::NotFound(board_id));
        };
        let objects: Vec<BoardObject> = serde_json::from_value(objects)?;
        Ok(BoardRow { id, name, objects })
    }

    async fn save_objects(&self, board_id: BoardId, objects: &[BoardObject]) -> Result<(), StoreError> {
        let payload = serde_json::to_value(objects)?;
        let result = sqlx::query("UPDATE boards SET objects = $2, updated_at = now() WHERE id = $1")
            .bind(board_id)
            .bind(payload)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(board_id));
        }
        Ok(())
    }
}

// =============================================================================
// IN-MEMORY
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<BoardId, BoardRow>>,
    unavailable: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a board row directly.
    pub async fn insert(&self, row: BoardRow) {
        self.rows.lock().await.insert(row.id, row);
    }

    /// Make every subsequent call fail with `Unavailable` until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Successful saves so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn create_board(&self, name: &str) -> Result<BoardRow, StoreError> {
        self.check_available()?;
        let row = BoardRow { id: Uuid::new_v4(), name: name.to_string(), objects: Vec::new() };
        self.rows.lock().await.insert(row.id, row.clone());
        Ok(row)
    }

    async fn load_board(&self, board_id: BoardId) -> Result<BoardRow, StoreError> {
        self.check_available()?;
        self.rows
            .lock()
            .await
            .get(&board_id)
            .cloned()
            .ok_or(StoreError::NotFound(board_id))
    }

    async fn save_objects(&self, board_id: BoardId, objects: &[BoardObject]) -> Result<(), StoreError> {
        self.check_available()?;
        let mut rows = self.rows.lock().await;
        let row = rows.get_mut(&board_id).ok_or(StoreError::NotFound(board_id))?;
        row.objects = objects.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
