//! Remote sync bridge.
//!
//! DESIGN
//! ======
//! The store publishes every board write on a change feed (Postgres
//! `LISTEN board_changes`). The sync task reads the feed and pushes each
//! snapshot for the open board into the container with history paused and
//! without arming persistence, so remote-origin updates are neither
//! undoable locally nor written back (no feedback loop). Conflicts resolve
//! last-write-wins: an incoming snapshot replaces the local sequence.
//!
//! Rows too large for a notification arrive as id-only payloads; the task
//! re-reads those through the store.
//!
//! Connection health is published as [`SyncStatus`] on a watch channel. A
//! dropped listener reports `Connecting` until the feed has re-established
//! the connection, then `Connected` even if no notification arrives.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::board::Board;
use crate::doc::{BoardId, BoardObject};
use crate::session::BoardSession;
use crate::store::StoreError;

/// Notification channel the `boards` trigger publishes on.
pub const CHANGE_CHANNEL: &str = "board_changes";

const RETRY_DELAY: Duration = Duration::from_secs(1);

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("change feed error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("malformed change payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("change feed closed")]
    Closed,
}

impl crate::error::ErrorCode for SyncError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "E_SYNC_DATABASE",
            Self::Payload(_) => "E_SYNC_PAYLOAD",
            Self::Store(e) => e.error_code(),
            Self::Closed => "E_SYNC_CLOSED",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Database(_) => true,
            Self::Store(e) => e.retryable(),
            Self::Payload(_) | Self::Closed => false,
        }
    }
}

/// Health of the change-feed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Connecting,
    Connected,
    Disconnected,
}

/// One board write announced by the store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChangeNotification {
    #[serde(rename = "id")]
    pub board_id: BoardId,
    /// Absent when the row was too large for the notification payload.
    #[serde(default)]
    pub objects: Option<Vec<BoardObject>>,
}

impl ChangeNotification {
    /// Parse a JSON notification payload.
    ///
    /// # Errors
    ///
    /// Returns `Payload` if the JSON is malformed or lacks an id.
    pub fn from_payload(payload: &str) -> Result<Self, SyncError> {
        Ok(serde_json::from_str(payload)?)
    }
}

/// What the feed produced.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Change(ChangeNotification),
    /// The connection dropped; the feed reconnects on the next call.
    Reconnecting,
    /// The connection is back after a drop or a failure.
    Connected,
}

#[async_trait]
pub trait ChangeFeed: Send {
    /// Wait for the next event.
    async fn next(&mut self) -> Result<FeedEvent, SyncError>;
}

// =============================================================================
// APPLY
// =============================================================================

/// Replace the board's objects with a remote snapshot.
///
/// Snapshots for other boards and snapshots identical to the current
/// sequence are ignored. Returns whether the board changed.
pub fn apply_remote(board: &mut Board, board_id: BoardId, objects: Vec<BoardObject>) -> bool {
    if board.board_id() != board_id {
        return false;
    }
    if board.objects() == objects.as_slice() {
        return false;
    }
    let count = objects.len();
    board.without_history(|board| board.replace_objects(objects));
    debug!(%board_id, count, "sync: remote snapshot applied");
    true
}

// =============================================================================
// POSTGRES FEED
// =============================================================================

pub struct PgChangeFeed {
    listener: PgListener,
    /// Set after a drop; the next call re-establishes the connection first.
    reconnecting: bool,
}

impl PgChangeFeed {
    /// Open a dedicated listener connection on [`CHANGE_CHANNEL`].
    ///
    /// # Errors
    ///
    /// Returns `Database` if the connection or `LISTEN` fails.
    pub async fn connect(pool: &PgPool) -> Result<Self, SyncError> {
        let mut listener = PgListener::connect_with(pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;
        Ok(Self { listener, reconnecting: false })
    }
}

#[async_trait]
impl ChangeFeed for PgChangeFeed {
    async fn next(&mut self) -> Result<FeedEvent, SyncError> {
        if self.reconnecting {
            // Any query on the listener reconnects and re-issues LISTEN.
            sqlx::query("SELECT 1").execute(&mut self.listener).await?;
            self.reconnecting = false;
            return Ok(FeedEvent::Connected);
        }
        match self.listener.try_recv().await {
            Ok(Some(notification)) => {
                Ok(FeedEvent::Change(ChangeNotification::from_payload(notification.payload())?))
            }
            Ok(None) => {
                self.reconnecting = true;
                Ok(FeedEvent::Reconnecting)
            }
            Err(e) => {
                self.reconnecting = true;
                Err(e.into())
            }
        }
    }
}

// =============================================================================
// TASK
// =============================================================================

/// Resolve a notification into the snapshot to apply, re-reading id-only payloads.
async fn resolve(session: &BoardSession, notification: ChangeNotification) -> Result<Vec<BoardObject>, SyncError> {
    match notification.objects {
        Some(objects) => Ok(objects),
        None => Ok(session.store().load_board(notification.board_id).await?.objects),
    }
}

/// Handle one feed result. Returns `false` when the feed is closed for good.
async fn handle(session: &BoardSession, event: Result<FeedEvent, SyncError>) -> bool {
    match event {
        Ok(FeedEvent::Change(notification)) => {
            session.set_status(SyncStatus::Connected);
            let board_id = notification.board_id;
            if board_id != session.board_id().await {
                return true;
            }
            match resolve(session, notification).await {
                Ok(objects) => {
                    session.apply_remote(board_id, objects).await;
                }
                Err(e) => warn!(%board_id, error = %e, "sync: could not resolve change"),
            }
            true
        }
        Ok(FeedEvent::Reconnecting) => {
            session.set_status(SyncStatus::Disconnected);
            session.set_status(SyncStatus::Connecting);
            true
        }
        Ok(FeedEvent::Connected) => {
            session.set_status(SyncStatus::Connected);
            true
        }
        Err(SyncError::Closed) => {
            session.set_status(SyncStatus::Disconnected);
            false
        }
        Err(SyncError::Payload(e)) => {
            warn!(error = %e, "sync: dropping malformed notification");
            true
        }
        Err(e) => {
            error!(error = %e, "sync: change feed failed");
            session.set_status(SyncStatus::Disconnected);
            tokio::time::sleep(RETRY_DELAY).await;
            session.set_status(SyncStatus::Connecting);
            true
        }
    }
}

/// Spawn the task that drains `feed` into the session's board.
pub fn spawn_sync_task<F>(session: Arc<BoardSession>, mut feed: F) -> JoinHandle<()>
where
    F: ChangeFeed + 'static,
{
    tokio::spawn(async move {
        session.set_status(SyncStatus::Connected);
        loop {
            let event = feed.next().await;
            if !handle(&session, event).await {
                break;
            }
        }
    })
}
