//! Board session: one opened board wired to its remote store.
//!
//! DESIGN
//! ======
//! The session owns the shared board container, the store handle and the
//! sync status channel. A background task wakes every poll interval and
//! asks the board for a due write. The write is taken under the lock, the
//! lock is released, then the snapshot goes to the store, so the hot path
//! (in-memory mutations) never waits on I/O.
//!
//! ERROR HANDLING
//! ==============
//! A failed write is logged and dropped. Memory is left as is and the next
//! local mutation re-arms the debounce, which retries with the newer
//! snapshot. There is no separate retry queue.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::board::{Board, PendingWrite};
use crate::config::BoardSettings;
use crate::consts::DEFAULT_PERSIST_POLL_MS;
use crate::doc::{BoardId, BoardObject};
use crate::store::{RemoteStore, StoreError};
use crate::sync::{SyncStatus, apply_remote};

/// Board container shared between the command path, persistence and sync.
pub type SharedBoard = Arc<RwLock<Board>>;

pub struct BoardSession {
    board: SharedBoard,
    store: Arc<dyn RemoteStore>,
    status: watch::Sender<SyncStatus>,
}

impl BoardSession {
    /// Load `board_id` from the store and build a fresh container for it.
    ///
    /// # Errors
    ///
    /// Returns the store error if the board cannot be loaded.
    pub async fn open(
        store: Arc<dyn RemoteStore>,
        board_id: BoardId,
        settings: BoardSettings,
    ) -> Result<Self, StoreError> {
        let row = store.load_board(board_id).await?;
        info!(%board_id, name = %row.name, objects = row.objects.len(), "session: board opened");
        let board = Board::load(row.id, row.objects, settings);
        let (status, _) = watch::channel(SyncStatus::Connecting);
        Ok(Self { board: Arc::new(RwLock::new(board)), store, status })
    }

    #[must_use]
    pub fn board(&self) -> SharedBoard {
        Arc::clone(&self.board)
    }

    #[must_use]
    pub fn store(&self) -> Arc<dyn RemoteStore> {
        Arc::clone(&self.store)
    }

    pub async fn board_id(&self) -> BoardId {
        self.board.read().await.board_id()
    }

    #[must_use]
    pub fn status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub(crate) fn set_status(&self, next: SyncStatus) {
        let changed = self.status.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
        if changed {
            info!(status = ?next, "session: sync status changed");
        }
    }

    // --- Persistence ---

    /// Write the debounced snapshot if its quiet period has passed at `now`.
    /// Returns whether a write succeeded.
    pub async fn persist_due(&self, now: Instant) -> bool {
        let pending = self.board.write().await.take_pending_write(now);
        match pending {
            Some(write) => self.write(write).await.is_ok(),
            None => false,
        }
    }

    /// Write any pending snapshot immediately, ignoring the debounce.
    ///
    /// # Errors
    ///
    /// Returns the store error if the write fails.
    pub async fn flush(&self) -> Result<bool, StoreError> {
        let pending = self.board.write().await.flush_pending_write();
        match pending {
            Some(write) => self.write(write).await.map(|()| true),
            None => Ok(false),
        }
    }

    async fn write(&self, write: PendingWrite) -> Result<(), StoreError> {
        let count = write.objects.len();
        match self.store.save_objects(write.board_id, &write.objects).await {
            Ok(()) => {
                debug!(board_id = %write.board_id, count, coalesced = write.coalesced, "session: objects persisted");
                Ok(())
            }
            Err(e) => {
                error!(board_id = %write.board_id, count, error = %e, "session: persist failed");
                Err(e)
            }
        }
    }

    /// Spawn the background persistence task. Returns a handle for shutdown.
    /// A zero `poll` is replaced by the default interval.
    pub fn spawn_persistence_task(self: &Arc<Self>, poll: Duration) -> JoinHandle<()> {
        let poll = if poll.is_zero() {
            warn!("session: zero persist poll interval; using default");
            Duration::from_millis(DEFAULT_PERSIST_POLL_MS)
        } else {
            poll
        };
        let session = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll);
            loop {
                interval.tick().await;
                session.persist_due(Instant::now()).await;
            }
        })
    }

    // --- Board switching / inbound ---

    /// Flush the current board, then load another into the same container.
    /// History, selection and clipboard never cross boards.
    ///
    /// # Errors
    ///
    /// Returns the store error from the flush or the load. On a failed load
    /// the current board stays open.
    pub async fn switch_board(&self, board_id: BoardId) -> Result<(), StoreError> {
        self.flush().await?;
        let row = self.store.load_board(board_id).await?;
        info!(%board_id, name = %row.name, "session: switched board");
        self.board.write().await.reset(row.id, row.objects);
        Ok(())
    }

    /// Apply a snapshot that came from the store's change feed.
    pub async fn apply_remote(&self, board_id: BoardId, objects: Vec<BoardObject>) -> bool {
        let mut board = self.board.write().await;
        apply_remote(&mut board, board_id, objects)
    }
}
